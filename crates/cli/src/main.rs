mod cli;
mod pipeline;
mod terminal;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use pdfrag_core::config::{load_dotenv, Config};
use pdfrag_ingest::{UploadOutcome, UploadReport};

use crate::cli::CliArgs;
use crate::pipeline::Pipeline;
use crate::terminal::Terminal;

/// How a run ended, before it becomes a process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    Success,
    Failure,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        match exit {
            Exit::Success => ExitCode::SUCCESS,
            Exit::Failure => ExitCode::FAILURE,
        }
    }
}

/// The closing line of an upload.
#[derive(Debug, PartialEq, Eq)]
enum Summary {
    Success(String),
    Warning(String),
    Error(String),
}

impl Summary {
    fn of(report: &UploadReport, endpoint: &str) -> Self {
        let counts = format!("{} / {} documents uploaded", report.uploaded, report.total);
        match report.outcome() {
            UploadOutcome::All => Summary::Success(counts),
            UploadOutcome::Partial => Summary::Warning(counts),
            UploadOutcome::None => Summary::Error(format!(
                "Error occurred while connecting to {endpoint}, no document uploaded!"
            )),
        }
    }

    fn exit(&self) -> Exit {
        match self {
            Summary::Error(_) => Exit::Failure,
            Summary::Success(_) | Summary::Warning(_) => Exit::Success,
        }
    }

    fn print(&self, terminal: &Terminal) -> Result<()> {
        match self {
            Summary::Success(msg) => terminal.print_success(msg),
            Summary::Warning(msg) => terminal.print_warning(msg),
            Summary::Error(msg) => terminal.print_error(msg),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();
    let terminal = Terminal::new(args.yes);

    load_dotenv();
    let config = load_config(&args);

    match run(&args, &config, &terminal).await {
        Ok(exit) => exit.into(),
        Err(e) => {
            let _ = terminal.print_error(&format!("Exception occurred: '{e:#}'"));
            ExitCode::FAILURE
        }
    }
}

/// Environment config (profiled when `--profile` is set) with flags on top.
fn load_config(args: &CliArgs) -> Config {
    let mut config = match &args.profile {
        Some(profile) => Config::from_lookup(profile, &|k: &str| std::env::var(k).ok()),
        None => Config::from_env(),
    };
    args.apply(&mut config);
    config
}

async fn run(args: &CliArgs, config: &Config, terminal: &Terminal) -> Result<Exit> {
    config.log_summary();
    terminal.print_success("Environment loaded")?;

    let endpoint = match config.upload.require_endpoint() {
        Ok(endpoint) => endpoint.to_string(),
        Err(e) => {
            terminal.print_error(&e.to_string())?;
            return Ok(Exit::Failure);
        }
    };

    let pipeline = Pipeline::new(config, terminal)?;
    let data_dir = &config.source.data_dir;

    terminal.print_warning(&format!(
        "This uploads all pdf documents from {} to the embedding database!",
        data_dir.display()
    ))?;
    if !terminal.confirm()? {
        info!("aborted before extraction");
        return Ok(Exit::Success);
    }

    let elements = pipeline.load(data_dir)?;
    let chunks = pipeline.chunk(&elements)?;
    let documents = pipeline.prepare(&chunks)?;

    let num_tokens = pipeline.estimate_tokens(&documents)?;
    terminal.print_info(&format!("Estimated number of tokens: {num_tokens}"))?;

    if args.dry_run {
        terminal.print_info("Dry run, nothing uploaded")?;
        return Ok(Exit::Success);
    }
    if !terminal.confirm()? {
        info!("aborted before upload");
        return Ok(Exit::Success);
    }

    let report = pipeline.upload(&endpoint, &documents).await?;
    let summary = Summary::of(&report, &config.upload.redacted_endpoint().unwrap_or_default());
    summary.print(terminal)?;
    Ok(summary.exit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::Router;
    use pdfrag_ingest::testing::pdf_with_pages;

    // ── Helpers ─────────────────────────────────────────────────────

    /// Endpoint answering every POST with `status`, counting the requests.
    async fn spawn_endpoint(status: StatusCode) -> (String, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route(
                "/documents",
                post(move |State(hits): State<Arc<AtomicUsize>>| async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    status
                }),
            )
            .with_state(hits.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/documents"), hits)
    }

    fn write_manual(dir: &Path) {
        std::fs::write(
            dir.join("manual.pdf"),
            pdf_with_pages(&["Alpha page text here.", "Beta page text here."]),
        )
        .unwrap();
    }

    fn config_for(data_dir: &Path, endpoint: Option<&str>) -> Config {
        let mut config = Config::from_lookup("", &|_: &str| -> Option<String> { None });
        config.source.data_dir = data_dir.to_path_buf();
        config.upload.endpoint = endpoint.map(str::to_string);
        config.upload.timeout_secs = 5;
        config
    }

    fn answering(answers: &str) -> Terminal {
        Terminal::with_input(false, Cursor::new(answers.to_string()))
    }

    // ── Operator flow ───────────────────────────────────────────────

    #[tokio::test]
    async fn missing_endpoint_stops_before_any_work() {
        // The folder does not exist: any attempt to load would be an error.
        let config = config_for(Path::new("/nonexistent/pdfrag-data"), None);
        let args = CliArgs::parse_from(["pdfrag"]);
        let exit = run(&args, &config, &answering("y\ny\n")).await.unwrap();
        assert_eq!(exit, Exit::Failure);
    }

    #[tokio::test]
    async fn declining_first_prompt_exits_cleanly() {
        let config = config_for(Path::new("/nonexistent/pdfrag-data"), Some("http://127.0.0.1:9/documents"));
        let args = CliArgs::parse_from(["pdfrag"]);
        let exit = run(&args, &config, &answering("n\n")).await.unwrap();
        assert_eq!(exit, Exit::Success);
    }

    #[tokio::test]
    async fn declining_second_prompt_uploads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        write_manual(dir.path());
        let (url, hits) = spawn_endpoint(StatusCode::CREATED).await;
        let config = config_for(dir.path(), Some(url.as_str()));
        let args = CliArgs::parse_from(["pdfrag"]);

        let exit = run(&args, &config, &answering("y\nn\n")).await.unwrap();
        assert_eq!(exit, Exit::Success);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn dry_run_stops_after_estimate() {
        let dir = tempfile::tempdir().unwrap();
        write_manual(dir.path());
        let (url, hits) = spawn_endpoint(StatusCode::CREATED).await;
        let config = config_for(dir.path(), Some(url.as_str()));
        let args = CliArgs::parse_from(["pdfrag", "--dry-run"]);

        // Only one answer: a second prompt would read end of input.
        let exit = run(&args, &config, &answering("y\n")).await.unwrap();
        assert_eq!(exit, Exit::Success);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn confirmed_upload_posts_every_document() {
        let dir = tempfile::tempdir().unwrap();
        write_manual(dir.path());
        let (url, hits) = spawn_endpoint(StatusCode::CREATED).await;
        let config = config_for(dir.path(), Some(url.as_str()));
        let args = CliArgs::parse_from(["pdfrag"]);

        let exit = run(&args, &config, &answering("y\ny\n")).await.unwrap();
        assert_eq!(exit, Exit::Success);
        assert!(hits.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn nothing_created_is_a_failure() {
        let dir = tempfile::tempdir().unwrap();
        write_manual(dir.path());
        let (url, hits) = spawn_endpoint(StatusCode::INTERNAL_SERVER_ERROR).await;
        let config = config_for(dir.path(), Some(url.as_str()));
        let args = CliArgs::parse_from(["pdfrag", "--yes"]);

        let exit = run(&args, &config, &Terminal::with_input(true, std::io::empty()))
            .await
            .unwrap();
        assert_eq!(exit, Exit::Failure);
        assert!(hits.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn unknown_encoding_fails_before_prompting() {
        let mut config = config_for(Path::new("/nonexistent/pdfrag-data"), Some("http://127.0.0.1:9/documents"));
        config.tokenizer.encoding = "gpt9_base".into();
        let args = CliArgs::parse_from(["pdfrag"]);

        // Declining would exit cleanly; the encoding error must come first.
        let err = run(&args, &config, &answering("n\n")).await.unwrap_err();
        assert!(format!("{err:#}").contains("gpt9_base"));
    }

    #[tokio::test]
    async fn missing_folder_is_reported_as_error() {
        let config = config_for(Path::new("/nonexistent/pdfrag-data"), Some("http://127.0.0.1:9/documents"));
        let args = CliArgs::parse_from(["pdfrag"]);
        let err = run(&args, &config, &answering("y\n")).await.unwrap_err();
        assert!(format!("{err:#}").contains("not found"));
    }

    // ── Summary ─────────────────────────────────────────────────────

    fn report(uploaded: usize, total: usize) -> UploadReport {
        UploadReport {
            uploaded,
            total,
            ..UploadReport::default()
        }
    }

    #[test]
    fn summary_follows_outcome() {
        let endpoint = "http://localhost:8000/api/documents";

        let all = Summary::of(&report(3, 3), endpoint);
        assert_eq!(all, Summary::Success("3 / 3 documents uploaded".into()));
        assert_eq!(all.exit(), Exit::Success);

        let partial = Summary::of(&report(1, 3), endpoint);
        assert_eq!(partial, Summary::Warning("1 / 3 documents uploaded".into()));
        assert_eq!(partial.exit(), Exit::Success);

        let none = Summary::of(&report(0, 3), endpoint);
        assert_eq!(
            none,
            Summary::Error(format!("Error occurred while connecting to {endpoint}, no document uploaded!"))
        );
        assert_eq!(none.exit(), Exit::Failure);
    }

    #[test]
    fn empty_upload_is_a_success() {
        assert_eq!(Summary::of(&report(0, 0), "http://x").exit(), Exit::Success);
    }
}
