use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use indicatif::{ProgressBar, ProgressStyle};

/// Color scheme for terminal output.
struct Colors;

impl Colors {
    const SUCCESS: Color = Color::Green;
    const WARNING: Color = Color::Yellow;
    const ERROR: Color = Color::Red;
    const PROMPT: Color = Color::Cyan;
    const INFO: Color = Color::Blue;
    const STEP: Color = Color::Magenta;
}

/// Operator-facing output: status lines, confirmations, progress bars.
pub struct Terminal {
    /// Auto-confirm every prompt (`--yes`).
    assume_yes: bool,
    input: RefCell<Box<dyn BufRead>>,
}

impl Terminal {
    pub fn new(assume_yes: bool) -> Self {
        Self::with_input(assume_yes, io::BufReader::new(io::stdin()))
    }

    /// Read confirmation answers from `input` instead of stdin.
    pub fn with_input(assume_yes: bool, input: impl BufRead + 'static) -> Self {
        Self {
            assume_yes,
            input: RefCell::new(Box::new(input)),
        }
    }

    fn print_colored(&self, color: Color, glyph: &str, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(color),
            Print(glyph),
            ResetColor,
            Print(format!(" {}\n", msg)),
        )?;
        stdout.flush()?;
        Ok(())
    }

    pub fn print_success(&self, msg: &str) -> Result<()> {
        self.print_colored(Colors::SUCCESS, "✔", msg)
    }

    pub fn print_warning(&self, msg: &str) -> Result<()> {
        self.print_colored(Colors::WARNING, "⚠", msg)
    }

    pub fn print_error(&self, msg: &str) -> Result<()> {
        self.print_colored(Colors::ERROR, "✘", msg)
    }

    pub fn print_info(&self, msg: &str) -> Result<()> {
        self.print_colored(Colors::INFO, "ℹ", msg)
    }

    /// Announce a pipeline step.
    pub fn print_step(&self, msg: &str) -> Result<()> {
        self.print_colored(Colors::STEP, "▸", msg)
    }

    /// Ask `Do you want to continue? (y/N)`. Only `y` (any case) continues;
    /// end of input counts as no.
    pub fn confirm(&self) -> Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::PROMPT),
            Print("?"),
            ResetColor,
            Print(" Do you want to continue? (y/N): "),
        )?;
        stdout.flush()?;

        let mut input = String::new();
        let read = self.input.borrow_mut().read_line(&mut input)?;
        Ok(read > 0 && is_affirmative(&input))
    }

    /// Progress bar for a counted loop. The length is set by the callee.
    pub fn progress_bar(&self, desc: &str) -> ProgressBar {
        let pb = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.green} {prefix} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
        pb.set_style(style);
        pb.set_prefix(desc.to_string());
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    }
}

fn is_affirmative(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case("y")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_y_confirms() {
        assert!(is_affirmative("y\n"));
        assert!(is_affirmative("  Y  "));
        assert!(!is_affirmative("yes"));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("n"));
    }

    #[test]
    fn assume_yes_skips_prompt() {
        let term = Terminal::with_input(true, io::empty());
        assert!(term.confirm().unwrap());
    }

    #[test]
    fn answers_are_read_line_by_line() {
        let term = Terminal::with_input(false, io::Cursor::new("y\nno\n"));
        assert!(term.confirm().unwrap());
        assert!(!term.confirm().unwrap());
        // End of input declines.
        assert!(!term.confirm().unwrap());
    }
}
