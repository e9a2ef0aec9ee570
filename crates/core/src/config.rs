use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn process_env(key: &str) -> Option<String> {
    env::var(key).ok()
}

/// Profiled variable lookup: tries `{PROFILE}_{KEY}` first, falls back to `{KEY}`.
/// Empty values count as unset.
struct ProfiledEnv<'a> {
    profile: &'a str,
    lookup: &'a dyn Fn(&str) -> Option<String>,
}

impl ProfiledEnv<'_> {
    fn raw(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|s| !s.is_empty())
    }

    fn opt(&self, key: &str) -> Option<String> {
        if !self.profile.is_empty() {
            let prefixed = format!("{}_{}", self.profile, key);
            if let Some(v) = self.raw(&prefixed) {
                return Some(v);
            }
        }
        self.raw(key)
    }

    fn or(&self, key: &str, default: &str) -> String {
        self.opt(key).unwrap_or_else(|| default.to_string())
    }

    fn parse_or<T: FromStr + Copy + std::fmt::Debug>(&self, key: &str, default: T) -> T {
        match self.opt(key) {
            None => default,
            Some(v) => v.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(key, value = %v, ?default, "unparseable value, using default");
                default
            }),
        }
    }

    fn flag_or(&self, key: &str, default: bool) -> bool {
        match self.opt(key).map(|v| v.trim().to_ascii_lowercase()) {
            None => default,
            Some(v) => match v.as_str() {
                "1" | "true" | "yes" | "y" | "on" => true,
                "0" | "false" | "no" | "n" | "off" => false,
                _ => {
                    tracing::warn!(key, value = %v, default, "unparseable flag, using default");
                    default
                }
            },
        }
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub source: SourceConfig,
    pub chunking: ChunkingConfig,
    pub tokenizer: TokenizerConfig,
    pub upload: UploadConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `PDFRAG_PROFILE`. When set (e.g. `PROD`), every
    /// key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = process_env("PDFRAG_PROFILE").unwrap_or_default();
        Self::from_lookup(&profile, &process_env)
    }

    /// Build config for a named profile from an arbitrary variable source.
    pub fn from_lookup(profile: &str, lookup: &dyn Fn(&str) -> Option<String>) -> Self {
        let p = profile.trim().to_uppercase();
        let env = ProfiledEnv { profile: &p, lookup };
        Self {
            source: SourceConfig::from_env_profiled(&env),
            chunking: ChunkingConfig::from_env_profiled(&env),
            tokenizer: TokenizerConfig::from_env_profiled(&env),
            upload: UploadConfig::from_env_profiled(&env),
            profile: p,
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  source:     data_dir={}, languages={}", self.source.data_dir.display(), self.source.languages.join(","));
        tracing::info!(
            "  chunking:   max={}, new_after={}, combine_under={}, overlap={}, overlap_all={}, multipage={}",
            self.chunking.max_characters,
            self.chunking.new_after_n_chars,
            self.chunking.combine_text_under_n_chars,
            self.chunking.overlap,
            self.chunking.overlap_all,
            self.chunking.multipage_sections,
        );
        tracing::info!("  tokenizer:  encoding={}", self.tokenizer.encoding);
        tracing::info!(
            "  upload:     endpoint={}, timeout={}s",
            self.upload.redacted_endpoint().as_deref().unwrap_or("(none)"),
            self.upload.timeout_secs
        );
    }

    /// Return a redacted view safe for printing (no credentials in URLs).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "source": { "data_dir": self.source.data_dir, "languages": self.source.languages },
            "chunking": self.chunking,
            "tokenizer": { "encoding": self.tokenizer.encoding },
            "upload": {
                "endpoint": self.upload.redacted_endpoint(),
                "timeout_secs": self.upload.timeout_secs,
                "configured": self.upload.is_configured(),
            },
        })
    }
}

// ── Source folder ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub data_dir: PathBuf,
    /// Document languages attached to every element's metadata.
    pub languages: Vec<String>,
}

impl SourceConfig {
    fn from_env_profiled(env: &ProfiledEnv<'_>) -> Self {
        let languages = env
            .or("PARTITION_LANGUAGES", "eng")
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        Self {
            data_dir: PathBuf::from(env.or("DATA_FOLDER", "../data")),
            languages,
        }
    }
}

// ── Chunking ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Hard maximum chunk length in characters.
    pub max_characters: usize,
    /// Soft maximum: a chunk at or past this length takes no more elements.
    pub new_after_n_chars: usize,
    /// Chunks shorter than this are combined with their successor.
    pub combine_text_under_n_chars: usize,
    /// Characters carried from the end of one split piece into the next.
    pub overlap: usize,
    /// Apply `overlap` between all chunks, not only split pieces.
    pub overlap_all: bool,
    /// When false, a page change starts a new section.
    pub multipage_sections: bool,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_characters: 500,
            new_after_n_chars: 400,
            combine_text_under_n_chars: 100,
            overlap: 100,
            overlap_all: false,
            multipage_sections: true,
        }
    }
}

impl ChunkingConfig {
    fn from_env_profiled(env: &ProfiledEnv<'_>) -> Self {
        let d = Self::default();
        Self {
            max_characters: env.parse_or("CHUNK_MAX_CHARACTERS", d.max_characters),
            new_after_n_chars: env.parse_or("CHUNK_NEW_AFTER_N_CHARS", d.new_after_n_chars),
            combine_text_under_n_chars: env
                .parse_or("CHUNK_COMBINE_UNDER_N_CHARS", d.combine_text_under_n_chars),
            overlap: env.parse_or("CHUNK_OVERLAP", d.overlap),
            overlap_all: env.flag_or("CHUNK_OVERLAP_ALL", d.overlap_all),
            multipage_sections: env.flag_or("CHUNK_MULTIPAGE_SECTIONS", d.multipage_sections),
        }
    }

    /// Check the hard limits and clamp the soft thresholds to `max_characters`.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        if self.max_characters == 0 {
            return Err(ConfigError::InvalidChunking(
                "max_characters must be greater than 0".into(),
            ));
        }
        if self.overlap >= self.max_characters {
            return Err(ConfigError::InvalidChunking(format!(
                "overlap ({}) must be less than max_characters ({})",
                self.overlap, self.max_characters
            )));
        }
        self.new_after_n_chars = self.new_after_n_chars.min(self.max_characters);
        self.combine_text_under_n_chars = self.combine_text_under_n_chars.min(self.max_characters);
        Ok(self)
    }
}

// ── Tokenizer ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenizerConfig {
    /// tiktoken encoding name, e.g. "cl100k_base".
    pub encoding: String,
}

impl TokenizerConfig {
    fn from_env_profiled(env: &ProfiledEnv<'_>) -> Self {
        Self {
            encoding: env.or("TOKEN_ENCODING", "cl100k_base"),
        }
    }
}

// ── Upload endpoint ───────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
}

impl UploadConfig {
    fn from_env_profiled(env: &ProfiledEnv<'_>) -> Self {
        Self {
            endpoint: env.opt("UPLOAD_API_ENDPOINT").map(|s| s.trim().to_string()),
            timeout_secs: env.parse_or("UPLOAD_TIMEOUT_SECS", 60),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    pub fn require_endpoint(&self) -> Result<&str, ConfigError> {
        self.endpoint.as_deref().ok_or(ConfigError::MissingEndpoint)
    }

    /// Endpoint with any `user:password@` userinfo masked.
    pub fn redacted_endpoint(&self) -> Option<String> {
        let endpoint = self.endpoint.as_deref()?;
        let Some((scheme, rest)) = endpoint.split_once("://") else {
            return Some(endpoint.to_string());
        };
        let authority_end = rest.find('/').unwrap_or(rest.len());
        match rest[..authority_end].rfind('@') {
            Some(at) => Some(format!("{scheme}://***@{}", &rest[at + 1..])),
            None => Some(endpoint.to_string()),
        }
    }
}
