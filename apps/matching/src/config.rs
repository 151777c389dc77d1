use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

use crate::matching::extractor::{ExtractorConfig, DEFAULT_MAX_PROFILE_CHARS};
use crate::matching::similarity::SimilarityBackend;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    pub similarity_backend: SimilarityBackend,
    /// Scores must be strictly above this to appear in top-match listings.
    pub match_threshold: f64,
    pub match_top_n: usize,
    pub extractor: ExtractorConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let similarity_backend = match get("SIMILARITY_BACKEND") {
            Some(raw) => raw.parse::<SimilarityBackend>().map_err(|e| anyhow!(e))?,
            None => SimilarityBackend::default(),
        };

        let match_threshold: f64 = parse_or(&get, "MATCH_THRESHOLD", 0.3)?;
        if !(0.0..=1.0).contains(&match_threshold) {
            return Err(anyhow!("MATCH_THRESHOLD must be within [0, 1]"));
        }

        let match_top_n: usize = parse_or(&get, "MATCH_TOP_N", 10)?;
        if match_top_n == 0 {
            return Err(anyhow!("MATCH_TOP_N must be at least 1"));
        }

        let mut extractor = ExtractorConfig {
            min_token_length: parse_or(&get, "MIN_TOKEN_LENGTH", 1)?,
            max_profile_chars: parse_or(&get, "MAX_PROFILE_CHARS", DEFAULT_MAX_PROFILE_CHARS)?,
            ..ExtractorConfig::default()
        };
        if let Some(path) = get("STOPWORDS_PATH") {
            extractor = extractor.with_stopwords(load_stopwords(Path::new(&path))?);
        }

        Ok(Config {
            database_url: require(&get, "DATABASE_URL")?,
            port: parse_or(&get, "PORT", 8080u16)
                .context("PORT must be a valid port number")?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            similarity_backend,
            match_threshold,
            match_top_n,
            extractor,
        })
    }
}

/// Reads one stopword per line. Blank lines and `#` comments are skipped.
pub fn load_stopwords(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read stopwords file '{}'", path.display()))?;

    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

fn require<F>(get: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    get(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_or<F, T>(get: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("Invalid value for '{key}': {e}")),
        None => Ok(default),
    }
}
