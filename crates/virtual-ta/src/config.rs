use std::path::PathBuf;

use crate::answer::{AnswerConfig, DEFAULT_MAX_LINKS};
use crate::corpus::CorpusPolicy;
use crate::error::AppError;

/// Application configuration loaded explicitly from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Socket address the HTTP server binds, e.g. "0.0.0.0:5000".
    pub listen_addr: String,
    /// Directory holding `course_content.json` and `discourse_posts.json`.
    pub data_dir: PathBuf,
    pub corpus_policy: CorpusPolicy,
    /// Maximum links per answer.
    pub max_links: usize,
    /// Whether the no-match answer cites the course Discourse category.
    pub fallback_link: bool,
}

impl Config {
    /// All optional:
    /// - `TA_LISTEN_ADDR` (default: "0.0.0.0:5000")
    /// - `TA_DATA_DIR` (default: "data")
    /// - `TA_CORPUS_POLICY`: embedded | file | fallback (default: fallback)
    /// - `TA_MAX_LINKS` (default: 5, at least 1)
    /// - `TA_FALLBACK_LINK`: true | false (default: true)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let corpus_policy = match var("TA_CORPUS_POLICY") {
            Some(raw) => raw.parse()?,
            None => CorpusPolicy::Fallback,
        };

        let max_links = match var("TA_MAX_LINKS") {
            Some(raw) => parse_max_links(&raw)?,
            None => DEFAULT_MAX_LINKS,
        };

        let fallback_link = match var("TA_FALLBACK_LINK") {
            Some(raw) => parse_bool("TA_FALLBACK_LINK", &raw)?,
            None => true,
        };

        Ok(Self {
            listen_addr: var("TA_LISTEN_ADDR").unwrap_or_else(|| "0.0.0.0:5000".to_string()),
            data_dir: var("TA_DATA_DIR").map_or_else(|| PathBuf::from("data"), PathBuf::from),
            corpus_policy,
            max_links,
            fallback_link,
        })
    }

    pub fn answer_config(&self) -> AnswerConfig {
        AnswerConfig {
            max_links: self.max_links,
            fallback_link: self.fallback_link,
        }
    }
}

fn parse_max_links(raw: &str) -> Result<usize, AppError> {
    raw.trim()
        .parse::<usize>()
        .ok()
        .filter(|&n| n > 0)
        .ok_or_else(|| {
            AppError::Config(format!("TA_MAX_LINKS must be a positive integer, got '{raw}'"))
        })
}

fn parse_bool(name: &str, raw: &str) -> Result<bool, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(AppError::Config(format!("{name} must be true or false, got '{raw}'"))),
    }
}
