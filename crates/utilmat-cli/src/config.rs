// crates/utilmat-cli/src/config.rs
//
// Build configuration for the utilmat CLI.
// Loaded from a TOML file or populated with defaults; CLI flags override it.

use serde::Deserialize;
use std::fs;

/// Runtime configuration for a matrix build.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildConfig {
    /// Path of the ratings log (`userId,movieId,rating,...`).
    #[serde(default = "default_ratings_path")]
    pub ratings_path: String,

    /// Path of the item catalog (`movieId,title,...`).
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    /// Records per batch on the streaming path.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Load the whole ratings log and build without chunking.
    #[serde(default)]
    pub in_memory: bool,

    /// Text encoding of both input files: "latin1" or "utf8".
    #[serde(default = "default_encoding")]
    pub encoding: String,

    /// Cross-chunk conflict handling: "newest-wins" or "reject".
    #[serde(default = "default_conflict_policy")]
    pub conflict_policy: String,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_ratings_path() -> String {
    "ratings.csv".to_string()
}

fn default_catalog_path() -> String {
    "movies.csv".to_string()
}

fn default_chunk_size() -> usize {
    100_000
}

fn default_encoding() -> String {
    "latin1".to_string()
}

fn default_conflict_policy() -> String {
    "newest-wins".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            ratings_path: default_ratings_path(),
            catalog_path: default_catalog_path(),
            chunk_size: default_chunk_size(),
            in_memory: false,
            encoding: default_encoding(),
            conflict_policy: default_conflict_policy(),
            log_level: default_log_level(),
        }
    }
}

impl BuildConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: BuildConfig = toml::from_str(contents)?;
        Ok(config)
    }
}
