// crates/utilmat-cli/src/commands/build.rs
//
// `utilmat build` — build the utility matrix from a catalog and ratings log.

use std::fs::File;
use std::io::{self, BufWriter};

use clap::Args;
use utilmat_build::{BuildRequest, BuiltMatrix, ConflictPolicy, MatrixBuilder};
use utilmat_ingest::{load_catalog, read_events, CsvEventSource, TextEncoding};

use crate::config::BuildConfig;
use crate::output::{self, OutputFormat};

/// Matrix build command. Flags override the configuration file.
#[derive(Debug, Args)]
pub struct BuildCmd {
    /// Ratings log (CSV with userId, movieId, rating columns).
    #[arg(long)]
    pub ratings: Option<String>,

    /// Item catalog (CSV with movieId, title columns).
    #[arg(long)]
    pub catalog: Option<String>,

    /// Records per streamed batch.
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Load all ratings at once instead of streaming batches.
    #[arg(long)]
    pub in_memory: bool,

    /// Input text encoding: latin1 or utf8.
    #[arg(long)]
    pub encoding: Option<String>,

    /// Cross-chunk conflict handling: newest-wins or reject.
    #[arg(long)]
    pub conflict_policy: Option<String>,

    /// Output format for the matrix.
    #[arg(long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Write the matrix to this file instead of stdout (csv and json only).
    #[arg(long)]
    pub output: Option<String>,

    /// Maximum number of matrix rows printed in table format.
    #[arg(long, default_value = "20")]
    pub limit: usize,
}

impl BuildCmd {
    /// Apply command-line overrides to the loaded configuration.
    pub fn apply(&self, config: &mut BuildConfig) {
        if let Some(ratings) = &self.ratings {
            config.ratings_path = ratings.clone();
        }
        if let Some(catalog) = &self.catalog {
            config.catalog_path = catalog.clone();
        }
        if let Some(chunk_size) = self.chunk_size {
            config.chunk_size = chunk_size;
        }
        if self.in_memory {
            config.in_memory = true;
        }
        if let Some(encoding) = &self.encoding {
            config.encoding = encoding.clone();
        }
        if let Some(policy) = &self.conflict_policy {
            config.conflict_policy = policy.clone();
        }
    }
}

/// Run the build command.
pub fn run(cmd: &BuildCmd, mut config: BuildConfig) -> Result<(), Box<dyn std::error::Error>> {
    cmd.apply(&mut config);

    let encoding: TextEncoding = config.encoding.parse()?;
    let policy: ConflictPolicy = config.conflict_policy.parse()?;
    let catalog = load_catalog(&config.catalog_path, encoding)?;
    let builder = MatrixBuilder::new(&catalog).with_conflict_policy(policy);

    let built = if config.in_memory {
        let events = read_events(&config.ratings_path, encoding)?;
        builder.build(BuildRequest::in_memory(events))?
    } else {
        let source = CsvEventSource::new(encoding);
        builder.build(BuildRequest::streaming(
            &source,
            config.ratings_path.clone(),
            config.chunk_size,
        ))?
    };

    emit(cmd, &built)
}

fn emit(cmd: &BuildCmd, built: &BuiltMatrix) -> Result<(), Box<dyn std::error::Error>> {
    match cmd.format {
        OutputFormat::Table => {
            println!("{}", output::format_report(&built.report, &built.matrix));
            println!();
            println!("{}", output::format_matrix(&built.matrix, cmd.limit));
            if built.matrix.len() > cmd.limit {
                println!("... {} more rows", built.matrix.len() - cmd.limit);
            }
        }
        OutputFormat::Json => {
            let body = serde_json::json!({
                "report": &built.report,
                "matrix": &built.matrix,
            });
            let text = output::format_json(&body);
            match &cmd.output {
                Some(path) => std::fs::write(path, text)?,
                None => println!("{}", text),
            }
        }
        OutputFormat::Csv => {
            match &cmd.output {
                Some(path) => {
                    output::write_matrix_csv(&built.matrix, BufWriter::new(File::create(path)?))?;
                    tracing::info!("Wrote {} rows to {}", built.matrix.len(), path);
                }
                None => output::write_matrix_csv(&built.matrix, io::stdout().lock())?,
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd() -> BuildCmd {
        BuildCmd {
            ratings: None,
            catalog: Some("/data/movies.csv".to_string()),
            chunk_size: Some(500),
            in_memory: false,
            encoding: None,
            conflict_policy: Some("reject".to_string()),
            format: OutputFormat::Table,
            output: None,
            limit: 20,
        }
    }

    #[test]
    fn flags_override_config_values() {
        let mut config = BuildConfig::default();
        cmd().apply(&mut config);

        assert_eq!(config.catalog_path, "/data/movies.csv");
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.conflict_policy, "reject");
        assert_eq!(config.ratings_path, "ratings.csv");
        assert_eq!(config.encoding, "latin1");
    }

    #[test]
    fn in_memory_flag_only_turns_the_option_on() {
        let mut config = BuildConfig {
            in_memory: true,
            ..BuildConfig::default()
        };
        cmd().apply(&mut config);
        assert!(config.in_memory);
    }
}
