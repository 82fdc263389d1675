pub mod toml_config;

use crate::core::map_reduce::MAX_MAPPER_CONCURRENCY;
use crate::domain::model::ReportFormat;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::Parser))]
#[cfg_attr(feature = "cli", command(name = "player-age-etl"))]
#[cfg_attr(
    feature = "cli",
    command(about = "Counts players per age bracket with a concurrent map-reduce pipeline")
)]
pub struct CliConfig {
    /// CSV file to read, relative to --base-dir
    #[cfg_attr(feature = "cli", arg(long, default_value = "data.csv"))]
    pub input: String,

    #[cfg_attr(feature = "cli", arg(long, default_value = "."))]
    pub base_dir: String,

    #[cfg_attr(feature = "cli", arg(long, value_enum, default_value_t = ReportFormat::Text))]
    pub format: ReportFormat,

    /// Cap on concurrently running mapper tasks (default: one per record)
    #[cfg_attr(feature = "cli", arg(long))]
    pub mapper_concurrency: Option<usize>,

    /// Treat the first row as data instead of a header
    #[cfg_attr(feature = "cli", arg(long))]
    pub no_headers: bool,

    #[cfg_attr(feature = "cli", arg(long, default_value_t = ','))]
    pub delimiter: char,

    /// Age column index, only used with --no-headers
    #[cfg_attr(feature = "cli", arg(long, default_value_t = 0))]
    pub age_column: usize,

    #[cfg_attr(feature = "cli", arg(long, help = "Enable verbose output"))]
    pub verbose: bool,

    #[cfg_attr(feature = "cli", arg(long, help = "Log CPU and memory usage per phase"))]
    pub monitor: bool,

    #[cfg_attr(feature = "cli", arg(long, help = "Emit logs as JSON"))]
    pub json_logs: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            input: "data.csv".to_string(),
            base_dir: ".".to_string(),
            format: ReportFormat::Text,
            mapper_concurrency: None,
            no_headers: false,
            delimiter: ',',
            age_column: 0,
            verbose: false,
            monitor: false,
            json_logs: false,
        }
    }
}

impl ConfigProvider for CliConfig {
    fn input_path(&self) -> &str {
        &self.input
    }

    fn has_headers(&self) -> bool {
        !self.no_headers
    }

    fn delimiter(&self) -> u8 {
        // Non-ASCII delimiters are rejected by `validate`.
        self.delimiter as u8
    }

    fn age_column(&self) -> usize {
        self.age_column
    }

    fn mapper_concurrency(&self) -> Option<usize> {
        self.mapper_concurrency
    }

    fn output_format(&self) -> ReportFormat {
        self.format
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input", &self.input)?;
        validation::validate_file_extension("input", &self.input, &["csv", "tsv", "txt"])?;
        validation::validate_path("base_dir", &self.base_dir)?;
        validation::validate_delimiter("delimiter", self.delimiter)?;
        if let Some(concurrency) = self.mapper_concurrency {
            validation::validate_range(
                "mapper_concurrency",
                concurrency,
                1,
                MAX_MAPPER_CONCURRENCY,
            )?;
        }
        Ok(())
    }
}
