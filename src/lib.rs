pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::local_storage::LocalStorage;
pub use config::{toml_config::TomlConfig, CliConfig};
pub use core::{
    etl::EtlEngine,
    map_reduce::{run_map_reduce, MapReduceJob, MapReduceOptions, PipelineState},
    pipeline::AgeHistogramPipeline,
};
pub use domain::model::{AgeCategory, AgeHistogram, Player, ReportFormat};
pub use utils::error::{EtlError, Result};
