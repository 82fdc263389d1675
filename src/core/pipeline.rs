use crate::adapters::csv_source::CsvPlayerSource;
use crate::adapters::report;
use crate::core::map_reduce::{run_map_reduce, MapReduceOptions};
use crate::domain::model::{AgeHistogram, Player};
use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
use crate::utils::error::Result;

/// Loads players from CSV, buckets them by age, and renders the histogram.
pub struct AgeHistogramPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> AgeHistogramPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn source(&self) -> CsvPlayerSource {
        CsvPlayerSource::new(
            self.config.has_headers(),
            self.config.delimiter(),
            self.config.age_column(),
        )
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for AgeHistogramPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<Player>> {
        tracing::debug!("Reading player dataset from {}", self.config.input_path());
        let data = self.storage.read_file(self.config.input_path()).await?;
        self.source().parse(&data)
    }

    async fn transform(&self, players: Vec<Player>) -> Result<AgeHistogram> {
        let options = MapReduceOptions {
            mapper_concurrency: self.config.mapper_concurrency(),
        };
        run_map_reduce(players, options).await
    }

    async fn load(&self, histogram: AgeHistogram) -> Result<String> {
        let rendered = report::render(&histogram, self.config.output_format())?;
        for (category, count) in histogram.iter() {
            tracing::debug!(%category, count, "bracket total");
        }
        Ok(rendered)
    }
}
