use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use std::time::Instant;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    /// Runs extract, map-reduce and report rendering in order. Returns the rendered report.
    pub async fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("Starting player age ETL");

        let players = self.pipeline.extract().await?;
        tracing::info!("Extracted {} player records", players.len());
        self.monitor.log_stats("extract");

        let histogram = self.pipeline.transform(players).await?;
        tracing::info!(
            "Bucketed {} players into {} age brackets",
            histogram.total(),
            histogram.len()
        );
        self.monitor.log_stats("map-reduce");

        let report = self.pipeline.load(histogram).await?;
        self.monitor.log_stats("report");

        tracing::info!("ETL finished in {:?}", started.elapsed());
        self.monitor.log_final_stats();

        Ok(report)
    }
}
