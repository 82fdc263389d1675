use crate::domain::model::{AgeHistogram, Player, ReportFormat};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn has_headers(&self) -> bool;
    fn delimiter(&self) -> u8;
    /// Column holding the age when the file has no header row.
    fn age_column(&self) -> usize;
    /// Upper bound on concurrently running mapper tasks; `None` means one slot per record.
    fn mapper_concurrency(&self) -> Option<usize>;
    fn output_format(&self) -> ReportFormat;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Player>>;
    async fn transform(&self, players: Vec<Player>) -> Result<AgeHistogram>;
    async fn load(&self, histogram: AgeHistogram) -> Result<String>;
}
