use crate::domain::model::{AgeHistogram, CategorizedSignal};
use crate::utils::error::{EtlError, Result};
use tokio::sync::{mpsc, oneshot};

/// Folds every categorized signal into one histogram and hands it over once
/// the classifier closes its side of the channel.
pub async fn run_reducer(
    mut input: mpsc::Receiver<CategorizedSignal>,
    result: oneshot::Sender<AgeHistogram>,
) -> Result<()> {
    let mut histogram = AgeHistogram::new();

    while let Some(signal) = input.recv().await {
        histogram.accumulate(signal.category, signal.count);
    }

    tracing::debug!(
        categories = histogram.len(),
        total = histogram.total(),
        "reducer input exhausted, delivering histogram"
    );

    result
        .send(histogram)
        .map_err(|_| EtlError::ChannelClosed { stage: "reducer" })
}
