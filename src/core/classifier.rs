use crate::domain::model::{AgeCategory, CategorizedSignal, IntermediateSignal};
use crate::utils::error::{EtlError, Result};
use tokio::sync::mpsc;

impl AgeCategory {
    /// Total over all integers; negative ages land in `Under20`.
    pub fn from_age(age: i64) -> Self {
        match age {
            i64::MIN..=19 => AgeCategory::Under20,
            20..=29 => AgeCategory::Under30,
            30..=39 => AgeCategory::Under40,
            40.. => AgeCategory::Retired,
        }
    }
}

pub fn classify(signal: IntermediateSignal) -> CategorizedSignal {
    CategorizedSignal {
        category: AgeCategory::from_age(signal.age),
        count: signal.count,
    }
}

/// Drains `input` until every sender is gone, forwarding one categorized
/// signal per input. `output` is dropped on return, which closes the
/// reducer's stream.
///
/// Returns the number of signals classified.
pub async fn run_classifier(
    mut input: mpsc::Receiver<IntermediateSignal>,
    output: mpsc::Sender<CategorizedSignal>,
) -> Result<u64> {
    let mut classified = 0u64;

    while let Some(signal) = input.recv().await {
        output
            .send(classify(signal))
            .await
            .map_err(|_| EtlError::ChannelClosed {
                stage: "classifier",
            })?;
        classified += 1;
    }

    tracing::debug!(classified, "classifier input exhausted, closing output");
    Ok(classified)
}
