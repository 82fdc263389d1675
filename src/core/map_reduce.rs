//! Driver for the map → classify → reduce pipeline.
//!
//! Every player gets its own mapper task. All mappers share one sender of the
//! intermediate channel, and the classifier and reducer each run as a single
//! long-lived task. The driver joins every mapper before it drops its own
//! sender. Dropping that last sender is the only end-of-stream signal the
//! classifier ever sees.

use crate::core::classifier::run_classifier;
use crate::core::mapper::run_mapper;
use crate::core::reducer::run_reducer;
use crate::domain::model::{AgeHistogram, Player};
use crate::utils::error::{EtlError, Result};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Semaphore};
use tokio::task::JoinSet;

/// Largest mapper concurrency accepted from configuration.
pub const MAX_MAPPER_CONCURRENCY: usize = 1 << 20;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapReduceOptions {
    /// Maximum number of mapper tasks alive at once. `None` sizes the pool to the input.
    pub mapper_concurrency: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    NotStarted,
    FanningOutMappers,
    ClassifyingAndReducing,
    Delivered,
}

impl PipelineState {
    pub fn as_str(self) -> &'static str {
        match self {
            PipelineState::NotStarted => "NotStarted",
            PipelineState::FanningOutMappers => "FanningOutMappers",
            PipelineState::ClassifyingAndReducing => "ClassifyingAndReducing",
            PipelineState::Delivered => "Delivered",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single run of the pipeline. Jobs are one-shot.
pub struct MapReduceJob {
    options: MapReduceOptions,
    state: PipelineState,
    #[cfg(test)]
    mapper_fault: Option<(usize, MapperFault)>,
}

#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MapperFault {
    Error,
    Panic,
}

impl MapReduceJob {
    pub fn new(options: MapReduceOptions) -> Self {
        Self {
            options,
            state: PipelineState::NotStarted,
            #[cfg(test)]
            mapper_fault: None,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    fn transition(&mut self, next: PipelineState) {
        tracing::debug!(from = %self.state, to = %next, "pipeline state change");
        self.state = next;
    }

    pub async fn run(&mut self, players: impl Into<Arc<[Player]>>) -> Result<AgeHistogram> {
        if self.state != PipelineState::NotStarted {
            return Err(EtlError::PipelineStateError {
                expected: PipelineState::NotStarted.as_str(),
                actual: self.state.as_str(),
            });
        }

        let players: Arc<[Player]> = players.into();
        let expected = players.len() as u64;
        // Room for the whole fan-out so no mapper can block on a full buffer.
        let capacity = players.len().max(1);

        let (signal_tx, signal_rx) = mpsc::channel(capacity);
        let (category_tx, category_rx) = mpsc::channel(capacity);
        let (result_tx, result_rx) = oneshot::channel();

        let classifier = tokio::spawn(run_classifier(signal_rx, category_tx));
        let reducer = tokio::spawn(run_reducer(category_rx, result_tx));

        self.transition(PipelineState::FanningOutMappers);

        // Never more permits than records, which also stays under Semaphore::MAX_PERMITS.
        let permits = self
            .options
            .mapper_concurrency
            .unwrap_or(capacity)
            .clamp(1, capacity);
        let semaphore = Arc::new(Semaphore::new(permits));
        let mut mappers = JoinSet::new();

        tracing::info!(
            records = players.len(),
            concurrency = permits,
            "fanning out mappers"
        );

        for index in 0..players.len() {
            let permit = match Arc::clone(&semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    mappers.abort_all();
                    classifier.abort();
                    reducer.abort();
                    return Err(EtlError::ChannelClosed {
                        stage: "mapper pool",
                    });
                }
            };
            let players = Arc::clone(&players);
            let sender = signal_tx.clone();
            #[cfg(test)]
            let fault = self
                .mapper_fault
                .filter(|(at, _)| *at == index)
                .map(|(_, fault)| fault);
            mappers.spawn(async move {
                let _permit = permit;
                #[cfg(test)]
                match fault {
                    Some(MapperFault::Error) => {
                        return Err(EtlError::ChannelClosed { stage: "mapper" })
                    }
                    Some(MapperFault::Panic) => panic!("mapper {} crashed", index),
                    None => {}
                }
                run_mapper(players, index, sender).await
            });
        }

        while let Some(joined) = mappers.join_next().await {
            if let Err(e) = joined.map_err(EtlError::from).and_then(|mapped| mapped) {
                tracing::error!("mapper failed, aborting run: {}", e);
                mappers.abort_all();
                classifier.abort();
                reducer.abort();
                return Err(e);
            }
        }

        // Every mapper has finished; this is the end of the intermediate stream.
        drop(signal_tx);
        self.transition(PipelineState::ClassifyingAndReducing);

        let classified = classifier.await??;
        reducer.await??;
        let histogram = result_rx
            .await
            .map_err(|_| EtlError::ChannelClosed { stage: "reducer" })?;

        if classified != expected || histogram.total() != expected {
            return Err(EtlError::ConservationError {
                expected,
                actual: histogram.total(),
            });
        }

        self.transition(PipelineState::Delivered);
        tracing::info!(
            records = expected,
            categories = histogram.len(),
            "age histogram delivered"
        );

        Ok(histogram)
    }
}

pub async fn run_map_reduce(
    players: impl Into<Arc<[Player]>>,
    options: MapReduceOptions,
) -> Result<AgeHistogram> {
    MapReduceJob::new(options).run(players).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::AgeCategory;

    fn players(ages: &[i64]) -> Vec<Player> {
        ages.iter().copied().map(Player::with_age).collect()
    }

    fn expected(pairs: &[(AgeCategory, u64)]) -> AgeHistogram {
        pairs.iter().copied().collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_mixed_ages_scenario() {
        let histogram = run_map_reduce(
            players(&[15, 25, 25, 35, 45, 60]),
            MapReduceOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(
            histogram,
            expected(&[
                (AgeCategory::Under20, 1),
                (AgeCategory::Under30, 2),
                (AgeCategory::Under40, 1),
                (AgeCategory::Retired, 2),
            ])
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_lower_boundaries_scenario() {
        let histogram = run_map_reduce(players(&[20, 30, 40]), MapReduceOptions::default())
            .await
            .unwrap();

        assert_eq!(
            histogram,
            expected(&[
                (AgeCategory::Under30, 1),
                (AgeCategory::Under40, 1),
                (AgeCategory::Retired, 1),
            ])
        );
        assert_eq!(histogram.get(AgeCategory::Under20), None);
    }

    #[tokio::test]
    async fn test_empty_input_yields_empty_histogram() {
        let histogram = run_map_reduce(Vec::<Player>::new(), MapReduceOptions::default())
            .await
            .unwrap();

        assert!(histogram.is_empty());
        assert_eq!(histogram.total(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_count_is_conserved_for_large_input() {
        let ages: Vec<i64> = (0..10_000).map(|i| (i * 7) % 70 - 5).collect();
        let histogram = run_map_reduce(players(&ages), MapReduceOptions::default())
            .await
            .unwrap();

        assert_eq!(histogram.total(), 10_000);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_permutations_produce_same_histogram() {
        let ages = [15, 25, 25, 35, 45, 60, -3, 19, 20, 39, 40, 88];
        let baseline = run_map_reduce(players(&ages), MapReduceOptions::default())
            .await
            .unwrap();

        let mut reversed = ages.to_vec();
        reversed.reverse();
        let mut permutations = vec![reversed];
        for shift in 1..ages.len() {
            let mut rotated = ages.to_vec();
            rotated.rotate_left(shift);
            permutations.push(rotated);
        }

        for permutation in permutations {
            let histogram = run_map_reduce(players(&permutation), MapReduceOptions::default())
                .await
                .unwrap();
            assert_eq!(histogram, baseline, "permutation {:?}", permutation);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_bounded_mapper_pool_conserves_counts() {
        let ages: Vec<i64> = (0..500).map(|i| i % 60).collect();

        for concurrency in [1, 3, 64] {
            let histogram = run_map_reduce(
                players(&ages),
                MapReduceOptions {
                    mapper_concurrency: Some(concurrency),
                },
            )
            .await
            .unwrap();

            assert_eq!(histogram.total(), 500);
            assert_eq!(histogram.count(AgeCategory::Under20), 180);
            assert_eq!(histogram.count(AgeCategory::Retired), 160);
        }
    }

    #[tokio::test]
    async fn test_oversized_concurrency_is_clamped() {
        let histogram = run_map_reduce(
            players(&[30]),
            MapReduceOptions {
                mapper_concurrency: Some(usize::MAX),
            },
        )
        .await
        .unwrap();

        assert_eq!(histogram.get(AgeCategory::Under40), Some(1));

        let histogram = run_map_reduce(
            Vec::<Player>::new(),
            MapReduceOptions {
                mapper_concurrency: Some(usize::MAX),
            },
        )
        .await
        .unwrap();
        assert!(histogram.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_failed_mapper_aborts_without_histogram() {
        let mut job = MapReduceJob::new(MapReduceOptions::default());
        job.mapper_fault = Some((3, MapperFault::Error));

        let ages: Vec<i64> = (0..100).collect();
        let err = job.run(players(&ages)).await.unwrap_err();

        assert!(matches!(err, EtlError::ChannelClosed { stage: "mapper" }));
        assert_eq!(job.state(), PipelineState::FanningOutMappers);
        assert!(job.run(players(&ages)).await.is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_panicked_mapper_aborts_without_histogram() {
        let mut job = MapReduceJob::new(MapReduceOptions {
            mapper_concurrency: Some(2),
        });
        job.mapper_fault = Some((0, MapperFault::Panic));

        let err = job.run(players(&[15, 25, 35, 45])).await.unwrap_err();

        assert!(matches!(err, EtlError::TaskJoinError(ref e) if e.is_panic()));
        assert_ne!(job.state(), PipelineState::Delivered);
        assert_eq!(err.exit_code(), 3);
    }

    #[tokio::test]
    async fn test_job_walks_states_and_cannot_rerun() {
        let mut job = MapReduceJob::new(MapReduceOptions::default());
        assert_eq!(job.state(), PipelineState::NotStarted);

        job.run(players(&[10, 50])).await.unwrap();
        assert_eq!(job.state(), PipelineState::Delivered);

        let err = job.run(players(&[10])).await.unwrap_err();
        assert!(matches!(
            err,
            EtlError::PipelineStateError {
                expected: "NotStarted",
                actual: "Delivered"
            }
        ));
    }
}
