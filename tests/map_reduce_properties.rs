use player_age_etl::{
    run_map_reduce, AgeCategory, AgeHistogram, MapReduceJob, MapReduceOptions, PipelineState,
    Player,
};

fn players(ages: impl IntoIterator<Item = i64>) -> Vec<Player> {
    ages.into_iter().map(Player::with_age).collect()
}

/// Single-threaded reference tally.
fn tally(ages: &[i64]) -> AgeHistogram {
    ages.iter()
        .map(|age| (AgeCategory::from_age(*age), 1))
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_matches_sequential_tally() {
    let ages: Vec<i64> = (0..2_000).map(|i| (i * 37 + 11) % 90 - 10).collect();

    let histogram = run_map_reduce(players(ages.clone()), MapReduceOptions::default())
        .await
        .unwrap();

    assert_eq!(histogram, tally(&ages));
    assert_eq!(histogram.total(), ages.len() as u64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_repeated_runs_are_deterministic() {
    let ages: Vec<i64> = (0..300).map(|i| (i * 13) % 75).collect();
    let first = run_map_reduce(players(ages.clone()), MapReduceOptions::default())
        .await
        .unwrap();

    for _ in 0..20 {
        let again = run_map_reduce(players(ages.clone()), MapReduceOptions::default())
            .await
            .unwrap();
        assert_eq!(again, first);
    }
}

#[tokio::test]
async fn test_single_threaded_runtime_does_not_deadlock() {
    let ages: Vec<i64> = (0..1_000).collect();
    let histogram = run_map_reduce(
        players(ages),
        MapReduceOptions {
            mapper_concurrency: Some(4),
        },
    )
    .await
    .unwrap();

    assert_eq!(histogram.count(AgeCategory::Under20), 20);
    assert_eq!(histogram.count(AgeCategory::Under30), 10);
    assert_eq!(histogram.count(AgeCategory::Under40), 10);
    assert_eq!(histogram.count(AgeCategory::Retired), 960);
}

#[tokio::test]
async fn test_negative_ages_are_youngest_bracket() {
    let histogram = run_map_reduce(players([-5, -1, 0]), MapReduceOptions::default())
        .await
        .unwrap();

    assert_eq!(histogram.len(), 1);
    assert_eq!(histogram.get(AgeCategory::Under20), Some(3));
}

#[test]
fn test_job_runs_inside_blocking_runtime() {
    let mut job = MapReduceJob::new(MapReduceOptions::default());
    let histogram = tokio_test::block_on(job.run(players([45, 46])));

    assert_eq!(histogram.unwrap().get(AgeCategory::Retired), Some(2));
    assert_eq!(job.state(), PipelineState::Delivered);
}
