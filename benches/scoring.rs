//! Scoring and dispatch benchmarks
//!
//! - Scoring a complete run as the focus group grows
//! - Merging retained variants
//! - Dispatching a run through a scripted oracle

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;

use grouper::adapters::oracles::ScriptedReactionOracle;
use grouper::domain::models::{
    best_performing_variant, scored_variants, BestScoringVariants, FocusGroup, FocusGroupRun,
    LikertRating, LlmOptions, Message, MessageVariants, Participant, Positioning,
    PromptedParticipant, Reaction, SpecificReaction,
};
use grouper::services::EvaluationDispatcher;

fn fixture(participants: usize, wordings: usize) -> FocusGroupRun {
    let group = FocusGroup::new(
        (0..participants)
            .map(|i| {
                Arc::new(PromptedParticipant::new(
                    format!("p{i}"),
                    LlmOptions::default(),
                    "persona",
                    1.0 + (i % 3) as f64,
                )) as Arc<dyn Participant>
            })
            .collect(),
    )
    .expect("valid group");
    let message = Arc::new(Message::new("nosmoke", "smoking is bad", "deter", "poster"));
    FocusGroupRun::new(
        group,
        Positioning::single(MessageVariants::new(
            message,
            (0..wordings).map(|w| format!("wording {w}")),
        )),
    )
}

fn completed_run(participants: usize, wordings: usize) -> FocusGroupRun {
    let mut run = fixture(participants, wordings);
    for (i, presentation) in run.pending_combinations().into_iter().enumerate() {
        let rating = LikertRating::ALL[i % LikertRating::ALL.len()];
        run.record(SpecificReaction::new(presentation, Reaction::rated(rating)))
            .expect("fresh combination");
    }
    run
}

fn bench_scoring(c: &mut Criterion) {
    let mut group = c.benchmark_group("scoring");

    for participants in [4usize, 16, 64] {
        let run = completed_run(participants, 10);
        group.throughput(Throughput::Elements((participants * 10) as u64));
        group.bench_with_input(
            BenchmarkId::new("best_performing_variant", participants),
            &run,
            |b, run| b.iter(|| best_performing_variant(black_box(run))),
        );
    }

    group.finish();
}

fn bench_retention(c: &mut Criterion) {
    let scores = scored_variants(&completed_run(16, 50));

    c.bench_function("retention/merge_50_into_10", |b| {
        b.iter(|| {
            let mut best = BestScoringVariants::new(10);
            best.merge(black_box(scores.clone()));
            best
        });
    });
}

fn bench_dispatch(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
    let mut group = c.benchmark_group("dispatch");

    for max_concurrency in [1usize, 8] {
        group.bench_with_input(
            BenchmarkId::new("scripted_16x10", max_concurrency),
            &max_concurrency,
            |b, &max_concurrency| {
                let dispatcher = EvaluationDispatcher::new(
                    Arc::new(ScriptedReactionOracle::hashed()),
                    max_concurrency,
                );
                b.to_async(&runtime).iter(|| async {
                    let mut run = fixture(16, 10);
                    dispatcher.dispatch(&mut run).await.expect("dispatch")
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_scoring, bench_retention, bench_dispatch);
criterion_main!(benches);
