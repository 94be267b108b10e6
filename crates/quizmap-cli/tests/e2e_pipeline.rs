//! End-to-end pipeline tests over the bundled quiz and response fixtures.
//!
//! These tests drive the library the way the CLI does: parse a quiz, score
//! answer sets, load stored responses and reduce them to statistics.

use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;

use quizmap_core::diagnosis::{score, try_score};
use quizmap_core::engine::{StatisticsEngine, StatisticsEngineConfig};
use quizmap_core::model::{AnswerSet, Quiz};
use quizmap_core::parser::{parse_quiz, validate_quiz};
use quizmap_core::report::{ScoreComparison, StatisticsReport};
use quizmap_core::source::{JsonFileSource, ResponseSource};
use quizmap_core::statistics::{basic_stats, full_statistics_at, SCORE_FIELD};

fn work_style() -> Quiz {
    parse_quiz(Path::new("../../quizzes/work-style.toml")).unwrap()
}

fn answers(pairs: &[(&str, u8)]) -> AnswerSet {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

#[test]
fn bundled_quiz_is_valid() {
    let quiz = work_style();
    assert!(validate_quiz(&quiz).is_empty());
    assert_eq!(quiz.axes.len(), 2);
}

#[test]
fn every_answer_combination_maps_inside_the_quiz() {
    let quiz = work_style();
    for a in 1..=5u8 {
        for b in 1..=5u8 {
            let set = answers(&[("q1", a), ("q2", b), ("q3", a), ("q4", b)]);
            let d = try_score(&set, &quiz.questions, &quiz.results, &quiz.axes).unwrap();
            assert!((-1.0..=1.0).contains(&d.coordinate.x));
            assert!((-1.0..=1.0).contains(&d.coordinate.y));
            assert!(quiz.results.iter().any(|r| r.id == d.matched_result_id));
            assert!(d
                .axis_scores
                .iter()
                .all(|s| (0.0..=100.0).contains(&s.percentage)));
        }
    }
}

#[test]
fn outgoing_detail_answers_match_host() {
    let quiz = work_style();
    // x: (1 + 0.5 + 1) / 4, y: (1 + 0.5) / 4
    let set = answers(&[("q1", 5), ("q2", 5), ("q3", 5), ("q4", 1)]);
    let d = score(&set, &quiz.questions, &quiz.results, &quiz.axes).unwrap();
    assert!((d.coordinate.x - 0.625).abs() < 1e-12);
    assert!((d.coordinate.y - 0.375).abs() < 1e-12);
    assert_eq!(d.matched_result_id, "host");
}

#[test]
fn partial_answers_degrade_gracefully() {
    let quiz = work_style();
    let set = answers(&[("q2", 1), ("unknown", 5)]);
    let d = score(&set, &quiz.questions, &quiz.results, &quiz.axes).unwrap();
    assert_eq!(d.coordinate.x, 0.0);
    assert_eq!(d.coordinate.y, -1.0);
    // No answered question touches X.
    assert_eq!(d.axis_scores[0].raw_score, 3.0);
}

#[tokio::test]
async fn fixture_statistics() {
    let source = JsonFileSource::new("../../fixtures/responses.json");
    let records = source.load_for_quiz("work-style").await.unwrap();
    assert_eq!(records.len(), 4);

    let today = NaiveDate::from_ymd_opt(2025, 6, 3).unwrap();
    let engine = StatisticsEngine::new(StatisticsEngineConfig {
        trend_window_days: 3,
        parallel: true,
    });
    let stats = engine
        .compute_snapshot(Arc::from(records.clone()), today)
        .await
        .unwrap();

    assert_eq!(stats, full_statistics_at(&records, 3, today));
    assert_eq!(stats.average_score, 70.0);
    assert_eq!(stats.completion_rate, 75.0);
    assert_eq!(stats.response_time_stats.average, 380.0);

    let counts: Vec<usize> = stats.trend_series.iter().map(|p| p.count).collect();
    assert_eq!(counts, vec![1, 2, 1]);
    assert_eq!(stats.trend_series[1].average_score, 60.0);

    for (a, row) in &stats.correlation_matrix {
        for (b, r) in row {
            assert_eq!(*r, stats.correlation_matrix[b][a]);
        }
    }
    assert!((stats.correlation_matrix[SCORE_FIELD][SCORE_FIELD] - 1.0).abs() < 1e-12);
}

#[tokio::test]
async fn report_roundtrip_through_engine() {
    let source = JsonFileSource::new("../../fixtures/responses.json");
    let report = StatisticsEngine::default()
        .report(&source, None)
        .await
        .unwrap();
    assert_eq!(report.statistics.total_responses, 5);
    assert_eq!(report.statistics.trend_series.len(), 30);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    report.save_json(&path).unwrap();
    let loaded = StatisticsReport::load_json(&path).unwrap();
    assert_eq!(loaded.statistics, report.statistics);
}

#[tokio::test]
async fn compare_fixture_batches() {
    let a = JsonFileSource::new("../../fixtures/responses.json")
        .load_for_quiz("work-style")
        .await
        .unwrap();
    let b = JsonFileSource::new("../../fixtures/responses-variant.json")
        .load_all()
        .await
        .unwrap();

    let cmp = ScoreComparison::compute("baseline", &a, "variant", &b, 0.95);
    assert_eq!(cmp.group_a.scored, 3);
    assert_eq!(cmp.group_b.scored, 3);
    assert_eq!(cmp.delta, -45.0);
    assert!(cmp.significance.is_significant);
}

#[test]
fn empty_batch_statistics() {
    let stats = basic_stats(&[]);
    assert_eq!(stats.total_responses, 0);
    assert_eq!(stats.average_score, 0.0);
    assert_eq!(stats.completion_rate, 0.0);

    let today = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
    let full = full_statistics_at(&[], 7, today);
    assert_eq!(full.trend_series.len(), 7);
    assert!(full.correlation_matrix.is_empty());
}
