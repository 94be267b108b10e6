use std::collections::HashMap;

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use quizmap_core::diagnosis::score;
use quizmap_core::model::*;
use quizmap_core::statistics::{correlation_matrix, full_statistics};

fn make_quiz(question_count: usize) -> (Vec<Question>, Vec<ArchetypeResult>, Vec<Axis>) {
    let questions = (0..question_count)
        .map(|i| Question {
            id: format!("q{i}"),
            text: String::new(),
            axis_weights: AxisWeights::new(
                ((i % 5) as f64 - 2.0) / 2.0,
                ((i % 3) as f64 - 1.0) / 2.0,
            ),
        })
        .collect();
    let results = (0..9)
        .map(|i| ArchetypeResult {
            id: format!("r{i}"),
            name: format!("Result {i}"),
            description: String::new(),
            x: (i % 3) as f64 - 1.0,
            y: (i / 3) as f64 - 1.0,
        })
        .collect();
    let axes = vec![
        Axis {
            id: 1,
            name: "X".into(),
            description: String::new(),
            positive_name: "+".into(),
            negative_name: "-".into(),
        },
        Axis {
            id: 2,
            name: "Y".into(),
            description: String::new(),
            positive_name: "+".into(),
            negative_name: "-".into(),
        },
    ];
    (questions, results, axes)
}

fn make_responses(count: usize, fields: usize) -> Vec<ResponseRecord> {
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            let answers: HashMap<String, AnswerValue> = (0..fields)
                .map(|f| (format!("q{f}"), AnswerValue::Number(((i + f) % 5 + 1) as f64)))
                .collect();
            let created_at = start + Duration::hours(i as i64);
            ResponseRecord {
                id: format!("r{i}"),
                user_id: format!("u{i}"),
                quiz_id: "bench".into(),
                answers,
                score: Some((i % 100) as f64),
                completed_at: Some(created_at),
                created_at,
                response_time_seconds: Some((i % 600) as f64),
                demographics: Some(Demographics {
                    age: Some((i % 70) as u32 + 12),
                    gender: None,
                    location: None,
                }),
            }
        })
        .collect()
}

fn bench_diagnosis(c: &mut Criterion) {
    let mut group = c.benchmark_group("diagnosis");

    for count in [10, 100] {
        let (questions, results, axes) = make_quiz(count);
        let answers: AnswerSet = questions
            .iter()
            .enumerate()
            .map(|(i, q)| (q.id.clone(), (i % 5 + 1) as u8))
            .collect();
        group.bench_function(format!("questions={count}"), |b| {
            b.iter(|| {
                score(
                    black_box(&answers),
                    black_box(&questions),
                    black_box(&results),
                    black_box(&axes),
                )
            })
        });
    }

    group.finish();
}

fn bench_statistics(c: &mut Criterion) {
    let mut group = c.benchmark_group("statistics");

    let responses = make_responses(1000, 10);
    group.bench_function("correlation 1000x10", |b| {
        b.iter(|| correlation_matrix(black_box(&responses)))
    });
    group.bench_function("full 1000x10", |b| {
        b.iter(|| full_statistics(black_box(&responses), 30))
    });

    group.finish();
}

criterion_group!(benches, bench_diagnosis, bench_statistics);
criterion_main!(benches);
