//! Diagnosis scoring: ratings to a coordinate on the trait map and the
//! nearest archetype.

use std::collections::HashSet;

use crate::error::DiagnosisError;
use crate::model::{
    AnswerSet, ArchetypeResult, Axis, AxisDimension, AxisScore, Coordinate, DiagnosisResult,
    Question,
};

/// The neutral rating, used when no question touches an axis.
pub const NEUTRAL_RATING: f64 = 3.0;

/// Rescale a 1–5 rating onto `[-1, 1]` with 3 at the origin.
pub fn normalize_rating(rating: u8) -> f64 {
    (rating as f64 - NEUTRAL_RATING) / 2.0
}

/// Map a mean raw rating onto 0–100.
pub fn rating_percentage(avg_rating: f64) -> f64 {
    ((avg_rating - 1.0) / 4.0) * 100.0
}

/// Mean weighted position of the answered questions.
///
/// Questions without a rating, and ratings for unknown questions, contribute
/// to neither the sum nor the count. Returns the origin when nothing matched.
pub fn compute_coordinate(answers: &AnswerSet, questions: &[Question]) -> Coordinate {
    let mut total_x = 0.0;
    let mut total_y = 0.0;
    let mut matched = 0usize;

    for question in questions {
        let Some(&rating) = answers.get(&question.id) else {
            continue;
        };
        let normalized = normalize_rating(rating);
        total_x += normalized * question.axis_weights.x;
        total_y += normalized * question.axis_weights.y;
        matched += 1;
    }

    if matched == 0 {
        return Coordinate::default();
    }

    Coordinate::new(total_x / matched as f64, total_y / matched as f64)
}

/// Nearest archetype by Euclidean distance. Ties go to the earliest entry.
pub fn nearest_result<'a>(
    coordinate: &Coordinate,
    results: &'a [ArchetypeResult],
) -> Option<&'a ArchetypeResult> {
    let mut best: Option<(&ArchetypeResult, f64)> = None;
    for result in results {
        let distance = coordinate.distance_to(result.x, result.y);
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((result, distance)),
        }
    }
    best.map(|(result, _)| result)
}

/// Raw-rating summary for one axis.
pub fn axis_score(answers: &AnswerSet, questions: &[Question], axis: &Axis) -> AxisScore {
    let ratings: Vec<f64> = match axis.dimension() {
        Some(dimension) => questions
            .iter()
            .filter(|q| q.axis_weights.on(dimension).abs() > 0.0)
            .filter_map(|q| answers.get(&q.id).map(|&r| r as f64))
            .collect(),
        None => Vec::new(),
    };

    let raw_score = if ratings.is_empty() {
        NEUTRAL_RATING
    } else {
        ratings.iter().sum::<f64>() / ratings.len() as f64
    };

    AxisScore {
        axis_id: axis.id,
        axis_name: axis.name.clone(),
        raw_score,
        percentage: rating_percentage(raw_score),
    }
}

/// Score one answer set against a quiz.
///
/// Callers must supply at least one question and one result; use
/// [`try_score`] to have that checked. With an empty `results` list this
/// returns `None`.
pub fn score(
    answers: &AnswerSet,
    questions: &[Question],
    results: &[ArchetypeResult],
    axes: &[Axis],
) -> Option<DiagnosisResult> {
    let known: HashSet<&str> = questions.iter().map(|q| q.id.as_str()).collect();
    let skipped = answers.keys().filter(|id| !known.contains(id.as_str())).count();
    if skipped > 0 {
        tracing::debug!("ignoring {skipped} answer(s) for unknown questions");
    }

    let coordinate = compute_coordinate(answers, questions);
    let matched = nearest_result(&coordinate, results)?;

    let axis_scores = axes
        .iter()
        .map(|axis| axis_score(answers, questions, axis))
        .collect();

    tracing::debug!(
        "diagnosed ({:.3}, {:.3}) as '{}'",
        coordinate.x,
        coordinate.y,
        matched.id
    );

    Some(DiagnosisResult {
        matched_result_id: matched.id.clone(),
        name: matched.name.clone(),
        description: matched.description.clone(),
        coordinate,
        axis_scores,
    })
}

/// Validate the scorer's preconditions, then score.
pub fn try_score(
    answers: &AnswerSet,
    questions: &[Question],
    results: &[ArchetypeResult],
    axes: &[Axis],
) -> Result<DiagnosisResult, DiagnosisError> {
    if questions.is_empty() {
        return Err(DiagnosisError::NoQuestions);
    }
    if results.is_empty() {
        return Err(DiagnosisError::NoResults);
    }
    if axes.len() != 2 {
        return Err(DiagnosisError::AxisCount(axes.len()));
    }
    if let Some(axis) = axes.iter().find(|a| a.dimension().is_none()) {
        return Err(DiagnosisError::UnknownAxis(axis.id));
    }
    for question in questions {
        for weight in [question.axis_weights.x, question.axis_weights.y] {
            if !(-1.0..=1.0).contains(&weight) {
                return Err(DiagnosisError::WeightOutOfRange {
                    question_id: question.id.clone(),
                    weight,
                });
            }
        }
    }
    // Sorted so the reported offender doesn't depend on map order.
    let mut ids: Vec<&String> = answers.keys().collect();
    ids.sort();
    for id in ids {
        let rating = answers[id];
        if !(1..=5).contains(&rating) {
            return Err(DiagnosisError::RatingOutOfRange {
                question_id: id.clone(),
                rating,
            });
        }
    }

    score(answers, questions, results, axes).ok_or(DiagnosisError::NoResults)
}
