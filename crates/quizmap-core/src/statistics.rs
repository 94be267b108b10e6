//! Population statistics over stored quiz responses.
//!
//! Every function here is a pure reduction over the slice it is given; nothing
//! is cached between calls and no input is mutated.

use std::collections::{BTreeMap, HashMap};

use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ResponseRecord;

/// Default trend window in days.
pub const DEFAULT_TREND_WINDOW_DAYS: u32 = 30;

/// Largest trend window accepted from configuration or the command line.
pub const MAX_TREND_WINDOW_DAYS: u32 = 3650;

/// Critical value used by [`approx_confidence_interval`] for every level.
pub const FIXED_CRITICAL_VALUE: f64 = 1.96;

/// p-value cut-off for [`approx_significance`].
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Synthetic correlation field holding each record's overall score.
pub const SCORE_FIELD: &str = "score";

/// Field name to field name to Pearson coefficient.
pub type CorrelationMatrix = BTreeMap<String, BTreeMap<String, f64>>;

/// Totals and averages across the batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicStats {
    pub total_responses: usize,
    pub average_score: f64,
    /// Percentage (0–100) of records with a completion timestamp.
    pub completion_rate: f64,
}

/// Summary of `response_time_seconds` over records that carry it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseTimeStats {
    pub average: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

/// Respondent counts per demographic value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DemographicBreakdown {
    pub age: BTreeMap<String, usize>,
    pub gender: BTreeMap<String, usize>,
    pub location: BTreeMap<String, usize>,
}

/// One calendar-day bucket of the trend series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub count: usize,
    pub average_score: f64,
}

/// Result of the approximate two-sample comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignificanceResult {
    pub p_value: f64,
    pub is_significant: bool,
}

/// Result of the fixed-z confidence interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
    pub mean: f64,
}

/// Numeric series extracted per field, in record order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumericFields {
    series: BTreeMap<String, Vec<f64>>,
}

impl NumericFields {
    /// Collect every numeric answer, plus the record score under `"score"`.
    ///
    /// Text answers are not coerced. A field missing from a record simply
    /// gets no entry for it, so series can differ in length.
    pub fn extract(responses: &[ResponseRecord]) -> Self {
        let mut series: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for record in responses {
            // Sorted per record so the push order is independent of map order.
            let mut entries: Vec<(&String, f64)> = record
                .answers
                .iter()
                .filter_map(|(k, v)| v.as_number().map(|n| (k, n)))
                .collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            for (key, value) in entries {
                series.entry(key.clone()).or_default().push(value);
            }
            if let Some(score) = record.score {
                series.entry(SCORE_FIELD.to_string()).or_default().push(score);
            }
        }
        Self { series }
    }

    /// Field names in sorted order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&[f64]> {
        self.series.get(field).map(Vec::as_slice)
    }

    /// How many records contributed a value to each field.
    pub fn coverage(&self) -> BTreeMap<String, usize> {
        self.series
            .iter()
            .map(|(k, v)| (k.clone(), v.len()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Everything the statistics view shows for one quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizStatistics {
    pub total_responses: usize,
    pub average_score: f64,
    pub completion_rate: f64,
    pub response_time_stats: ResponseTimeStats,
    pub demographic_breakdown: DemographicBreakdown,
    pub trend_series: Vec<TrendPoint>,
    pub correlation_matrix: CorrelationMatrix,
    /// Records contributing to each correlation field.
    #[serde(default)]
    pub field_coverage: BTreeMap<String, usize>,
}

impl QuizStatistics {
    /// Assemble from independently computed parts.
    pub fn from_parts(
        basic: BasicStats,
        response_time_stats: ResponseTimeStats,
        demographic_breakdown: DemographicBreakdown,
        trend_series: Vec<TrendPoint>,
        fields: &NumericFields,
        correlation_matrix: CorrelationMatrix,
    ) -> Self {
        Self {
            total_responses: basic.total_responses,
            average_score: basic.average_score,
            completion_rate: basic.completion_rate,
            response_time_stats,
            demographic_breakdown,
            trend_series,
            correlation_matrix,
            field_coverage: fields.coverage(),
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median of already sorted values. Returns 0.0 when empty.
fn median_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

/// Sum of squared deviations from the mean.
fn sum_of_squares(values: &[f64], mean: f64) -> f64 {
    values.iter().map(|v| (v - mean).powi(2)).sum()
}

pub fn basic_stats(responses: &[ResponseRecord]) -> BasicStats {
    let total_responses = responses.len();
    let scores: Vec<f64> = responses.iter().filter_map(|r| r.score).collect();
    let completed = responses.iter().filter(|r| r.completed_at.is_some()).count();

    let completion_rate = if total_responses == 0 {
        0.0
    } else {
        completed as f64 / total_responses as f64 * 100.0
    };

    BasicStats {
        total_responses,
        average_score: mean(&scores),
        completion_rate,
    }
}

pub fn response_time_stats(responses: &[ResponseRecord]) -> ResponseTimeStats {
    let mut times: Vec<f64> = responses
        .iter()
        .filter_map(|r| r.response_time_seconds)
        .collect();
    if times.is_empty() {
        return ResponseTimeStats::default();
    }
    times.sort_by(|a, b| a.total_cmp(b));

    ResponseTimeStats {
        average: mean(&times),
        median: median_sorted(&times),
        min: times[0],
        max: times[times.len() - 1],
    }
}

/// Bucket label for an age.
pub fn age_bucket(age: u32) -> &'static str {
    match age {
        0..=17 => "<18",
        18..=24 => "18-24",
        25..=34 => "25-34",
        35..=44 => "35-44",
        45..=54 => "45-54",
        55..=64 => "55-64",
        _ => "65+",
    }
}

pub fn demographic_breakdown(responses: &[ResponseRecord]) -> DemographicBreakdown {
    let mut breakdown = DemographicBreakdown::default();
    for demo in responses.iter().filter_map(|r| r.demographics.as_ref()) {
        if let Some(age) = demo.age {
            *breakdown.age.entry(age_bucket(age).to_string()).or_default() += 1;
        }
        if let Some(gender) = &demo.gender {
            *breakdown.gender.entry(gender.clone()).or_default() += 1;
        }
        if let Some(location) = &demo.location {
            *breakdown.location.entry(location.clone()).or_default() += 1;
        }
    }
    breakdown
}

/// Daily buckets for the `window_days` days ending today (UTC).
pub fn trend_series(responses: &[ResponseRecord], window_days: u32) -> Vec<TrendPoint> {
    trend_series_at(responses, window_days, Utc::now().date_naive())
}

/// Daily buckets for the `window_days` days ending at `today`, oldest first.
///
/// Always returns exactly `window_days` points; days without responses get a
/// zero count and a zero average.
/// `window_days` is expected to be within [`MAX_TREND_WINDOW_DAYS`]; config
/// loading and the CLI enforce that bound.
pub fn trend_series_at(
    responses: &[ResponseRecord],
    window_days: u32,
    today: NaiveDate,
) -> Vec<TrendPoint> {
    let mut by_day: HashMap<NaiveDate, Vec<&ResponseRecord>> = HashMap::new();
    for record in responses {
        by_day
            .entry(record.created_at.date_naive())
            .or_default()
            .push(record);
    }

    (0..window_days)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset as i64);
            let day = by_day.get(&date).map(Vec::as_slice).unwrap_or(&[]);
            let scores: Vec<f64> = day.iter().filter_map(|r| r.score).collect();
            TrendPoint {
                date,
                count: day.len(),
                average_score: mean(&scores),
            }
        })
        .collect()
}

/// Pearson correlation coefficient.
///
/// Series are paired position by position over their common prefix; values
/// are not re-aligned by the record they came from. Returns 0.0 when either
/// series has no variance (including constant and empty series).
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n == 0 {
        return 0.0;
    }
    let (x, y) = (&x[..n], &y[..n]);
    let nf = n as f64;

    let sum_x: f64 = x.iter().sum();
    let sum_y: f64 = y.iter().sum();
    let sum_xy: f64 = x.iter().zip(y).map(|(a, b)| a * b).sum();
    let sum_x2: f64 = x.iter().map(|a| a * a).sum();
    let sum_y2: f64 = y.iter().map(|b| b * b).sum();

    let var_x = nf * sum_x2 - sum_x * sum_x;
    let var_y = nf * sum_y2 - sum_y * sum_y;

    // A constant fractional series leaves rounding residue of either sign
    if var_x <= variance_tolerance(nf, sum_x2) || var_y <= variance_tolerance(nf, sum_y2) {
        return 0.0;
    }

    let numerator = nf * sum_xy - sum_x * sum_y;
    let denominator = (var_x * var_y).sqrt();
    if !denominator.is_finite() || denominator == 0.0 {
        return 0.0;
    }
    (numerator / denominator).clamp(-1.0, 1.0)
}

/// Cancellation error bound for `n * sum_sq - sum * sum`.
fn variance_tolerance(n: f64, sum_sq: f64) -> f64 {
    4.0 * f64::EPSILON * n * n * sum_sq
}

/// Pairwise correlation over every extracted field, itself included.
pub fn correlation_matrix_from(fields: &NumericFields) -> CorrelationMatrix {
    let names: Vec<&str> = fields.fields().collect();
    let mut matrix = CorrelationMatrix::new();

    for (i, a) in names.iter().enumerate() {
        for b in &names[i..] {
            let (Some(xs), Some(ys)) = (fields.get(a), fields.get(b)) else {
                continue;
            };
            let r = pearson(xs, ys);
            matrix
                .entry(a.to_string())
                .or_default()
                .insert(b.to_string(), r);
            matrix
                .entry(b.to_string())
                .or_default()
                .insert(a.to_string(), r);
        }
    }

    matrix
}

pub fn correlation_matrix(responses: &[ResponseRecord]) -> CorrelationMatrix {
    let fields = NumericFields::extract(responses);
    let coverage = fields.coverage();
    if coverage.values().collect::<std::collections::HashSet<_>>().len() > 1 {
        tracing::debug!(
            "correlation fields have uneven coverage, pairing by position: {coverage:?}"
        );
    }
    correlation_matrix_from(&fields)
}

/// Approximate two-sample comparison.
///
/// Uses a pooled-variance t statistic, then maps it to a p-value with the
/// linear rule `2 * (1 - min(0.99, t / 3))` instead of a Student's t
/// distribution. The result lies in `[0.02, 2]` and is not a true p-value.
pub fn approx_significance(group_a: &[f64], group_b: &[f64]) -> SignificanceResult {
    const DEGENERATE: SignificanceResult = SignificanceResult {
        p_value: 1.0,
        is_significant: false,
    };

    let (n1, n2) = (group_a.len(), group_b.len());
    if n1 == 0 || n2 == 0 || n1 + n2 < 3 {
        return DEGENERATE;
    }

    let mean1 = mean(group_a);
    let mean2 = mean(group_b);
    let pooled_variance = (sum_of_squares(group_a, mean1) + sum_of_squares(group_b, mean2))
        / (n1 + n2 - 2) as f64;
    let standard_error = (pooled_variance * (1.0 / n1 as f64 + 1.0 / n2 as f64)).sqrt();

    if !standard_error.is_finite() || standard_error == 0.0 {
        return DEGENERATE;
    }

    let t = (mean1 - mean2).abs() / standard_error;
    let p_value = 2.0 * (1.0 - (t / 3.0).min(0.99));

    SignificanceResult {
        p_value,
        is_significant: p_value < SIGNIFICANCE_LEVEL,
    }
}

/// Confidence interval around the mean with a fixed critical value of 1.96.
///
/// `confidence` is accepted for interface compatibility but does not change
/// the critical value. Uses the sample standard deviation; a single value
/// yields a zero-width interval.
pub fn approx_confidence_interval(data: &[f64], confidence: f64) -> ConfidenceInterval {
    if data.is_empty() {
        return ConfidenceInterval::default();
    }
    if (confidence - 0.95).abs() > f64::EPSILON {
        tracing::debug!("confidence level {confidence} requested; using fixed z = 1.96");
    }

    let n = data.len() as f64;
    let m = mean(data);
    let std_dev = if data.len() > 1 {
        (sum_of_squares(data, m) / (n - 1.0)).sqrt()
    } else {
        0.0
    };
    let margin = FIXED_CRITICAL_VALUE * std_dev / n.sqrt();

    ConfidenceInterval {
        lower: m - margin,
        upper: m + margin,
        mean: m,
    }
}

/// Compute every statistic over one snapshot, with the trend ending today.
pub fn full_statistics(responses: &[ResponseRecord], window_days: u32) -> QuizStatistics {
    full_statistics_at(responses, window_days, Utc::now().date_naive())
}

/// [`full_statistics`] with the trend window pinned to `today`.
pub fn full_statistics_at(
    responses: &[ResponseRecord],
    window_days: u32,
    today: NaiveDate,
) -> QuizStatistics {
    let fields = NumericFields::extract(responses);
    let matrix = correlation_matrix_from(&fields);
    QuizStatistics::from_parts(
        basic_stats(responses),
        response_time_stats(responses),
        demographic_breakdown(responses),
        trend_series_at(responses, window_days, today),
        &fields,
        matrix,
    )
}
