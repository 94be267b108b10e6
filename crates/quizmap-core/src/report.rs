//! Statistics report types with JSON persistence, plus score comparison
//! between two response batches.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::ResponseRecord;
use crate::statistics::{
    approx_confidence_interval, approx_significance, ConfidenceInterval, QuizStatistics,
    SignificanceResult,
};

/// A saved statistics snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Quiz the responses were filtered to, if any.
    #[serde(default)]
    pub quiz_id: Option<String>,
    pub statistics: QuizStatistics,
}

impl StatisticsReport {
    pub fn new(quiz_id: Option<String>, statistics: QuizStatistics) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            quiz_id,
            statistics,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: StatisticsReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let stats = &self.statistics;
        let mut md = String::new();

        md.push_str(&format!(
            "## Statistics: {}\n\n",
            self.quiz_id.as_deref().unwrap_or("all quizzes")
        ));
        md.push_str(&format!(
            "**Summary:** {} responses, average score {:.1}, {:.1}% completed\n\n",
            stats.total_responses, stats.average_score, stats.completion_rate
        ));

        let t = &stats.response_time_stats;
        md.push_str("### Response time (seconds)\n\n");
        md.push_str("| Average | Median | Min | Max |\n");
        md.push_str("|---------|--------|-----|-----|\n");
        md.push_str(&format!(
            "| {:.1} | {:.1} | {:.1} | {:.1} |\n\n",
            t.average, t.median, t.min, t.max
        ));

        let demo = &stats.demographic_breakdown;
        for (title, counts) in [
            ("Age", &demo.age),
            ("Gender", &demo.gender),
            ("Location", &demo.location),
        ] {
            if counts.is_empty() {
                continue;
            }
            md.push_str(&format!("### {title}\n\n"));
            md.push_str("| Value | Count |\n");
            md.push_str("|-------|-------|\n");
            for (value, count) in counts {
                md.push_str(&format!("| {value} | {count} |\n"));
            }
            md.push('\n');
        }

        let active: Vec<_> = stats.trend_series.iter().filter(|p| p.count > 0).collect();
        if !active.is_empty() {
            md.push_str("### Daily responses\n\n");
            md.push_str("| Date | Count | Avg score |\n");
            md.push_str("|------|-------|-----------|\n");
            for point in active {
                md.push_str(&format!(
                    "| {} | {} | {:.1} |\n",
                    point.date, point.count, point.average_score
                ));
            }
            md.push('\n');
        }

        if !stats.correlation_matrix.is_empty() {
            let fields: Vec<&String> = stats.correlation_matrix.keys().collect();
            md.push_str("### Correlations\n\n");
            md.push_str("| |");
            for f in &fields {
                md.push_str(&format!(" {f} |"));
            }
            md.push_str("\n|---|");
            md.push_str(&"---|".repeat(fields.len()));
            md.push('\n');
            for a in &fields {
                md.push_str(&format!("| {a} |"));
                for b in &fields {
                    let r = stats.correlation_matrix[*a].get(*b).copied().unwrap_or(0.0);
                    md.push_str(&format!(" {r:.2} |"));
                }
                md.push('\n');
            }
        }

        md
    }
}

/// Score summary for one side of a comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary {
    pub label: String,
    /// Records carrying a score.
    pub scored: usize,
    pub interval: ConfidenceInterval,
}

/// Result of comparing the scores of two response batches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreComparison {
    pub group_a: GroupSummary,
    pub group_b: GroupSummary,
    /// `group_b` mean minus `group_a` mean.
    pub delta: f64,
    /// Approximate; see [`approx_significance`].
    pub significance: SignificanceResult,
}

impl ScoreComparison {
    /// Compare the `score` field of two batches. Unscored records are ignored.
    pub fn compute(
        label_a: &str,
        group_a: &[ResponseRecord],
        label_b: &str,
        group_b: &[ResponseRecord],
        confidence: f64,
    ) -> Self {
        let scores = |records: &[ResponseRecord]| -> Vec<f64> {
            records.iter().filter_map(|r| r.score).collect()
        };
        let a = scores(group_a);
        let b = scores(group_b);

        let summary = |label: &str, values: &[f64]| GroupSummary {
            label: label.to_string(),
            scored: values.len(),
            interval: approx_confidence_interval(values, confidence),
        };
        let group_a = summary(label_a, &a);
        let group_b = summary(label_b, &b);

        Self {
            delta: group_b.interval.mean - group_a.interval.mean,
            significance: approx_significance(&a, &b),
            group_a,
            group_b,
        }
    }

    /// Format the comparison as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        md.push_str("| Group | Scored | Mean | 95% CI |\n");
        md.push_str("|-------|--------|------|--------|\n");
        for g in [&self.group_a, &self.group_b] {
            md.push_str(&format!(
                "| {} | {} | {:.2} | {:.2} to {:.2} |\n",
                g.label, g.scored, g.interval.mean, g.interval.lower, g.interval.upper
            ));
        }
        md.push_str(&format!(
            "\n**Delta:** {:+.2} (approx. p = {:.3}, {})\n",
            self.delta,
            self.significance.p_value,
            if self.significance.is_significant {
                "significant"
            } else {
                "not significant"
            }
        ));
        md
    }
}
