//! Statistics engine orchestrator.
//!
//! Pulls a response snapshot from a [`ResponseSource`] and reduces it to
//! [`QuizStatistics`], either inline or with the independent parts fanned out
//! over blocking tasks.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use tokio::task::JoinHandle;

use crate::config::QuizmapConfig;
use crate::model::ResponseRecord;
use crate::report::StatisticsReport;
use crate::source::ResponseSource;
use crate::statistics::{
    basic_stats, correlation_matrix_from, demographic_breakdown, full_statistics_at,
    response_time_stats, trend_series_at, NumericFields, QuizStatistics,
    DEFAULT_TREND_WINDOW_DAYS,
};

/// Configuration for the statistics engine.
#[derive(Debug, Clone)]
pub struct StatisticsEngineConfig {
    /// Days covered by the trend series.
    pub trend_window_days: u32,
    /// Run the parts concurrently in `compute_snapshot`.
    pub parallel: bool,
}

impl Default for StatisticsEngineConfig {
    fn default() -> Self {
        Self {
            trend_window_days: DEFAULT_TREND_WINDOW_DAYS,
            parallel: true,
        }
    }
}

impl From<&QuizmapConfig> for StatisticsEngineConfig {
    fn from(config: &QuizmapConfig) -> Self {
        Self {
            trend_window_days: config.trend_window_days,
            parallel: config.parallel,
        }
    }
}

/// The statistics engine.
pub struct StatisticsEngine {
    config: StatisticsEngineConfig,
}

impl StatisticsEngine {
    pub fn new(config: StatisticsEngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StatisticsEngineConfig {
        &self.config
    }

    /// Compute everything inline, with the trend ending at `today`.
    pub fn compute_at(&self, responses: &[ResponseRecord], today: NaiveDate) -> QuizStatistics {
        full_statistics_at(responses, self.config.trend_window_days, today)
    }

    /// Compute everything over an owned snapshot.
    ///
    /// With `parallel` set, the five parts run as separate blocking tasks; the
    /// result is identical to [`StatisticsEngine::compute_at`].
    pub async fn compute_snapshot(
        &self,
        responses: Arc<[ResponseRecord]>,
        today: NaiveDate,
    ) -> Result<QuizStatistics> {
        if !self.config.parallel {
            return Ok(self.compute_at(&responses, today));
        }

        let window = self.config.trend_window_days;
        let basic = spawn_part(&responses, basic_stats);
        let times = spawn_part(&responses, response_time_stats);
        let demographics = spawn_part(&responses, demographic_breakdown);
        let trend = spawn_part(&responses, move |r| trend_series_at(r, window, today));
        let correlation = spawn_part(&responses, |r| {
            let fields = NumericFields::extract(r);
            let matrix = correlation_matrix_from(&fields);
            (fields, matrix)
        });

        let (basic, times, demographics, trend, (fields, matrix)) =
            tokio::try_join!(basic, times, demographics, trend, correlation)
                .context("statistics task panicked")?;

        Ok(QuizStatistics::from_parts(
            basic,
            times,
            demographics,
            trend,
            &fields,
            matrix,
        ))
    }

    /// Load one quiz's responses and build a report.
    pub async fn report(
        &self,
        source: &dyn ResponseSource,
        quiz_id: Option<&str>,
    ) -> Result<StatisticsReport> {
        let start = Instant::now();
        let records = match quiz_id {
            Some(id) => source.load_for_quiz(id).await?,
            None => source.load_all().await?,
        };
        tracing::info!(
            "loaded {} response(s) from {}",
            records.len(),
            source.name()
        );

        let statistics = self
            .compute_snapshot(Arc::from(records), Utc::now().date_naive())
            .await?;

        let report = StatisticsReport::new(quiz_id.map(String::from), statistics);
        tracing::debug!(
            "statistics for {} computed in {}ms",
            quiz_id.unwrap_or("all quizzes"),
            start.elapsed().as_millis()
        );
        Ok(report)
    }
}

/// Run one part of the computation on the blocking pool.
fn spawn_part<T, F>(snapshot: &Arc<[ResponseRecord]>, part: F) -> JoinHandle<T>
where
    F: FnOnce(&[ResponseRecord]) -> T + Send + 'static,
    T: Send + 'static,
{
    let snapshot = Arc::clone(snapshot);
    tokio::task::spawn_blocking(move || part(&snapshot))
}

impl Default for StatisticsEngine {
    fn default() -> Self {
        Self::new(StatisticsEngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnswerValue;
    use crate::source::InMemorySource;
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn record(id: &str, quiz: &str, score: f64, day: u32) -> ResponseRecord {
        let created_at = Utc.with_ymd_and_hms(2025, 4, day, 9, 0, 0).unwrap();
        ResponseRecord {
            id: id.into(),
            user_id: "u".into(),
            quiz_id: quiz.into(),
            answers: HashMap::from([("q1".to_string(), AnswerValue::Number(score / 20.0))]),
            score: Some(score),
            completed_at: Some(created_at),
            created_at,
            response_time_seconds: Some(score * 2.0),
            demographics: None,
        }
    }

    fn snapshot() -> Vec<ResponseRecord> {
        vec![
            record("a", "quiz", 40.0, 1),
            record("b", "quiz", 80.0, 2),
            record("c", "quiz", 60.0, 2),
            record("d", "other", 100.0, 3),
        ]
    }

    #[tokio::test]
    async fn parallel_matches_sequential() {
        let today = NaiveDate::from_ymd_opt(2025, 4, 3).unwrap();
        let records = snapshot();

        let engine = StatisticsEngine::new(StatisticsEngineConfig {
            trend_window_days: 5,
            parallel: true,
        });
        let sequential = engine.compute_at(&records, today);
        let parallel = engine
            .compute_snapshot(Arc::from(records), today)
            .await
            .unwrap();

        assert_eq!(sequential, parallel);
        assert_eq!(parallel.trend_series.len(), 5);
        assert_eq!(parallel.response_time_stats.max, 200.0);
    }

    #[tokio::test]
    async fn report_filters_by_quiz() {
        let source = InMemorySource::new(snapshot());
        let engine = StatisticsEngine::default();

        let report = engine.report(&source, Some("quiz")).await.unwrap();
        assert_eq!(report.quiz_id.as_deref(), Some("quiz"));
        assert_eq!(report.statistics.total_responses, 3);
        assert_eq!(report.statistics.average_score, 60.0);
        assert_eq!(report.statistics.trend_series.len(), 30);

        let all = engine.report(&source, None).await.unwrap();
        assert_eq!(all.statistics.total_responses, 4);
    }

    #[test]
    fn config_from_file_settings() {
        let file = QuizmapConfig {
            trend_window_days: 7,
            parallel: false,
            ..Default::default()
        };
        let config = StatisticsEngineConfig::from(&file);
        assert_eq!(config.trend_window_days, 7);
        assert!(!config.parallel);
    }
}
