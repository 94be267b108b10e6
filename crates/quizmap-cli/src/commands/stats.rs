//! The `quizmap stats` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use quizmap_core::config::{check_trend_window, load_config_from};
use quizmap_core::engine::{StatisticsEngine, StatisticsEngineConfig};
use quizmap_core::report::StatisticsReport;
use quizmap_core::source::JsonFileSource;

pub async fn execute(
    responses_path: PathBuf,
    quiz_id: Option<String>,
    window_days: Option<u32>,
    format: String,
    output: Option<PathBuf>,
    save: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let mut engine_config = StatisticsEngineConfig::from(&config);
    if let Some(days) = window_days {
        check_trend_window(days).context("invalid --window-days")?;
        engine_config.trend_window_days = days;
    }

    let source = JsonFileSource::new(responses_path);
    let engine = StatisticsEngine::new(engine_config);
    let report = engine.report(&source, quiz_id.as_deref()).await?;

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        "markdown" | "md" => println!("{}", report.to_markdown()),
        _ => print_summary(&report),
    }

    let save_path = match output {
        Some(path) => Some(path),
        None if save => Some(
            config
                .output_dir
                .join(format!("report-{}.json", report.id)),
        ),
        None => None,
    };

    if let Some(path) = save_path {
        report.save_json(&path)?;
        eprintln!("Report saved to: {}", path.display());
    }

    Ok(())
}

fn print_summary(report: &StatisticsReport) {
    let stats = &report.statistics;
    let times = &stats.response_time_stats;

    let mut summary = Table::new();
    summary.set_header(vec!["Metric", "Value"]);
    summary.add_row(vec![
        Cell::new("Responses"),
        Cell::new(stats.total_responses),
    ]);
    summary.add_row(vec![
        Cell::new("Average score"),
        Cell::new(format!("{:.1}", stats.average_score)),
    ]);
    summary.add_row(vec![
        Cell::new("Completion rate"),
        Cell::new(format!("{:.1}%", stats.completion_rate)),
    ]);
    summary.add_row(vec![
        Cell::new("Response time (avg / median)"),
        Cell::new(format!("{:.0}s / {:.0}s", times.average, times.median)),
    ]);
    summary.add_row(vec![
        Cell::new("Response time (min / max)"),
        Cell::new(format!("{:.0}s / {:.0}s", times.min, times.max)),
    ]);
    println!("{summary}");

    let demo = &stats.demographic_breakdown;
    if !(demo.age.is_empty() && demo.gender.is_empty() && demo.location.is_empty()) {
        let mut table = Table::new();
        table.set_header(vec!["Demographic", "Value", "Count"]);
        for (field, counts) in [
            ("age", &demo.age),
            ("gender", &demo.gender),
            ("location", &demo.location),
        ] {
            for (value, count) in counts {
                table.add_row(vec![Cell::new(field), Cell::new(value), Cell::new(count)]);
            }
        }
        println!("\n{table}");
    }

    let active = stats.trend_series.iter().filter(|p| p.count > 0).count();
    println!(
        "\nTrend: {active} of {} day(s) with responses",
        stats.trend_series.len()
    );

    if !stats.correlation_matrix.is_empty() {
        let fields: Vec<&String> = stats.correlation_matrix.keys().collect();
        let mut table = Table::new();
        let mut header = vec![String::new()];
        header.extend(fields.iter().map(|f| {
            let n = stats.field_coverage.get(*f).copied().unwrap_or(0);
            format!("{f} (n={n})")
        }));
        table.set_header(header);
        for a in &fields {
            let mut row = vec![Cell::new(a)];
            for b in &fields {
                let r = stats.correlation_matrix[*a].get(*b).copied().unwrap_or(0.0);
                row.push(Cell::new(format!("{r:.2}")));
            }
            table.add_row(row);
        }
        println!("\nCorrelations:\n{table}");
    }
}
