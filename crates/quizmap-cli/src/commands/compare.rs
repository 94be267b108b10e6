//! The `quizmap compare` command.

use std::path::PathBuf;

use anyhow::Result;

use quizmap_core::config::load_config_from;
use quizmap_core::report::ScoreComparison;
use quizmap_core::source::{JsonFileSource, ResponseSource};

pub async fn execute(
    group_a_path: PathBuf,
    group_b_path: PathBuf,
    quiz_id: Option<String>,
    fail_on_significant: bool,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let source_a = JsonFileSource::new(&group_a_path);
    let source_b = JsonFileSource::new(&group_b_path);
    let (group_a, group_b) = match quiz_id.as_deref() {
        Some(id) => tokio::try_join!(source_a.load_for_quiz(id), source_b.load_for_quiz(id))?,
        None => tokio::try_join!(source_a.load_all(), source_b.load_all())?,
    };

    let comparison = ScoreComparison::compute(
        source_a.name(),
        &group_a,
        source_b.name(),
        &group_b,
        config.confidence,
    );

    match format.as_str() {
        "markdown" | "md" => println!("{}", comparison.to_markdown()),
        "json" => println!("{}", serde_json::to_string_pretty(&comparison)?),
        _ => {
            for g in [&comparison.group_a, &comparison.group_b] {
                println!(
                    "  {}: {} scored, mean {:.2} (CI {:.2} to {:.2})",
                    g.label, g.scored, g.interval.mean, g.interval.lower, g.interval.upper
                );
            }
            println!(
                "Delta: {:+.2}, approx. p = {:.3} ({})",
                comparison.delta,
                comparison.significance.p_value,
                if comparison.significance.is_significant {
                    "significant"
                } else {
                    "not significant"
                }
            );
        }
    }

    if fail_on_significant && comparison.significance.is_significant {
        std::process::exit(1);
    }

    Ok(())
}
