//! The `quizmap diagnose` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use quizmap_core::diagnosis::try_score;
use quizmap_core::model::AnswerSet;
use quizmap_core::parser;

pub fn execute(quiz_path: PathBuf, answers_path: PathBuf, format: String) -> Result<()> {
    let quiz = parser::parse_quiz(&quiz_path)?;

    let content = std::fs::read_to_string(&answers_path)
        .with_context(|| format!("failed to read answers: {}", answers_path.display()))?;
    let answers: AnswerSet = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse answers: {}", answers_path.display()))?;

    let diagnosis = try_score(&answers, &quiz.questions, &quiz.results, &quiz.axes)
        .with_context(|| format!("cannot score answers against quiz '{}'", quiz.id))?;

    match format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&diagnosis)?);
        }
        _ => {
            println!("Quiz: {}", quiz.title);
            println!(
                "Result: {} ({})",
                diagnosis.name, diagnosis.matched_result_id
            );
            if !diagnosis.description.is_empty() {
                println!("{}", diagnosis.description);
            }
            println!(
                "Coordinate: ({:.3}, {:.3})",
                diagnosis.coordinate.x, diagnosis.coordinate.y
            );

            let mut table = Table::new();
            table.set_header(vec!["Axis", "Leaning", "Avg rating", "Score"]);
            for score in &diagnosis.axis_scores {
                let axis = quiz.axes.iter().find(|a| a.id == score.axis_id);
                let leaning = match axis {
                    Some(a) if score.percentage > 50.0 => a.positive_name.as_str(),
                    Some(a) if score.percentage < 50.0 => a.negative_name.as_str(),
                    _ => "neutral",
                };
                table.add_row(vec![
                    Cell::new(&score.axis_name),
                    Cell::new(leaning),
                    Cell::new(format!("{:.2}", score.raw_score)),
                    Cell::new(format!("{:.1}%", score.percentage)),
                ]);
            }
            println!("\n{table}");
        }
    }

    Ok(())
}
