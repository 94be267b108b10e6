//! TOML quiz definition parser.
//!
//! Loads quizzes from TOML files and directories, and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{ArchetypeResult, Axis, AxisWeights, Question, Quiz};

/// Intermediate TOML structure for parsing quiz files.
#[derive(Debug, Deserialize)]
struct TomlQuizFile {
    quiz: TomlQuizHeader,
    #[serde(default)]
    axes: Vec<TomlAxis>,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
    #[serde(default)]
    results: Vec<TomlResult>,
}

#[derive(Debug, Deserialize)]
struct TomlQuizHeader {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlAxis {
    id: u32,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    positive_name: String,
    #[serde(default)]
    negative_name: String,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    text: String,
    #[serde(default)]
    weights: TomlWeights,
}

#[derive(Debug, Default, Deserialize)]
struct TomlWeights {
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
}

#[derive(Debug, Deserialize)]
struct TomlResult {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    x: f64,
    y: f64,
}

/// Parse a single TOML file into a `Quiz`.
pub fn parse_quiz(path: &Path) -> Result<Quiz> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read quiz file: {}", path.display()))?;

    parse_quiz_str(&content, path)
}

/// Parse a TOML string into a `Quiz` (useful for testing).
pub fn parse_quiz_str(content: &str, source_path: &Path) -> Result<Quiz> {
    let parsed: TomlQuizFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let axes = parsed
        .axes
        .into_iter()
        .map(|a| Axis {
            id: a.id,
            name: a.name,
            description: a.description,
            positive_name: a.positive_name,
            negative_name: a.negative_name,
        })
        .collect();

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| Question {
            id: q.id,
            text: q.text,
            axis_weights: AxisWeights::new(q.weights.x, q.weights.y),
        })
        .collect();

    let results = parsed
        .results
        .into_iter()
        .map(|r| ArchetypeResult {
            id: r.id,
            name: r.name,
            description: r.description,
            x: r.x,
            y: r.y,
        })
        .collect();

    Ok(Quiz {
        id: parsed.quiz.id,
        title: parsed.quiz.title,
        description: parsed.quiz.description,
        axes,
        questions,
        results,
    })
}

/// Recursively load all `.toml` quiz files from a directory.
pub fn load_quiz_directory(dir: &Path) -> Result<Vec<Quiz>> {
    let mut quizzes = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();

    for path in paths {
        if path.is_dir() {
            quizzes.extend(load_quiz_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_quiz(&path) {
                Ok(quiz) => quizzes.push(quiz),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(quizzes)
}

/// A warning from quiz validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question, result or axis the warning is about (if applicable).
    pub item_id: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn quiz(message: impl Into<String>) -> Self {
        Self {
            item_id: None,
            message: message.into(),
        }
    }

    fn item(id: &str, message: impl Into<String>) -> Self {
        Self {
            item_id: Some(id.to_string()),
            message: message.into(),
        }
    }
}

fn in_unit_range(v: f64) -> bool {
    (-1.0..=1.0).contains(&v)
}

/// Validate a quiz for common issues.
pub fn validate_quiz(quiz: &Quiz) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if quiz.questions.is_empty() {
        warnings.push(ValidationWarning::quiz("quiz has no questions"));
    }
    if quiz.results.is_empty() {
        warnings.push(ValidationWarning::quiz("quiz has no results"));
    }

    // Axes: exactly X (1) and Y (2)
    if quiz.axes.len() != 2 {
        warnings.push(ValidationWarning::quiz(format!(
            "expected 2 axes, found {}",
            quiz.axes.len()
        )));
    }
    let mut seen_axes = HashSet::new();
    for axis in &quiz.axes {
        let id = axis.id.to_string();
        if axis.dimension().is_none() {
            warnings.push(ValidationWarning::item(
                &id,
                "axis id must be 1 (x) or 2 (y)",
            ));
        }
        if !seen_axes.insert(axis.id) {
            warnings.push(ValidationWarning::item(&id, format!("duplicate axis ID: {id}")));
        }
    }

    let mut seen_questions = HashSet::new();
    for question in &quiz.questions {
        if !seen_questions.insert(&question.id) {
            warnings.push(ValidationWarning::item(
                &question.id,
                format!("duplicate question ID: {}", question.id),
            ));
        }
        let w = question.axis_weights;
        if !in_unit_range(w.x) || !in_unit_range(w.y) {
            warnings.push(ValidationWarning::item(
                &question.id,
                format!("weights ({}, {}) outside [-1, 1]", w.x, w.y),
            ));
        }
        if w.x == 0.0 && w.y == 0.0 {
            warnings.push(ValidationWarning::item(
                &question.id,
                "question has zero weight on both axes",
            ));
        }
        if question.text.trim().is_empty() {
            warnings.push(ValidationWarning::item(&question.id, "question text is empty"));
        }
    }

    let mut seen_results = HashSet::new();
    for result in &quiz.results {
        if !seen_results.insert(&result.id) {
            warnings.push(ValidationWarning::item(
                &result.id,
                format!("duplicate result ID: {}", result.id),
            ));
        }
        if !in_unit_range(result.x) || !in_unit_range(result.y) {
            warnings.push(ValidationWarning::item(
                &result.id,
                format!(
                    "result at ({}, {}) is outside the reachable map",
                    result.x, result.y
                ),
            ));
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[quiz]
id = "work-style"
title = "Work Style"
description = "Where do you sit on the work-style map?"

[[axes]]
id = 1
name = "Energy"
positive_name = "Outgoing"
negative_name = "Reserved"

[[axes]]
id = 2
name = "Focus"
positive_name = "Detail"
negative_name = "Big picture"

[[questions]]
id = "q1"
text = "I enjoy meeting new people."
weights = { x = 1.0, y = 0.0 }

[[questions]]
id = "q2"
text = "I double-check my work."
weights = { x = 0.0, y = 1.0 }

[[results]]
id = "planner"
name = "The Planner"
x = -0.5
y = 0.5

[[results]]
id = "spark"
name = "The Spark"
x = 0.5
y = -0.5
"#;

    #[test]
    fn parse_valid_toml() {
        let quiz = parse_quiz_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(quiz.id, "work-style");
        assert_eq!(quiz.axes.len(), 2);
        assert_eq!(quiz.axes[0].positive_name, "Outgoing");
        assert_eq!(quiz.questions.len(), 2);
        assert_eq!(quiz.questions[1].axis_weights, AxisWeights::new(0.0, 1.0));
        assert_eq!(quiz.results[1].id, "spark");
        assert!(validate_quiz(&quiz).is_empty());
    }

    #[test]
    fn parse_missing_optional_fields() {
        let toml = r#"
[quiz]
id = "minimal"
title = "Minimal"

[[questions]]
id = "q1"
text = "Only question"
weights = { x = 0.5 }
"#;
        let quiz = parse_quiz_str(toml, &PathBuf::from("test.toml")).unwrap();
        assert!(quiz.description.is_empty());
        assert_eq!(quiz.questions[0].axis_weights, AxisWeights::new(0.5, 0.0));
        assert!(quiz.results.is_empty());
    }

    #[test]
    fn validate_reports_structural_issues() {
        let toml = r#"
[quiz]
id = "broken"
title = "Broken"

[[axes]]
id = 3
name = "Odd"

[[questions]]
id = "q1"
text = "First"
weights = { x = 1.5, y = 0.0 }

[[questions]]
id = "q1"
text = "Second"

[[results]]
id = "far"
name = "Far away"
x = 2.0
y = 0.0
"#;
        let quiz = parse_quiz_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_quiz(&quiz);
        let has = |needle: &str| warnings.iter().any(|w| w.message.contains(needle));
        assert!(has("expected 2 axes"));
        assert!(has("axis id must be"));
        assert!(has("duplicate question ID"));
        assert!(has("outside [-1, 1]"));
        assert!(has("zero weight"));
        assert!(has("outside the reachable map"));
    }

    #[test]
    fn validate_empty_quiz() {
        let toml = "[quiz]\nid = \"empty\"\ntitle = \"Empty\"\n";
        let quiz = parse_quiz_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_quiz(&quiz);
        assert!(warnings.iter().any(|w| w.message == "quiz has no questions"));
        assert!(warnings.iter().any(|w| w.message == "quiz has no results"));
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        let result = parse_quiz_str(bad, &PathBuf::from("bad.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn load_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("work.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        std::fs::write(dir.path().join("broken.toml"), "not = [toml").unwrap();

        let quizzes = load_quiz_directory(dir.path()).unwrap();
        assert_eq!(quizzes.len(), 1);
        assert_eq!(quizzes[0].id, "work-style");
    }
}
