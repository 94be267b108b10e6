//! Core data model types for quizmap.
//!
//! Quizzes, axes, archetypes and stored response records. All record shapes
//! serialize with camelCase keys so fixtures written by other callers of the
//! platform load unchanged.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Per-question influence on the two trait axes, each in `[-1, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisWeights {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

impl AxisWeights {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Weight on the given dimension.
    pub fn on(&self, dimension: AxisDimension) -> f64 {
        match dimension {
            AxisDimension::X => self.x,
            AxisDimension::Y => self.y,
        }
    }
}

/// A single Likert item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub axis_weights: AxisWeights,
}

/// Which of the two map dimensions an axis describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisDimension {
    X,
    Y,
}

impl AxisDimension {
    /// Axis id 1 is X, axis id 2 is Y.
    pub fn from_axis_id(id: u32) -> Option<Self> {
        match id {
            1 => Some(AxisDimension::X),
            2 => Some(AxisDimension::Y),
            _ => None,
        }
    }
}

impl fmt::Display for AxisDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisDimension::X => write!(f, "x"),
            AxisDimension::Y => write!(f, "y"),
        }
    }
}

/// One of the two trait axes of a quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Axis {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub positive_name: String,
    #[serde(default)]
    pub negative_name: String,
}

impl Axis {
    pub fn dimension(&self) -> Option<AxisDimension> {
        AxisDimension::from_axis_id(self.id)
    }
}

/// A pre-authored archetype placed in axis space.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchetypeResult {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub x: f64,
    pub y: f64,
}

/// One respondent's ratings, question id to 1–5.
pub type AnswerSet = HashMap<String, u8>;

/// A point in the two-dimensional trait map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to a point.
    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        ((self.x - x).powi(2) + (self.y - y).powi(2)).sqrt()
    }
}

/// Per-axis summary attached to a diagnosis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisScore {
    pub axis_id: u32,
    pub axis_name: String,
    /// Mean raw rating (1–5) over the questions touching this axis.
    pub raw_score: f64,
    /// `raw_score` mapped onto 0–100.
    pub percentage: f64,
}

/// Output of the diagnosis scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisResult {
    pub matched_result_id: String,
    pub name: String,
    pub description: String,
    pub coordinate: Coordinate,
    pub axis_scores: Vec<AxisScore>,
}

/// A complete quiz definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub axes: Vec<Axis>,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub results: Vec<ArchetypeResult>,
}

/// A raw answer value as stored; numeric ratings or free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Number(f64),
    Text(String),
}

impl AnswerValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AnswerValue::Number(n) => Some(*n),
            AnswerValue::Text(_) => None,
        }
    }
}

/// Optional respondent demographics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Demographics {
    /// Whole years. Fractional, numeric-string and unusable values are read
    /// leniently so one odd record does not reject its batch.
    #[serde(default, deserialize_with = "lenient_age")]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAge {
    Whole(u32),
    Number(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

fn whole_years(value: f64) -> Option<u32> {
    (0.0..=u32::MAX as f64)
        .contains(&value)
        .then(|| value.trunc() as u32)
}

fn lenient_age<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let age = match Option::<RawAge>::deserialize(deserializer)? {
        Some(RawAge::Whole(years)) => Some(years),
        Some(RawAge::Number(value)) => whole_years(value),
        Some(RawAge::Text(text)) => text.trim().parse().ok().and_then(whole_years),
        Some(RawAge::Other(_)) | None => None,
    };
    Ok(age)
}

/// One stored submission. Owned by the storage layer; read-only here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRecord {
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub quiz_id: String,
    #[serde(default)]
    pub answers: HashMap<String, AnswerValue>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub response_time_seconds: Option<f64>,
    #[serde(default)]
    pub demographics: Option<Demographics>,
}
