use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::category::{CategoryKind, kind_for_key};
use crate::validate::clamp_score;

/// Server ids are integers, offline ids are timestamp strings; both are kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SectionId(String);

impl SectionId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SectionId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<u64> for SectionId {
    fn from(raw: u64) -> Self {
        Self(raw.to_string())
    }
}

impl<'de> Deserialize<'de> for SectionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Num(i64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Num(n) => SectionId(n.to_string()),
            RawId::Text(s) => SectionId(s),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "femenino")]
    Female,
    #[serde(rename = "masculino")]
    Male,
}

impl Gender {
    pub fn toggled(self) -> Self {
        match self {
            Gender::Female => Gender::Male,
            Gender::Male => Gender::Female,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Gender::Female => "Femenino",
            Gender::Male => "Masculino",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub finished: bool,
    #[serde(rename = "codeA", default, skip_serializing_if = "Option::is_none")]
    pub code_a: Option<String>,
    #[serde(rename = "codeB", default, skip_serializing_if = "Option::is_none")]
    pub code_b: Option<String>,
    #[serde(
        rename = "scoreA",
        default,
        deserialize_with = "lenient_score",
        skip_serializing_if = "Option::is_none"
    )]
    pub score_a: Option<u32>,
    #[serde(
        rename = "scoreB",
        default,
        deserialize_with = "lenient_score",
        skip_serializing_if = "Option::is_none"
    )]
    pub score_b: Option<u32>,
    #[serde(
        default,
        deserialize_with = "lenient_gender",
        skip_serializing_if = "Option::is_none"
    )]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positions: Option<Vec<String>>,
}

impl Section {
    pub fn from_new(id: SectionId, category: &str, date: Option<String>, new: &NewSection) -> Self {
        let mut section = Section {
            id,
            category: category.to_string(),
            date,
            finished: false,
            code_a: None,
            code_b: None,
            score_a: None,
            score_b: None,
            gender: None,
            positions: None,
        };
        match new {
            NewSection::Score {
                code_a,
                code_b,
                score_a,
                score_b,
            } => {
                section.code_a = Some(code_a.clone());
                section.code_b = Some(code_b.clone());
                section.score_a = Some(*score_a);
                section.score_b = Some(*score_b);
            }
            NewSection::Position { gender, positions } => {
                section.gender = *gender;
                section.positions = Some(positions.clone());
            }
        }
        section
    }

    pub fn kind(&self) -> CategoryKind {
        kind_for_key(&self.category)
    }

    pub fn score(&self, side: Side) -> u32 {
        match side {
            Side::A => self.score_a.unwrap_or(0),
            Side::B => self.score_b.unwrap_or(0),
        }
    }

    pub fn code(&self, side: Side) -> &str {
        let code = match side {
            Side::A => self.code_a.as_deref(),
            Side::B => self.code_b.as_deref(),
        };
        code.unwrap_or("--")
    }

    pub fn positions(&self) -> &[String] {
        self.positions.as_deref().unwrap_or(&[])
    }

    /// One-line summary used by the category list and the scoreboard.
    pub fn headline(&self) -> String {
        if self.kind().uses_positions() || self.positions.is_some() {
            let podium = self
                .positions()
                .iter()
                .enumerate()
                .map(|(idx, code)| format!("{}°{}", idx + 1, code))
                .collect::<Vec<_>>()
                .join(" ");
            match self.gender {
                Some(gender) => format!("[{}] {podium}", gender.label()),
                None => podium,
            }
        } else {
            format!(
                "{} {} - {} {}",
                self.code(Side::A).to_uppercase(),
                self.score(Side::A),
                self.score(Side::B),
                self.code(Side::B).to_uppercase()
            )
        }
    }
}

/// Create payload, shaped per category kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum NewSection {
    Score {
        #[serde(rename = "codeA")]
        code_a: String,
        #[serde(rename = "codeB")]
        code_b: String,
        #[serde(rename = "scoreA")]
        score_a: u32,
        #[serde(rename = "scoreB")]
        score_b: u32,
    },
    Position {
        #[serde(skip_serializing_if = "Option::is_none")]
        gender: Option<Gender>,
        positions: Vec<String>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SectionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(rename = "scoreA", skip_serializing_if = "Option::is_none")]
    pub score_a: Option<u32>,
    #[serde(rename = "scoreB", skip_serializing_if = "Option::is_none")]
    pub score_b: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub positions: Option<Vec<String>>,
}

impl SectionPatch {
    pub fn score(side: Side, value: u32) -> Self {
        let mut patch = Self::default();
        match side {
            Side::A => patch.score_a = Some(value),
            Side::B => patch.score_b = Some(value),
        }
        patch
    }

    pub fn finished(finished: bool, date: String) -> Self {
        Self {
            finished: Some(finished),
            date: Some(date),
            ..Self::default()
        }
    }

    pub fn positions(positions: Vec<String>) -> Self {
        Self {
            positions: Some(positions),
            ..Self::default()
        }
    }

    pub fn touches_results(&self) -> bool {
        self.score_a.is_some() || self.score_b.is_some() || self.positions.is_some()
    }

    pub fn apply_to(&self, section: &mut Section) {
        if let Some(finished) = self.finished {
            section.finished = finished;
        }
        if let Some(date) = &self.date {
            section.date = Some(date.clone());
        }
        if let Some(score) = self.score_a {
            section.score_a = Some(score);
        }
        if let Some(score) = self.score_b {
            section.score_b = Some(score);
        }
        if let Some(positions) = &self.positions {
            section.positions = Some(positions.clone());
        }
    }
}

// Stored rows were never validated server-side: negative or textual scores
// and free-form genders must not sink the whole list.
fn lenient_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    let value = match raw {
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|_| i64::MAX))
            .or_else(|| n.as_f64().map(|f| f as i64)),
        Some(serde_json::Value::String(text)) => text.trim().parse::<i64>().ok(),
        _ => None,
    };
    Ok(value.map(|v| clamp_score(v, u32::MAX)))
}

fn lenient_gender<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Gender>, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    let gender = match raw {
        Some(serde_json::Value::String(text)) => match text.trim().to_lowercase().as_str() {
            "femenino" => Some(Gender::Female),
            "masculino" => Some(Gender::Male),
            _ => None,
        },
        _ => None,
    };
    Ok(gender)
}

pub fn parse_sections_json(raw: &str) -> anyhow::Result<Vec<Section>> {
    use anyhow::Context;

    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    serde_json::from_str(trimmed).context("invalid sections json")
}
