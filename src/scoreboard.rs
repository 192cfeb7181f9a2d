use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::category::catalog_index;
use crate::section::Section;

pub const UNDATED_LABEL: &str = "Sin fecha";

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreboardGroup {
    pub date: Option<NaiveDate>,
    pub label: String,
    pub sections: Vec<Section>,
}

/// Groups finished sections by calendar day, newest day first; undated records go last.
pub fn group_by_date(sections: Vec<Section>) -> Vec<ScoreboardGroup> {
    let mut by_day: HashMap<Option<NaiveDate>, Vec<Section>> = HashMap::new();
    for section in sections.into_iter().filter(|s| s.finished) {
        let day = section.date.as_deref().and_then(parse_section_date);
        by_day.entry(day).or_default().push(section);
    }

    let mut groups: Vec<ScoreboardGroup> = by_day
        .into_iter()
        .map(|(date, mut sections)| {
            sections.sort_by_key(|s| catalog_index(&s.category));
            ScoreboardGroup {
                date,
                label: date_label(date),
                sections,
            }
        })
        .collect();
    // None sorts below every Some, so reversing puts undated last.
    groups.sort_by(|a, b| b.date.cmp(&a.date));
    groups
}

pub fn date_label(date: Option<NaiveDate>) -> String {
    match date {
        Some(day) => day.format("%d/%m/%Y").to_string(),
        None => UNDATED_LABEL.to_string(),
    }
}

pub fn parse_section_date(raw: &str) -> Option<NaiveDate> {
    const DATETIME_FORMATS: [&str; 5] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%d/%m/%Y %H:%M",
    ];
    const DATE_FORMATS: [&str; 2] = ["%d/%m/%Y", "%Y-%m-%d"];

    let cleaned = raw.trim();
    if cleaned.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(cleaned) {
        return Some(dt.naive_utc().date());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(cleaned, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(day) = NaiveDate::parse_from_str(cleaned, fmt) {
            return Some(day);
        }
    }
    None
}
