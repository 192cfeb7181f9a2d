use chrono::NaiveDate;

use lafe_score::scoreboard::{UNDATED_LABEL, date_label, group_by_date, parse_section_date};
use lafe_score::section::{Section, SectionId};

fn finished(id: &str, category: &str, date: Option<&str>) -> Section {
    Section {
        id: SectionId::from(id),
        category: category.to_string(),
        date: date.map(str::to_string),
        finished: true,
        code_a: Some("1a".to_string()),
        code_b: Some("2a".to_string()),
        score_a: Some(0),
        score_b: Some(0),
        gender: None,
        positions: None,
    }
}

#[test]
fn most_recent_date_comes_first() {
    let groups = group_by_date(vec![
        finished("1", "futbol", Some("09/05/2024")),
        finished("2", "futbol", Some("10/05/2024")),
    ]);
    let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
    assert_eq!(labels, vec!["10/05/2024", "09/05/2024"]);
}

#[test]
fn mixed_formats_land_on_the_same_day() {
    let groups = group_by_date(vec![
        finished("1", "voleibol", Some("2024-05-10T08:00:00.123Z")),
        finished("2", "futbol", Some("10/05/2024")),
        finished("3", "basketball", Some("2024-05-10 19:45:00")),
    ]);
    assert_eq!(groups.len(), 1);
    let ids: Vec<&str> = groups[0].sections.iter().map(|s| s.id.as_str()).collect();
    // catalog order: futbol, basketball, voleibol
    assert_eq!(ids, vec!["2", "3", "1"]);
}

#[test]
fn same_category_keeps_fetch_order() {
    let groups = group_by_date(vec![
        finished("b", "futbol", Some("2024-05-10")),
        finished("a", "futbol", Some("2024-05-10")),
    ]);
    let ids: Vec<&str> = groups[0].sections.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a"]);
}

#[test]
fn undated_and_unparseable_go_last() {
    let groups = group_by_date(vec![
        finished("1", "futbol", None),
        finished("2", "futbol", Some("pronto")),
        finished("3", "futbol", Some("2023-01-02")),
    ]);
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].label, "02/01/2023");
    assert_eq!(groups[1].label, UNDATED_LABEL);
    assert_eq!(groups[1].sections.len(), 2);
}

#[test]
fn open_sections_are_skipped() {
    let mut open = finished("1", "futbol", Some("2024-05-10"));
    open.finished = false;
    assert!(group_by_date(vec![open]).is_empty());
}

#[test]
fn parses_supported_date_formats() {
    let day = NaiveDate::from_ymd_opt(2024, 5, 9);
    assert_eq!(parse_section_date("2024-05-09T12:00:00Z"), day);
    assert_eq!(parse_section_date("2024-05-09T12:00:00.250"), day);
    assert_eq!(parse_section_date("2024-05-09T12:00:00+02:00"), day);
    assert_eq!(parse_section_date("09/05/2024"), day);
    assert_eq!(parse_section_date("2024-05-09"), day);
    assert_eq!(parse_section_date(""), None);
    assert_eq!(parse_section_date("ayer"), None);
    assert_eq!(date_label(day), "09/05/2024");
}
