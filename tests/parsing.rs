use std::fs;
use std::path::PathBuf;

use lafe_score::section::{Gender, NewSection, SectionPatch, Side, parse_sections_json};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_sections_fixture() {
    let raw = read_fixture("sections.json");
    let sections = parse_sections_json(&raw).expect("fixture should parse");
    assert_eq!(sections.len(), 4);

    assert_eq!(sections[0].id.as_str(), "17");
    assert!(sections[0].finished);
    assert_eq!(sections[0].score(Side::B), 2);
    assert_eq!(sections[0].headline(), "1A 2 - 2 3B");

    assert_eq!(sections[1].id.as_str(), "1715350000000");
    assert_eq!(sections[1].date, None);
    assert_eq!(sections[1].score(Side::A), 0);

    assert_eq!(sections[2].gender, Some(Gender::Male));
    assert_eq!(sections[2].positions().len(), 8);
    assert!(sections[2].headline().starts_with("[Masculino] 1°1A"));

    // no category on the wire
    assert_eq!(sections[3].category, "");
    assert_eq!(sections[3].positions(), ["6B", "2A", "3B"]);
}

#[test]
fn empty_and_null_bodies_are_empty_lists() {
    assert!(parse_sections_json("").unwrap().is_empty());
    assert!(parse_sections_json("  null \n").unwrap().is_empty());
    assert!(parse_sections_json("[]").unwrap().is_empty());
    assert!(parse_sections_json("{\"oops\": 1}").is_err());
}

#[test]
fn create_payloads_use_wire_names() {
    let team = NewSection::Score {
        code_a: "1a".to_string(),
        code_b: "2b".to_string(),
        score_a: 0,
        score_b: 0,
    };
    let json = serde_json::to_value(&team).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"codeA": "1a", "codeB": "2b", "scoreA": 0, "scoreB": 0})
    );

    let chess = NewSection::Position {
        gender: None,
        positions: vec!["1A".to_string(), "2B".to_string()],
    };
    let json = serde_json::to_value(&chess).unwrap();
    assert_eq!(json, serde_json::json!({"positions": ["1A", "2B"]}));

    let sprint = NewSection::Position {
        gender: Some(Gender::Female),
        positions: vec!["1A".to_string()],
    };
    let json = serde_json::to_value(&sprint).unwrap();
    assert_eq!(json["gender"], "femenino");
}

#[test]
fn patches_only_carry_changed_fields() {
    let json = serde_json::to_value(SectionPatch::score(Side::A, 4)).unwrap();
    assert_eq!(json, serde_json::json!({"scoreA": 4}));

    let json = serde_json::to_value(SectionPatch::finished(
        true,
        "2024-05-10T12:00:00.000Z".to_string(),
    ))
    .unwrap();
    assert_eq!(
        json,
        serde_json::json!({"finished": true, "date": "2024-05-10T12:00:00.000Z"})
    );
}

#[test]
fn out_of_range_fields_do_not_sink_the_list() {
    let raw = r#"[
        {"id": 1, "category": "futbol", "finished": true, "codeA": "1a", "codeB": "2a", "scoreA": 3, "scoreB": 1},
        {"id": 2, "category": "futbol", "finished": false, "codeA": "3a", "codeB": "4a", "scoreA": -1, "scoreB": "7"},
        {"id": 3, "category": "basketball", "finished": false, "codeA": "5a", "codeB": "6a", "scoreA": 99999999999, "scoreB": null},
        {"id": 4, "category": "atletismo_velocidad", "finished": false, "gender": "otro", "positions": ["1A", "2B", "3A"]}
    ]"#;
    let sections = parse_sections_json(raw).expect("every row should decode");
    assert_eq!(sections.len(), 4);

    assert_eq!(sections[0].score(Side::A), 3);
    assert_eq!(sections[1].score_a, Some(0));
    assert_eq!(sections[1].score_b, Some(7));
    assert_eq!(sections[2].score_a, Some(u32::MAX));
    assert_eq!(sections[2].score_b, None);
    assert_eq!(sections[3].gender, None);
    assert_eq!(sections[3].positions().len(), 3);
}

#[test]
fn gender_is_matched_loosely() {
    let raw = r#"[{"id": "x", "category": "atletismo_velocidad", "finished": false, "gender": " Femenino ", "positions": []}]"#;
    let sections = parse_sections_json(raw).expect("should parse");
    assert_eq!(sections[0].gender, Some(Gender::Female));
}
