use lafe_score::category::{CategoryKind, kind_for_key};
use lafe_score::section::{Gender, NewSection, Side};
use lafe_score::validate::{
    SectionForm, TEAM_CODE_ALPHABET, ValidationError, apply_score_delta, clamp_score,
    parse_score_text, sanitize_position_code, sanitize_team_code, validate_new_section,
};

#[test]
fn team_codes_only_keep_allowed_characters() {
    let inputs = [
        "", "1", "1a", "1A", "ab", "7z", "z9", "12345", "  6b  ", "ÁB", "a-b", "b\t1", "zzz", "99",
        "6B6B", "🙂1a",
    ];
    for raw in inputs {
        let code = sanitize_team_code(raw);
        assert!(code.chars().count() <= 2, "{raw:?} -> {code:?}");
        assert!(
            code.chars().all(|c| TEAM_CODE_ALPHABET.contains(c)),
            "{raw:?} -> {code:?}"
        );
    }
    assert_eq!(sanitize_team_code("1A"), "1a");
    assert_eq!(sanitize_team_code("x6yb9"), "6b");
    assert_eq!(sanitize_team_code("7890"), "");
}

#[test]
fn position_codes_are_uppercased_and_truncated() {
    assert_eq!(sanitize_position_code("1a"), "1A");
    assert_eq!(sanitize_position_code(" 3 c "), "3C");
    assert_eq!(sanitize_position_code("abc"), "AB");
    assert_eq!(sanitize_position_code(""), "");
}

#[test]
fn score_mutations_stay_in_range() {
    for max in [1_u32, 5, 999] {
        for value in [i64::MIN, -1000, -1, 0, 1, 4, 5, 998, 999, 1000, i64::MAX] {
            let clamped = clamp_score(value, max);
            assert!(clamped <= max, "{value} max {max}");
        }
        for current in [0_u32, 1, max] {
            for delta in [i32::MIN, -1, 0, 1, i32::MAX] {
                assert!(apply_score_delta(current, delta, max) <= max);
            }
        }
    }
    assert_eq!(apply_score_delta(0, -1, 999), 0);
    assert_eq!(apply_score_delta(999, 1, 999), 999);
    assert_eq!(apply_score_delta(3, 1, 999), 4);
}

#[test]
fn malformed_score_text_is_zero() {
    assert_eq!(parse_score_text("", 999), 0);
    assert_eq!(parse_score_text("abc", 999), 0);
    assert_eq!(parse_score_text("-4", 999), 0);
    assert_eq!(parse_score_text(" 12 ", 999), 12);
    assert_eq!(parse_score_text("7goles", 999), 7);
    assert_eq!(parse_score_text("+3", 999), 3);
    assert_eq!(parse_score_text("5000", 999), 999);
    assert_eq!(parse_score_text("99999999999999999999999", 10), 10);
}

#[test]
fn partial_positions_keep_submit_disabled() {
    let mut form = SectionForm::new(kind_for_key("atletismo_relevo"));
    form.set_position(0, "1A");
    form.set_position(2, "3C");
    assert_eq!(form.positions, vec!["1A", "", "3C"]);
    assert!(!form.can_submit());
    assert_eq!(
        form.to_payload().unwrap_err(),
        ValidationError::PositionMissing { index: 1 }
    );

    form.set_position(1, "2b");
    assert!(form.can_submit());
}

#[test]
fn gender_only_sent_for_athletics() {
    let mut form = SectionForm::new(kind_for_key("atletismo_velocidad"));
    for (idx, code) in ["1a", "2a", "3a", "4a"].iter().enumerate() {
        form.set_position(idx, code);
    }
    form.toggle_gender();
    match form.to_payload().unwrap() {
        NewSection::Position { gender, positions } => {
            assert_eq!(gender, Some(Gender::Male));
            assert_eq!(positions, vec!["1A", "2A", "3A", "4A"]);
        }
        other => panic!("unexpected payload {other:?}"),
    }

    let mut chess = SectionForm::new(CategoryKind::Chess);
    chess.set_position(0, "1a");
    chess.set_position(1, "2b");
    match chess.to_payload().unwrap() {
        NewSection::Position { gender, .. } => assert_eq!(gender, None),
        other => panic!("unexpected payload {other:?}"),
    }
}

#[test]
fn team_form_requires_two_distinct_codes() {
    let mut form = SectionForm::new(CategoryKind::Score);
    form.set_code(Side::A, "1a");
    assert!(!form.can_submit());
    form.set_code(Side::B, "1A");
    assert_eq!(
        form.to_payload().unwrap_err(),
        ValidationError::DuplicateTeamCodes
    );
    form.set_code(Side::B, "2a");
    assert!(form.can_submit());

    form.reset();
    assert!(form.code_a.is_empty() && form.code_b.is_empty());
}

#[test]
fn payload_kind_must_match_category() {
    let positions = NewSection::Position {
        gender: None,
        positions: vec!["1A".to_string(), "2B".to_string()],
    };
    assert_eq!(
        validate_new_section(CategoryKind::Score, &positions),
        Err(ValidationError::WrongKind)
    );
    assert_eq!(
        validate_new_section(CategoryKind::Position { count: 3 }, &positions),
        Err(ValidationError::PositionCount {
            expected: 3,
            got: 2
        })
    );
    let with_gender = NewSection::Position {
        gender: Some(Gender::Female),
        positions: vec!["1A".to_string(), "2B".to_string()],
    };
    assert_eq!(
        validate_new_section(CategoryKind::Chess, &with_gender),
        Err(ValidationError::WrongKind)
    );
    assert_eq!(validate_new_section(CategoryKind::Chess, &positions), Ok(()));
}

#[test]
fn unknown_category_behaves_like_team_sport() {
    assert_eq!(kind_for_key("quidditch"), CategoryKind::Score);
    assert_eq!(kind_for_key("vuelo_avion").position_count(), 3);
    assert_eq!(kind_for_key("ajedrez").position_count(), 2);
    assert!(kind_for_key("atletismo_maraton").uses_gender());
    assert!(!kind_for_key("ajedrez").uses_gender());
}
