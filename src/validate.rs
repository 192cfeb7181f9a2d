use thiserror::Error;

use crate::category::CategoryKind;
use crate::section::{Gender, NewSection, Side};

pub const TEAM_CODE_ALPHABET: &str = "123456ab";
pub const CODE_LEN: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("team codes must be exactly 2 characters")]
    TeamCodeLength,
    #[error("team code contains characters outside [1-6ab]")]
    TeamCodeAlphabet,
    #[error("both teams have the same code")]
    DuplicateTeamCodes,
    #[error("position {index} is empty or malformed")]
    PositionMissing { index: usize },
    #[error("expected {expected} positions, got {got}")]
    PositionCount { expected: usize, got: usize },
    #[error("payload does not match the category kind")]
    WrongKind,
    #[error("email and password are required")]
    MissingCredentials,
}

/// Lowercases, drops anything outside the team alphabet and keeps at most two characters.
pub fn sanitize_team_code(raw: &str) -> String {
    raw.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| TEAM_CODE_ALPHABET.contains(*c))
        .take(CODE_LEN)
        .collect()
}

pub fn sanitize_position_code(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .take(CODE_LEN)
        .collect()
}

pub fn clamp_score(value: i64, max: u32) -> u32 {
    value.clamp(0, i64::from(max)) as u32
}

pub fn apply_score_delta(current: u32, delta: i32, max: u32) -> u32 {
    clamp_score(i64::from(current) + i64::from(delta), max)
}

/// Leading-integer parse: `"12abc"` is 12, garbage is 0, the result is clamped to `[0, max]`.
pub fn parse_score_text(raw: &str, max: u32) -> u32 {
    let trimmed = raw.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let leading: String = digits.chars().take_while(|c| c.is_ascii_digit()).collect();
    if leading.is_empty() || negative {
        return 0;
    }
    match leading.parse::<u64>() {
        Ok(value) => clamp_score(i64::try_from(value).unwrap_or(i64::MAX), max),
        Err(_) => max,
    }
}

fn is_team_code(code: &str) -> bool {
    code.chars().count() == CODE_LEN
}

fn check_team_code(code: &str) -> Result<(), ValidationError> {
    if !is_team_code(code) {
        return Err(ValidationError::TeamCodeLength);
    }
    if code.chars().any(|c| !TEAM_CODE_ALPHABET.contains(c)) {
        return Err(ValidationError::TeamCodeAlphabet);
    }
    Ok(())
}

pub fn validate_positions(kind: CategoryKind, positions: &[String]) -> Result<(), ValidationError> {
    let expected = kind.position_count();
    if positions.len() != expected {
        return Err(ValidationError::PositionCount {
            expected,
            got: positions.len(),
        });
    }
    for (index, code) in positions.iter().enumerate() {
        if code.chars().count() != CODE_LEN {
            return Err(ValidationError::PositionMissing { index });
        }
    }
    Ok(())
}

pub fn validate_new_section(kind: CategoryKind, payload: &NewSection) -> Result<(), ValidationError> {
    match (kind, payload) {
        (CategoryKind::Score, NewSection::Score { code_a, code_b, .. }) => {
            check_team_code(code_a)?;
            check_team_code(code_b)?;
            if code_a == code_b {
                return Err(ValidationError::DuplicateTeamCodes);
            }
            Ok(())
        }
        (CategoryKind::Score, NewSection::Position { .. }) => Err(ValidationError::WrongKind),
        (_, NewSection::Score { .. }) => Err(ValidationError::WrongKind),
        (kind, NewSection::Position { gender, positions }) => {
            if gender.is_some() && !kind.uses_gender() {
                return Err(ValidationError::WrongKind);
            }
            validate_positions(kind, positions)
        }
    }
}

/// Create-section form; inputs are sanitized as they are typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionForm {
    pub kind: CategoryKind,
    pub code_a: String,
    pub code_b: String,
    pub positions: Vec<String>,
    pub gender: Gender,
}

impl SectionForm {
    pub fn new(kind: CategoryKind) -> Self {
        Self {
            kind,
            code_a: String::new(),
            code_b: String::new(),
            positions: vec![String::new(); kind.position_count()],
            gender: Gender::Female,
        }
    }

    pub fn set_code(&mut self, side: Side, raw: &str) {
        let code = sanitize_team_code(raw);
        match side {
            Side::A => self.code_a = code,
            Side::B => self.code_b = code,
        }
    }

    pub fn set_position(&mut self, index: usize, raw: &str) {
        if let Some(slot) = self.positions.get_mut(index) {
            *slot = sanitize_position_code(raw);
        }
    }

    pub fn toggle_gender(&mut self) {
        self.gender = self.gender.toggled();
    }

    pub fn field_count(&self) -> usize {
        if self.kind.is_score() {
            2
        } else {
            self.positions.len()
        }
    }

    pub fn field_value(&self, index: usize) -> &str {
        if self.kind.is_score() {
            match index {
                0 => &self.code_a,
                _ => &self.code_b,
            }
        } else {
            self.positions.get(index).map(String::as_str).unwrap_or("")
        }
    }

    pub fn set_field(&mut self, index: usize, raw: &str) {
        if self.kind.is_score() {
            let side = if index == 0 { Side::A } else { Side::B };
            self.set_code(side, raw);
        } else {
            self.set_position(index, raw);
        }
    }

    pub fn can_submit(&self) -> bool {
        self.to_payload().is_ok()
    }

    pub fn to_payload(&self) -> Result<NewSection, ValidationError> {
        let payload = if self.kind.is_score() {
            NewSection::Score {
                code_a: self.code_a.clone(),
                code_b: self.code_b.clone(),
                score_a: 0,
                score_b: 0,
            }
        } else {
            NewSection::Position {
                gender: self.kind.uses_gender().then_some(self.gender),
                positions: self.positions.iter().map(|p| p.to_uppercase()).collect(),
            }
        };
        validate_new_section(self.kind, &payload)?;
        Ok(payload)
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.kind);
    }
}

#[cfg(test)]
mod tests {
    use super::is_team_code;

    #[test]
    fn team_code_length_counts_chars() {
        assert!(is_team_code("1a"));
        assert!(!is_team_code("1"));
        assert!(!is_team_code("1ab"));
    }
}
