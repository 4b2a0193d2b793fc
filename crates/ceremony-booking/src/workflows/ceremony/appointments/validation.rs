use super::domain::{Gender, WitnessInfo};

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 20;
pub const NOTES_MAX_CHARS: usize = 500;
pub const REASON_MAX_CHARS: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must be between 2 and 20 characters")]
    NameLength { field: &'static str },
    #[error("notes cannot exceed 500 characters")]
    NotesTooLong,
    #[error("{field} cannot be blank")]
    BlankReason { field: &'static str },
    #[error("{field} cannot exceed 255 characters")]
    ReasonTooLong { field: &'static str },
    #[error("two or three witnesses are required, got {0}")]
    WitnessCount(usize),
}

/// Trim, lowercase, then capitalize the first letter: `"  aNN "` becomes `"Ann"`.
pub fn normalize_name(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let mut chars = lowered.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn validate_name(field: &'static str, raw: &str) -> Result<(), ValidationError> {
    let len = raw.trim().chars().count();
    if (NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&len) {
        Ok(())
    } else {
        Err(ValidationError::NameLength { field })
    }
}

pub fn validate_notes(notes: Option<&str>) -> Result<(), ValidationError> {
    match notes {
        Some(text) if text.chars().count() > NOTES_MAX_CHARS => Err(ValidationError::NotesTooLong),
        _ => Ok(()),
    }
}

/// Rejection and cancellation reasons: non-blank and at most 255 characters. Returns the trimmed text.
pub fn validate_reason(field: &'static str, raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankReason { field });
    }
    if trimmed.chars().count() > REASON_MAX_CHARS {
        return Err(ValidationError::ReasonTooLong { field });
    }
    Ok(trimmed.to_string())
}

pub fn validate_witness_fields(witnesses: &[WitnessInfo]) -> Result<(), ValidationError> {
    if !(2..=3).contains(&witnesses.len()) {
        return Err(ValidationError::WitnessCount(witnesses.len()));
    }
    for witness in witnesses {
        validate_name("witness first name", &witness.first_name)?;
        validate_name("witness last name", &witness.last_name)?;
    }
    Ok(())
}

/// Exactly two men, or one man and two women.
pub fn witnesses_are_valid(witnesses: &[WitnessInfo]) -> bool {
    let males = witnesses
        .iter()
        .filter(|witness| witness.gender == Gender::Male)
        .count();
    let females = witnesses.len() - males;
    matches!((males, females), (2, 0) | (1, 2))
}
