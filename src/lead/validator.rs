//! Full-name validation and phone number masking.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{NameShape, ValidationError};

/// Cyrillic letters, whitespace and hyphens only.
static CYRILLIC_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[А-ЯЁа-яё\s-]+$").expect("valid name pattern"));

/// Validate a full name ("Фамилия Имя Отчество").
///
/// Rules are checked in order and the first failure wins: script, word
/// count, minimum 2 letters per word, minimum 3 letters for the surname and
/// given name (and patronymic when present).
pub fn validate_full_name(raw: &str) -> Result<(), ValidationError> {
    let trimmed = raw.trim();

    if !CYRILLIC_NAME.is_match(trimmed) {
        return Err(ValidationError::InvalidScript);
    }

    let words: Vec<&str> = trimmed.split_whitespace().collect();
    if words.len() < 2 {
        return Err(ValidationError::TooFewWords);
    }

    let letters = |word: &str| word.chars().count();

    if words.iter().any(|w| letters(w) < 2) {
        return Err(ValidationError::WordTooShort);
    }

    let shape = if words.len() == 2 {
        NameShape::TwoPart
    } else {
        NameShape::ThreePart
    };
    if words.iter().take(3).any(|w| letters(w) < 3) {
        return Err(ValidationError::ComponentTooShort { shape });
    }

    Ok(())
}

/// Reformat raw phone input as `+7 (DDD) DDD-DD-DD`, as far as digits allow.
///
/// The first digit stands for the `+7` country code and is not repeated. A
/// complete 10-digit national number without country code (not starting
/// with 7 or 8) has the country code implied.
pub fn format_phone_number(raw: &str) -> String {
    let mut digits: Vec<char> = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.is_empty() {
        return String::new();
    }

    if digits.len() == 10 && !matches!(digits[0], '7' | '8') {
        digits.insert(0, '7');
    }

    let group = |from: usize, to: usize| -> String {
        let to = to.min(digits.len());
        if from >= to {
            String::new()
        } else {
            digits[from..to].iter().collect()
        }
    };

    let count = digits.len();
    let mut formatted = String::from("+7");

    if count > 1 {
        formatted.push_str(" (");
        formatted.push_str(&group(1, 4));
    }
    if count >= 4 {
        formatted.push_str(") ");
        formatted.push_str(&group(4, 7));
    }
    if count >= 7 {
        formatted.push('-');
        formatted.push_str(&group(7, 9));
    }
    if count >= 9 {
        formatted.push('-');
        formatted.push_str(&group(9, 11));
    }

    formatted
}
