use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::StoreError;
use crate::models::Specialty;
use crate::services::conflict::ConflictChecker;
use crate::services::nlp::vocabulary::{contains_any, contains_term, normalize, ANY_TECHNICIAN};

static NUMBERED_CHOICE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:number|option|choice|no\.?|#)\s*(\d+)").unwrap());

static ANY_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d+)\b").unwrap());

static ORDINAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(first|second|third|fourth|fifth|1st|2nd|3rd|4th|5th)\b").unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    // zero-based
    Chosen(usize),
    OutOfRange,
    NoMatch,
}

pub fn candidates_for(specialty: Specialty) -> Vec<String> {
    specialty.technicians().iter().map(|t| t.to_string()).collect()
}

pub fn wants_any_technician(text: &str) -> bool {
    contains_any(&normalize(text), ANY_TECHNICIAN)
}

fn ordinal_position(word: &str) -> usize {
    match word {
        "first" | "1st" => 1,
        "second" | "2nd" => 2,
        "third" | "3rd" => 3,
        "fourth" | "4th" => 4,
        _ => 5,
    }
}

fn by_position(position: usize, len: usize) -> Selection {
    if (1..=len).contains(&position) {
        Selection::Chosen(position - 1)
    } else {
        Selection::OutOfRange
    }
}

pub fn resolve_selection(text: &str, candidates: &[String]) -> Selection {
    let text = normalize(text);

    let number = NUMBERED_CHOICE
        .captures(&text)
        .or_else(|| ANY_NUMBER.captures(&text))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<usize>().ok());
    if let Some(position) = number {
        return by_position(position, candidates.len());
    }

    if let Some(word) = ORDINAL.captures(&text).and_then(|caps| caps.get(1)) {
        return by_position(ordinal_position(word.as_str()), candidates.len());
    }

    if let Some(idx) = candidates.iter().position(|c| c.to_lowercase() == text) {
        return Selection::Chosen(idx);
    }

    let partial = candidates.iter().position(|c| {
        let name = c.to_lowercase();
        text.contains(&name)
            || name
                .split_whitespace()
                .any(|part| part.len() >= 3 && contains_term(&text, part))
    });
    match partial {
        Some(idx) => Selection::Chosen(idx),
        None => Selection::NoMatch,
    }
}

pub fn auto_assign(
    checker: &ConflictChecker<'_>,
    candidates: &[String],
    time: NaiveDateTime,
) -> Result<Option<String>, StoreError> {
    for candidate in candidates {
        if checker.check_conflict(time, None, Some(candidate))?.is_none() {
            return Ok(Some(candidate.clone()));
        }
    }
    Ok(None)
}
