use once_cell::sync::Lazy;
use regex::Regex;

use super::vocabulary::{
    find_term, fuzzy_matches, normalize, specialty_names, specialty_terms, term_positions,
    NON_OFFERED_SPECIALTIES,
};
use crate::models::Specialty;

static BOOKING_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:booking|appointment|id)\b[^\d]*(\d+)").unwrap());

static BOOKING_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:booking|appointment)s?\s*(?:#|number|no\.?|id)?\s*#?(\d+)\b").unwrap()
});

static STANDALONE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d+)\b").unwrap());

const NEGATIONS: &[&str] = &["not a", "not an", "not", "no", "don't need a", "don't need an"];

fn is_negated(text: &str, start: usize) -> bool {
    let before = text[..start].trim_end();
    NEGATIONS.iter().any(|n| {
        before.ends_with(n)
            && before[..before.len() - n.len()]
                .chars()
                .next_back()
                .map_or(true, |c| !c.is_alphanumeric())
    })
}

const WORD_ENDINGS: &[&str] = &["", "s", "es", "ing", "ed", "y"];

fn earliest_mention(text: &str, words: &[&str]) -> Option<usize> {
    words
        .iter()
        .flat_map(|word| WORD_ENDINGS.iter().map(move |ending| format!("{word}{ending}")))
        .filter_map(|form| term_positions(text, &form).find(|&start| !is_negated(text, start)))
        .min()
}

fn earliest_by<F>(text: &str, candidates: &[Specialty], words_for: F) -> Option<Specialty>
where
    F: Fn(Specialty) -> &'static [&'static str],
{
    candidates
        .iter()
        .filter_map(|&sp| earliest_mention(text, words_for(sp)).map(|pos| (pos, sp)))
        .min_by_key(|(pos, _)| *pos)
        .map(|(_, sp)| sp)
}

// explicit names, then problem words, then misspellings
pub fn extract_specialty(text: &str) -> Option<Specialty> {
    let text = normalize(text);

    if let Some(sp) = extract_named_specialty(&text) {
        return Some(sp);
    }

    let specific: Vec<Specialty> = Specialty::OFFERED
        .into_iter()
        .filter(|sp| *sp != Specialty::GeneralRepairs)
        .collect();
    if let Some(sp) = earliest_by(&text, &specific, specialty_terms) {
        return Some(sp);
    }
    if earliest_mention(&text, specialty_terms(Specialty::GeneralRepairs)).is_some() {
        return Some(Specialty::GeneralRepairs);
    }

    Specialty::OFFERED.into_iter().find(|sp| {
        fuzzy_matches(*sp)
            .iter()
            .any(|frag| text.contains(frag) && !text.contains(&format!("not a {frag}")))
    })
}

pub fn extract_named_specialty(text: &str) -> Option<Specialty> {
    earliest_by(&normalize(text), &Specialty::OFFERED, specialty_names)
}

// falls back to the first standalone integer: "cancel my booking on the 15th" yields 15
pub fn extract_booking_id(text: &str) -> Option<i64> {
    let text = normalize(text);
    BOOKING_ID
        .captures(&text)
        .or_else(|| STANDALONE_NUMBER.captures(&text))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

pub fn split_booking_reference(text: &str) -> Option<(i64, String)> {
    let text = normalize(text);
    let caps = BOOKING_REFERENCE.captures(&text)?;
    let id = caps.get(1)?.as_str().parse().ok()?;
    let whole = caps.get(0)?;
    let rest = format!("{} {}", &text[..whole.start()], &text[whole.end()..]);
    Some((id, normalize(&rest)))
}

pub fn mentions_unoffered_specialty(text: &str) -> Option<&'static str> {
    let text = normalize(text);
    NON_OFFERED_SPECIALTIES.iter().copied().find(|trade| {
        find_term(&text, trade).is_some() || find_term(&text, &format!("{trade}s")).is_some()
    })
}

pub fn mentions_technician(text: &str) -> bool {
    let text = normalize(text);
    find_term(&text, "technician").is_some() || find_term(&text, "technicians").is_some()
}
