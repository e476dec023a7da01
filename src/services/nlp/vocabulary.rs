//! Fixed word lists for the rule-based parser and the word-boundary matcher
//! they are checked with.

use crate::models::Specialty;

pub const BOOKING_KEYWORDS: &[&str] = &[
    "book",
    "booking",
    "schedule",
    "appointment",
    "reserve",
    "make a booking",
    "make an appointment",
    "need a",
    "need an",
    "want a",
    "want an",
    "looking for a",
    "looking for an",
];
pub const INQUIRY_KEYWORDS: &[&str] = &["what", "what's", "whats", "tell me", "show", "give me"];
pub const ID_KEYWORDS: &[&str] = &["id", "number", "booking id", "appointment id", "reference"];
pub const CANCEL_KEYWORDS: &[&str] = &["cancel", "delete", "remove", "cancellation"];
pub const UPDATE_KEYWORDS: &[&str] = &["update", "change", "modify", "reschedule"];
pub const BOOKING_REFERENCE_KEYWORDS: &[&str] = &[
    "booking",
    "bookings",
    "appointment",
    "appointments",
    "reservation",
    "reservations",
];
pub const BOOKING_PLURAL_KEYWORDS: &[&str] = &["bookings", "appointments", "reservations"];
pub const LIST_KEYWORDS: &[&str] = &[
    "list", "show", "view", "see", "get", "display", "what are", "check",
];
pub const LIST_BOOKINGS_EXACT_MATCHES: &[&str] = &[
    "my bookings",
    "list my bookings",
    "show my bookings",
    "check bookings",
    "show bookings",
    "list bookings",
    "check my bookings",
    "view bookings",
    "view my bookings",
    "get my bookings",
    "see my bookings",
    "display bookings",
    "display my bookings",
    "what are my bookings",
    "my appointments",
];
pub const GREETING_KEYWORDS: &[&str] = &[
    "hello",
    "hi",
    "hey",
    "greetings",
    "good morning",
    "good afternoon",
    "good evening",
];
pub const UPDATE_COMMANDS: &[&str] = &[
    "update booking",
    "change booking",
    "reschedule booking",
    "modify booking",
    "update appointment",
    "change appointment",
    "reschedule appointment",
    "modify appointment",
    "update my booking",
    "change my booking",
    "reschedule my booking",
    "modify my booking",
    "update my appointment",
    "change my appointment",
    "reschedule my appointment",
    "modify my appointment",
];

pub const CANCEL_TERMS: &[&str] = &["cancel", "nevermind", "never mind", "cancellation"];
pub const NEGATIVE_RESPONSES: &[&str] = &["no", "n", "nope", "nevermind", "never mind"];
pub const AFFIRMATIVE_RESPONSES: &[&str] = &["yes", "y", "sure", "ok", "okay", "yep", "yeah", "yea"];
pub const ANY_TECHNICIAN: &[&str] = &["any", "anyone", "anybody", "whoever", "no preference"];

pub const SPECIALTY_CHANGE_MARKERS: &[&str] =
    &["actually", "instead", "need", "want", "not a", "not an", "rather"];

pub const NON_OFFERED_SPECIALTIES: &[&str] = &[
    "chef", "doctor", "lawyer", "teacher", "driver", "mechanic", "cleaner",
];

pub fn specialty_names(specialty: Specialty) -> &'static [&'static str] {
    match specialty {
        Specialty::Plumber => &["plumber"],
        Specialty::Electrician => &["electrician"],
        Specialty::Welder => &["welder"],
        Specialty::Gardener => &["gardener"],
        Specialty::Carpenter => &["carpenter"],
        Specialty::Painter => &["painter"],
        Specialty::Hvac => &["hvac"],
        Specialty::GeneralRepairs => &["general repair", "general repairs", "handyman"],
    }
}

pub fn specialty_terms(specialty: Specialty) -> &'static [&'static str] {
    match specialty {
        Specialty::Plumber => &[
            "plumbing", "pipe", "leak", "toilet", "sink", "faucet", "drain", "water heater",
        ],
        Specialty::Electrician => &[
            "electrical", "wiring", "circuit", "power", "outlet", "light", "switch", "breaker",
        ],
        Specialty::Gardener => &[
            "garden", "lawn", "plant", "tree", "shrub", "mow", "trim", "landscape",
        ],
        Specialty::Carpenter => &[
            "wood", "cabinet", "furniture", "door", "window", "shelf", "deck", "floor", "carpentry",
        ],
        Specialty::Painter => &[
            "paint", "wall", "ceiling", "color", "stain", "varnish", "brush", "roller",
        ],
        Specialty::Welder => &[
            "weld", "metal", "steel", "iron", "fabricate", "solder", "forge",
        ],
        Specialty::Hvac => &[
            "heating", "cooling", "air conditioning", "ventilation", "ac", "furnace", "thermostat",
            "duct",
        ],
        Specialty::GeneralRepairs => &["repair", "fix", "maintenance", "broken"],
    }
}

pub fn fuzzy_matches(specialty: Specialty) -> &'static [&'static str] {
    match specialty {
        Specialty::Plumber => &["plumb", "plumr", "pluber", "plumer"],
        Specialty::Electrician => &["electr", "lectric", "lectri", "electrcian"],
        Specialty::Welder => &["weld", "weldr"],
        Specialty::Gardener => &["garden", "gardn", "gardner"],
        Specialty::Carpenter => &["carpent", "carpentr"],
        Specialty::Painter => &["paint", "paintr"],
        Specialty::Hvac => &["hvac", "heating", "cooling"],
        Specialty::GeneralRepairs => &[],
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

pub fn term_positions<'a>(text: &'a str, term: &'a str) -> impl Iterator<Item = usize> + 'a {
    text.match_indices(term).map(|(i, _)| i).filter(move |&i| {
        let before = text[..i].chars().next_back();
        let after = text[i + term.len()..].chars().next();
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    })
}

pub fn find_term(text: &str, term: &str) -> Option<usize> {
    term_positions(text, term).next()
}

pub fn contains_term(text: &str, term: &str) -> bool {
    find_term(text, term).is_some()
}

pub fn contains_any(text: &str, terms: &[&str]) -> bool {
    terms.iter().any(|t| contains_term(text, t))
}

pub fn has_digit(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
}

pub fn normalize(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_end_matches(['?', '!', '.', ','])
        .trim()
        .to_lowercase()
}

pub fn has_cancel_term(text: &str) -> bool {
    contains_any(text, CANCEL_TERMS)
}

pub fn is_affirmative(text: &str) -> bool {
    AFFIRMATIVE_RESPONSES.contains(&text)
        || AFFIRMATIVE_RESPONSES
            .iter()
            .any(|w| text.starts_with(&format!("{w} ")) || text.starts_with(&format!("{w},")))
}

pub fn is_negative(text: &str) -> bool {
    NEGATIVE_RESPONSES.contains(&text)
        || NEGATIVE_RESPONSES
            .iter()
            .any(|w| text.starts_with(&format!("{w} ")) || text.starts_with(&format!("{w},")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terms_respect_word_boundaries() {
        assert!(contains_term("hi there", "hi"));
        assert!(!contains_term("this is it", "hi"));
        assert!(!contains_term("what did you do", "id"));
        assert!(contains_term("my booking id?", "id"));
        assert!(!contains_term("actually", "ac"));
        assert!(contains_term("fix the ac please", "ac"));
    }

    #[test]
    fn test_multi_word_terms() {
        assert!(contains_term("could you list my bookings", "list my bookings"));
        assert_eq!(find_term("i need a plumber", "need a"), Some(2));
        assert!(!contains_term("i need an electrician", "need a"));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Show   MY bookings?! "), "show my bookings");
        assert_eq!(normalize("3 P.M."), "3 p.m");
    }

    #[test]
    fn test_yes_no() {
        assert!(is_affirmative("yes"));
        assert!(is_affirmative("yeah, sure"));
        assert!(!is_affirmative("yesterday"));
        assert!(is_negative("no thanks"));
        assert!(!is_negative("november 3"));
    }
}
