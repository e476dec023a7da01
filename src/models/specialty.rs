use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Specialty {
    Plumber,
    Electrician,
    Welder,
    Gardener,
    Carpenter,
    Painter,
    #[serde(rename = "HVAC")]
    Hvac,
    #[serde(rename = "General Repairs")]
    GeneralRepairs,
}

impl Specialty {
    pub const OFFERED: [Specialty; 8] = [
        Specialty::Plumber,
        Specialty::Electrician,
        Specialty::Welder,
        Specialty::Gardener,
        Specialty::Carpenter,
        Specialty::Painter,
        Specialty::Hvac,
        Specialty::GeneralRepairs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Specialty::Plumber => "Plumber",
            Specialty::Electrician => "Electrician",
            Specialty::Welder => "Welder",
            Specialty::Gardener => "Gardener",
            Specialty::Carpenter => "Carpenter",
            Specialty::Painter => "Painter",
            Specialty::Hvac => "HVAC",
            Specialty::GeneralRepairs => "General Repairs",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::OFFERED
            .into_iter()
            .find(|sp| sp.as_str().eq_ignore_ascii_case(s))
    }

    pub fn technicians(&self) -> &'static [&'static str] {
        match self {
            Specialty::Plumber => &["Nicolas Woollett", "John Pipe", "Sarah Waters"],
            Specialty::Electrician => &["Franky Flay", "Emma Volt", "Michael Wire"],
            Specialty::Welder => &["Griselda Dickson", "Mark Steel", "Lisa Torch"],
            Specialty::Gardener => &["Peter Green", "Rose Bush", "Tom Lawn"],
            Specialty::Carpenter => &["Woody Oak", "Jane Hammer", "Sam Nail"],
            Specialty::Painter => &["Pablo Brush", "Frida Color", "Vincent Wall"],
            Specialty::Hvac => &["Cool Breeze", "Warm Current", "Air Flow"],
            Specialty::GeneralRepairs => &["Fix It Felix", "Handy Mandy", "Repair Randy"],
        }
    }

    pub fn article(&self) -> &'static str {
        if *self == Specialty::Hvac {
            return "an";
        }
        match self.as_str().chars().next() {
            Some(c) if "aeiouAEIOU".contains(c) => "an",
            _ => "a",
        }
    }
}

impl fmt::Display for Specialty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
