use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Language used for AI prompt wording.
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Id,
}

impl Locale {
    pub fn from_code(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" | "en-gb" => Some(Locale::En),
            "id" | "id-id" => Some(Locale::Id),
            _ => None,
        }
    }
}

impl Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            Locale::En => "en",
            Locale::Id => "id",
        };
        write!(f, "{}", code)
    }
}
