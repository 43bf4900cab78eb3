use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Recognition language supported by the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    /// Kazakh (Kazakhstan)
    #[default]
    #[serde(rename = "kk-KZ")]
    Kazakh,
    /// Russian (Russia)
    #[serde(rename = "ru-RU")]
    Russian,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Kazakh, Language::Russian];

    /// BCP 47 tag handed to the recognition engine
    pub fn tag(&self) -> &'static str {
        match self {
            Language::Kazakh => "kk-KZ",
            Language::Russian => "ru-RU",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        // Accept bare language subtags as well ("kk", "ru")
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "kk-kz" | "kk" => Ok(Language::Kazakh),
            "ru-ru" | "ru" => Ok(Language::Russian),
            other => bail!("Unsupported recognition language: {}", other),
        }
    }
}
