use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Serialization of group documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContentFormat {
    #[default]
    Xml,
    Json,
}

impl ContentFormat {
    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ContentFormat::Xml => "xml",
            ContentFormat::Json => "json",
        }
    }
}

impl FromStr for ContentFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "xml" => Ok(ContentFormat::Xml),
            "json" => Ok(ContentFormat::Json),
            _ => Err(Error::UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for ContentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
