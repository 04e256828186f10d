//! Instrument stems.

use serde::{Deserialize, Serialize};

/// An isolated instrument/vocal track derived from a full song.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stem {
    Drums,
    Melody,
    Vocals,
    Bass,
}

impl Stem {
    /// Returns the canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stem::Drums => "drums",
            Stem::Melody => "melody",
            Stem::Vocals => "vocals",
            Stem::Bass => "bass",
        }
    }

    /// Returns all stems.
    pub fn all() -> &'static [Stem] {
        &[Stem::Drums, Stem::Melody, Stem::Vocals, Stem::Bass]
    }
}

impl std::fmt::Display for Stem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Stem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "drums" => Ok(Stem::Drums),
            "melody" => Ok(Stem::Melody),
            "vocals" => Ok(Stem::Vocals),
            "bass" => Ok(Stem::Bass),
            _ => Err(format!("unknown stem: {}", s)),
        }
    }
}

impl Default for Stem {
    fn default() -> Self {
        Stem::Melody
    }
}
