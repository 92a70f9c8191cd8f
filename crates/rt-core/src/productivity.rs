//! Productivity scores used in productivity and activity reports.

use std::fmt;

use serde::{Serialize, Serializer};

/// The five productivity levels, from -2 to 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProductivityLevel {
    VeryUnproductive,
    Unproductive,
    Neutral,
    Productive,
    VeryProductive,
}

impl ProductivityLevel {
    /// Every level, lowest score first.
    pub const ALL: [Self; 5] = [
        Self::VeryUnproductive,
        Self::Unproductive,
        Self::Neutral,
        Self::Productive,
        Self::VeryProductive,
    ];

    /// Score as it appears in the `productivity` report column.
    pub const fn score(&self) -> i8 {
        match self {
            Self::VeryUnproductive => -2,
            Self::Unproductive => -1,
            Self::Neutral => 0,
            Self::Productive => 1,
            Self::VeryProductive => 2,
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::VeryUnproductive => "Very Unproductive",
            Self::Unproductive => "Unproductive",
            Self::Neutral => "Neutral",
            Self::Productive => "Productive",
            Self::VeryProductive => "Very Productive",
        }
    }

    pub const fn from_score(score: i64) -> Option<Self> {
        match score {
            -2 => Some(Self::VeryUnproductive),
            -1 => Some(Self::Unproductive),
            0 => Some(Self::Neutral),
            1 => Some(Self::Productive),
            2 => Some(Self::VeryProductive),
            _ => None,
        }
    }
}

impl fmt::Display for ProductivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl Serialize for ProductivityLevel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i8(self.score())
    }
}
