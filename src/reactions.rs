//! Reactions
//!
//! The six fixed emoji reactions a marketplace listing can collect, plus the
//! per-product counters derived from the contract's reactor lists.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors mapping between reactions and their contract-side encodings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReactionError {
    /// The contract-side category code is not one of the six known codes.
    #[error("unknown reaction code {0}")]
    UnknownCode(u8),

    /// The label does not name a known category.
    #[error("unknown reaction label {0:?}")]
    UnknownLabel(String),
}

/// A reaction category.
///
/// The contract stores reactions under numeric category codes 1–6; the codes
/// are part of its interface and must not change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reaction {
    /// Tasted great.
    Delicious,

    /// Indifferent.
    Whatever,

    /// Too sour.
    Sour,

    /// Triggered an allergy.
    Allergic,

    /// Overpriced.
    Expensive,

    /// Something seems off about the listing.
    Suspicious,
}

impl Reaction {
    /// All categories, in wire-code order.
    pub const ALL: [Reaction; 6] = [
        Reaction::Delicious,
        Reaction::Whatever,
        Reaction::Sour,
        Reaction::Allergic,
        Reaction::Expensive,
        Reaction::Suspicious,
    ];

    /// The contract-side category code.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Reaction::Delicious => 1,
            Reaction::Whatever => 2,
            Reaction::Sour => 3,
            Reaction::Allergic => 4,
            Reaction::Expensive => 5,
            Reaction::Suspicious => 6,
        }
    }

    /// The category for a contract-side code.
    ///
    /// # Errors
    ///
    /// Returns [`ReactionError::UnknownCode`] for codes outside 1–6.
    pub fn from_code(code: u8) -> Result<Self, ReactionError> {
        match code {
            1 => Ok(Reaction::Delicious),
            2 => Ok(Reaction::Whatever),
            3 => Ok(Reaction::Sour),
            4 => Ok(Reaction::Allergic),
            5 => Ok(Reaction::Expensive),
            6 => Ok(Reaction::Suspicious),
            other => Err(ReactionError::UnknownCode(other)),
        }
    }

    /// Lowercase label used in fixtures and notification copy.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Reaction::Delicious => "delicious",
            Reaction::Whatever => "whatever",
            Reaction::Sour => "sour",
            Reaction::Allergic => "allergic",
            Reaction::Expensive => "expensive",
            Reaction::Suspicious => "suspicious",
        }
    }

    /// The category for a lowercase label.
    ///
    /// # Errors
    ///
    /// Returns [`ReactionError::UnknownLabel`] if the label names no category.
    pub fn from_label(label: &str) -> Result<Self, ReactionError> {
        Reaction::ALL
            .into_iter()
            .find(|reaction| reaction.label() == label)
            .ok_or_else(|| ReactionError::UnknownLabel(label.to_owned()))
    }

    /// Emoji glyph shown beside the category's counter.
    #[must_use]
    pub const fn emoji(self) -> &'static str {
        match self {
            Reaction::Delicious => "\u{1f60b}",
            Reaction::Whatever => "\u{1f610}",
            Reaction::Sour => "\u{1f616}",
            Reaction::Allergic => "\u{1f922}",
            Reaction::Expensive => "\u{1f911}",
            Reaction::Suspicious => "\u{1f9d0}",
        }
    }
}

impl Display for Reaction {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.label())
    }
}

impl TryFrom<u8> for Reaction {
    type Error = ReactionError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Reaction::from_code(code)
    }
}

/// Per-category reaction counters for a single product.
///
/// Each counter is the length of the contract's reactor-address list for
/// that category; a category nobody has used counts as zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReactionCounts {
    delicious: u64,
    whatever: u64,
    sour: u64,
    allergic: u64,
    expensive: u64,
    suspicious: u64,
}

impl ReactionCounts {
    /// Counters with every category at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The counter for one category.
    #[must_use]
    pub const fn get(&self, reaction: Reaction) -> u64 {
        match reaction {
            Reaction::Delicious => self.delicious,
            Reaction::Whatever => self.whatever,
            Reaction::Sour => self.sour,
            Reaction::Allergic => self.allergic,
            Reaction::Expensive => self.expensive,
            Reaction::Suspicious => self.suspicious,
        }
    }

    /// Overwrite the counter for one category.
    pub const fn set(&mut self, reaction: Reaction, count: u64) {
        match reaction {
            Reaction::Delicious => self.delicious = count,
            Reaction::Whatever => self.whatever = count,
            Reaction::Sour => self.sour = count,
            Reaction::Allergic => self.allergic = count,
            Reaction::Expensive => self.expensive = count,
            Reaction::Suspicious => self.suspicious = count,
        }
    }

    /// Counters paired with their categories, in wire-code order.
    pub fn iter(&self) -> impl Iterator<Item = (Reaction, u64)> + '_ {
        Reaction::ALL
            .into_iter()
            .map(move |reaction| (reaction, self.get(reaction)))
    }

    /// Sum of all six counters.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.iter().map(|(_, count)| count).sum()
    }
}
