//! User-facing search filters.
//!
//! The index covers a fixed set of publishers and publication years; both
//! selections default to everything.

use crate::error::SearchError;
use crate::vector_index::MetadataFilter;
use serde::{Deserialize, Serialize};

/// Publisher channels present in the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    #[serde(rename = "GSC")]
    Gsc,
    #[serde(rename = "SEMrush")]
    Semrush,
    #[serde(rename = "Ahrefs")]
    Ahrefs,
    #[serde(rename = "MOZ")]
    Moz,
}

impl Channel {
    pub const ALL: [Channel; 4] = [Channel::Gsc, Channel::Semrush, Channel::Ahrefs, Channel::Moz];

    /// Value stored in the index's `channel` metadata field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Gsc => "GSC",
            Channel::Semrush => "SEMrush",
            Channel::Ahrefs => "Ahrefs",
            Channel::Moz => "MOZ",
        }
    }
}

impl std::str::FromStr for Channel {
    type Err = SearchError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Channel::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SearchError::InvalidInput(format!("Unknown channel: {}", s)))
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Publication year covered by the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct PublishYear(u16);

impl PublishYear {
    pub const FIRST: u16 = 2014;
    pub const LAST: u16 = 2023;

    pub fn new(year: u16) -> Result<Self, SearchError> {
        if (Self::FIRST..=Self::LAST).contains(&year) {
            Ok(Self(year))
        } else {
            Err(SearchError::InvalidInput(format!(
                "Year {} outside {}-{}",
                year,
                Self::FIRST,
                Self::LAST
            )))
        }
    }

    pub fn all() -> Vec<PublishYear> {
        (Self::FIRST..=Self::LAST).map(PublishYear).collect()
    }

    pub fn value(&self) -> u16 {
        self.0
    }
}

impl TryFrom<u16> for PublishYear {
    type Error = SearchError;

    fn try_from(year: u16) -> Result<Self, Self::Error> {
        Self::new(year)
    }
}

impl From<PublishYear> for u16 {
    fn from(year: PublishYear) -> Self {
        year.0
    }
}

impl std::str::FromStr for PublishYear {
    type Err = SearchError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let year: u16 = s
            .trim()
            .parse()
            .map_err(|_| SearchError::InvalidInput(format!("Invalid year: {}", s)))?;
        Self::new(year)
    }
}

impl std::fmt::Display for PublishYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Channel and year selections for a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilter {
    pub channels: Vec<Channel>,
    pub years: Vec<PublishYear>,
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self {
            channels: Channel::ALL.to_vec(),
            years: PublishYear::all(),
        }
    }
}

impl SearchFilter {
    /// Build a filter from optional selections; `None` selects everything.
    pub fn from_selection(channels: Option<Vec<Channel>>, years: Option<Vec<PublishYear>>) -> Self {
        let defaults = Self::default();
        Self {
            channels: channels.unwrap_or(defaults.channels),
            years: years.unwrap_or(defaults.years),
        }
    }

    /// Index predicate on the `channel` and `publish` metadata fields.
    pub fn to_metadata_filter(&self) -> MetadataFilter {
        MetadataFilter::new()
            .include("channel", self.channels.iter().map(|c| c.as_str()))
            .include("publish", self.years.iter().map(|y| y.to_string()))
    }
}
