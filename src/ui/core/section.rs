use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Bitcoin,
    Eth,
    Blackrock,
    Lido,
    BinancePolar,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Bitcoin,
        Section::Eth,
        Section::Blackrock,
        Section::Lido,
        Section::BinancePolar,
    ];

    /// Wire tag passed to the analytics process and used in export filenames.
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Bitcoin => "bitcoin",
            Section::Eth => "eth",
            Section::Blackrock => "blackrock",
            Section::Lido => "lido",
            Section::BinancePolar => "binance_polar",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Section::Bitcoin => "Bitcoin",
            Section::Eth => "Ethereum",
            Section::Blackrock => "BlackRock",
            Section::Lido => "Lido Staking",
            Section::BinancePolar => "Binance Polar",
        }
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(0)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSection(pub String);

impl fmt::Display for UnknownSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown section: {}", self.0)
    }
}

impl std::error::Error for UnknownSection {}

impl FromStr for Section {
    type Err = UnknownSection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|section| section.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| UnknownSection(s.to_string()))
    }
}
