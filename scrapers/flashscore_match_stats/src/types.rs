use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One anchor found inside a match block of a season's results listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonLink {
    pub season: String,
    pub href: String,
}

impl SeasonLink {
    pub fn new(season: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            season: season.into(),
            href: href.into(),
        }
    }
}

/// Home and away value of a single statistic row, as rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatLine {
    pub home: String,
    pub away: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    pub season: String,
    pub href: String,
    pub score_home: Option<String>,
    pub score_away: Option<String>,
    pub halftime_home: Option<String>,
    pub halftime_away: Option<String>,
    /// Keyed by normalized category name (spaces replaced by underscores).
    pub stats: BTreeMap<String, StatLine>,
}

impl MatchRecord {
    pub fn empty(link: &SeasonLink) -> Self {
        Self {
            season: link.season.clone(),
            href: link.href.clone(),
            score_home: None,
            score_away: None,
            halftime_home: None,
            halftime_away: None,
            stats: BTreeMap::new(),
        }
    }

    /// `(column, value)` pairs of the dynamic statistic columns.
    pub fn stat_columns(&self) -> impl Iterator<Item = (String, &str)> {
        self.stats.iter().flat_map(|(category, line)| {
            [
                (format!("{category}_home"), line.home.as_str()),
                (format!("{category}_away"), line.away.as_str()),
            ]
        })
    }
}

/// Three-way match result as stored in exported tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    HomeWin,
    Draw,
    AwayWin,
}

impl Outcome {
    /// Value written to the `outcome` column.
    pub fn label(self) -> i8 {
        match self {
            Outcome::HomeWin => -1,
            Outcome::Draw => 0,
            Outcome::AwayWin => 1,
        }
    }

    pub fn from_label(label: i8) -> Option<Self> {
        match label {
            -1 => Some(Outcome::HomeWin),
            0 => Some(Outcome::Draw),
            1 => Some(Outcome::AwayWin),
            _ => None,
        }
    }

    /// Class index used by the classifier.
    pub fn class_index(self) -> usize {
        match self {
            Outcome::HomeWin => 0,
            Outcome::Draw => 1,
            Outcome::AwayWin => 2,
        }
    }
}
