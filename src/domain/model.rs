use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// One row of the player dataset.
///
/// Only `age` takes part in the histogram; the remaining columns are kept so
/// that loaded records stay recognizable in logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    #[serde(rename = "ID", default)]
    pub id: Option<u64>,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Age")]
    pub age: i64,
    #[serde(rename = "Nationality", default)]
    pub nationality: String,
    #[serde(rename = "Club", default)]
    pub club: String,
    #[serde(rename = "Overall", default)]
    pub overall: Option<i64>,
    #[serde(rename = "Potential", default)]
    pub potential: Option<i64>,
}

impl Player {
    pub fn with_age(age: i64) -> Self {
        Self {
            id: None,
            name: String::new(),
            age,
            nationality: String::new(),
            club: String::new(),
            overall: None,
            potential: None,
        }
    }
}

/// Mapper output: one per player, count is always 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntermediateSignal {
    pub age: i64,
    pub count: u64,
}

/// Classifier output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategorizedSignal {
    pub category: AgeCategory,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgeCategory {
    Under20,
    Under30,
    Under40,
    Retired,
}

impl AgeCategory {
    pub const ALL: [AgeCategory; 4] = [
        AgeCategory::Under20,
        AgeCategory::Under30,
        AgeCategory::Under40,
        AgeCategory::Retired,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AgeCategory::Under20 => "Under 20-years old",
            AgeCategory::Under30 => "Under 30-years old",
            AgeCategory::Under40 => "Under 40-years old",
            AgeCategory::Retired => "Should retire",
        }
    }
}

impl fmt::Display for AgeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Final per-category player counts.
///
/// Categories that never received a signal have no entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgeHistogram {
    counts: HashMap<AgeCategory, u64>,
}

impl AgeHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accumulate(&mut self, category: AgeCategory, count: u64) {
        *self.counts.entry(category).or_insert(0) += count;
    }

    pub fn get(&self, category: AgeCategory) -> Option<u64> {
        self.counts.get(&category).copied()
    }

    /// Count for `category`, zero when absent.
    pub fn count(&self, category: AgeCategory) -> u64 {
        self.get(category).unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AgeCategory, u64)> + '_ {
        self.counts.iter().map(|(category, count)| (*category, *count))
    }
}

impl FromIterator<(AgeCategory, u64)> for AgeHistogram {
    fn from_iter<I: IntoIterator<Item = (AgeCategory, u64)>>(iter: I) -> Self {
        let mut histogram = AgeHistogram::new();
        for (category, count) in iter {
            histogram.accumulate(category, count);
        }
        histogram
    }
}

/// How the final histogram is presented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}
