use chrono::DateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Name {
    pub title: String,
    pub first: String,
    pub last: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dob {
    /// ISO-8601 timestamp as delivered by the API.
    pub date: String,
    pub age: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRecord {
    pub name: Name,
    pub dob: Dob,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl PersonRecord {
    pub fn age(&self) -> i64 {
        self.dob.age
    }

    /// "Mr. Louis Martin"
    pub fn display_name(&self) -> String {
        format!("{}. {} {}", self.name.title, self.name.first, self.name.last)
    }

    /// Birth date as `dd.mm.yyyy`; falls back to the raw string when it is not RFC 3339.
    pub fn formatted_birth_date(&self) -> String {
        match DateTime::parse_from_rfc3339(&self.dob.date) {
            Ok(date) => date.format("%d.%m.%Y").to_string(),
            Err(_) => self.dob.date.clone(),
        }
    }
}

/// One of the six fixed histogram bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeBand {
    Under30,
    Thirties,
    Forties,
    Fifties,
    Sixties,
    SeventyPlus,
}

impl AgeBand {
    pub const ALL: [AgeBand; 6] = [
        AgeBand::Under30,
        AgeBand::Thirties,
        AgeBand::Forties,
        AgeBand::Fifties,
        AgeBand::Sixties,
        AgeBand::SeventyPlus,
    ];

    /// Band for a non-negative age.
    pub fn for_age(age: u64) -> Self {
        match age {
            0..=29 => AgeBand::Under30,
            30..=39 => AgeBand::Thirties,
            40..=49 => AgeBand::Forties,
            50..=59 => AgeBand::Fifties,
            60..=69 => AgeBand::Sixties,
            _ => AgeBand::SeventyPlus,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            AgeBand::Under30 => "<30",
            AgeBand::Thirties => "30-39",
            AgeBand::Forties => "40-49",
            AgeBand::Fifties => "50-59",
            AgeBand::Sixties => "60-69",
            AgeBand::SeventyPlus => "70+",
        }
    }
}

/// Record counts per [`AgeBand`], always in band order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeHistogram {
    counts: [u64; 6],
}

impl AgeHistogram {
    pub(crate) fn record(&mut self, band: AgeBand) {
        self.counts[band.index()] += 1;
    }

    pub fn counts(&self) -> [u64; 6] {
        self.counts
    }

    pub fn count(&self, band: AgeBand) -> u64 {
        self.counts[band.index()]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// `(label, count)` pairs for a chart.
    pub fn labelled(&self) -> impl Iterator<Item = (&'static str, u64)> + '_ {
        AgeBand::ALL
            .into_iter()
            .map(move |band| (band.label(), self.count(band)))
    }
}

/// Everything one run hands to the load step.
#[derive(Debug, Clone, Serialize)]
pub struct AgeReport {
    pub record_count: usize,
    pub histogram: AgeHistogram,
    pub oldest: Vec<PersonRecord>,
    pub histogram_csv: String,
    pub oldest_csv: String,
}
