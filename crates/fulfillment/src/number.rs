//! Human-facing slip numbers: `PS` + `YYYYMMDD` + 3-digit daily sequence.

use core::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult};

const PREFIX: &str = "PS";
const DATE_LEN: usize = 8;
const SEQ_LEN: usize = 3;

/// Highest sequence number a single day can hand out.
pub const MAX_DAILY_SEQUENCE: u32 = 999;

/// A validated slip number such as `PS20261017001`.
///
/// Ordering is lexicographic, which for well-formed numbers is the same as
/// ordering by (date, sequence).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlipNumber(String);

impl SlipNumber {
    pub fn new(date: NaiveDate, sequence: u32) -> DomainResult<Self> {
        if sequence == 0 || sequence > MAX_DAILY_SEQUENCE {
            return Err(DomainError::conflict(format!(
                "slip sequence {sequence} out of range 1..={MAX_DAILY_SEQUENCE} for {date}"
            )));
        }
        Ok(Self(format!("{}{:03}", Self::date_prefix(date), sequence)))
    }

    /// First number of a day.
    pub fn first_of(date: NaiveDate) -> Self {
        Self(format!("{}001", Self::date_prefix(date)))
    }

    /// `PS` + `YYYYMMDD`; every number issued on `date` starts with this.
    pub fn date_prefix(date: NaiveDate) -> String {
        format!("{PREFIX}{}", date.format("%Y%m%d"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn date(&self) -> NaiveDate {
        // Validated on construction.
        NaiveDate::parse_from_str(&self.0[PREFIX.len()..PREFIX.len() + DATE_LEN], "%Y%m%d")
            .unwrap_or_default()
    }

    pub fn sequence(&self) -> u32 {
        self.0[PREFIX.len() + DATE_LEN..].parse().unwrap_or_default()
    }

    /// The number following this one on the same day.
    pub fn next(&self) -> DomainResult<Self> {
        Self::new(self.date(), self.sequence() + 1)
    }
}

impl FromStr for SlipNumber {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::invalid_id(format!("SlipNumber: {s:?}"));

        let rest = s.strip_prefix(PREFIX).ok_or_else(invalid)?;
        if rest.len() != DATE_LEN + SEQ_LEN || !rest.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let date = NaiveDate::parse_from_str(&rest[..DATE_LEN], "%Y%m%d").map_err(|_| invalid())?;
        let sequence: u32 = rest[DATE_LEN..].parse().map_err(|_| invalid())?;
        Self::new(date, sequence).map_err(|_| invalid())
    }
}

impl TryFrom<String> for SlipNumber {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SlipNumber> for String {
    fn from(value: SlipNumber) -> Self {
        value.0
    }
}

impl core::fmt::Display for SlipNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
