//! Canonical identifiers for seismic cubes and survey dates
//!
//! A cube file name follows the pattern
//! `process--attribute[_stack]_domain--date.ext`, where `date` is either a
//! single vintage (`YYYYMMDD`) or a monitor_base difference pair. These
//! types parse, render and compare such names so the rest of the crate
//! never handles raw file-name strings.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

const DATE_FORMAT: &str = "%Y%m%d";

/// Processing stage a cube originates from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Process {
    /// Observed or depth-converted field seismic
    Seismic,
    /// Synthetic seismic from forward modelling
    Syntseis,
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Process::Seismic => write!(f, "seismic"),
            Process::Syntseis => write!(f, "syntseis"),
        }
    }
}

impl FromStr for Process {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "seismic" => Ok(Process::Seismic),
            "syntseis" => Ok(Process::Syntseis),
            _ => Err(Error::InvalidName(s.to_string())),
        }
    }
}

/// Vertical domain of a cube
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Time,
    Depth,
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Time => write!(f, "time"),
            Domain::Depth => write!(f, "depth"),
        }
    }
}

impl FromStr for Domain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "time" => Ok(Domain::Time),
            "depth" => Ok(Domain::Depth),
            _ => Err(Error::InvalidName(s.to_string())),
        }
    }
}

/// Offset stack a cube was migrated from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stack {
    Full,
    Near,
    Mid,
    Far,
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stack::Full => write!(f, "full"),
            Stack::Near => write!(f, "near"),
            Stack::Mid => write!(f, "mid"),
            Stack::Far => write!(f, "far"),
        }
    }
}

impl FromStr for Stack {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "full" => Ok(Stack::Full),
            "near" => Ok(Stack::Near),
            "mid" => Ok(Stack::Mid),
            "far" => Ok(Stack::Far),
            _ => Err(Error::InvalidName(s.to_string())),
        }
    }
}

/// A survey date token: one vintage, or a monitor_base difference pair
///
/// Construction validates calendar correctness and normalizes a two-date
/// token so the most recent date (monitor) always comes first. Mutation is
/// by re-parsing, which re-validates.
///
/// # Examples
///
/// ```
/// use seisattr::identity::SeismicDate;
///
/// let date: SeismicDate = "20090101_20100101".parse().unwrap();
/// // Monitor (most recent) is normalized to the front
/// assert_eq!(date.to_string(), "20100101_20090101");
/// assert_eq!(date.monitor_date().as_deref(), Some("20100101"));
/// assert_eq!(date.base_date().as_deref(), Some("20090101"));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeismicDate {
    monitor: NaiveDate,
    base: Option<NaiveDate>,
}

impl SeismicDate {
    /// True for a monitor_base difference token
    pub fn is_difference(&self) -> bool {
        self.base.is_some()
    }

    /// The monitor (most recent) date, `None` for a single vintage
    pub fn monitor_date(&self) -> Option<String> {
        self.base
            .map(|_| self.monitor.format(DATE_FORMAT).to_string())
    }

    /// The base (oldest) date, `None` for a single vintage
    pub fn base_date(&self) -> Option<String> {
        self.base.map(|d| d.format(DATE_FORMAT).to_string())
    }
}

impl FromStr for SeismicDate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parse_part = |part: &str| -> Result<NaiveDate> {
            if part.len() != 8 || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(Error::InvalidDate {
                    date: s.to_string(),
                    reason: format!("'{part}' is not an 8-digit YYYYMMDD token"),
                });
            }
            NaiveDate::parse_from_str(part, DATE_FORMAT).map_err(|err| Error::InvalidDate {
                date: s.to_string(),
                reason: err.to_string(),
            })
        };

        match s.split_once('_') {
            None => Ok(SeismicDate {
                monitor: parse_part(s)?,
                base: None,
            }),
            Some((first, second)) => {
                let first = parse_part(first)?;
                let second = parse_part(second)?;
                // Most recent date first, regardless of input order
                let (monitor, base) = if first >= second {
                    (first, second)
                } else {
                    (second, first)
                };
                Ok(SeismicDate {
                    monitor,
                    base: Some(base),
                })
            }
        }
    }
}

impl fmt::Display for SeismicDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.monitor.format(DATE_FORMAT))?;
        if let Some(base) = self.base {
            write!(f, "_{}", base.format(DATE_FORMAT))?;
        }
        Ok(())
    }
}

impl Serialize for SeismicDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SeismicDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Composite identifier for a seismic cube
///
/// Equality and hashing cover process, attribute, domain, stack and date;
/// the file extension is excluded, so two names differing only in `ext`
/// compare equal.
///
/// # Examples
///
/// ```
/// use seisattr::identity::SeismicName;
///
/// let name = SeismicName::parse_name("seismic--relai_full_depth--20200101.segy").unwrap();
/// assert_eq!(name.to_string(), "seismic--relai_full_depth--20200101.segy");
/// assert!(name.compare_without_date("seismic--relai_full_depth--"));
/// ```
#[derive(Clone, Debug)]
pub struct SeismicName {
    pub process: Process,
    pub attribute: String,
    pub domain: Domain,
    pub stack: Option<Stack>,
    pub date: SeismicDate,
    pub ext: String,
}

impl SeismicName {
    pub fn new(
        process: Process,
        attribute: impl Into<String>,
        domain: Domain,
        stack: Option<Stack>,
        date: SeismicDate,
    ) -> Self {
        SeismicName {
            process,
            attribute: attribute.into(),
            domain,
            stack,
            date,
            ext: "segy".to_string(),
        }
    }

    pub fn with_ext(mut self, ext: impl Into<String>) -> Self {
        self.ext = ext.into();
        self
    }

    /// Parse a name serialized as `process--attribute[_stack]_domain--date.ext`
    pub fn parse_name(raw: &str) -> Result<Self> {
        let invalid = || Error::InvalidName(raw.to_string());

        let parts: Vec<&str> = raw.split("--").collect();
        if parts.len() != 3 {
            return Err(invalid());
        }
        let process: Process = parts[0].parse().map_err(|_| invalid())?;
        let (attribute, stack, domain) = parse_middle(parts[1]).ok_or_else(invalid)?;
        let (date, ext) = match parts[2].rsplit_once('.') {
            Some((date, ext)) if !ext.is_empty() => (date, ext),
            _ => return Err(invalid()),
        };
        let date: SeismicDate = date.parse().map_err(|_| invalid())?;

        Ok(SeismicName {
            process,
            attribute,
            domain,
            stack,
            date,
            ext: ext.to_string(),
        })
    }

    /// The `attribute[_stack]_domain` segment of the serialized name
    fn middle(&self) -> String {
        match self.stack {
            Some(stack) => format!("{}_{}_{}", self.attribute, stack, self.domain),
            None => format!("{}_{}", self.attribute, self.domain),
        }
    }

    /// Compare against a name or prefix string, ignoring the date segment
    ///
    /// Trailing `--` artifacts and a trailing date (with or without
    /// extension) are stripped from the candidate before comparing. A
    /// candidate that omits the process segment entirely is matched against
    /// the attribute/stack/domain segment alone; a present but different
    /// process segment does not match.
    pub fn compare_without_date(&self, candidate: &str) -> bool {
        let mut segments: Vec<&str> = candidate.split("--").collect();
        while segments.last().is_some_and(|s| s.is_empty()) {
            segments.pop();
        }
        if let Some(last) = segments.last() {
            let token = last.rsplit_once('.').map_or(*last, |(date, _ext)| date);
            if token.parse::<SeismicDate>().is_ok() {
                segments.pop();
            }
        }

        let middle = self.middle();
        match segments.as_slice() {
            [process, mid] => *process == self.process.to_string() && *mid == middle,
            [mid] => *mid == middle,
            _ => false,
        }
    }
}

fn parse_middle(middle: &str) -> Option<(String, Option<Stack>, Domain)> {
    let tokens: Vec<&str> = middle.split('_').collect();
    if tokens.len() < 2 {
        return None;
    }
    let domain: Domain = tokens[tokens.len() - 1].parse().ok()?;
    let (stack, attribute_tokens) = if tokens.len() >= 3 {
        match tokens[tokens.len() - 2].parse::<Stack>() {
            Ok(stack) => (Some(stack), &tokens[..tokens.len() - 2]),
            Err(_) => (None, &tokens[..tokens.len() - 1]),
        }
    } else {
        (None, &tokens[..tokens.len() - 1])
    };
    if attribute_tokens.iter().any(|t| t.is_empty()) {
        return None;
    }
    Some((attribute_tokens.join("_"), stack, domain))
}

impl fmt::Display for SeismicName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}--{}--{}.{}",
            self.process,
            self.middle(),
            self.date,
            self.ext
        )
    }
}

// Equality and hash exclude `ext`: all cube bookkeeping treats names
// differing only in file extension as the same cube.
impl PartialEq for SeismicName {
    fn eq(&self, other: &Self) -> bool {
        self.process == other.process
            && self.attribute == other.attribute
            && self.domain == other.domain
            && self.stack == other.stack
            && self.date == other.date
    }
}

impl Eq for SeismicName {}

impl std::hash::Hash for SeismicName {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.process.hash(state);
        self.attribute.hash(state);
        self.domain.hash(state);
        self.stack.hash(state);
        self.date.hash(state);
    }
}

impl Serialize for SeismicName {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SeismicName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        SeismicName::parse_name(&raw).map_err(serde::de::Error::custom)
    }
}
