//! Severity and change-origin enumerations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Minimum severity a log event must meet to be processed.
///
/// Ordered from most to least verbose: `Verbose < Debug < ... < Fatal`.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Verbose = 0,
    Debug = 1,
    Information = 2,
    Warning = 3,
    Error = 4,
    Fatal = 5,
}

impl Severity {
    /// All severities, most verbose first.
    pub const ALL: [Severity; 6] = [
        Severity::Verbose,
        Severity::Debug,
        Severity::Information,
        Severity::Warning,
        Severity::Error,
        Severity::Fatal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Verbose => "Verbose",
            Severity::Debug => "Debug",
            Severity::Information => "Information",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
            Severity::Fatal => "Fatal",
        }
    }

    /// Names of every severity, in order. Used by the admin API.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(Severity::as_str).collect()
    }

    /// True if `self` lets through more events than `other`.
    pub fn is_more_verbose_than(&self, other: Severity) -> bool {
        *self < other
    }

    pub(crate) fn from_u8(val: u8) -> Self {
        match val {
            0 => Severity::Verbose,
            1 => Severity::Debug,
            2 => Severity::Information,
            3 => Severity::Warning,
            4 => Severity::Error,
            _ => Severity::Fatal,
        }
    }
}

impl From<tracing::Level> for Severity {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Severity::Verbose,
            tracing::Level::DEBUG => Severity::Debug,
            tracing::Level::INFO => Severity::Information,
            tracing::Level::WARN => Severity::Warning,
            // ERROR
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced when parsing level tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseLevelError {
    #[error("unsupported log level '{0}', allowed values: Verbose, Debug, Information, Warning, Error, Fatal")]
    Severity(String),

    #[error("unsupported change origin '{0}', allowed values: Manual, Automatic")]
    Origin(String),
}

impl FromStr for Severity {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Severity::ALL
            .iter()
            .copied()
            .find(|sev| sev.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| ParseLevelError::Severity(s.to_string()))
    }
}

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Who requested a level change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeOrigin {
    /// Operator override; outranks automatic changes until it expires.
    Manual,
    /// Produced by the detector.
    Automatic,
}

impl ChangeOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeOrigin::Manual => "Manual",
            ChangeOrigin::Automatic => "Automatic",
        }
    }
}

impl fmt::Display for ChangeOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeOrigin {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.eq_ignore_ascii_case("manual") {
            Ok(ChangeOrigin::Manual)
        } else if name.eq_ignore_ascii_case("automatic") {
            Ok(ChangeOrigin::Automatic)
        } else {
            Err(ParseLevelError::Origin(s.to_string()))
        }
    }
}
