//! Switch message codec.
//!
//! Wire form: `"{Severity}:{ChangeOrigin}:{dd/MM/yyyy HH:mm:ss}"`, timestamp in UTC
//! without offset. The same string is published on the channel and stored under
//! the state key, so both paths go through [`SwitchMessage::encode`] and
//! [`SwitchMessage::decode`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use thiserror::Error;

use crate::level::severity::ParseLevelError;
use crate::level::{ChangeOrigin, Severity};

/// Fixed-width expiration format.
pub const EXPIRATION_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Errors that can occur while decoding a switch message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    #[error("empty switch message")]
    Empty,

    #[error("expected 3 fields separated by ':', found {0}")]
    FieldCount(usize),

    #[error(transparent)]
    Level(#[from] ParseLevelError),

    #[error("invalid expiration timestamp '{0}'")]
    Timestamp(String),
}

/// A requested level change: what, who asked, and until when it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchMessage {
    pub severity: Severity,
    pub origin: ChangeOrigin,
    /// Second precision; anything finer is dropped by the wire format.
    pub expires_at: DateTime<Utc>,
}

impl SwitchMessage {
    /// Build a message expiring `duration_minutes` from now.
    pub fn new(severity: Severity, origin: ChangeOrigin, duration_minutes: u32) -> Self {
        Self::expiring_after(severity, origin, duration_minutes, Utc::now())
    }

    pub fn expiring_after(
        severity: Severity,
        origin: ChangeOrigin,
        duration_minutes: u32,
        now: DateTime<Utc>,
    ) -> Self {
        let expires_at = TimeDelta::try_minutes(i64::from(duration_minutes))
            .and_then(|delta| now.checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            severity,
            origin,
            expires_at,
        }
    }

    /// True once `now` has reached the expiration instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn encode(&self) -> String {
        format!(
            "{}:{}:{}",
            self.severity,
            self.origin,
            self.expires_at.format(EXPIRATION_FORMAT)
        )
    }

    pub fn decode(raw: &str) -> Result<Self, MessageError> {
        if raw.is_empty() {
            return Err(MessageError::Empty);
        }

        let parts: Vec<&str> = raw.splitn(3, ':').collect();
        let [severity, origin, expiration] = parts[..] else {
            return Err(MessageError::FieldCount(parts.len()));
        };

        let severity: Severity = severity.parse()?;
        let origin: ChangeOrigin = origin.parse()?;

        let expires_at = NaiveDateTime::parse_from_str(expiration.trim(), EXPIRATION_FORMAT)
            .map_err(|_| MessageError::Timestamp(expiration.to_string()))?
            .and_utc();

        Ok(Self {
            severity,
            origin,
            expires_at,
        })
    }
}

impl fmt::Display for SwitchMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for SwitchMessage {
    type Err = MessageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_encode_uses_fixed_width_timestamp() {
        let now = Utc.with_ymd_and_hms(2024, 1, 5, 9, 3, 7).unwrap();
        let msg = SwitchMessage::expiring_after(Severity::Debug, ChangeOrigin::Manual, 30, now);
        assert_eq!(msg.encode(), "Debug:Manual:05/01/2024 09:33:07");
    }

    #[test]
    fn test_round_trip_recovers_fields() {
        let before = Utc::now();
        let msg = SwitchMessage::new(Severity::Error, ChangeOrigin::Automatic, 10);
        let decoded = SwitchMessage::decode(&msg.encode()).unwrap();

        assert_eq!(decoded.severity, Severity::Error);
        assert_eq!(decoded.origin, ChangeOrigin::Automatic);

        let expected = before + TimeDelta::minutes(10);
        let drift = (decoded.expires_at - expected).num_seconds().abs();
        assert!(drift <= 2, "expiration drifted by {drift}s");
    }

    #[test]
    fn test_decode_is_lenient_on_case_and_whitespace() {
        let msg = SwitchMessage::decode("warning:MANUAL:  01/01/2024 10:00:00 ").unwrap();
        assert_eq!(msg.severity, Severity::Warning);
        assert_eq!(msg.origin, ChangeOrigin::Manual);
        assert_eq!(msg.expires_at, Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_decode_rejects_malformed_input() {
        assert_eq!(SwitchMessage::decode(""), Err(MessageError::Empty));
        assert_eq!(
            SwitchMessage::decode("InvalidMessage"),
            Err(MessageError::FieldCount(1))
        );
        assert!(matches!(
            SwitchMessage::decode(":Manual:01/01/2024 10:00:00"),
            Err(MessageError::Level(_))
        ));
        assert!(matches!(
            SwitchMessage::decode("Warning:Unknown:01/01/2024 10:00:00"),
            Err(MessageError::Level(ParseLevelError::Origin(_)))
        ));
        assert!(matches!(
            SwitchMessage::decode("Warning:Manual:invalid-date"),
            Err(MessageError::Timestamp(_))
        ));
    }

    #[test]
    fn test_expiration_is_inclusive() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let msg = SwitchMessage::expiring_after(Severity::Debug, ChangeOrigin::Manual, 5, now);
        assert!(!msg.is_expired_at(now));
        assert!(msg.is_expired_at(now + TimeDelta::minutes(5)));
    }
}
