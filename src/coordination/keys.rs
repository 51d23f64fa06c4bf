//! Shared-store namespace.

use chrono::{DateTime, SecondsFormat, Utc};

/// Keys and channel for one application identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreKeys {
    /// Pub/sub channel carrying switch messages.
    pub channel: String,
    /// Last applied switch message. Same name as the channel.
    pub state: String,
    /// Instant of the last automatic switch, RFC 3339.
    pub last_switch: String,
}

impl StoreKeys {
    pub fn for_app(identity: &str) -> Self {
        let channel = format!("{identity}:smartlog:level_change_channel");
        Self {
            state: channel.clone(),
            channel,
            last_switch: format!("{identity}:smartlog:last_switch_timestamp"),
        }
    }
}

pub fn format_instant(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|at| at.with_timezone(&Utc))
}
