use chrono::NaiveDateTime;

/// Daemon status as reported by `show status`.
///
/// ```text
/// 1000-BIRD 1.4.5
/// 1011-Router ID is 195.69.146.34
///  Current server time is 2012-01-10 10:24:37
///  Last reboot on 2012-01-03 12:46:40
///  Last reconfiguration on 2012-01-03 12:46:40
/// 0013 Daemon is up and running
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BirdStatus {
    pub version: Option<String>,
    pub router_id: String,
    /// Only printed by BIRD 2.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none", default))]
    pub hostname: Option<String>,
    pub last_reboot: NaiveDateTime,
    pub last_reconfiguration: NaiveDateTime,
}
