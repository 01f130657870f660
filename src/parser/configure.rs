use crate::error::BirdError;
use crate::models::{FieldLine, ReplyCode};
use crate::parser::check_daemon_error;

/// Outcome of an accepted `configure` or `configure check` command.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfigureReport {
    /// Path from `Reading configuration from <path>`, when BIRD printed it.
    pub config_file: Option<String>,
    /// Text of the line that decided the outcome, e.g. `Configuration OK`.
    pub message: String,
}

/// Parse the reply of `configure`, `configure soft` or `configure check`.
///
/// ```text
/// 0001 BIRD 1.4.5 ready.
/// 0002-Reading configuration from /etc/bird/bird.conf
/// 8002 /etc/bird/bird.conf, line 3: syntax error
/// ```
///
/// The first success or rejection line decides; a reply with neither is a parse error.
pub fn parse_configure(reply: &str) -> Result<ConfigureReport, BirdError> {
    check_daemon_error(reply)?;

    let mut config_file = None;
    for line in reply.lines().map(FieldLine::from_raw) {
        match line.reply_code() {
            Some(ReplyCode::ReadingConfiguration) => {
                config_file = line.payload.split(' ').nth(3).map(str::to_string);
            }
            Some(ReplyCode::NothingToDo | ReplyCode::InvalidValue) => {
                return Err(BirdError::ConfigurationRejected(line.payload));
            }
            Some(
                ReplyCode::Reconfigured
                | ReplyCode::ReconfigurationInProgress
                | ReplyCode::ReconfigurationConfirmed
                | ReplyCode::ConfigurationOk,
            ) => {
                return Ok(ConfigureReport {
                    config_file,
                    message: line.payload,
                });
            }
            _ => {}
        }
    }
    Err(BirdError::parse("configure reply", reply))
}
