/*!
parser module turns raw BIRD control-protocol replies into typed records.

The pipeline is: [tokenizer] splits lines into field code and payload, [blocks] groups them
into summary/detail blocks, and the record parsers ([status], [peer], [route], [configure])
turn blocks into [crate::models] records. Timestamps go through [datetime].
*/
pub mod blocks;
pub mod configure;
pub mod datetime;
pub mod peer;
pub mod route;
pub mod status;
pub mod tokenizer;

pub use blocks::{BlockAssembler, LogicalBlock, ReplyKind};
pub use configure::{parse_configure, ConfigureReport};
pub use datetime::resolve_timestamp;
pub use peer::{parse_peers, parse_peers_of_protocol, DEFAULT_PROTOCOL};
pub use route::parse_routes;
pub use status::parse_status;
pub use tokenizer::{extract_field_code, tokenize_reply};

use crate::error::BirdError;
use crate::models::FieldLine;

/// Fail with [BirdError::Daemon] if the reply carries a daemon error code.
pub(crate) fn check_daemon_error(reply: &str) -> Result<(), BirdError> {
    let error = reply
        .lines()
        .map(FieldLine::from_raw)
        .find(|line| line.reply_code().is_some_and(|code| code.is_daemon_error()));

    match error {
        Some(FieldLine {
            code: Some(code),
            payload,
        }) => Err(BirdError::Daemon {
            code,
            message: payload,
        }),
        _ => Ok(()),
    }
}
