use crate::error::BirdError;
use crate::models::{BirdStatus, FieldLine, ReplyCode};
use crate::parser::blocks::{BlockAssembler, LogicalBlock, ReplyKind};
use crate::parser::{check_daemon_error, resolve_timestamp};
use chrono::NaiveDateTime;

/// Parse the reply of `show status`.
///
/// Timestamps are resolved against `now`; BIRD prints them in full here, so `now` only matters
/// for daemons configured with a short `timeformat`.
pub fn parse_status(reply: &str, now: NaiveDateTime) -> Result<BirdStatus, BirdError> {
    check_daemon_error(reply)?;

    let mut version = None;
    let mut router = None;

    for block in BlockAssembler::new(reply, ReplyKind::Status) {
        match block.summary.reply_code() {
            Some(ReplyCode::BirdVersion) => {
                version = block.summary.payload.split(' ').nth(1).map(str::to_string);
            }
            Some(ReplyCode::StatusRouterId) => router = Some(block),
            _ => {}
        }
    }

    let block = router.ok_or_else(|| BirdError::parse("status reply", reply))?;
    let (router_id, hostname, last_reboot, last_reconfiguration) = parse_router_block(&block, now)?;

    Ok(BirdStatus {
        version,
        router_id,
        hostname,
        last_reboot,
        last_reconfiguration,
    })
}

/// Value part of a status line: `Router ID is X`, `Last reboot on DATE TIME`.
fn status_value(line: &FieldLine) -> &str {
    line.payload.trim().splitn(4, ' ').last().unwrap_or_default()
}

type RouterStatus = (String, Option<String>, NaiveDateTime, NaiveDateTime);

fn parse_router_block(block: &LogicalBlock, now: NaiveDateTime) -> Result<RouterStatus, BirdError> {
    let router_id = status_value(&block.summary).to_string();
    let hostname = block
        .continuation
        .first()
        .and_then(|line| line.payload.strip_prefix("Hostname is"))
        .map(|h| h.trim().to_string());

    // [0] is the current server time
    let (Some(reboot), Some(reconfiguration)) = (block.detail.get(1), block.detail.get(2)) else {
        return Err(BirdError::parse(
            "status section",
            block.summary.payload.clone(),
        ));
    };

    Ok((
        router_id,
        hostname,
        resolve_timestamp(status_value(reboot), now)?,
        resolve_timestamp(status_value(reconfiguration), now)?,
    ))
}
