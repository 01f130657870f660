use crate::error::BirdError;
use crate::models::{FieldLine, Peer, RouteChangeStats, StatsColumn, StatsRow};
use crate::parser::blocks::{BlockAssembler, ReplyKind};
use crate::parser::{check_daemon_error, resolve_timestamp};
use chrono::NaiveDateTime;
use log::warn;
use regex::Regex;
use std::sync::LazyLock;

/// Protocol type of the sessions this crate reports on.
pub const DEFAULT_PROTOCOL: &str = "BGP";

/// Placeholder BIRD prints for statistics that do not apply.
const PLACEHOLDER: &str = "---";

static ROUTES_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?P<imported>\d+) imported,(?: (?P<filtered>\d+) filtered,)? (?P<exported>\d+) exported(?:, (?P<preferred>\d+) preferred)?",
    )
    .expect("valid routes field regex")
});

/// Parse the reply of `show protocols all`, keeping BGP sessions only.
pub fn parse_peers(reply: &str, now: NaiveDateTime) -> Result<Vec<Peer>, BirdError> {
    parse_peers_of_protocol(reply, DEFAULT_PROTOCOL, now)
}

/// Parse the reply of `show protocols all`, keeping sessions of the given protocol type.
pub fn parse_peers_of_protocol(
    reply: &str,
    protocol: &str,
    now: NaiveDateTime,
) -> Result<Vec<Peer>, BirdError> {
    check_daemon_error(reply)?;

    BlockAssembler::new(reply, ReplyKind::Peers { protocol })
        .map(|block| {
            let mut peer = parse_peer_summary(&block.summary.payload, now)?;
            // detail[0] is the `1006` line itself and carries the first field
            parse_peer_detail(&block.detail, &mut peer)?;
            Ok(peer)
        })
        .collect()
}

/// Newer BIRD releases print the `since` column as `date time`, pushing the state one token
/// to the right. This is detected by the token looking like a clock time.
fn looks_like_time(token: &str) -> bool {
    token.contains(':')
}

/// Parse a protocol summary line like:
///
/// ```text
/// PS1      BGP      T_PS1    start  Jun13       Passive
/// bgp1     BGP      ---      up     2019-12-10 10:12:19  Established
/// ```
pub fn parse_peer_summary(line: &str, now: NaiveDateTime) -> Result<Peer, BirdError> {
    let elements: Vec<&str> = line.split_whitespace().collect();
    let [name, protocol, table, _, since, info @ ..] = elements.as_slice() else {
        return Err(BirdError::parse("peer summary", line));
    };

    let (state, last_change) = match info {
        [time, rest @ ..] if looks_like_time(time) => {
            let combined = format!("{} {}", since, time);
            let last_change = resolve_timestamp(&combined, now)
                .or_else(|_| resolve_timestamp(since, now))?;
            (rest.first().copied(), last_change)
        }
        [state, ..] => (Some(*state), resolve_timestamp(since, now)?),
        [] => (None, resolve_timestamp(since, now)?),
    };

    Ok(Peer {
        name: name.to_string(),
        protocol: protocol.to_string(),
        table: table.to_string(),
        state: state.map(str::to_string),
        up: state.is_some_and(|s| s.eq_ignore_ascii_case("established")),
        last_change,
        description: None,
        router_id: None,
        address: None,
        source_address: None,
        asn: None,
        bgp_state: None,
        preference: None,
        input_filter: None,
        output_filter: None,
        routes_imported: None,
        routes_filtered: None,
        routes_exported: None,
        routes_preferred: None,
        route_changes: RouteChangeStats::default(),
    })
}

/// Apply the `label: value` lines of a protocol detail block to `peer`.
///
/// ```text
/// Description:    Peering AS8954 - InTouch
/// Routes:         24 imported, 23 exported, 0 preferred
/// Route change stats:     received   rejected   filtered    ignored   accepted
///   Import updates:             12          0          0          0         12
///   Import withdraws:            3          0        ---          0          3
/// BGP state:          Established
///   Neighbor AS:      8954
///   Neighbor ID:      85.184.4.5
/// ```
///
/// Unknown labels are skipped.
pub fn parse_peer_detail(lines: &[FieldLine], peer: &mut Peer) -> Result<(), BirdError> {
    for line in lines {
        let Some((field, value)) = line.payload.split_once(':') else {
            continue;
        };
        let field = field.trim().to_lowercase();
        let value = value.trim();

        match field.as_str() {
            "routes" => parse_routes_field(value, peer),
            "description" => peer.description = Some(value.to_string()),
            "neighbor id" => peer.router_id = Some(value.to_string()),
            "neighbor address" => peer.address = Some(value.to_string()),
            "source address" => peer.source_address = Some(value.to_string()),
            "bgp state" => peer.bgp_state = Some(value.to_string()),
            "input filter" => peer.input_filter = Some(value.to_string()),
            "output filter" => peer.output_filter = Some(value.to_string()),
            "neighbor as" => match value.parse::<u32>() {
                Ok(asn) => peer.asn = Some(asn),
                Err(_) => warn!("peer {}: unable to parse neighbor AS {:?}", peer.name, value),
            },
            "preference" => peer.preference = value.parse().ok(),
            other => {
                if let Some(row) = StatsRow::from_label(other) {
                    parse_stats_row(row, value, &line.payload, &mut peer.route_changes)?;
                }
            }
        }
    }
    Ok(())
}

fn parse_routes_field(value: &str, peer: &mut Peer) {
    let Some(caps) = ROUTES_FIELD.captures(value) else {
        warn!("peer {}: unable to parse routes count {:?}", peer.name, value);
        return;
    };
    let count = |name: &str| caps.name(name).and_then(|m| m.as_str().parse::<u64>().ok());
    peer.routes_imported = count("imported");
    peer.routes_filtered = count("filtered");
    peer.routes_exported = count("exported");
    peer.routes_preferred = count("preferred");
}

/// One row of the route change statistics: five cells, `---` meaning not applicable.
fn parse_stats_row(
    row: StatsRow,
    value: &str,
    line: &str,
    stats: &mut RouteChangeStats,
) -> Result<(), BirdError> {
    let cells: Vec<&str> = value.split_whitespace().collect();
    if cells.len() != StatsColumn::ALL.len() {
        warn!("expected {} route change counters in {:?}", StatsColumn::ALL.len(), line);
        return Ok(());
    }

    let counters = stats.row_mut(row);
    for (column, cell) in StatsColumn::ALL.into_iter().zip(cells) {
        let value = match cell {
            PLACEHOLDER => None,
            n => Some(
                n.parse::<u64>()
                    .map_err(|_| BirdError::parse("route change stats", line))?,
            ),
        };
        counters.set(column, value);
    }
    Ok(())
}
