use crate::error::BirdError;
use crate::models::{AttributeValue, FieldLine, Route};
use crate::parser::blocks::{BlockAssembler, LogicalBlock, ReplyKind};
use crate::parser::check_daemon_error;
use ipnet::IpNet;
use itertools::Itertools;
use regex::Regex;
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::LazyLock;

/// Attribute namespace prefix of route detail lines.
const ATTRIBUTE_PREFIX: &str = "bgp.";

static ROUTE_SUMMARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?P<prefix>[0-9a-fA-F.:/]+)\s+)?(?:via\s+(?P<nexthop>\S+)\s+on\s+(?P<interface>\S+)|(?P<kind>\w+))?\s*\[(?P<source>\S+)\s+(?P<time>[^\]]+?)(?:\s+from\s+(?P<from>\S+))?\]",
    )
    .expect("valid route summary regex")
});

static VIA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^via\s+(?P<nexthop>\S+)\s+on\s+(?P<interface>\S+)").expect("valid via regex")
});

/// Parse the reply of any `show route ... all` command.
///
/// `8001 Network not in table` anywhere in the reply yields no routes.
pub fn parse_routes(reply: &str) -> Result<Vec<Route>, BirdError> {
    check_daemon_error(reply)?;

    let mut assembler = BlockAssembler::new(reply, ReplyKind::Routes);
    let blocks: Vec<LogicalBlock> = assembler.by_ref().collect();
    if assembler.network_not_in_table() {
        return Ok(vec![]);
    }

    blocks.iter().map(parse_route_block).collect()
}

fn parse_route_block(block: &LogicalBlock) -> Result<Route, BirdError> {
    let ParsedSummary {
        mut route,
        peer_from_summary,
    } = parse_route_summary(&block.summary.payload)?;

    // BIRD 2 prints the next hop on its own line below the summary
    if !peer_from_summary {
        if let Some(caps) = block
            .continuation
            .iter()
            .find_map(|line| VIA.captures(&line.payload))
        {
            route.peer = caps["nexthop"].to_string();
            route.interface = Some(caps["interface"].to_string());
        }
    }

    route.attributes = parse_route_detail(&block.detail);
    Ok(route)
}

struct ParsedSummary {
    route: Route,
    /// Whether `peer` came from a `via` or `from` clause rather than the source protocol.
    peer_from_summary: bool,
}

fn parse_route_summary(line: &str) -> Result<ParsedSummary, BirdError> {
    let caps = ROUTE_SUMMARY
        .captures(line)
        .ok_or_else(|| BirdError::parse("route summary", line))?;

    let prefix = match caps.name("prefix") {
        Some(m) => Some(IpNet::from_str(m.as_str()).map_err(|_| BirdError::parse("route prefix", line))?),
        None => None,
    };

    let source = caps["source"].to_string();
    let explicit_peer = caps
        .name("nexthop")
        .or_else(|| caps.name("from"))
        .map(|m| m.as_str().to_string());

    Ok(ParsedSummary {
        peer_from_summary: explicit_peer.is_some(),
        route: Route {
            prefix,
            peer: explicit_peer.unwrap_or_else(|| source.clone()),
            interface: caps.name("interface").map(|m| m.as_str().to_string()),
            route_type: caps.name("kind").map(|m| m.as_str().to_string()),
            source,
            time: caps["time"].to_string(),
            attributes: BTreeMap::new(),
        },
    })
}

/// Turn `BGP.key: value` lines into attributes. A line without a value is a flag.
pub fn parse_route_detail(lines: &[FieldLine]) -> BTreeMap<String, AttributeValue> {
    let mut attributes = BTreeMap::new();
    for line in lines {
        let text = line.payload.trim();
        let rest = match text.to_ascii_lowercase().find(ATTRIBUTE_PREFIX) {
            Some(pos) => &text[pos + ATTRIBUTE_PREFIX.len()..],
            None => text,
        };

        match rest.split_once(": ") {
            Some((key, value)) => {
                let key = key.trim();
                let value = if key == "community" {
                    normalize_communities(value)
                } else {
                    value.trim().to_string()
                };
                attributes.insert(key.to_string(), AttributeValue::Text(value));
            }
            None => {
                let key = rest.trim().trim_end_matches(':');
                attributes.insert(key.to_string(), AttributeValue::Flag(true));
            }
        }
    }
    attributes
}

/// `(8954,220) (8954,620)` → `8954:220 8954:620`
fn normalize_communities(value: &str) -> String {
    value
        .split_whitespace()
        .map(|community| {
            community
                .trim_matches(|c| c == '(' || c == ')')
                .replace(',', ":")
        })
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_summary_via() {
        let summary = parse_route_summary(
            "2a02:898::/32      via 2001:7f8:1::a500:8954:1 on eth1 [PS2 12:46] * (100) [AS8283i]",
        )
        .unwrap();
        let route = summary.route;
        assert_eq!(route.prefix, Some("2a02:898::/32".parse().unwrap()));
        assert_eq!(route.peer, "2001:7f8:1::a500:8954:1");
        assert_eq!(route.interface.as_deref(), Some("eth1"));
        assert_eq!(route.source, "PS2");
        assert_eq!(route.time, "12:46");
        assert_eq!(route.route_type, None);
    }

    #[test]
    fn test_route_summary_from() {
        let route = parse_route_summary(
            "1.2.0.0/16         unreachable [PS1 2012-01-03 from 192.0.2.7] * (100) [AS8283i]",
        )
        .unwrap()
        .route;
        assert_eq!(route.peer, "192.0.2.7");
        assert_eq!(route.interface, None);
        assert_eq!(route.route_type.as_deref(), Some("unreachable"));
        assert_eq!(route.time, "2012-01-03");
    }

    #[test]
    fn test_route_summary_source_only() {
        let route = parse_route_summary("10.0.0.0/8 [PEERNAME 12:46]").unwrap().route;
        assert_eq!(route.peer, "PEERNAME");
        assert_eq!(route.source, "PEERNAME");
        assert_eq!(route.interface, None);

        let route = parse_route_summary("[PEERNAME Jun13]").unwrap().route;
        assert_eq!(route.prefix, None);
        assert_eq!(route.peer, "PEERNAME");
    }

    #[test]
    fn test_route_summary_full_time() {
        let route = parse_route_summary(
            "10.0.0.0/24          unicast [bgp1 2019-12-10 10:12:19 from 192.0.2.1] * (100) [AS65001i]",
        )
        .unwrap()
        .route;
        assert_eq!(route.time, "2019-12-10 10:12:19");
        assert_eq!(route.peer, "192.0.2.1");
        assert_eq!(route.route_type.as_deref(), Some("unicast"));
    }

    #[test]
    fn test_route_summary_errors() {
        assert!(matches!(
            parse_route_summary("10.0.0.0/24 via 192.0.2.1 on eth0"),
            Err(BirdError::Parse { .. })
        ));
        assert!(matches!(
            parse_route_summary("10.0.0/99 [PS1 12:46]"),
            Err(BirdError::Parse {
                context: "route prefix",
                ..
            })
        ));
    }

    #[test]
    fn test_route_detail() {
        let lines: Vec<FieldLine> = [
            "1012-   BGP.origin: IGP",
            "    BGP.as_path: 8954 8283",
            "    BGP.next_hop: 2001:7f8:1::a500:8954:1 fe80::21f:caff:fe16:e02",
            "    BGP.local_pref: 100",
            "    BGP.atomic_aggr:",
            "    BGP.community: (8954,220) (8954,620)",
        ]
        .iter()
        .map(|l| FieldLine::from_raw(l))
        .collect();

        let attributes = parse_route_detail(&lines);
        assert_eq!(attributes.len(), 6);
        assert_eq!(attributes["origin"], AttributeValue::from("IGP"));
        assert_eq!(attributes["as_path"], AttributeValue::from("8954 8283"));
        assert_eq!(attributes["local_pref"], AttributeValue::from("100"));
        assert_eq!(attributes["atomic_aggr"], AttributeValue::Flag(true));
        assert_eq!(
            attributes["community"],
            AttributeValue::from("8954:220 8954:620")
        );
    }

    #[test]
    fn test_parse_routes() {
        let reply = include_str!("../../tests/data/show_route_all_protocol_PS1.txt");
        let routes = parse_routes(reply).unwrap();
        assert_eq!(routes.len(), 3);

        let first = &routes[0];
        assert_eq!(first.prefix, Some("2a02:898::/32".parse().unwrap()));
        assert_eq!(first.source, "PS1");
        assert_eq!(first.attribute("as_path").and_then(|v| v.as_str()), Some("8954 8283"));
        assert_eq!(
            first.attribute("community").and_then(|v| v.as_str()),
            Some("8954:620")
        );
    }

    #[test]
    fn test_parse_routes_without_prefix_or_detail() {
        let reply = "0001 BIRD 1.6.3 ready.
1007-193.0.0.0/21       via 193.17.192.135 on eth0 [HIVANE 2017-01-11] * (100) [AS3333i]
1008-   Type: BGP unicast univ
1012-   BGP.origin: IGP
        BGP.as_path: 47583 3333
1007-                   unreachable [HIVANE 2017-01-11 from 193.17.192.135] (100/-) [AS47583i]
1008-   Type: BGP unicast univ
1012-   BGP.origin: IGP
        BGP.as_path: 47583
1007-10.255.30.0/24     blackhole [static1 2017-01-14] * (200)
1007-                   via 206.41.110.21 on bond0.895 [transit_as53264_nchc 2016-11-22] (100) [AS29713i]
1008-   Type: BGP unicast univ
1012-   BGP.origin: IGP
        BGP.as_path: 53264 29713
0000
";
        let routes = parse_routes(reply).unwrap();
        assert_eq!(routes.len(), 4);

        let unreachable = &routes[1];
        assert_eq!(unreachable.prefix, None);
        assert_eq!(unreachable.route_type.as_deref(), Some("unreachable"));
        assert_eq!(unreachable.peer, "193.17.192.135");
        assert_eq!(unreachable.source, "HIVANE");
        assert_eq!(
            unreachable.attribute("as_path").and_then(|v| v.as_str()),
            Some("47583")
        );

        let blackhole = &routes[2];
        assert_eq!(blackhole.prefix, Some("10.255.30.0/24".parse().unwrap()));
        assert_eq!(blackhole.route_type.as_deref(), Some("blackhole"));
        assert_eq!(blackhole.peer, "static1");
        assert_eq!(blackhole.time, "2017-01-14");
        assert!(blackhole.attributes.is_empty());

        let via = &routes[3];
        assert_eq!(via.prefix, None);
        assert_eq!(via.peer, "206.41.110.21");
        assert_eq!(via.interface.as_deref(), Some("bond0.895"));
        assert_eq!(via.source, "transit_as53264_nchc");
        assert_eq!(via.time, "2016-11-22");
        assert_eq!(via.attributes.len(), 2);
    }

    #[test]
    fn test_next_hop_on_continuation_line() {
        let reply = "1007-10.0.0.0/24          unicast [bgp1 2019-12-10] * (100) [AS65001i]
\tvia 192.0.2.1 on eth0
1008-\tType: BGP univ
1012-\tBGP.origin: IGP
\tBGP.as_path: 65001
0000
";
        let routes = parse_routes(reply).unwrap();
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].peer, "192.0.2.1");
        assert_eq!(routes[0].interface.as_deref(), Some("eth0"));
        assert_eq!(routes[0].source, "bgp1");
        assert_eq!(routes[0].attributes.len(), 2);
    }

    #[test]
    fn test_network_not_in_table() {
        let reply = "0001 BIRD 1.3.3 ready.
1007-2a02:898::/32      via 2001:7f8:1::a500:8954:1 on eth1 [PS2 12:46] * (100) [AS8283i]
1012-   BGP.origin: IGP
8001 Network not in table
";
        assert!(parse_routes(reply).unwrap().is_empty());
    }

    #[test]
    fn test_daemon_error() {
        let reply = "0001 BIRD 1.3.3 ready.\n9001 syntax error, unexpected CF_SYM_UNDEFINED\n";
        match parse_routes(reply) {
            Err(BirdError::Daemon { code, message }) => {
                assert_eq!(code, 9001);
                assert!(message.starts_with("syntax error"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
