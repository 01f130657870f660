use bgpkit_birdc::parser::{parse_peers, parse_routes};
use chrono::NaiveDate;
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

const PEERS_PER_REPLY: usize = 500;
const ROUTES_PER_REPLY: usize = 10_000;

/// A `show protocols all` reply listing `count` established BGP sessions.
fn peers_reply(count: usize) -> String {
    let mut reply = String::from(
        "0001 BIRD 1.6.3 ready.\n2002-name     proto    table    state  since       info\n",
    );
    for i in 0..count {
        reply.push_str(&format!(
            "1002-PS{i}      BGP      T_PS{i}    up     14:20       Established
1006-  Description:    Peering AS{asn}
  Preference:     100
  Input filter:   ACCEPT
  Output filter:  ACCEPT
  Routes:         24 imported, 23 exported, 0 preferred
  Route change stats:     received   rejected   filtered    ignored   accepted
    Import updates:             12          0          0          0         12
    Import withdraws:            3          0        ---          0          3
    Export updates:             12         12          0        ---          0
    Export withdraws:            3        ---        ---        ---          0
  BGP state:          Established
    Neighbor AS:      {asn}
    Neighbor ID:      85.184.4.5
    Neighbor address: 2001:7f8:1::a500:8954:1

",
            i = i,
            asn = 64512 + i
        ));
    }
    reply.push_str("0000 \n");
    reply
}

/// A `show route all` reply with `count` IPv4 routes.
fn routes_reply(count: usize) -> String {
    let mut reply = String::from("0001 BIRD 1.6.3 ready.\n");
    for i in 0..count {
        reply.push_str(&format!(
            "1007-10.{}.{}.0/24      via 192.0.2.1 on eth1 [PS1 12:46] * (100) [AS8283i]
1008-   Type: BGP unicast univ
1012-   BGP.origin: IGP
        BGP.as_path: 8954 8283
        BGP.next_hop: 192.0.2.1
        BGP.local_pref: 100
        BGP.community: (8954,220) (8954,620)
",
            i / 256 % 256,
            i % 256
        ));
    }
    reply.push_str("0000 \n");
    reply
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let now = NaiveDate::from_ymd_opt(2019, 12, 10)
        .unwrap()
        .and_hms_opt(10, 12, 19)
        .unwrap();
    let peers = peers_reply(PEERS_PER_REPLY);
    let routes = routes_reply(ROUTES_PER_REPLY);

    c.bench_function("show protocols all", |b| {
        b.iter_with_large_drop(|| parse_peers(black_box(&peers), now).unwrap())
    });

    c.bench_function("show route all", |b| {
        b.iter_with_large_drop(|| parse_routes(black_box(&routes)).unwrap())
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default();
    targets = criterion_benchmark
}
criterion_main!(benches);
