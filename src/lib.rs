/*!
`bgpkit-birdc` is a client for the control socket of the [BIRD](https://bird.network.cz/)
routing daemon. It sends the same commands `birdc` does and parses the text replies into typed
records: daemon status, BGP sessions with their route counters, and routes with their BGP
attributes.

## Examples

### Query a local daemon

```no_run
use bgpkit_birdc::BirdClientBuilder;

let mut client = BirdClientBuilder::new("/var/run/bird/bird.ctl").build();

let status = client.status().unwrap();
println!("BIRD {:?}, router id {}", status.version, status.router_id);

for peer in client.peers().unwrap() {
    println!("{} {:?} since {}", peer.name, peer.state, peer.last_change);
}

for route in client.peer_prefixes_rejected("PS1").unwrap() {
    println!("rejected {:?} via {}", route.prefix, route.peer);
}
```

### Query over SSH

```no_run
use bgpkit_birdc::BirdClientBuilder;

let mut client = BirdClientBuilder::new("/var/run/bird/bird.ctl")
    .remote("rs1.example.net", Some("bird".to_string()))
    .config_file("/etc/bird/bird.conf")
    .build();
let config = client.get_config().unwrap();
client.put_config(&config).unwrap();
client.configure(false).unwrap();
```

### Parse a captured reply

The parsers work on plain text and do not need a daemon:

```
use bgpkit_birdc::parser::parse_routes;

let reply = "0001 BIRD 1.6.3 ready.
1007-2a02:898::/32      via 2001:7f8:1::a500:8954:1 on eth1 [PS2 12:46] * (100) [AS8283i]
1008-   Type: BGP unicast univ
1012-   BGP.origin: IGP
    BGP.community: (8954,220) (8954,620)
0000
";
let routes = parse_routes(reply).unwrap();
assert_eq!(routes[0].peer, "2001:7f8:1::a500:8954:1");
assert_eq!(routes[0].attribute("community").unwrap().as_str(), Some("8954:220 8954:620"));
```

## Features

- `serde`: `Serialize`/`Deserialize` for all records
- `cli`: the `bgpkit-birdc` command line tool
*/

#[cfg(unix)]
pub mod client;
pub mod error;
pub mod models;
pub mod parser;

#[cfg(unix)]
pub use client::{BirdClient, BirdClientBuilder, Transport};
pub use error::BirdError;
pub use models::*;
