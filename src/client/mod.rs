/*!
client module issues queries to a BIRD daemon and parses the replies.

```no_run
use bgpkit_birdc::BirdClientBuilder;

let mut client = BirdClientBuilder::new("/var/run/bird/bird.ctl").build();
for peer in client.peers().unwrap() {
    println!("{} up={} imported={:?}", peer.name, peer.up, peer.routes_imported);
}
```
*/
pub mod config_file;
pub mod transport;

pub use config_file::ConfigFile;
pub use transport::{
    BirdTransport, RemoteShellTransport, Transport, UnixSocketTransport, DEFAULT_BIRDC,
    DEFAULT_SOCKET,
};

use crate::error::BirdError;
use crate::models::{BirdStatus, Peer, Route};
use crate::parser::{
    parse_configure, parse_peers_of_protocol, parse_routes, parse_status, ConfigureReport,
    DEFAULT_PROTOCOL,
};
use chrono::{Local, NaiveDateTime};
use ipnet::IpNet;
use log::debug;
use regex::Regex;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\W+").expect("valid non-word regex"));

/// Drop everything but letters, digits and underscores from a name before it goes into a
/// command.
///
/// ```
/// use bgpkit_birdc::client::clean_input;
///
/// assert_eq!(clean_input("PS1\"; down"), "PS1down");
/// assert_eq!(clean_input("AS65000_v6"), "AS65000_v6");
/// ```
pub fn clean_input(input: &str) -> String {
    NON_WORD.replace_all(input, "").trim().to_string()
}

/// Builder for [BirdClient].
#[derive(Debug, Clone)]
pub struct BirdClientBuilder {
    socket_path: PathBuf,
    host: Option<String>,
    user: Option<String>,
    birdc: String,
    config_file: Option<PathBuf>,
    read_timeout: Option<Duration>,
    protocol: String,
    reference_time: Option<NaiveDateTime>,
}

impl BirdClientBuilder {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        BirdClientBuilder {
            socket_path: socket_path.into(),
            host: None,
            user: None,
            birdc: DEFAULT_BIRDC.to_string(),
            config_file: None,
            read_timeout: None,
            protocol: DEFAULT_PROTOCOL.to_string(),
            reference_time: None,
        }
    }

    /// Query a BIRD running on `host` through `ssh` and `birdc` instead of the local socket.
    pub fn remote(mut self, host: impl Into<String>, user: Option<String>) -> Self {
        self.host = Some(host.into());
        self.user = user;
        self
    }

    pub fn birdc(mut self, birdc: impl Into<String>) -> Self {
        self.birdc = birdc.into();
        self
    }

    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// Protocol type listed by [BirdClient::peers], `BGP` by default.
    pub fn protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }

    /// Resolve relative timestamps against a fixed instant instead of the local time of each
    /// query.
    pub fn reference_time(mut self, now: NaiveDateTime) -> Self {
        self.reference_time = Some(now);
        self
    }

    pub fn build(self) -> BirdClient<BirdTransport> {
        let transport = match &self.host {
            Some(host) => BirdTransport::Remote(
                RemoteShellTransport::new(host, self.user.as_deref(), &self.socket_path)
                    .with_birdc(&self.birdc),
            ),
            None => BirdTransport::Unix(
                UnixSocketTransport::new(&self.socket_path).with_read_timeout(self.read_timeout),
            ),
        };
        let config_file = self.config_file.as_ref().map(|path| match &self.host {
            Some(host) => ConfigFile::remote(path, host, self.user.as_deref()),
            None => ConfigFile::local(path),
        });

        BirdClient {
            transport,
            config_file,
            protocol: self.protocol,
            reference_time: self.reference_time,
        }
    }
}

/// Typed queries against one BIRD daemon.
///
/// Each method sends one command (two for [BirdClient::peer_prefixes_rejected]) and parses the
/// reply. "No protocols match" and "network not in table" come back as empty lists.
pub struct BirdClient<T: Transport> {
    transport: T,
    config_file: Option<ConfigFile>,
    protocol: String,
    reference_time: Option<NaiveDateTime>,
}

impl<T: Transport> BirdClient<T> {
    /// Client over any transport, e.g. a test double. See [BirdClientBuilder] for the usual way.
    pub fn new(transport: T) -> Self {
        BirdClient {
            transport,
            config_file: None,
            protocol: DEFAULT_PROTOCOL.to_string(),
            reference_time: None,
        }
    }

    pub fn with_config_file(mut self, config_file: ConfigFile) -> Self {
        self.config_file = Some(config_file);
        self
    }

    pub fn with_reference_time(mut self, now: NaiveDateTime) -> Self {
        self.reference_time = Some(now);
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn now(&self) -> NaiveDateTime {
        self.reference_time
            .unwrap_or_else(|| Local::now().naive_local())
    }

    fn query(&mut self, command: &str) -> Result<String, BirdError> {
        debug!("query {}", command);
        self.transport.send(command)
    }

    fn query_routes(&mut self, command: &str) -> Result<Vec<Route>, BirdError> {
        let reply = self.query(command)?;
        parse_routes(&reply)
    }

    /// `show status`
    pub fn status(&mut self) -> Result<BirdStatus, BirdError> {
        let reply = self.query("show status")?;
        parse_status(&reply, self.now())
    }

    /// All sessions of the configured protocol type.
    pub fn peers(&mut self) -> Result<Vec<Peer>, BirdError> {
        let reply = self.query("show protocols all")?;
        parse_peers_of_protocol(&reply, &self.protocol, self.now())
    }

    /// One session by name, `None` if BIRD does not know it.
    pub fn peer(&mut self, name: &str) -> Result<Option<Peer>, BirdError> {
        let name = clean_input(name);
        let reply = self.query(&format!("show protocols all \"{}\"", name))?;
        let mut peers = parse_peers_of_protocol(&reply, &self.protocol, self.now())?;
        match peers.len() {
            0 => Ok(None),
            1 => Ok(peers.pop()),
            count => Err(BirdError::MultiplePeers { name, count }),
        }
    }

    /// `show route all`, optionally limited to a prefix and/or a protocol.
    pub fn routes(
        &mut self,
        prefix: Option<IpNet>,
        peer: Option<&str>,
    ) -> Result<Vec<Route>, BirdError> {
        let mut command = String::from("show route all");
        if let Some(prefix) = prefix {
            command.push_str(&format!(" for {}", prefix));
        }
        if let Some(peer) = peer {
            command.push_str(&format!(" protocol {}", clean_input(peer)));
        }
        self.query_routes(&command)
    }

    /// Routes announced by a peer before import filtering, read from its `T_<peer>` table.
    pub fn peer_prefixes_announced(&mut self, peer: &str) -> Result<Vec<Route>, BirdError> {
        let peer = clean_input(peer);
        self.query_routes(&format!("show route table T_{} all protocol {}", peer, peer))
    }

    pub fn routes_received(&mut self, peer: &str) -> Result<Vec<Route>, BirdError> {
        self.peer_prefixes_announced(peer)
    }

    /// Routes announced by a peer that passed the import filter.
    pub fn peer_prefixes_accepted(&mut self, peer: &str) -> Result<Vec<Route>, BirdError> {
        let peer = clean_input(peer);
        self.query_routes(&format!("show route all protocol {}", peer))
    }

    /// Routes exported to a peer.
    pub fn peer_prefixes_exported(&mut self, peer: &str) -> Result<Vec<Route>, BirdError> {
        let peer = clean_input(peer);
        self.query_routes(&format!("show route all table T_{} export {}", peer, peer))
    }

    /// Announced routes whose prefix is missing from the accepted routes, in announcement
    /// order.
    pub fn peer_prefixes_rejected(&mut self, peer: &str) -> Result<Vec<Route>, BirdError> {
        let announced = self.peer_prefixes_announced(peer)?;
        let accepted: HashSet<Option<IpNet>> = self
            .peer_prefixes_accepted(peer)?
            .into_iter()
            .map(|route| route.prefix)
            .collect();

        Ok(announced
            .into_iter()
            .filter(|route| !accepted.contains(&route.prefix))
            .collect())
    }

    /// `show route for <prefix> all`, optionally limited to one protocol.
    pub fn prefix_info(
        &mut self,
        prefix: IpNet,
        peer: Option<&str>,
    ) -> Result<Vec<Route>, BirdError> {
        let mut command = format!("show route for {} all", prefix);
        if let Some(peer) = peer {
            command.push_str(&format!(" protocol {}", clean_input(peer)));
        }
        self.query_routes(&command)
    }

    /// `configure check`: have BIRD parse its configuration file without applying it.
    pub fn check_config(&mut self) -> Result<ConfigureReport, BirdError> {
        let reply = self.query("configure check")?;
        parse_configure(&reply)
    }

    /// `configure` or `configure soft`: reload the configuration file.
    pub fn configure(&mut self, soft: bool) -> Result<ConfigureReport, BirdError> {
        let command = if soft { "configure soft" } else { "configure" };
        let reply = self.query(command)?;
        parse_configure(&reply)
    }

    pub fn get_config(&self) -> Result<String, BirdError> {
        self.config_file
            .as_ref()
            .ok_or(BirdError::ConfigFileNotSet)?
            .read()
    }

    pub fn put_config(&self, contents: &str) -> Result<(), BirdError> {
        self.config_file
            .as_ref()
            .ok_or(BirdError::ConfigFileNotSet)?
            .write(contents)
    }
}
