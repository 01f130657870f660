//! End-to-end tests of the client against a small mock BIRD control socket.
//!
//! The mock accepts one command per connection and answers it from a table of canned replies,
//! the same way BIRD does. Unknown commands get the greeting only, which leaves the client
//! waiting for an end marker that never comes.
#![cfg(unix)]

use std::collections::HashMap;
use std::io::{self, BufRead, BufReader, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use bgpkit_birdc::client::{BirdClient, BirdTransport};
use bgpkit_birdc::{BirdClientBuilder, BirdError};
use chrono::{NaiveDate, NaiveDateTime};
use env_logger::Env;
use tempfile::TempDir;

const GREETING: &str = "0001 BIRD 1.6.3 ready.\n";

struct MockBird {
    _dir: TempDir,
    socket: PathBuf,
    requests: Arc<Mutex<Vec<String>>>,
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<Result<()>>>,
}

impl MockBird {
    fn spawn(responses: HashMap<String, String>) -> Result<Self> {
        let dir = tempfile::tempdir().context("create socket dir")?;
        let socket = dir.path().join("bird.ctl");
        let listener = UnixListener::bind(&socket).context("bind mock socket")?;
        listener
            .set_nonblocking(true)
            .context("mock socket nonblocking")?;

        let requests = Arc::new(Mutex::new(Vec::new()));
        let stop = Arc::new(AtomicBool::new(false));
        let handle = {
            let requests = Arc::clone(&requests);
            let stop = Arc::clone(&stop);
            thread::spawn(move || Self::serve(listener, responses, requests, stop))
        };

        Ok(MockBird {
            _dir: dir,
            socket,
            requests,
            stop,
            handle: Some(handle),
        })
    }

    fn socket(&self) -> &Path {
        &self.socket
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn serve(
        listener: UnixListener,
        responses: HashMap<String, String>,
        requests: Arc<Mutex<Vec<String>>>,
        stop: Arc<AtomicBool>,
    ) -> Result<()> {
        while !stop.load(Ordering::Relaxed) {
            match listener.accept() {
                Ok((stream, _)) => Self::answer(stream, &responses, &requests)?,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(5));
                }
                Err(e) => return Err(e).context("accept connection"),
            }
        }
        Ok(())
    }

    fn answer(
        mut stream: UnixStream,
        responses: &HashMap<String, String>,
        requests: &Arc<Mutex<Vec<String>>>,
    ) -> Result<()> {
        stream.set_nonblocking(false)?;
        let mut command = String::new();
        BufReader::new(stream.try_clone()?)
            .read_line(&mut command)
            .context("read command")?;
        let command = command.trim_end().to_string();

        let reply = responses
            .get(&command)
            .map(String::as_str)
            .unwrap_or(GREETING);
        requests
            .lock()
            .map_err(|e| anyhow!("lock requests: {e}"))?
            .push(command);
        stream.write_all(reply.as_bytes())?;
        Ok(())
    }
}

impl Drop for MockBird {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2019, 12, 10)
        .unwrap()
        .and_hms_opt(10, 12, 19)
        .unwrap()
}

fn mock_bird() -> MockBird {
    // tests share the process, only the first one installs the logger
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("debug"))
        .is_test(true)
        .try_init();

    let responses: HashMap<String, String> = [
        ("show status", include_str!("data/show_status.txt")),
        ("show protocols all", include_str!("data/show_protocols_all.txt")),
        (
            "show protocols all \"PS2\"",
            "0001 BIRD 1.6.3 ready.
2002-name     proto    table    state  since       info
1002-PS2      BGP      T_PS2    up     14:20       Established
1006-  Description:    Peering AS8954 - InTouch
   Routes:         24 imported, 23 exported, 0 preferred
   BGP state:          Established
     Neighbor AS:      8954
     Neighbor ID:      85.184.4.5

0000
",
        ),
        (
            "show protocols all \"HAMSTER\"",
            "0001 BIRD 1.6.3 ready.\n8003 No protocols match\n",
        ),
        (
            "show route all protocol PS1",
            include_str!("data/show_route_all_protocol_PS1.txt"),
        ),
        (
            "show route table T_PS1 all protocol PS1",
            include_str!("data/show_route_table_T_PS1_all_protocol_PS1.txt"),
        ),
        (
            "show route for 203.0.113.0/24 all",
            "0001 BIRD 1.6.3 ready.\n8001 Network not in table\n",
        ),
        (
            "configure check",
            "0001 BIRD 1.6.3 ready.\n0002-Reading configuration from /etc/bird/bird.conf\n0020 Configuration OK\n",
        ),
        (
            "show route all protocol BROKEN",
            "0001 BIRD 1.6.3 ready.\n9001 syntax error, unexpected CF_SYM_UNDEFINED\n",
        ),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    MockBird::spawn(responses).unwrap()
}

fn client(bird: &MockBird) -> BirdClient<BirdTransport> {
    BirdClientBuilder::new(bird.socket())
        .read_timeout(Duration::from_secs(5))
        .reference_time(now())
        .build()
}

#[test]
fn test_status() {
    let bird = mock_bird();
    let status = client(&bird).status().unwrap();
    assert_eq!(status.version.as_deref(), Some("1.6.3"));
    assert_eq!(status.router_id, "195.69.146.34");
    assert_eq!(bird.requests(), vec!["show status"]);
}

#[test]
fn test_peers() {
    let bird = mock_bird();
    let peers = client(&bird).peers().unwrap();
    assert_eq!(peers.len(), 2);

    let ps1 = &peers[0];
    assert_eq!(ps1.name, "PS1");
    assert!(!ps1.up);
    assert_eq!(ps1.routes_imported, Some(0));

    let ps2 = &peers[1];
    assert_eq!(ps2.name, "PS2");
    assert!(ps2.up);
    assert_eq!(ps2.routes_imported, Some(24));
    assert_eq!(ps2.routes_exported, Some(23));
    assert_eq!(ps2.asn, Some(8954));
    assert_eq!(ps2.route_changes.get("export_updates_rejected"), Some(12));
    assert_eq!(ps2.route_changes.get("export_withdraws_rejected"), None);
}

#[test]
fn test_single_peer() {
    let bird = mock_bird();
    let mut client = client(&bird);

    let peer = client.peer("PS2").unwrap().unwrap();
    assert_eq!(peer.router_id.as_deref(), Some("85.184.4.5"));
    assert_eq!(
        peer.last_change,
        NaiveDate::from_ymd_opt(2019, 12, 9)
            .unwrap()
            .and_hms_opt(14, 20, 0)
            .unwrap()
    );

    assert_eq!(client.peer("HAMSTER").unwrap(), None);
}

#[test]
fn test_unknown_command_stalls() {
    let bird = mock_bird();
    let mut client = client(&bird);

    match client.peer("PS1'; down") {
        Err(BirdError::Stalled { partial }) => assert_eq!(partial, GREETING),
        other => panic!("unexpected {:?}", other),
    }
    // the name reached BIRD sanitized
    assert_eq!(bird.requests(), vec!["show protocols all \"PS1down\""]);
}

#[test]
fn test_rejected_prefixes() {
    let bird = mock_bird();
    let rejected = client(&bird).peer_prefixes_rejected("PS1").unwrap();
    let prefixes: Vec<String> = rejected
        .iter()
        .filter_map(|r| r.prefix.map(|p| p.to_string()))
        .collect();
    assert_eq!(prefixes, vec!["10.0.0.0/8", "192.168.0.0/16"]);
    assert_eq!(
        bird.requests(),
        vec![
            "show route table T_PS1 all protocol PS1",
            "show route all protocol PS1",
        ]
    );
}

#[test]
fn test_network_not_in_table() {
    let bird = mock_bird();
    let routes = client(&bird)
        .prefix_info("203.0.113.0/24".parse().unwrap(), None)
        .unwrap();
    assert!(routes.is_empty());
}

#[test]
fn test_daemon_error() {
    let bird = mock_bird();
    assert!(matches!(
        client(&bird).peer_prefixes_accepted("BROKEN"),
        Err(BirdError::Daemon { code: 9001, .. })
    ));
}

#[test]
fn test_check_config() {
    let bird = mock_bird();
    let report = client(&bird).check_config().unwrap();
    assert_eq!(report.config_file.as_deref(), Some("/etc/bird/bird.conf"));
}

#[test]
fn test_missing_socket() {
    let dir = tempfile::tempdir().unwrap();
    let mut client = BirdClientBuilder::new(dir.path().join("nothing.ctl")).build();
    assert!(matches!(client.status(), Err(BirdError::IoError(_))));
}
