use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use bgpkit_birdc::client::{BirdClient, BirdTransport, DEFAULT_BIRDC, DEFAULT_SOCKET};
use bgpkit_birdc::{BirdClientBuilder, BirdError};
use clap::{Parser, Subcommand};
use ipnet::IpNet;
use serde::Serialize;

/// bgpkit-birdc queries a BIRD routing daemon and prints the results as JSON.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Opts {
    /// Path to the BIRD control socket.
    #[clap(short, long, default_value = DEFAULT_SOCKET)]
    socket: PathBuf,

    /// Run birdc on this host over SSH instead of using a local socket.
    #[clap(short = 'H', long)]
    host: Option<String>,

    /// SSH user for --host.
    #[clap(short, long)]
    user: Option<String>,

    /// birdc command on the remote host.
    #[clap(long, default_value = DEFAULT_BIRDC)]
    birdc: String,

    /// BIRD configuration file, for show-config.
    #[clap(short, long)]
    config_file: Option<PathBuf>,

    /// Socket read timeout in seconds.
    #[clap(short, long)]
    timeout: Option<u64>,

    /// Pretty-print JSON output
    #[clap(long)]
    pretty: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Daemon version, router ID and reboot times.
    Status,
    /// All BGP sessions, or a single one by name.
    Peers {
        #[clap(name = "NAME")]
        name: Option<String>,
    },
    /// Routes, optionally limited to a prefix and/or a peer.
    Routes {
        #[clap(short, long)]
        prefix: Option<IpNet>,
        #[clap(long)]
        peer: Option<String>,
    },
    /// Routes announced by a peer before filtering.
    Announced { peer: String },
    /// Routes of a peer accepted by the import filter.
    Accepted { peer: String },
    /// Routes of a peer rejected by the import filter.
    Rejected { peer: String },
    /// Routes exported to a peer.
    Exported { peer: String },
    /// Routes for a prefix.
    Prefix {
        prefix: IpNet,
        #[clap(long)]
        peer: Option<String>,
    },
    /// Have BIRD check its configuration file.
    CheckConfig,
    /// Reload the configuration file.
    Configure {
        #[clap(long)]
        soft: bool,
    },
    /// Print the configuration file.
    ShowConfig,
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), BirdError> {
    let output = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(std::io::Error::other)?;

    let mut stdout = std::io::stdout();
    if let Err(e) = writeln!(stdout, "{}", output) {
        if e.kind() != std::io::ErrorKind::BrokenPipe {
            return Err(e.into());
        }
    }
    Ok(())
}

fn run(client: &mut BirdClient<BirdTransport>, command: Commands, pretty: bool) -> Result<(), BirdError> {
    match command {
        Commands::Status => print_json(&client.status()?, pretty),
        Commands::Peers { name: None } => print_json(&client.peers()?, pretty),
        Commands::Peers { name: Some(name) } => match client.peer(&name)? {
            Some(peer) => print_json(&peer, pretty),
            None => {
                eprintln!("peer {} not found", name);
                std::process::exit(2);
            }
        },
        Commands::Routes { prefix, peer } => {
            print_json(&client.routes(prefix, peer.as_deref())?, pretty)
        }
        Commands::Announced { peer } => print_json(&client.peer_prefixes_announced(&peer)?, pretty),
        Commands::Accepted { peer } => print_json(&client.peer_prefixes_accepted(&peer)?, pretty),
        Commands::Rejected { peer } => print_json(&client.peer_prefixes_rejected(&peer)?, pretty),
        Commands::Exported { peer } => print_json(&client.peer_prefixes_exported(&peer)?, pretty),
        Commands::Prefix { prefix, peer } => {
            print_json(&client.prefix_info(prefix, peer.as_deref())?, pretty)
        }
        Commands::CheckConfig => print_json(&client.check_config()?, pretty),
        Commands::Configure { soft } => print_json(&client.configure(soft)?, pretty),
        Commands::ShowConfig => {
            print!("{}", client.get_config()?);
            Ok(())
        }
    }
}

fn main() {
    let opts: Opts = Opts::parse();

    env_logger::init();

    let mut builder = BirdClientBuilder::new(&opts.socket).birdc(&opts.birdc);
    if let Some(host) = &opts.host {
        builder = builder.remote(host, opts.user.clone());
    }
    if let Some(config_file) = &opts.config_file {
        builder = builder.config_file(config_file);
    }
    if let Some(secs) = opts.timeout {
        builder = builder.read_timeout(Duration::from_secs(secs));
    }
    let mut client = builder.build();

    if let Err(e) = run(&mut client, opts.command, opts.pretty) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
