/*!
error module defines the error types used in bgpkit-birdc.
*/
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BirdError {
    /// A general IO error triggered while talking to the control socket or reading the
    /// configuration file.
    ///
    /// ## Occurs during:
    ///  - Connecting to or reading from the BIRD control socket
    ///  - Spawning the remote shell for `birdc`
    ///  - Reading or writing the configuration file
    #[error(transparent)]
    IoError(#[from] io::Error),
    /// The socket stopped delivering data before a terminal reply code was seen.
    ///
    /// ## Occurs during:
    ///  - Reading a reply from the control socket
    #[error("could not read additional data from BIRD ({} bytes received)", partial.len())]
    Stalled { partial: String },
    /// A remote command (`ssh ... birdc`, `cat`) exited unsuccessfully.
    #[error("remote command `{command}` failed: {status}")]
    RemoteCommand { command: String, status: String },
    /// A line expected to follow a fixed pattern did not.
    ///
    /// ## Occurs during:
    ///  - Parsing peer or route summary lines
    ///  - Parsing the status section and route change statistics
    ///  - Parsing `configure` replies
    #[error("unable to parse {context}: {line:?}")]
    Parse { context: &'static str, line: String },
    /// None of the known BIRD timestamp notations matched.
    #[error("can not parse datetime: [{0}]")]
    InvalidTimestamp(String),
    /// A lookup by peer name returned more than one peer.
    #[error("searched for peer {name:?}, but BIRD returned {count} peers")]
    MultiplePeers { name: String, count: usize },
    /// BIRD answered with an error reply code.
    #[error("BIRD error {code:04}: {message}")]
    Daemon { code: u16, message: String },
    /// BIRD refused the configuration.
    #[error("configuration rejected: {0}")]
    ConfigurationRejected(String),
    #[error("config_file is not set")]
    ConfigFileNotSet,
}

impl BirdError {
    pub(crate) fn parse(context: &'static str, line: impl Into<String>) -> Self {
        BirdError::Parse {
            context,
            line: line.into(),
        }
    }
}
