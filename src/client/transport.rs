//! Moving commands to BIRD and replies back.
//!
//! [UnixSocketTransport] talks to the control socket directly. [RemoteShellTransport] runs
//! `birdc` on another machine over `ssh`. Both hand back the raw reply text, the parsers never
//! see a socket.

use crate::error::BirdError;
use crate::models::ReplyCode;
use log::{debug, trace};
use std::io::{self, Read, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

/// Read size used on the control socket.
const CHUNK_SIZE: usize = 1024;

/// `birdc` executable used by [RemoteShellTransport] unless told otherwise.
pub const DEFAULT_BIRDC: &str = "birdc";

/// Control socket of a packaged BIRD 2 installation.
pub const DEFAULT_SOCKET: &str = "/var/run/bird/bird.ctl";

const SSH: &str = "ssh";

/// Something that can deliver one command to BIRD and return its complete reply.
pub trait Transport {
    fn send(&mut self, command: &str) -> Result<String, BirdError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, command: &str) -> Result<String, BirdError> {
        (**self).send(command)
    }
}

/// A line ending a reply: four digits followed by a space or nothing, with a terminal code.
/// Dash lines announce more output and never end a reply.
fn is_terminal_line(line: &[u8]) -> bool {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    let Some(code) = line.get(..4) else {
        return false;
    };
    if !code.iter().all(u8::is_ascii_digit) {
        return false;
    }
    if !matches!(line.get(4), None | Some(b' ')) {
        return false;
    }
    let code = code
        .iter()
        .fold(0u16, |acc, digit| acc * 10 + u16::from(digit - b'0'));
    ReplyCode::from(code).is_terminal()
}

/// Whether `buffer` holds a complete, newline-terminated line with a terminal reply code.
pub fn is_reply_complete(buffer: &str) -> bool {
    match buffer.rfind('\n') {
        Some(end) => buffer.as_bytes()[..end]
            .split(|b| *b == b'\n')
            .any(is_terminal_line),
        None => false,
    }
}

/// Read from `reader` until the reply is complete.
///
/// Every line is checked once, when its newline arrives. A read that returns no data, or times
/// out, before the terminal line arrived means BIRD will not send anything more, and
/// [BirdError::Stalled] carries what was received so far.
pub fn read_reply<R: Read>(reader: &mut R) -> Result<String, BirdError> {
    let mut data: Vec<u8> = Vec::with_capacity(CHUNK_SIZE);
    let mut chunk = [0u8; CHUNK_SIZE];
    // start of the first line not checked yet
    let mut line_start = 0;

    loop {
        let n = match reader.read(&mut chunk) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                debug!("read timed out after {} bytes from BIRD", data.len());
                return Err(BirdError::Stalled {
                    partial: String::from_utf8_lossy(&data).into_owned(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        if n == 0 {
            // an unterminated final line still counts at end of stream
            let text = String::from_utf8_lossy(&data).into_owned();
            if is_terminal_line(&data[line_start..]) {
                return Ok(text);
            }
            debug!("no additional data from BIRD after {} bytes", data.len());
            return Err(BirdError::Stalled { partial: text });
        }

        data.extend_from_slice(&chunk[..n]);
        while let Some(pos) = data[line_start..].iter().position(|b| *b == b'\n') {
            let line = &data[line_start..line_start + pos];
            line_start += pos + 1;
            if is_terminal_line(line) {
                return Ok(String::from_utf8_lossy(&data).into_owned());
            }
        }
    }
}

/// Direct connection to the BIRD control socket. One connection per command.
#[derive(Debug, Clone)]
pub struct UnixSocketTransport {
    socket_path: PathBuf,
    read_timeout: Option<Duration>,
}

impl UnixSocketTransport {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        UnixSocketTransport {
            socket_path: socket_path.into(),
            read_timeout: None,
        }
    }

    /// Give up on a silent daemon after `timeout`. `None` waits forever.
    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

impl Transport for UnixSocketTransport {
    fn send(&mut self, command: &str) -> Result<String, BirdError> {
        debug!("query {} on {}", command, self.socket_path.display());
        let mut stream = UnixStream::connect(&self.socket_path)?;
        stream.set_read_timeout(self.read_timeout)?;
        stream.write_all(format!("{}\n", command).as_bytes())?;
        stream.flush()?;

        let reply = read_reply(&mut stream)?;
        debug!("received {} bytes for {:?}", reply.len(), command);
        trace!("{}", reply);
        Ok(reply)
    }
}

/// Run `command` on `destination` through `ssh`, optionally feeding `input` to its stdin.
pub(crate) fn run_remote(
    destination: &str,
    command: &str,
    input: Option<&[u8]>,
) -> Result<String, BirdError> {
    debug!("ssh {} {:?}", destination, command);
    let mut child = Command::new(SSH)
        .arg(destination)
        .arg(command)
        .stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()?;

    if let (Some(input), Some(mut stdin)) = (input, child.stdin.take()) {
        stdin.write_all(input)?;
        // closing stdin lets the remote `cat` finish
        drop(stdin);
    }

    let output = child.wait_with_output()?;
    if !output.status.success() {
        return Err(BirdError::RemoteCommand {
            command: command.to_string(),
            status: output.status.to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// `user@host`, or just `host` when no user is given.
pub(crate) fn ssh_destination(host: &str, user: Option<&str>) -> String {
    match user {
        Some(user) => format!("{}@{}", user, host),
        None => host.to_string(),
    }
}

/// Runs `birdc -v -s <socket> '<command>'` on a remote host.
///
/// `birdc -v` prints the same coded lines as the socket but no end marker, so one is appended.
#[derive(Debug, Clone)]
pub struct RemoteShellTransport {
    destination: String,
    birdc: String,
    socket_path: PathBuf,
}

impl RemoteShellTransport {
    pub fn new(host: &str, user: Option<&str>, socket_path: impl Into<PathBuf>) -> Self {
        RemoteShellTransport {
            destination: ssh_destination(host, user),
            birdc: DEFAULT_BIRDC.to_string(),
            socket_path: socket_path.into(),
        }
    }

    pub fn with_birdc(mut self, birdc: impl Into<String>) -> Self {
        self.birdc = birdc.into();
        self
    }

    pub fn remote_command(&self, command: &str) -> String {
        format!(
            "{} -v -s {} '{}'",
            self.birdc,
            self.socket_path.display(),
            command
        )
    }
}

impl Transport for RemoteShellTransport {
    fn send(&mut self, command: &str) -> Result<String, BirdError> {
        let mut reply = run_remote(&self.destination, &self.remote_command(command), None)?;
        reply.push_str("0000\n");
        debug!("received {} bytes for {:?}", reply.len(), command);
        trace!("{}", reply);
        Ok(reply)
    }
}

/// The transports a [crate::client::BirdClientBuilder] can produce.
#[derive(Debug, Clone)]
pub enum BirdTransport {
    Unix(UnixSocketTransport),
    Remote(RemoteShellTransport),
}

impl Transport for BirdTransport {
    fn send(&mut self, command: &str) -> Result<String, BirdError> {
        match self {
            BirdTransport::Unix(t) => t.send(command),
            BirdTransport::Remote(t) => t.send(command),
        }
    }
}
