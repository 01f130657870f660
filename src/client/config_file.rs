use crate::client::transport::{run_remote, ssh_destination};
use crate::error::BirdError;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// The BIRD configuration file, on this machine or on the remote host BIRD runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    path: PathBuf,
    /// `user@host` to reach the file through `ssh`.
    remote: Option<String>,
}

impl ConfigFile {
    pub fn local(path: impl Into<PathBuf>) -> Self {
        ConfigFile {
            path: path.into(),
            remote: None,
        }
    }

    pub fn remote(path: impl Into<PathBuf>, host: &str, user: Option<&str>) -> Self {
        ConfigFile {
            path: path.into(),
            remote: Some(ssh_destination(host, user)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> Result<String, BirdError> {
        debug!("reading configuration {}", self.path.display());
        match &self.remote {
            Some(destination) => run_remote(
                destination,
                &format!("cat {}", self.path.display()),
                None,
            ),
            None => Ok(fs::read_to_string(&self.path)?),
        }
    }

    /// Replace the file content. BIRD is not told about it, see
    /// [crate::client::BirdClient::configure].
    pub fn write(&self, contents: &str) -> Result<(), BirdError> {
        debug!("writing configuration {}", self.path.display());
        match &self.remote {
            Some(destination) => {
                run_remote(
                    destination,
                    &format!("cat > {}", self.path.display()),
                    Some(contents.as_bytes()),
                )?;
                Ok(())
            }
            None => Ok(fs::write(&self.path, contents)?),
        }
    }
}
