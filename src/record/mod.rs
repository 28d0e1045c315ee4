use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

use crate::error::{Error, Result};

/// Default record file name, relative to the process working directory.
/// Callers that want a different location pass an explicit path.
pub const DEFAULT_RECORD_FILE: &str = "server.setup";

/// Persisted server location, the only hand-off mechanism between a server
/// and its clients. `address` is always derived from `host` and `port`;
/// `load` re-checks that invariant so a tampered file never yields a record
/// whose fields disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    host: String,
    port: u16,
    address: (String, u16),
}

impl AddressRecord {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        let host = host.into();
        let address = (host.clone(), port);
        Self {
            host,
            port,
            address,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn address(&self) -> (&str, u16) {
        (&self.address.0, self.address.1)
    }

    /// Serializes the record to `path`, overwriting any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = bincode::serialize(self).map_err(|e| Error::CorruptRecord {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        fs::write(path, bytes)?;
        debug!("Saved address record for {}:{} to {}", self.host, self.port, path.display());
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::RecordNotFound {
                path: path.to_path_buf(),
            },
            _ => Error::Io(e),
        })?;

        let record: AddressRecord =
            bincode::deserialize(&bytes).map_err(|e| Error::CorruptRecord {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        if record.port == 0 || record.address != (record.host.clone(), record.port) {
            return Err(Error::CorruptRecord {
                path: path.to_path_buf(),
                reason: "address field disagrees with host/port".to_string(),
            });
        }

        debug!("Loaded address record {}:{} from {}", record.host, record.port, path.display());
        Ok(record)
    }
}
