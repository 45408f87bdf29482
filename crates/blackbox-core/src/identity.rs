//! Persistent node identity
//!
//! Each listen port owns exactly one Ed25519 keypair, stored as a
//! protobuf-encoded libp2p key under the node's data directory. The key is
//! generated on first use and loaded unchanged afterwards; a file that cannot
//! be decoded is reported as [`BlackboxError::CorruptKey`] and never replaced,
//! since rotating the key silently would invalidate every address the operator
//! has already shared.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use libp2p::identity::{DecodingError, Keypair};
use libp2p::PeerId;
use tracing::{debug, info};

use crate::{BlackboxError, Result};

// ----------------------------------------------------------------------------
// Node Identity
// ----------------------------------------------------------------------------

/// The signing keypair a node presents to the network
#[derive(Debug, Clone)]
pub struct NodeIdentity {
    keypair: Keypair,
}

impl NodeIdentity {
    /// Generate a fresh Ed25519 identity
    pub fn generate() -> Self {
        Self {
            keypair: Keypair::generate_ed25519(),
        }
    }

    /// Wrap an existing keypair
    pub fn from_keypair(keypair: Keypair) -> Self {
        Self { keypair }
    }

    /// Peer id derived from the public half of the keypair
    pub fn peer_id(&self) -> PeerId {
        self.keypair.public().to_peer_id()
    }

    pub fn into_keypair(self) -> Keypair {
        self.keypair
    }

    /// Serialized form written to the key file
    pub fn encode(&self) -> std::result::Result<Vec<u8>, DecodingError> {
        self.keypair.to_protobuf_encoding()
    }
}

// ----------------------------------------------------------------------------
// Key File Layout
// ----------------------------------------------------------------------------

/// Path of the key file for `port` inside `data_dir`
pub fn key_path(data_dir: &Path, port: u16) -> PathBuf {
    data_dir.join(format!("node_{port}.key"))
}

// ----------------------------------------------------------------------------
// Load or Create
// ----------------------------------------------------------------------------

/// Load the identity stored at `path`, creating it on first use.
///
/// The parent directory is created when missing (owner-only on unix). A new
/// key file is created exclusively, owner-only from the start, so a key that
/// appeared in the meantime is loaded rather than overwritten.
pub fn ensure_identity(path: &Path) -> Result<NodeIdentity> {
    if path.exists() {
        return load_identity(path);
    }

    if let Some(parent) = path.parent() {
        create_key_dir(parent)?;
    }

    let identity = NodeIdentity::generate();
    let encoded = identity.encode().map_err(|e| BlackboxError::CorruptKey {
        path: path.to_path_buf(),
        reason: format!("failed to encode keypair: {e}"),
    })?;

    let mut file = match create_key_file(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            debug!(path = %path.display(), "key file created concurrently, loading it");
            return load_identity(path);
        }
        Err(e) => return Err(BlackboxError::io(path, e)),
    };
    file.write_all(&encoded)
        .and_then(|()| file.sync_all())
        .map_err(|e| BlackboxError::io(path, e))?;

    info!(peer_id = %identity.peer_id(), path = %path.display(), "generated new node identity");
    Ok(identity)
}

fn load_identity(path: &Path) -> Result<NodeIdentity> {
    let data = fs::read(path).map_err(|e| BlackboxError::io(path, e))?;
    let keypair = Keypair::from_protobuf_encoding(&data).map_err(|e| BlackboxError::CorruptKey {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let identity = NodeIdentity::from_keypair(keypair);
    debug!(peer_id = %identity.peer_id(), path = %path.display(), "loaded node identity");
    Ok(identity)
}

fn create_key_dir(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() || dir.exists() {
        return Ok(());
    }

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(dir).map_err(|e| BlackboxError::io(dir, e))
}

fn create_key_file(path: &Path) -> std::io::Result<fs::File> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
