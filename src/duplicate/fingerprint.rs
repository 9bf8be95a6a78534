//! Content fingerprint pipeline
//!
//! Produces the two digests the duplicate engine filters on: a cheap partial
//! fingerprint over the first 64 KiB of a file, and a full fingerprint over
//! the complete byte stream, read in fixed-size chunks so peak memory stays
//! bounded no matter how large the file is.
//!
//! Every fingerprint carries its algorithm tag; fingerprints computed under
//! different algorithms never compare equal. The partial fingerprint also
//! carries the file's byte size, so two size-different files whose prefixes
//! happen to collide can never be merged into one bucket.

use crate::core::error::{CleanupError, Result};
use sha2::{Digest, Sha256, Sha512};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Bytes covered by a partial fingerprint, and the chunk size used when
/// streaming a full one (64 KiB)
pub const PREFIX_LEN: usize = 64 * 1024;

/// Selectable hash family.
///
/// Either choice is correct; they trade speed for collision margin. The tag
/// travels with every digest so mixed-algorithm comparisons are impossible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Sha512,
}

impl HashAlgorithm {
    /// Parse a user-supplied algorithm name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "sha256" => Some(HashAlgorithm::Sha256),
            "sha512" => Some(HashAlgorithm::Sha512),
            _ => None,
        }
    }

    /// Canonical lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha512 => "sha512",
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Digest over the first [`PREFIX_LEN`] bytes of a file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartialFingerprint {
    pub algorithm: HashAlgorithm,
    /// Byte size of the whole file; part of the grouping key, not just a
    /// pre-filter
    pub size: u64,
    pub digest: Vec<u8>,
}

/// Digest over a file's complete byte stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FullFingerprint {
    pub algorithm: HashAlgorithm,
    pub digest: Vec<u8>,
}

impl FullFingerprint {
    /// Render the digest as lowercase hex.
    pub fn hex(&self) -> String {
        to_hex(&self.digest)
    }
}

impl PartialFingerprint {
    /// Render the digest as lowercase hex.
    pub fn hex(&self) -> String {
        to_hex(&self.digest)
    }
}

fn to_hex(digest: &[u8]) -> String {
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Incremental hasher dispatching over the selected algorithm.
enum Digester {
    Sha256(Sha256),
    Sha512(Sha512),
}

impl Digester {
    fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Sha256 => Digester::Sha256(Sha256::new()),
            HashAlgorithm::Sha512 => Digester::Sha512(Sha512::new()),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Digester::Sha256(h) => h.update(data),
            Digester::Sha512(h) => h.update(data),
        }
    }

    fn finalize(self) -> Vec<u8> {
        match self {
            Digester::Sha256(h) => h.finalize().to_vec(),
            Digester::Sha512(h) => h.finalize().to_vec(),
        }
    }
}

/// Hash at most the first 64 KiB of a file.
///
/// `size` is the byte size recorded when the file was collected; it is not
/// re-statted here, so an in-progress scan keeps its snapshot semantics.
/// Files shorter than the prefix are simply read to EOF, so for them the
/// partial fingerprint covers the entire content.
pub fn partial_fingerprint(
    path: &Path,
    size: u64,
    algorithm: HashAlgorithm,
) -> Result<PartialFingerprint> {
    let mut file = open(path)?;
    let mut digester = Digester::new(algorithm);
    let mut buffer = vec![0u8; PREFIX_LEN];
    let mut filled = 0usize;

    while filled < PREFIX_LEN {
        let n = file
            .read(&mut buffer[filled..])
            .map_err(|e| read_error(path, &e))?;
        if n == 0 {
            break;
        }
        filled += n;
    }

    digester.update(&buffer[..filled]);
    Ok(PartialFingerprint {
        algorithm,
        size,
        digest: digester.finalize(),
    })
}

/// Hash a file's complete byte stream in 64 KiB chunks.
pub fn full_fingerprint(path: &Path, algorithm: HashAlgorithm) -> Result<FullFingerprint> {
    let file = open(path)?;
    let mut reader = BufReader::with_capacity(PREFIX_LEN, file);
    let mut digester = Digester::new(algorithm);
    let mut buffer = vec![0u8; PREFIX_LEN];

    loop {
        let n = reader
            .read(&mut buffer)
            .map_err(|e| read_error(path, &e))?;
        if n == 0 {
            break;
        }
        digester.update(&buffer[..n]);
    }

    Ok(FullFingerprint {
        algorithm,
        digest: digester.finalize(),
    })
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| CleanupError::OperationError {
        name: path.display().to_string(),
        message: format!("Failed to open file: {}", e),
    })
}

fn read_error(path: &Path, e: &std::io::Error) -> CleanupError {
    CleanupError::OperationError {
        name: path.display().to_string(),
        message: format!("Failed to read file: {}", e),
    }
}
