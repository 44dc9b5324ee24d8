//! Digest primitives used by the duplicate engine.
//!
//! # Overview
//!
//! The engine depends on two capabilities only, expressed as traits so an
//! alternative algorithm can be plugged in without touching the stages:
//!
//! - [`QuickDigest`]: fast, deterministic, possibly partial. The default
//!   [`XxQuickHasher`] hashes the whole file when it is smaller than twice the
//!   window, otherwise the first and last window bytes fed into one running
//!   XxHash64 state. Files that agree at head and tail collide on purpose; the
//!   full digest separates them.
//! - [`FullDigest`]: deterministic with negligible collision probability. The
//!   default [`Blake3Hasher`] streams the whole file in fixed-size chunks so
//!   memory use does not depend on file size.

use std::fs::File;
use std::hash::Hasher as _;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use twox_hash::XxHash64;

use super::HashError;

/// Default quick-hash window: 8 KiB from the head and 8 KiB from the tail.
pub const QUICK_HASH_WINDOW: usize = 8 * 1024;

/// Default streaming chunk for the full digest (64 KiB).
pub const FULL_HASH_CHUNK: usize = 64 * 1024;

/// Quick digest reported for zero-byte files, which are never opened.
pub const EMPTY_QUICK_DIGEST: u64 = 0;

/// Strong content digest bytes (32 bytes for BLAKE3).
pub type FullHash = Vec<u8>;

/// Fast, possibly partial file digest.
///
/// Implementations must be deterministic: unchanged content always yields
/// the same value.
pub trait QuickDigest: Send + Sync {
    /// Digest the file at `path`, whose size at discovery time was `size`.
    ///
    /// # Errors
    ///
    /// Returns a [`HashError`] if the file cannot be opened or read.
    fn quick_digest(&self, path: &Path, size: u64) -> Result<u64, HashError>;
}

/// Strong whole-content file digest.
pub trait FullDigest: Send + Sync {
    /// Digest the entire content of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`HashError`] if the file cannot be opened or read.
    fn full_digest(&self, path: &Path) -> Result<FullHash, HashError>;
}

/// XxHash64 head/tail quick digest.
#[derive(Debug, Clone, Copy)]
pub struct XxQuickHasher {
    window: usize,
}

impl Default for XxQuickHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl XxQuickHasher {
    /// Create a quick hasher with the default 8 KiB window.
    #[must_use]
    pub fn new() -> Self {
        Self {
            window: QUICK_HASH_WINDOW,
        }
    }

    /// Create a quick hasher with a custom window (minimum 1 byte).
    #[must_use]
    pub fn with_window(window: usize) -> Self {
        Self {
            window: window.max(1),
        }
    }

    /// The head/tail window in bytes.
    #[must_use]
    pub fn window(&self) -> usize {
        self.window
    }

    /// Size at or above which only head and tail are hashed.
    #[must_use]
    pub fn partial_threshold(&self) -> u64 {
        self.window as u64 * 2
    }
}

impl QuickDigest for XxQuickHasher {
    fn quick_digest(&self, path: &Path, size: u64) -> Result<u64, HashError> {
        if size == 0 {
            return Ok(EMPTY_QUICK_DIGEST);
        }

        let mut file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let mut hasher = XxHash64::with_seed(0);
        let buffer_len = usize::try_from(size).map_or(self.window, |size| size.min(self.window));
        let mut buffer = vec![0u8; buffer_len];

        if size < self.partial_threshold() {
            stream_into(&mut file, &mut buffer, |chunk| hasher.write(chunk))
                .map_err(|e| HashError::from_io(path, e))?;
        } else {
            file.read_exact(&mut buffer)
                .map_err(|e| HashError::from_io(path, e))?;
            hasher.write(&buffer);

            file.seek(SeekFrom::End(-(self.window as i64)))
                .map_err(|e| HashError::from_io(path, e))?;
            file.read_exact(&mut buffer)
                .map_err(|e| HashError::from_io(path, e))?;
            hasher.write(&buffer);
        }

        Ok(hasher.finish())
    }
}

/// BLAKE3 streaming full digest.
#[derive(Debug, Clone, Copy)]
pub struct Blake3Hasher {
    chunk_size: usize,
}

impl Default for Blake3Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Blake3Hasher {
    /// Create a full hasher reading 64 KiB at a time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            chunk_size: FULL_HASH_CHUNK,
        }
    }

    /// Create a full hasher with a custom read chunk (minimum 1 byte).
    #[must_use]
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    /// Read chunk in bytes.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

impl FullDigest for Blake3Hasher {
    fn full_digest(&self, path: &Path) -> Result<FullHash, HashError> {
        let mut file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0u8; self.chunk_size];

        stream_into(&mut file, &mut buffer, |chunk| {
            hasher.update(chunk);
        })
        .map_err(|e| HashError::from_io(path, e))?;

        Ok(hasher.finalize().as_bytes().to_vec())
    }
}

/// Read `reader` to EOF through `buffer`, handing each filled slice to `sink`.
fn stream_into<R: Read>(
    reader: &mut R,
    buffer: &mut [u8],
    mut sink: impl FnMut(&[u8]),
) -> std::io::Result<u64> {
    let mut total = 0u64;
    loop {
        match reader.read(buffer) {
            Ok(0) => return Ok(total),
            Ok(n) => {
                sink(&buffer[..n]);
                total += n as u64;
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
}

/// Render digest bytes as lowercase hexadecimal.
#[must_use]
pub fn hash_to_hex(hash: &[u8]) -> String {
    use std::fmt::Write;

    hash.iter().fold(String::with_capacity(hash.len() * 2), |mut s, b| {
        let _ = write!(s, "{b:02x}");
        s
    })
}
