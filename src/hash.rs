//! SHA-256 content fingerprinting for deduplication
//!
//! Files are read in bounded chunks so large videos never need to fit in
//! memory. Two files with equal fingerprints are treated as identical
//! content regardless of name or location.

use crate::error::{Error, Result};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::trace;

/// Chunk size for streaming reads (64KB)
const CHUNK_SIZE: usize = 64 * 1024;

/// A 256-bit content digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentFingerprint([u8; 32]);

impl From<[u8; 32]> for ContentFingerprint {
    fn from(digest: [u8; 32]) -> Self {
        Self(digest)
    }
}

impl fmt::Display for ContentFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Compute the content fingerprint of a file
///
/// Streams the file through SHA-256 in fixed-size chunks. Deterministic:
/// identical bytes always yield the same fingerprint.
pub fn fingerprint(path: &Path) -> Result<ContentFingerprint> {
    let mut file = File::open(path).map_err(|e| Error::Fingerprint {
        path: path.to_path_buf(),
        message: format!("Failed to open file: {}", e),
    })?;

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        let bytes_read = file.read(&mut buffer).map_err(|e| Error::Fingerprint {
            path: path.to_path_buf(),
            message: format!("Failed to read file: {}", e),
        })?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    let digest: [u8; 32] = hasher.finalize().into();
    let fp = ContentFingerprint(digest);
    trace!(?path, %fp, "Computed content fingerprint");
    Ok(fp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_same_content_same_fingerprint() {
        let mut file1 = NamedTempFile::new().unwrap();
        file1.write_all(b"test content").unwrap();
        file1.flush().unwrap();

        let mut file2 = NamedTempFile::new().unwrap();
        file2.write_all(b"test content").unwrap();
        file2.flush().unwrap();

        let fp1 = fingerprint(file1.path()).unwrap();
        let fp2 = fingerprint(file2.path()).unwrap();
        assert_eq!(fp1, fp2);
    }

    #[test]
    fn test_different_content_different_fingerprint() {
        let mut file1 = NamedTempFile::new().unwrap();
        file1.write_all(b"content 1").unwrap();
        file1.flush().unwrap();

        let mut file2 = NamedTempFile::new().unwrap();
        file2.write_all(b"content 2").unwrap();
        file2.flush().unwrap();

        assert_ne!(
            fingerprint(file1.path()).unwrap(),
            fingerprint(file2.path()).unwrap()
        );
    }

    #[test]
    fn test_large_file_streams_in_chunks() {
        let mut file = NamedTempFile::new().unwrap();
        let data = vec![0xabu8; CHUNK_SIZE * 3 + 17];
        file.write_all(&data).unwrap();
        file.flush().unwrap();

        // Must match a one-shot SHA-256 of the same bytes
        let expected: [u8; 32] = Sha256::digest(&data).into();
        let fp = fingerprint(file.path()).unwrap();
        assert_eq!(fp.to_string(), ContentFingerprint(expected).to_string());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = fingerprint(Path::new("/nonexistent/file.bin"));
        assert!(matches!(err, Err(Error::Fingerprint { .. })));
    }

    #[test]
    fn test_display_is_hex() {
        let fp = ContentFingerprint([0u8; 32]);
        assert_eq!(fp.to_string().len(), 64);
        assert!(fp.to_string().chars().all(|c| c == '0'));
    }
}
