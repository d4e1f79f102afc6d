//! URI scheme handling and the blob store abstraction (§6's "input/output URIs use
//! explicit schemes `{file, gs}`; unsupported schemes produce an invalid-argument
//! failure at the boundary").

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

const SUPPORTED_SCHEMES: &[&str] = &["file", "gs"];

/// The `scheme://` prefix of `uri`, or `None` if it has no recognizable scheme at all.
fn scheme_of(uri: &str) -> Option<&str> {
    uri.split_once("://").map(|(scheme, _)| scheme)
}

/// Rejects any URI whose scheme isn't `file` or `gs`.
pub fn validate_scheme(uri: &str) -> Result<()> {
    match scheme_of(uri) {
        Some(scheme) if SUPPORTED_SCHEMES.contains(&scheme) => Ok(()),
        Some(scheme) => Err(Error::InvalidArgument(format!("unsupported URI scheme `{scheme}`"))),
        None => Err(Error::InvalidArgument(format!("`{uri}` has no scheme"))),
    }
}

/// Reads and writes the opaque byte blobs the service passes to and from storage
/// (bitcode handles, persisted ICFG edge-lists, walker output).
pub trait BlobStore: Send + Sync {
    fn get(&self, uri: &str) -> Result<Vec<u8>>;
    fn put(&self, uri: &str, data: &[u8]) -> Result<()>;
}

/// The `file://` backend. `gs://` (Google Cloud Storage) is a recognized scheme at the
/// validation boundary but has no implementation here; a caller that needs it supplies
/// its own `BlobStore`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileBlobStore;

impl FileBlobStore {
    /// Strips the `file://` prefix, producing the filesystem path it names.
    fn path_of(uri: &str) -> Result<&Path> {
        uri.strip_prefix("file://")
            .map(Path::new)
            .ok_or_else(|| Error::InvalidArgument(format!("`{uri}` is not a file:// URI")))
    }
}

impl BlobStore for FileBlobStore {
    fn get(&self, uri: &str) -> Result<Vec<u8>> {
        let path = Self::path_of(uri)?;
        fs::read(path).map_err(|e| Error::DataLoss(format!("reading {}: {e}", path.display())))
    }

    fn put(&self, uri: &str, data: &[u8]) -> Result<()> {
        let path = Self::path_of(uri)?;
        fs::write(path, data).map_err(|e| Error::DataLoss(format!("writing {}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_and_gs_schemes_are_accepted() {
        assert!(validate_scheme("file:///tmp/a.bin").is_ok());
        assert!(validate_scheme("gs://bucket/obj").is_ok());
    }

    #[test]
    fn unsupported_scheme_is_rejected() {
        assert!(validate_scheme("http://example.com/a").is_err());
    }

    #[test]
    fn missing_scheme_is_rejected() {
        assert!(validate_scheme("/tmp/a.bin").is_err());
    }

    #[test]
    fn file_blob_store_round_trips() {
        let mut path = std::env::temp_dir();
        path.push(format!("errspec-blob-store-test-{}", std::process::id()));
        let uri = format!("file://{}", path.display());

        let store = FileBlobStore;
        store.put(&uri, b"hello").unwrap();
        assert_eq!(store.get(&uri).unwrap(), b"hello");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn file_blob_store_reports_missing_file_as_data_loss() {
        let store = FileBlobStore;
        let err = store.get("file:///nonexistent/path/for/errspec/tests").unwrap_err();
        assert!(matches!(err, Error::DataLoss(_)));
    }
}
