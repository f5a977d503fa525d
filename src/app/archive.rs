//! Local artifact validation
//!
//! Uploads must be zip archives. The check reads the leading signature bytes
//! instead of trusting the file extension.

use std::path::Path;

use tokio::io::AsyncReadExt;

use crate::errors::InputError;

/// Local file header, empty archive, and spanned archive markers
const ZIP_SIGNATURES: [[u8; 4]; 3] = [
    [0x50, 0x4B, 0x03, 0x04],
    [0x50, 0x4B, 0x05, 0x06],
    [0x50, 0x4B, 0x07, 0x08],
];

/// Whether `data` starts with a zip signature
pub fn is_zip_signature(data: &[u8]) -> bool {
    match data {
        [a, b, c, d, ..] => ZIP_SIGNATURES.contains(&[*a, *b, *c, *d]),
        _ => false,
    }
}

/// Check that `path` is a regular file holding a zip archive
///
/// Returns the file size on success.
pub async fn validate_archive(path: &Path) -> Result<u64, InputError> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(InputError::NotFound {
                path: path.to_path_buf(),
            })
        }
        Err(source) => {
            return Err(InputError::Unreadable {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if !metadata.is_file() {
        return Err(InputError::NotAFile {
            path: path.to_path_buf(),
        });
    }

    let unreadable = |source| InputError::Unreadable {
        path: path.to_path_buf(),
        source,
    };
    let mut file = tokio::fs::File::open(path).await.map_err(unreadable)?;
    let mut header = [0u8; 4];
    let mut filled = 0;
    while filled < header.len() {
        let read = file.read(&mut header[filled..]).await.map_err(unreadable)?;
        if read == 0 {
            break;
        }
        filled += read;
    }

    if !is_zip_signature(&header[..filled]) {
        return Err(InputError::NotAnArchive {
            path: path.to_path_buf(),
        });
    }

    tracing::debug!("Validated archive {} ({} bytes)", path.display(), metadata.len());
    Ok(metadata.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn detect_zip_signatures() {
        assert!(is_zip_signature(&[0x50, 0x4B, 0x03, 0x04, 0x14, 0x00]));
        assert!(is_zip_signature(&[0x50, 0x4B, 0x05, 0x06]));
        assert!(is_zip_signature(&[0x50, 0x4B, 0x07, 0x08]));
    }

    #[test]
    fn reject_other_formats() {
        assert!(!is_zip_signature(&[0x1F, 0x8B, 0x08, 0x00]));
        assert!(!is_zip_signature(b"PK"));
        assert!(!is_zip_signature(b""));
    }

    #[tokio::test]
    async fn test_validate_archive_ok() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("artifact.zip");
        let mut content = vec![0x50, 0x4B, 0x03, 0x04];
        content.extend_from_slice(&[0u8; 60]);
        tokio::fs::write(&path, &content).await.unwrap();

        assert_eq!(validate_archive(&path).await.unwrap(), 64);
    }

    #[tokio::test]
    async fn test_validate_archive_rejects_renamed_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.zip");
        tokio::fs::write(&path, "just some text").await.unwrap();

        let result = validate_archive(&path).await;
        assert!(matches!(result, Err(InputError::NotAnArchive { .. })));
    }

    #[tokio::test]
    async fn test_validate_archive_rejects_directory() {
        let dir = tempdir().unwrap();

        let result = validate_archive(dir.path()).await;
        assert!(matches!(result, Err(InputError::NotAFile { .. })));
    }

    #[tokio::test]
    async fn test_validate_archive_missing() {
        let dir = tempdir().unwrap();

        let result = validate_archive(&dir.path().join("missing.zip")).await;
        assert!(matches!(result, Err(InputError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_validate_archive_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.zip");
        tokio::fs::write(&path, b"").await.unwrap();

        let result = validate_archive(&path).await;
        assert!(matches!(result, Err(InputError::NotAnArchive { .. })));
    }
}
