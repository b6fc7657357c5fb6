use std::fs;
use std::path::Path;

use crate::error::ImageError;

/// Read an image, rejecting directories and empty files.
pub(crate) fn read_image_file(path: &Path) -> Result<Vec<u8>, ImageError> {
    let meta = fs::metadata(path).map_err(|source| ImageError::Access {
        path: path.to_path_buf(),
        source,
    })?;
    if meta.is_dir() {
        return Err(ImageError::IsDirectory {
            path: path.to_path_buf(),
        });
    }
    if meta.len() == 0 {
        return Err(ImageError::Empty {
            path: path.to_path_buf(),
        });
    }

    fs::read(path).map_err(|source| ImageError::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_non_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("20260215_0900_UTC.jpg");
        fs::write(&path, [0xFF, 0xD8, 0xFF]).unwrap();

        assert_eq!(read_image_file(&path).unwrap(), vec![0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn missing_file_is_access_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_image_file(&dir.path().join("nope.jpg")).unwrap_err();
        assert!(matches!(err, ImageError::Access { .. }));
    }

    #[test]
    fn empty_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.jpg");
        fs::write(&path, []).unwrap();

        assert!(matches!(read_image_file(&path), Err(ImageError::Empty { .. })));
    }

    #[test]
    fn directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("folder.jpg");
        fs::create_dir(&path).unwrap();

        assert!(matches!(
            read_image_file(&path),
            Err(ImageError::IsDirectory { .. })
        ));
    }
}
