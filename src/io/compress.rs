use crate::error::WriteError;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

// Gzips `path` into `<path>.gz` and removes the original, like `gzip -f`
pub fn gzip_in_place(path: &Path) -> Result<PathBuf, WriteError> {
    let mut gz_name = path.as_os_str().to_owned();
    gz_name.push(".gz");
    let gz_path = PathBuf::from(gz_name);

    let io_err = |p: &Path| {
        let p = p.to_path_buf();
        move |source: io::Error| WriteError::Io { path: p, source }
    };

    let mut input = BufReader::new(File::open(path).map_err(io_err(path))?);
    let output = File::create(&gz_path).map_err(io_err(&gz_path))?;

    let mut encoder = GzEncoder::new(BufWriter::new(output), Compression::default());
    io::copy(&mut input, &mut encoder).map_err(io_err(&gz_path))?;
    encoder
        .finish()
        .and_then(|mut w| w.flush())
        .map_err(io_err(&gz_path))?;

    std::fs::remove_file(path).map_err(io_err(path))?;
    Ok(gz_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;
    use tempfile::tempdir;

    #[test]
    fn replaces_file_with_gzip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("static.nc");
        std::fs::write(&path, b"static data").unwrap();

        let gz_path = gzip_in_place(&path).unwrap();

        assert_eq!(gz_path, dir.path().join("static.nc.gz"));
        assert!(!path.exists());

        let mut restored = String::new();
        GzDecoder::new(File::open(&gz_path).unwrap())
            .read_to_string(&mut restored)
            .unwrap();
        assert_eq!(restored, "static data");
    }

    #[test]
    fn overwrites_existing_archive() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("static.nc");
        std::fs::write(dir.path().join("static.nc.gz"), b"stale").unwrap();
        std::fs::write(&path, b"fresh").unwrap();

        assert!(gzip_in_place(&path).is_ok());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(gzip_in_place(&dir.path().join("absent.nc")).is_err());
    }
}
