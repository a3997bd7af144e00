use crate::core::models::system::PolymerSystem;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Defines the interface for reading and writing polymer topology file formats.
///
/// Implementors handle format-specific parsing and serialization; the provided path-based
/// methods take care of buffering and atomic publication.
pub trait TopologyFile {
    /// Header information recovered when reading a file.
    type Metadata;

    /// Format-specific knobs controlling how a system is written.
    type Options;

    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    /// Reads a polymer system from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or the reader fails.
    fn read_from(reader: &mut impl BufRead) -> Result<(PolymerSystem, Self::Metadata), Self::Error>;

    /// Writes a polymer system to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if the system cannot be represented with the given options or
    /// writing fails.
    fn write_to(
        system: &PolymerSystem,
        options: &Self::Options,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error>;

    /// Reads a polymer system from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<(PolymerSystem, Self::Metadata), Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    /// Renders a polymer system into an in-memory buffer.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`TopologyFile::write_to`].
    fn render(system: &PolymerSystem, options: &Self::Options) -> Result<Vec<u8>, Self::Error> {
        let mut buffer = Vec::new();
        Self::write_to(system, options, &mut buffer)?;
        Ok(buffer)
    }

    /// Writes a polymer system to a file path.
    ///
    /// The file is rendered completely before anything touches the disk, then written to a
    /// temporary file next to `path` and renamed over it.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails or the file cannot be created or replaced. In
    /// either case `path` is left untouched.
    fn write_to_path<P: AsRef<Path>>(
        system: &PolymerSystem,
        options: &Self::Options,
        path: P,
    ) -> Result<(), Self::Error> {
        let buffer = Self::render(system, options)?;
        persist_atomically(path.as_ref(), &buffer)?;
        Ok(())
    }
}

/// Writes `contents` to a temporary file in the directory of `path`, then renames it
/// into place.
pub fn persist_atomically(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(contents)?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|e| e.error)?;
    debug!("Persisted {} bytes to {:?}", contents.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn persist_atomically_creates_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.data");

        persist_atomically(&path, b"first").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "first");

        persist_atomically(&path, b"second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");

        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn persist_atomically_fails_for_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("out.data");
        assert!(persist_atomically(&path, b"data").is_err());
        assert!(!path.exists());
    }
}
