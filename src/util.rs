use crate::error::FileOpError;
use std::{
    fs::{self, File, OpenOptions},
    io::{ErrorKind, Write},
    path::Path,
};

fn create_file_impl(name: &'static str, path: &Path) -> Result<File, Box<FileOpError>> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(|error| FileOpError::make_create(name, path.to_path_buf(), error))
}

/// Creates a file at the specified path, truncating it if it already exists.
///
/// # Errors
/// This function will return a boxed `FileOpError` with the `FileOpAction::Create` action in case
/// an I/O error occurs while creating the file.
pub fn create_file<P: AsRef<Path>>(name: &'static str, path: P) -> Result<File, Box<FileOpError>> {
    create_file_impl(name, path.as_ref())
}

fn save_file_impl(name: &'static str, path: &Path, data: &[u8]) -> Result<(), Box<FileOpError>> {
    create_file(name, path)?
        .write_all(data)
        .map_err(|error| FileOpError::make_write(name, path.to_path_buf(), error))?;

    info!("Saved {} to {}.", name, path.display());

    Ok(())
}

/// Creates or truncates a file at the specified path and writes data from a slice into it.
///
/// # Errors
/// This function will return a boxed [`FileOpError`] with either [`FileOpAction::Create`] or
/// [`FileOpAction::Write`] action in case an I/O error occurs while either creating or writing the
/// file.
///
/// [`FileOpAction::Create`]: crate::error::FileOpAction::Create
/// [`FileOpAction::Write`]: crate::error::FileOpAction::Write
pub fn save_file<P: AsRef<Path>>(
    name: &'static str,
    path: P,
    data: &[u8],
) -> Result<(), Box<FileOpError>> {
    save_file_impl(name, path.as_ref(), data)
}

/// Creates a directory and its parents unless it already exists.
///
/// # Errors
/// Returns a boxed `FileOpError` with the `FileOpAction::Create` action if the directory couldn't
/// be created or the path exists and is not a directory.
pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<(), Box<FileOpError>> {
    let path = path.as_ref();
    match fs::create_dir_all(path) {
        Ok(()) if path.is_dir() => Ok(()),
        Ok(()) => Err(FileOpError::make_create(
            "output directory",
            path.to_path_buf(),
            ErrorKind::AlreadyExists.into(),
        )),
        Err(error) => Err(FileOpError::make_create(
            "output directory",
            path.to_path_buf(),
            error,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FileOpAction;
    use std::fs;

    #[test]
    fn save_file_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");
        save_file("test", &path, b"longer contents").unwrap();
        save_file("test", &path, b"short").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"short");
    }

    #[test]
    fn ensure_dir_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());

        let file = dir.path().join("file");
        fs::write(&file, b"x").unwrap();
        assert_eq!(ensure_dir(&file).unwrap_err().action, FileOpAction::Create);
    }
}
