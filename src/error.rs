use crate::{extract::ExtractError, parser::ParseError, verify::VerifyError};
use std::{
    error::Error,
    fmt, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// File actions that are supported by the [`FileOpError`] type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum FileOpAction {
    /// Specifies that an error occurred while trying to create a file.
    Create,
    /// Specifies that an error occurred while writing to a file.
    Write,
}

/// An error type that contains enough information to display an error which occurred during a file
/// I/O operation.
#[derive(Debug)]
pub struct FileOpError {
    /// The action which caused an error.
    pub action: FileOpAction,
    /// The name of the file to be included into the error message.
    pub name: &'static str,
    /// The path to the file on which the I/O operation was performed.
    pub path: PathBuf,
    /// The error returned by the I/O operation.
    pub error: io::Error,
}

impl FileOpError {
    /// Creates a boxed [`FileOpError`].
    pub fn boxed(
        action: FileOpAction,
        name: &'static str,
        path: PathBuf,
        error: io::Error,
    ) -> Box<Self> {
        Box::new(Self {
            action,
            name,
            path,
            error,
        })
    }

    /// Creates a boxed [`FileOpError`] setting action to [`FileOpAction::Create`].
    pub fn make_create(name: &'static str, path: PathBuf, error: io::Error) -> Box<Self> {
        Self::boxed(FileOpAction::Create, name, path, error)
    }

    /// Creates a boxed [`FileOpError`] setting action to [`FileOpAction::Write`].
    pub fn make_write(name: &'static str, path: PathBuf, error: io::Error) -> Box<Self> {
        Self::boxed(FileOpAction::Write, name, path, error)
    }
}

impl fmt::Display for FileOpError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let verb = match self.action {
            FileOpAction::Create => "create",
            FileOpAction::Write => "write",
        };

        write!(
            f,
            "failed to {} {} at path {}: {}",
            verb,
            self.name,
            self.path.display(),
            self.error
        )
    }
}

impl Error for FileOpError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.error)
    }
}

/// A type that describes errors which may end an extraction run.
#[derive(Debug, Error)]
pub enum RunError<'a> {
    /// A catch-all for file creation and write errors outside of partition extraction.
    #[error("{0}")]
    FileOp(#[from] Box<FileOpError>),
    /// An error returned when the PAC file couldn't be opened or measured.
    #[error("cannot open file {}: {}", .0.display(), .1)]
    Open(&'a Path, #[source] io::Error),
    /// An error returned when the header or the partition table is invalid.
    #[error("failed to parse file at {}: {}", .0.display(), .1)]
    Parse(&'a Path, #[source] ParseError),
    /// An error returned when a checksum doesn't match.
    #[error("{0}")]
    Verify(#[from] VerifyError),
    /// An error returned when a partition couldn't be extracted.
    #[error("{0}")]
    Extract(#[from] ExtractError),
    /// An error returned when the manifest couldn't be serialized.
    #[error("failed to serialize the manifest: {0}")]
    Manifest(#[from] toml::ser::Error),
}
