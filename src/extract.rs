//! Streams partition payloads out of a container into individual files.

use crate::{
    error::FileOpError,
    parser::PartitionDescriptor,
    progress::{self, Progress},
    reader::{PacReader, ReadError},
    util,
    wstr::NarrowString,
};
use std::{
    io::{Read, Seek, Write},
    path::{Component, Path, PathBuf},
};
use thiserror::Error;

/// Size of the chunks partitions are copied in.
pub const CHUNK_LEN: usize = 4096;

/// An error which may occur while extracting partitions.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Returned when a partition's file name would escape the output directory or is empty.
    #[error("partition {index} has an invalid file name {name:?}")]
    InvalidFileName { index: usize, name: NarrowString },
    /// Returned when a partition's payload couldn't be read completely.
    #[error("partition image extraction error: {0}")]
    Read(#[from] ReadError),
    /// Returned when an output file couldn't be created or written.
    #[error("{0}")]
    FileOp(#[from] Box<FileOpError>),
}

/// Interprets the raw bytes of a decoded file name as a path.
#[cfg(unix)]
fn name_path(name: &NarrowString) -> Option<&Path> {
    use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

    Some(Path::new(OsStr::from_bytes(name.as_bytes())))
}

/// Interprets a decoded file name as a path. Names which aren't valid UTF-8 are refused.
#[cfg(not(unix))]
fn name_path(name: &NarrowString) -> Option<&Path> {
    std::str::from_utf8(name.as_bytes()).ok().map(Path::new)
}

/// Joins a partition file name to `out_dir`, refusing anything but a single plain component.
///
/// The name's bytes are used as is, so distinct names always map to distinct paths.
fn output_path(out_dir: &Path, name: &NarrowString) -> Option<PathBuf> {
    let mut components = name_path(name)?.components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(file_name)), None) => Some(out_dir.join(file_name)),
        _ => None,
    }
}

/// Copies a single partition to a file at `path`, creating or truncating it.
///
/// Progress is reported after every chunk. On error the partially written file is left in place.
pub fn extract_partition<R: Read + Seek>(
    reader: &mut PacReader<R>,
    partition: &PartitionDescriptor,
    path: &Path,
    progress: &mut dyn Progress,
) -> Result<(), ExtractError> {
    reader.seek(partition.data_offset)?;
    debug!(
        "Copying {:#x} bytes from {:#x} to {}.",
        partition.size,
        reader.position(),
        path.display()
    );
    let mut file = util::create_file("partition", path)?;

    let total = partition.size;
    let mut left = total;
    let mut buf = [0u8; CHUNK_LEN];

    while left > 0 {
        let len = left.min(CHUNK_LEN as u64) as usize;
        let chunk = &mut buf[..len];
        reader.read_exact(chunk)?;
        file.write_all(chunk)
            .map_err(|error| FileOpError::make_write("partition", path.to_path_buf(), error))?;
        left -= len as u64;
        progress.update(progress::percent(left, total));
    }

    Ok(())
}

/// Extracts every non-empty partition into `out_dir` in table order and returns the written paths.
///
/// All file names are validated before the first file is created. Partitions with a zero size are
/// skipped.
pub fn extract_all<R: Read + Seek>(
    reader: &mut PacReader<R>,
    partitions: &[PartitionDescriptor],
    out_dir: &Path,
    progress: &mut dyn Progress,
) -> Result<Vec<PathBuf>, ExtractError> {
    let mut jobs = Vec::with_capacity(partitions.len());
    for (index, partition) in partitions.iter().enumerate() {
        if partition.size == 0 {
            debug!("Partition {} is empty, skipping.", partition.partition_id);
            continue;
        }

        let path = output_path(out_dir, &partition.file_name).ok_or_else(|| {
            ExtractError::InvalidFileName {
                index,
                name: partition.file_name.clone(),
            }
        })?;
        jobs.push((partition, path));
    }

    let mut written = Vec::with_capacity(jobs.len());
    for (partition, path) in jobs {
        let name = partition.file_name.to_string_lossy();

        progress.start(&name);
        extract_partition(reader, partition, &path, progress)?;
        progress.finish(&name);

        info!("Saved partition {} to {}.", partition.partition_id, path.display());
        written.push(path);
    }

    Ok(written)
}
