//! File helpers built on the sequential fold

use crate::core::{BoxFuture, FoldError};
use crate::execution::fold_async;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use thiserror::Error;
use tracing::{debug, info};

/// Failure while concatenating files
#[derive(Debug, Error)]
pub enum ConcatError {
    #[error("Failed to create {}: {source}", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Read(#[from] FoldError<io::Error>),
}

impl ConcatError {
    /// Index of the input file that failed, if an input failed
    pub fn file_index(&self) -> Option<usize> {
        match self {
            ConcatError::Create { .. } => None,
            ConcatError::Read(err) => Some(err.index()),
        }
    }
}

/// Concatenate `files`, in order, into `output`.
///
/// `output` is truncated first. Files are appended one at a time and each is
/// flushed before the next is read; the first unreadable file stops the run.
/// Returns the number of bytes written.
pub async fn concat_files(files: &[PathBuf], output: &Path) -> Result<u64, ConcatError> {
    let writer = File::create(output).await.map_err(|source| ConcatError::Create {
        path: output.to_path_buf(),
        source,
    })?;

    info!("Concatenating {} file(s) into {}", files.len(), output.display());

    let (_, written) = fold_async(files, (writer, 0u64), |(mut writer, written), path| async move {
        let data = tokio::fs::read(path).await?;
        writer.write_all(&data).await?;
        writer.flush().await?;
        debug!("Appended {} ({} bytes)", path.display(), data.len());
        Ok::<_, io::Error>((writer, written + data.len() as u64))
    })
    .await?;

    Ok(written)
}

/// Read the entries of `dir`, sorted by path
async fn read_entries(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut reader = tokio::fs::read_dir(dir).await?;
    let mut entries = Vec::new();
    while let Some(entry) = reader.next_entry().await? {
        entries.push(entry.path());
    }
    entries.sort();
    Ok(entries)
}

fn into_io_error(err: FoldError<io::Error>) -> io::Error {
    match err {
        FoldError::Step { error, .. } => error,
        dropped @ FoldError::ContinuationDropped { .. } => io::Error::new(ErrorKind::Other, dropped.to_string()),
    }
}

/// Remove `path` whatever it is. A path that does not exist is not an error.
pub fn force_delete(path: PathBuf) -> BoxFuture<io::Result<()>> {
    Box::pin(async move {
        let metadata = match tokio::fs::symlink_metadata(&path).await {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(err),
        };

        if metadata.is_dir() {
            return delete_directory(&path).await;
        }

        match tokio::fs::remove_file(&path).await {
            Err(err) if err.kind() != ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        }
    })
}

/// Delete everything inside `dir`, one entry at a time, keeping `dir` itself
pub async fn clean_directory(dir: &Path) -> io::Result<()> {
    let entries = read_entries(dir).await?;
    debug!("Cleaning {} entries from {}", entries.len(), dir.display());

    fold_async(entries, (), |(), entry| force_delete(entry))
        .await
        .map_err(into_io_error)
}

/// Delete `dir` and everything below it. A missing directory is not an error.
pub async fn delete_directory(dir: &Path) -> io::Result<()> {
    match clean_directory(dir).await {
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
        result => result?,
    }

    match tokio::fs::remove_dir(dir).await {
        Err(err) if err.kind() != ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}

/// List files and directories under `dir` in sorted order.
///
/// With `recursive`, each directory is followed by its own listing.
pub fn list_files(dir: PathBuf, recursive: bool) -> BoxFuture<io::Result<Vec<PathBuf>>> {
    Box::pin(async move {
        let entries = read_entries(&dir).await?;

        fold_async(entries, Vec::new(), |mut found: Vec<PathBuf>, entry| async move {
            let metadata = tokio::fs::metadata(&entry).await?;
            found.push(entry.clone());
            if recursive && metadata.is_dir() {
                found.extend(list_files(entry, true).await?);
            }
            Ok::<_, io::Error>(found)
        })
        .await
        .map_err(into_io_error)
    })
}
