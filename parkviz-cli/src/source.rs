//! Filesystem-backed result source.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parkviz_core::{InputFile, ResultSource};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("input {} does not exist", .path.display())]
    Missing { path: PathBuf },
    #[error("failed to list {}", .path.display())]
    ListDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Files and directories named on the command line.
///
/// Directories contribute their `*.json` entries sorted by name. Explicit
/// files keep their argument order; non-JSON ones are passed through by
/// name only so the engine can skip them.
#[derive(Debug, Clone)]
pub struct FsSource {
    inputs: Vec<PathBuf>,
}

impl FsSource {
    pub const fn new(inputs: Vec<PathBuf>) -> Self {
        Self { inputs }
    }
}

impl ResultSource for FsSource {
    type Error = SourceError;

    fn load_files(&self) -> Result<Vec<InputFile>, Self::Error> {
        let mut files = Vec::new();
        for input in &self.inputs {
            if input.is_dir() {
                for path in json_entries(input)? {
                    files.push(read_input(&path)?);
                }
            } else if input.is_file() {
                files.push(read_input(input)?);
            } else {
                return Err(SourceError::Missing {
                    path: input.clone(),
                });
            }
        }
        Ok(files)
    }
}

fn json_entries(dir: &Path) -> Result<Vec<PathBuf>, SourceError> {
    let list_err = |source| SourceError::ListDir {
        path: dir.to_path_buf(),
        source,
    };
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(list_err)? {
        let path = entry.map_err(list_err)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    log::debug!("{}: {} JSON file(s)", dir.display(), paths.len());
    Ok(paths)
}

fn read_input(path: &Path) -> Result<InputFile, SourceError> {
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    if path.extension().is_none_or(|ext| ext != "json") {
        return Ok(InputFile::new(name, String::new()));
    }
    let bytes = fs::read(path).map_err(|source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    // Invalid UTF-8 stays a per-file problem: the replacement characters
    // fail JSON parsing downstream and the batch carries on.
    let contents = String::from_utf8(bytes).unwrap_or_else(|err| {
        log::warn!("{} is not valid UTF-8", path.display());
        String::from_utf8_lossy(err.as_bytes()).into_owned()
    });
    Ok(InputFile::new(name, contents))
}
