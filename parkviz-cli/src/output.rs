//! On-disk batch outputs and report destinations.
use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};

use parkviz_core::BatchOutput;
use parkviz_core::constants::{MANIFEST_FILE_NAME, RENDER_REQUESTS_FILE_NAME};

/// `YYYYMMDD-HHMMSS_park_images`, relative to the working directory.
pub fn default_output_dir<Tz>(now: &DateTime<Tz>) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    PathBuf::from(format!("{}_park_images", now.format("%Y%m%d-%H%M%S")))
}

/// Write the manifest and the render requests into `dir`.
pub fn write_batch_files(dir: &Path, output: &BatchOutput) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let manifest_path = dir.join(MANIFEST_FILE_NAME);
    write_json(&manifest_path, &output.manifest)?;
    let requests_path = dir.join(RENDER_REQUESTS_FILE_NAME);
    write_json(&requests_path, &output.render_requests)?;
    log::info!("wrote batch outputs to {}", dir.display());
    Ok(vec![manifest_path, requests_path])
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("failed to serialize {}", path.display()))?;
    writeln!(writer)?;
    writer
        .flush()
        .with_context(|| format!("failed to write {}", path.display()))
}

/// Where a report goes: stdout, or a file created before the batch runs.
pub struct ReportSink {
    inner: BufWriter<Box<dyn Write>>,
    destination: String,
}

impl ReportSink {
    pub fn open(path: Option<&Path>) -> Result<Self> {
        let (inner, destination): (Box<dyn Write>, String) = match path {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("failed to create {}", path.display()))?;
                (Box::new(file), path.display().to_string())
            }
            None => (Box::new(stdout()), "stdout".to_string()),
        };
        Ok(Self {
            inner: BufWriter::new(inner),
            destination,
        })
    }

    /// Flush buffered report text, naming the destination on failure.
    pub fn finish(mut self) -> Result<()> {
        self.inner
            .flush()
            .with_context(|| format!("failed to write report to {}", self.destination))
    }
}

impl Write for ReportSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
