//! Render output: optional zip wrapping and durable file persistence.

use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[cfg(not(target_arch = "wasm32"))]
use std::path::{Path, PathBuf};

use zip::write::FileOptions;

use crate::package::XlsxError;

/// Cooperative cancellation for save calls.
///
/// Cloned tokens share one flag. Cancellation is only observed at I/O
/// boundaries; an in-flight XML rewrite always runs to completion.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), XlsxError> {
        if self.is_cancelled() {
            Err(XlsxError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// A finished render, named but not yet on disk.
#[derive(Debug, Clone)]
pub struct Output {
    /// Base name without extension.
    pub name: String,
    /// The rendered workbook bytes.
    pub bytes: Vec<u8>,
    /// Wrap the workbook in an outer zip archive when persisting.
    pub zipped: bool,
}

impl Output {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
            zipped: false,
        }
    }

    pub fn zipped(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
            zipped: true,
        }
    }

    /// File name this output persists under; the extension follows `zipped`.
    pub fn file_name(&self) -> String {
        if self.zipped {
            format!("{}.zip", self.name)
        } else {
            format!("{}.xlsx", self.name)
        }
    }

    /// Bytes to persist. Zipped outputs wrap the workbook in an archive
    /// holding a single `<name>.xlsx` entry.
    pub fn into_bytes(self) -> Result<Vec<u8>, XlsxError> {
        if !self.zipped {
            return Ok(self.bytes);
        }
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut buffer);
            let options =
                FileOptions::<()>::default().compression_method(zip::CompressionMethod::Deflated);
            zip.start_file(format!("{}.xlsx", self.name), options)?;
            zip.write_all(&self.bytes)?;
            zip.finish()?;
        }
        Ok(buffer.into_inner())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SaveOptions {
    /// Create missing directories on the target path.
    pub create_directories: bool,
}

/// Persist an output into `directory`, atomically.
///
/// The bytes land in a temporary sibling first and are renamed over the final
/// path, so a crash or cancellation never leaves a partial file behind.
#[cfg(not(target_arch = "wasm32"))]
pub fn save_to_file(
    output: Output,
    directory: &Path,
    options: &SaveOptions,
    cancel: &CancelToken,
) -> Result<PathBuf, XlsxError> {
    cancel.check()?;
    if options.create_directories {
        std::fs::create_dir_all(directory)?;
    }
    let path = directory.join(output.file_name());
    let bytes = output.into_bytes()?;
    cancel.check()?;

    let mut tmp = tempfile::NamedTempFile::new_in(directory)?;
    tmp.write_all(&bytes)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(&path).map_err(|err| XlsxError::Io(err.error))?;
    Ok(path)
}

/// Async variant of [`save_to_file`], using a sibling `.tmp` file and rename.
#[cfg(not(target_arch = "wasm32"))]
pub async fn save_to_file_async(
    output: Output,
    directory: &Path,
    options: &SaveOptions,
    cancel: &CancelToken,
) -> Result<PathBuf, XlsxError> {
    cancel.check()?;
    if options.create_directories {
        tokio::fs::create_dir_all(directory).await?;
    }
    let file_name = output.file_name();
    let path = directory.join(&file_name);
    let tmp = directory.join(format!("{file_name}.tmp"));
    let bytes = output.into_bytes()?;
    cancel.check()?;

    tokio::fs::write(&tmp, &bytes).await?;
    if cancel.is_cancelled() {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(XlsxError::Cancelled);
    }
    tokio::fs::rename(&tmp, &path).await?;
    Ok(path)
}
