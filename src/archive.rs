use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::{Builder, NamedTempFile};
use zip::ZipArchive;

use crate::error::CvmError;
use crate::transport::CvmTransport;

pub const FALLBACK_SCRATCH_DIR: &str = ".cvm-quota-tmp";

#[derive(Debug, Clone)]
pub struct ScratchDir {
    root: Utf8PathBuf,
}

impl ScratchDir {
    pub fn new(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    pub fn resolve(configured: Option<&Utf8Path>) -> Result<Self, CvmError> {
        let root = match configured {
            Some(path) => path.to_path_buf(),
            None => {
                let system = std::env::temp_dir();
                match Utf8PathBuf::from_path_buf(system) {
                    Ok(path) if path.as_std_path().is_dir() => path,
                    _ => Utf8PathBuf::from(FALLBACK_SCRATCH_DIR),
                }
            }
        };
        fs::create_dir_all(root.as_std_path())
            .map_err(|err| CvmError::Filesystem(format!("scratch dir {root}: {err}")))?;
        Ok(Self { root })
    }

    pub fn path(&self) -> &Utf8Path {
        &self.root
    }
}

// Dropping the handle removes the file on early returns.
pub struct DownloadedArchive {
    file: NamedTempFile,
}

impl DownloadedArchive {
    pub fn extract_text(&self) -> Result<String, CvmError> {
        read_single_entry(self.file.path())
    }

    pub fn close(self) -> Result<(), CvmError> {
        self.file
            .close()
            .map_err(|err| CvmError::Filesystem(format!("remove temp archive: {err}")))
    }
}

pub fn download_archive<T: CvmTransport + ?Sized>(
    transport: &T,
    url: &str,
    scratch: &ScratchDir,
) -> Result<DownloadedArchive, CvmError> {
    let bytes = transport.get_bytes(url).map_err(|err| match err {
        CvmError::Fetch(message) => {
            CvmError::Fetch(format!("error getting the last CVM file: {message}"))
        }
        other => other,
    })?;

    let mut file = Builder::new()
        .prefix("cvm_")
        .suffix(".zip")
        .rand_bytes(12)
        .tempfile_in(scratch.path().as_std_path())
        .map_err(|err| CvmError::Filesystem(err.to_string()))?;
    file.write_all(&bytes)
        .and_then(|()| file.flush())
        .map_err(|err| CvmError::Filesystem(err.to_string()))?;
    tracing::debug!(path = %file.path().display(), bytes = bytes.len(), "archive downloaded");

    Ok(DownloadedArchive { file })
}

pub fn fetch_archive_text<T: CvmTransport + ?Sized>(
    transport: &T,
    url: &str,
    scratch: &ScratchDir,
) -> Result<String, CvmError> {
    let archive = download_archive(transport, url, scratch)?;
    let payload = archive.extract_text();
    let cleanup = archive.close();
    match (payload, cleanup) {
        (Ok(text), Ok(())) => Ok(text),
        (Ok(_), Err(err)) => Err(err),
        (Err(err), cleanup) => {
            if let Err(cleanup_err) = cleanup {
                tracing::warn!(error = %cleanup_err, "temp archive left behind");
            }
            Err(err)
        }
    }
}

// Directory entries are skipped; the first file entry is the report.
pub fn read_single_entry(zip_path: &Path) -> Result<String, CvmError> {
    let file = fs::File::open(zip_path)
        .map_err(|err| CvmError::Archive(format!("open zip {}: {err}", zip_path.display())))?;
    let mut archive = ZipArchive::new(file).map_err(|err| CvmError::Archive(err.to_string()))?;

    if archive.len() > 1 {
        tracing::warn!(
            entries = archive.len(),
            "archive has more than one entry, reading the first file"
        );
    }

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|err| CvmError::Archive(err.to_string()))?;
        if entry.is_dir() {
            continue;
        }
        let mut raw = Vec::new();
        entry
            .read_to_end(&mut raw)
            .map_err(|err| CvmError::Archive(err.to_string()))?;
        return Ok(String::from_utf8_lossy(&raw).into_owned());
    }
    Err(CvmError::EmptyArchive)
}
