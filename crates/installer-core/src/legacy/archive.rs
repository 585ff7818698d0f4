//! Zip extraction for legacy installs

use crate::error::{InstallError, Result};
use std::path::Path;

/// Whether this build can extract legacy archives
pub const SUPPORTED: bool = cfg!(feature = "legacy");

/// Extract `archive` into `destination`
#[cfg(feature = "legacy")]
pub fn extract(archive: &Path, destination: &Path) -> Result<()> {
    let file = std::fs::File::open(archive)?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| {
        InstallError::service(format!("The downloaded archive could not be read: {}", e))
    })?;

    tracing::debug!(entries = zip.len(), destination = %destination.display(), "extracting archive");
    zip.extract(destination).map_err(|e| {
        InstallError::service(format!("The downloaded archive could not be extracted: {}", e))
    })
}

#[cfg(not(feature = "legacy"))]
pub fn extract(_archive: &Path, _destination: &Path) -> Result<()> {
    Err(InstallError::precondition(
        "Zip support is not available in this build. Please install a build with legacy support and try again.",
    ))
}
