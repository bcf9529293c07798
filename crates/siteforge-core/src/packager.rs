//! Site packaging: bundle -> scratch files -> zip archive.
//!
//! The scratch directory is a `tempfile::TempDir` scoped to this one call
//! and keyed by user id, so no other in-flight turn can touch it. RAII drop
//! removes it on every exit path -- success, write failure, or archive
//! failure -- which rules out cross-user leakage and unbounded disk growth.

use std::fs;
use std::io::{Cursor, Write};

use zip::write::FileOptions;
use zip::ZipWriter;

use siteforge_types::error::PackagingError;
use siteforge_types::site::{SiteArchive, SiteBundle};
use siteforge_types::user::UserId;

/// Archive entry names, in the exact order they are written. Fixed so the
/// resulting archive is deterministic for a given bundle.
pub const ARCHIVE_ENTRIES: [&str; 3] = ["index.html", "style.css", "script.js"];

/// Materialize the bundle as three files in a per-user scratch directory,
/// then produce one zip archive containing exactly those three entries.
///
/// Deterministic in entry set, naming, order, and content bytes given the
/// same bundle.
pub fn package_site(bundle: &SiteBundle, user_id: &UserId) -> Result<SiteArchive, PackagingError> {
    let scratch = tempfile::Builder::new()
        .prefix(&format!("siteforge-{user_id}-"))
        .tempdir()?;

    let contents: [&str; 3] = [&bundle.markup, &bundle.styling, &bundle.script];

    for (name, body) in ARCHIVE_ENTRIES.iter().zip(contents) {
        fs::write(scratch.path().join(name), body)?;
    }

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for name in ARCHIVE_ENTRIES {
        writer
            .start_file(name, options)
            .map_err(|e| PackagingError::Archive(e.to_string()))?;
        let bytes = fs::read(scratch.path().join(name))?;
        writer.write_all(&bytes)?;
    }

    let cursor = writer
        .finish()
        .map_err(|e| PackagingError::Archive(e.to_string()))?;

    Ok(SiteArchive {
        bytes: cursor.into_inner(),
    })
    // `scratch` drops here, removing the working files on every path.
}
