// src/discover/mod.rs

use anyhow::{Context, Result};
use glob::glob;
use std::path::{Path, PathBuf};
use tracing::warn;

/// The two workbook formats we accept, derived from the file extension.
/// `Xlsx` is the zipped-XML format, `Xls` the legacy binary one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Xlsx,
    Xls,
}

impl SheetFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())?
            .to_ascii_lowercase()
            .as_str()
        {
            "xlsx" => Some(SheetFormat::Xlsx),
            "xls" => Some(SheetFormat::Xls),
            _ => None,
        }
    }
}

const WORKBOOK_PATTERNS: &[&str] = &["*.xlsx", "*.xls"];

/// List every workbook under `dir`, one glob pattern at a time, in directory
/// listing order within each pattern. Errors out if `dir` is not an existing
/// directory; nothing else has been touched at that point, so the whole run
/// can abort cleanly.
pub fn find_workbooks(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!(
            "excel dir `{}` does not exist or is not a directory",
            dir.display()
        );
    }

    let mut files = Vec::new();
    for pattern in WORKBOOK_PATTERNS {
        let full_pattern = format!("{}/{}", dir.display(), pattern);
        for entry in glob(&full_pattern).context("invalid glob pattern for workbook scan")? {
            match entry {
                Ok(path) if path.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => warn!(error = %e, "cannot read glob entry"),
            }
        }
    }
    Ok(files)
}
