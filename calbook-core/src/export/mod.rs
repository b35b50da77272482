//! Writing a calendar out to files other calendar apps can import.

mod csv;
mod ics;

use std::path::{Path, PathBuf};

use tracing::info;

use crate::calendar::Calendar;
use crate::error::{CalbookError, CalbookResult};

pub use csv::generate_csv;
pub use ics::generate_ics;

/// Export file formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Ics,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> CalbookResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("csv") => Ok(ExportFormat::Csv),
            Some("ics") | Some("ical") => Ok(ExportFormat::Ics),
            _ => Err(CalbookError::Export(format!(
                "can't tell the format of '{}'. Use a .csv or .ics file name",
                path.display()
            ))),
        }
    }

    pub fn render(self, calendar: &Calendar) -> CalbookResult<String> {
        match self {
            ExportFormat::Csv => Ok(generate_csv(calendar)),
            ExportFormat::Ics => generate_ics(calendar),
        }
    }
}

/// Write every event of `calendar` to `path`, creating parent directories
/// as needed. Returns the absolute path written.
pub fn export_to_path(calendar: &Calendar, path: &Path) -> CalbookResult<PathBuf> {
    let format = ExportFormat::from_path(path)?;
    let contents = format.render(calendar)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)?;

    let written = std::fs::canonicalize(path)?;
    info!(
        calendar = calendar.name(),
        events = calendar.len(),
        path = %written.display(),
        "exported calendar"
    );
    Ok(written)
}
