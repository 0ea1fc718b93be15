//! CLI command implementations

pub mod check;
pub mod run;
pub mod sample;

use std::fs::File;
use std::path::Path;

use crate::{CliError, Result};

/// Creates an output file, mapping a missing parent directory to `FileNotFound`.
pub(crate) fn create_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            return Err(CliError::FileNotFound(parent.display().to_string()));
        }
    }
    Ok(File::create(path)?)
}
