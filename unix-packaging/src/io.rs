// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! I/O helpers. */

use {
    crate::error::{PackagingError, Result},
    log::info,
    std::path::Path,
};

/// Write text to a file, replacing existing content.
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    info!("writing {}", path.display());
    std::fs::write(path, content).map_err(|e| PackagingError::io_path(path, e))
}

/// Create a directory and any missing parents.
pub fn create_dir_all(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|e| PackagingError::io_path(path, e))
}
