// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Recording of the produced package filename for downstream tooling. */

use {
    crate::{error::Result, io::write_text},
    log::info,
    std::path::{Path, PathBuf},
};

/// Name of the file in the target directory holding the package filename.
pub const PACKAGE_FILENAME_FILE: &str = "package_filename";

/// Write the package base filename to `<target_dir>/package_filename`.
pub fn write_package_filename(target_dir: &Path, base_filename: &str) -> Result<PathBuf> {
    info!("produced package {}", base_filename);

    let path = target_dir.join(PACKAGE_FILENAME_FILE);
    write_text(&path, &format!("{}\n", base_filename))?;

    Ok(path)
}
