// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Disk usage measurement of a staging tree. */

use {
    crate::{
        command::{CommandRunner, Invocation},
        error::{PackagingError, Result},
    },
    log::debug,
    std::path::{Path, PathBuf},
};

const DU: &str = "du";

/// Space used by a top-level entry of the staging tree.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SizeEntry {
    /// Final path component of the measured entry.
    pub name: String,
    /// Size in the units reported by `du`.
    pub size: u64,
}

/// Top-level entries of a directory, in the order a shell expands `dir/*`.
pub fn top_level_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = format!("{}/*", glob::Pattern::escape(&dir.display().to_string()));

    let options = glob::MatchOptions {
        require_literal_leading_dot: true,
        ..glob::MatchOptions::new()
    };

    let mut paths = vec![];
    for path in glob::glob_with(&pattern, options)? {
        paths.push(path?);
    }

    Ok(paths)
}

/// Parse `du -s` output into size entries.
///
/// Entries keep the order `du` reported them in.
pub fn parse_du_output(output: &str) -> Result<Vec<SizeEntry>> {
    let mut res = vec![];

    for line in output.lines() {
        let malformed = || PackagingError::MalformedToolOutput {
            program: DU.to_string(),
            line: line.to_string(),
        };

        let (size, path) = line.trim().split_once(char::is_whitespace).ok_or_else(malformed)?;
        let size = size.parse::<u64>().map_err(|_| malformed())?;
        let path = path.trim();

        let name = Path::new(path)
            .file_name()
            .ok_or_else(malformed)?
            .to_string_lossy()
            .to_string();

        res.push(SizeEntry { name, size });
    }

    Ok(res)
}

/// Measure the space used by every top-level entry of `staging_dir`.
pub fn measure_staging_tree(
    runner: &dyn CommandRunner,
    staging_dir: &Path,
) -> Result<Vec<SizeEntry>> {
    let entries = top_level_entries(staging_dir)?;
    if entries.is_empty() {
        return Ok(vec![]);
    }

    let invocation = Invocation::new(DU)
        .arg("-s")
        .args(entries.iter().map(|p| p.display()));

    let output = runner.run(&invocation)?;
    let sizes = parse_du_output(&String::from_utf8_lossy(&output.stdout))?;

    for entry in &sizes {
        debug!("{} uses {}", entry.name, entry.size);
    }

    Ok(sizes)
}
