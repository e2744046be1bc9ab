// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Platform independent description of package content. */

use {
    crate::error::{PackagingError, Result},
    std::{
        collections::BTreeMap,
        fmt::{Display, Formatter},
        str::FromStr,
    },
};

/// A POSIX permission mode, rendered in octal without a leading zero.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Permissions(pub u32);

impl Display for Permissions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:o}", self.0)
    }
}

impl FromStr for Permissions {
    type Err = PackagingError;

    fn from_str(s: &str) -> Result<Self> {
        u32::from_str_radix(s, 8)
            .map(Self)
            .map_err(|_| PackagingError::InvalidPermissions(s.to_string()))
    }
}

/// Classification of a [FileEntry].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum FileType {
    #[default]
    Regular,
    /// A configuration file whose local modifications survive reinstalls.
    Conffile,
}

impl FromStr for FileType {
    type Err = PackagingError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" => Ok(Self::Regular),
            "conffile" => Ok(Self::Conffile),
            _ => Err(PackagingError::UnknownEntryType(s.to_string())),
        }
    }
}

/// Classification of a [DirEntry].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum DirType {
    #[default]
    Regular,
    /// A pre-existing system directory not owned by the package.
    Sysdir,
}

impl FromStr for DirType {
    type Err = PackagingError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" => Ok(Self::Regular),
            "sysdir" => Ok(Self::Sysdir),
            _ => Err(PackagingError::UnknownEntryType(s.to_string())),
        }
    }
}

/// Ownership and mode shared by every staged entry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ownership {
    pub owner: String,
    pub group: String,
    pub permissions: Permissions,
}

impl Ownership {
    pub fn new(owner: impl ToString, group: impl ToString, permissions: Permissions) -> Self {
        Self {
            owner: owner.to_string(),
            group: group.to_string(),
            permissions,
        }
    }
}

/// Common view of files, directories, and links in the staging tree.
pub trait StagedEntry {
    /// Absolute path of the entry as installed, e.g. `/etc/foo.conf`.
    fn staged_location(&self) -> &str;

    fn ownership(&self) -> &Ownership;

    /// Whether the entry is content owned by the package.
    ///
    /// System directories exist before the package is installed and are
    /// excluded from content listings.
    fn is_package_content(&self) -> bool {
        true
    }

    /// The staged location relative to the staging root, e.g. `./etc/foo.conf`.
    fn dotted_location(&self) -> String {
        format!(".{}", self.staged_location())
    }
}

/// A regular file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileEntry {
    pub staged_location: String,
    pub file_type: FileType,
    pub ownership: Ownership,
}

impl FileEntry {
    pub fn new(staged_location: impl ToString, file_type: FileType, ownership: Ownership) -> Self {
        Self {
            staged_location: staged_location.to_string(),
            file_type,
            ownership,
        }
    }

    pub fn is_conffile(&self) -> bool {
        self.file_type == FileType::Conffile
    }
}

impl StagedEntry for FileEntry {
    fn staged_location(&self) -> &str {
        &self.staged_location
    }

    fn ownership(&self) -> &Ownership {
        &self.ownership
    }
}

/// A directory.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DirEntry {
    pub staged_location: String,
    pub dir_type: DirType,
    pub ownership: Ownership,
}

impl DirEntry {
    pub fn new(staged_location: impl ToString, dir_type: DirType, ownership: Ownership) -> Self {
        Self {
            staged_location: staged_location.to_string(),
            dir_type,
            ownership,
        }
    }
}

impl StagedEntry for DirEntry {
    fn staged_location(&self) -> &str {
        &self.staged_location
    }

    fn ownership(&self) -> &Ownership {
        &self.ownership
    }

    fn is_package_content(&self) -> bool {
        self.dir_type != DirType::Sysdir
    }
}

/// A symbolic link.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LinkEntry {
    pub staged_location: String,
    /// Target of the link.
    pub base_location: String,
    pub ownership: Ownership,
}

impl LinkEntry {
    pub fn new(
        staged_location: impl ToString,
        base_location: impl ToString,
        ownership: Ownership,
    ) -> Self {
        Self {
            staged_location: staged_location.to_string(),
            base_location: base_location.to_string(),
            ownership,
        }
    }
}

impl StagedEntry for LinkEntry {
    fn staged_location(&self) -> &str {
        &self.staged_location
    }

    fn ownership(&self) -> &Ownership {
        &self.ownership
    }
}

/// A package lifecycle phase having an authored script.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Phase {
    Preinstall,
    Postinstall,
    Preuninstall,
    Postuninstall,
    Preupgrade,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preinstall => "Preinstall",
            Self::Postinstall => "Postinstall",
            Self::Preuninstall => "Preuninstall",
            Self::Postuninstall => "Postuninstall",
            Self::Preupgrade => "Preupgrade",
        }
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The named sections of a package description.
///
/// Entries keep the order they were authored in. Every generator emits them
/// in that order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Sections {
    pub files: Vec<FileEntry>,
    pub directories: Vec<DirEntry>,
    pub links: Vec<LinkEntry>,
    /// Platform formatted dependency expressions, emitted verbatim.
    pub dependencies: Vec<String>,
    pub scripts: BTreeMap<Phase, Vec<String>>,
}

impl Sections {
    /// Lines of the script for a lifecycle phase.
    ///
    /// A phase without an authored script has no lines.
    pub fn script(&self, phase: Phase) -> &[String] {
        self.scripts.get(&phase).map(|x| x.as_slice()).unwrap_or(&[])
    }

    /// Register script lines for a lifecycle phase, replacing existing ones.
    #[must_use]
    pub fn with_script(
        mut self,
        phase: Phase,
        lines: impl IntoIterator<Item = impl ToString>,
    ) -> Self {
        self.scripts
            .insert(phase, lines.into_iter().map(|x| x.to_string()).collect());
        self
    }

    /// Files marked as configuration files.
    pub fn conffiles(&self) -> impl Iterator<Item = &FileEntry> {
        self.files.iter().filter(|f| f.is_conffile())
    }

    /// Files, then directories, then links.
    pub fn iter_entries(&self) -> impl Iterator<Item = &dyn StagedEntry> {
        self.files
            .iter()
            .map(|x| x as &dyn StagedEntry)
            .chain(self.directories.iter().map(|x| x as &dyn StagedEntry))
            .chain(self.links.iter().map(|x| x as &dyn StagedEntry))
    }
}
