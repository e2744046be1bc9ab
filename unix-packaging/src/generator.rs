// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Platform package generators and their registry. */

use {
    crate::{
        aix::AixLppGenerator,
        command::CommandRunner,
        config::Variables,
        error::{PackagingError, Result},
        hpux::HpuxDepotGenerator,
        model::Sections,
    },
    std::{
        collections::BTreeMap,
        fmt::{Display, Formatter},
        path::{Path, PathBuf},
        str::FromStr,
    },
};

/// A target platform family.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Platform {
    Aix,
    Hpux,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aix => "aix",
            Self::Hpux => "hpux",
        }
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = PackagingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "aix" => Ok(Self::Aix),
            "hpux" | "hp-ux" => Ok(Self::Hpux),
            _ => Err(PackagingError::UnknownPlatform(s.to_string())),
        }
    }
}

/// Directories a package build operates on.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BuildPaths {
    /// Scratch space. Generators create private directories under it.
    pub intermediate_dir: PathBuf,
    /// Where the package and the `package_filename` record are written.
    pub target_dir: PathBuf,
    /// Tree mirroring the installed filesystem layout.
    pub staging_dir: PathBuf,
}

impl BuildPaths {
    pub fn new(
        intermediate_dir: impl AsRef<Path>,
        target_dir: impl AsRef<Path>,
        staging_dir: impl AsRef<Path>,
    ) -> Self {
        Self {
            intermediate_dir: intermediate_dir.as_ref().to_path_buf(),
            target_dir: target_dir.as_ref().to_path_buf(),
            staging_dir: staging_dir.as_ref().to_path_buf(),
        }
    }
}

/// Everything a generator is constructed from.
#[derive(Clone, Copy)]
pub struct PackageInputs<'a> {
    pub paths: &'a BuildPaths,
    pub variables: &'a Variables,
    pub sections: &'a Sections,
    pub runner: &'a dyn CommandRunner,
}

/// Produces a native package for one platform.
pub trait PackageGenerator {
    fn platform(&self) -> Platform;

    /// Write descriptor files and scripts for the package.
    fn generate_package_description_files(&self) -> Result<()>;

    /// The base filename of the package to produce.
    fn package_filename(&self) -> Result<String>;

    /// Invoke the native packaging tool to produce the package.
    ///
    /// Returns the package base filename, which is also recorded in the
    /// target directory. Returns `None` if building was skipped.
    fn build_package(&self) -> Result<Option<String>>;
}

/// Function constructing a generator.
pub type GeneratorFactory =
    for<'a> fn(PackageInputs<'a>) -> Result<Box<dyn PackageGenerator + 'a>>;

fn create_aix(inputs: PackageInputs<'_>) -> Result<Box<dyn PackageGenerator + '_>> {
    Ok(Box::new(AixLppGenerator::new(inputs)?))
}

fn create_hpux(inputs: PackageInputs<'_>) -> Result<Box<dyn PackageGenerator + '_>> {
    Ok(Box::new(HpuxDepotGenerator::new(inputs)?))
}

/// Maps platforms to the generators producing their packages.
#[derive(Clone, Default)]
pub struct GeneratorRegistry {
    factories: BTreeMap<Platform, GeneratorFactory>,
}

impl GeneratorRegistry {
    /// A registry knowing about every generator in this crate.
    pub fn with_defaults() -> Self {
        let mut registry = Self::default();
        registry.register(Platform::Aix, create_aix);
        registry.register(Platform::Hpux, create_hpux);

        registry
    }

    /// Register a generator, replacing any existing one for the platform.
    pub fn register(&mut self, platform: Platform, factory: GeneratorFactory) {
        self.factories.insert(platform, factory);
    }

    pub fn platforms(&self) -> impl Iterator<Item = Platform> + '_ {
        self.factories.keys().copied()
    }

    /// Construct the generator for a platform.
    pub fn create<'a>(
        &self,
        platform: Platform,
        inputs: PackageInputs<'a>,
    ) -> Result<Box<dyn PackageGenerator + 'a>> {
        let factory = self
            .factories
            .get(&platform)
            .ok_or(PackagingError::UnregisteredPlatform(platform))?;

        factory(inputs)
    }
}

/// Generate descriptor files then build the package.
pub fn run(generator: &dyn PackageGenerator) -> Result<Option<String>> {
    generator.generate_package_description_files()?;
    generator.build_package()
}

/// Like [run], but print a diagnostic and exit the process on failure.
pub fn run_or_exit(generator: &dyn PackageGenerator) -> Option<String> {
    match run(generator) {
        Ok(filename) => filename,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
