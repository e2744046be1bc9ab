// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Package variables and their resolution into a typed configuration. */

use {
    crate::error::{PackagingError, Result},
    std::collections::BTreeMap,
};

/// Raw variables describing a package, as produced by an installer loader.
pub type Variables = BTreeMap<String, String>;

pub const SHORT_NAME: &str = "SHORT_NAME";
pub const LONG_NAME: &str = "LONG_NAME";
pub const VERSION: &str = "VERSION";
pub const RELEASE: &str = "RELEASE";
pub const VENDOR: &str = "VENDOR";
pub const DESCRIPTION: &str = "DESCRIPTION";
pub const COPYRIGHT_FILE: &str = "COPYRIGHT_FILE";
pub const HPUX_COPYRIGHT: &str = "HPUX_COPYRIGHT";
pub const SHORT_NAME_PREFIX: &str = "SHORT_NAME_PREFIX";
pub const PFARCH: &str = "PFARCH";
pub const PFMAJOR: &str = "PFMAJOR";
pub const PFMINOR: &str = "PFMINOR";
pub const OUTPUTFILE: &str = "OUTPUTFILE";
pub const SKIP_BUILDING_PACKAGE: &str = "SKIP_BUILDING_PACKAGE";
pub const SHELL_HEADER: &str = "SHELL_HEADER";

/// Expand the literal `\n` and `\t` escape sequences used in copyright text.
pub fn expand_escapes(s: &str) -> String {
    s.replace("\\n", "\n").replace("\\t", "\t")
}

/// Package metadata resolved from [Variables].
///
/// Only `SHORT_NAME` and `VERSION` are required by every platform. Generators
/// check the fields they additionally depend on when they are constructed,
/// and the naming fields when a package filename is computed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PackageConfig {
    /// Short package name. Used in filenames and tags.
    pub short_name: String,
    /// Human readable package name.
    pub long_name: Option<String>,
    pub version: String,
    /// Optional release number appended to the version.
    pub release: Option<String>,
    /// Vendor title.
    pub vendor: Option<String>,
    pub description: Option<String>,
    /// Copyright text with escape sequences expanded.
    pub copyright: Option<String>,
    /// HP-UX product copyright line.
    pub hpux_copyright: Option<String>,
    /// Vendor tag.
    pub short_name_prefix: Option<String>,
    /// Target architecture identifier (e.g. `ppc`, `ia64`, `pa-risc`).
    pub architecture: Option<String>,
    /// Major version of the target operating system.
    pub platform_major: Option<String>,
    /// Minor version of the target operating system.
    pub platform_minor: Option<u32>,
    /// Explicit output filename, without the platform extension.
    pub output_file: Option<String>,
    /// Whether invoking the native packaging tool should be skipped.
    pub skip_build: bool,
    /// Interpreter line heading generated scripts that need one.
    pub shell_header: Option<String>,
}

impl PackageConfig {
    /// Resolve an instance from raw variables.
    pub fn from_variables(variables: &Variables) -> Result<Self> {
        let get = |key: &str| variables.get(key).cloned();
        let required = |key: &'static str| get(key).ok_or(PackagingError::MissingVariable(key));

        let short_name = required(SHORT_NAME)?;

        let platform_minor = match variables.get(PFMINOR) {
            Some(value) => Some(value.trim().parse::<u32>().map_err(|e| {
                PackagingError::InvalidVariable {
                    key: PFMINOR,
                    value: value.clone(),
                    reason: e.to_string(),
                }
            })?),
            None => None,
        };

        Ok(Self {
            long_name: get(LONG_NAME),
            version: required(VERSION)?,
            release: get(RELEASE),
            vendor: get(VENDOR),
            description: get(DESCRIPTION),
            copyright: get(COPYRIGHT_FILE).map(|s| expand_escapes(&s)),
            hpux_copyright: get(HPUX_COPYRIGHT),
            short_name_prefix: get(SHORT_NAME_PREFIX),
            architecture: get(PFARCH),
            platform_major: get(PFMAJOR),
            platform_minor,
            output_file: get(OUTPUTFILE),
            skip_build: variables.contains_key(SKIP_BUILDING_PACKAGE),
            shell_header: get(SHELL_HEADER),
            short_name,
        })
    }

    /// Version as it appears in machine read revision fields.
    ///
    /// `VERSION.RELEASE`, or just `VERSION` when there is no release.
    pub fn fullversion(&self) -> String {
        match &self.release {
            Some(release) => format!("{}.{}", self.version, release),
            None => self.version.clone(),
        }
    }

    /// Version as it appears in output filenames.
    ///
    /// `VERSION-RELEASE`, or just `VERSION` when there is no release.
    pub fn fullversion_dashed(&self) -> String {
        match &self.release {
            Some(release) => format!("{}-{}", self.version, release),
            None => self.version.clone(),
        }
    }

    pub fn require_long_name(&self) -> Result<&str> {
        self.long_name
            .as_deref()
            .ok_or(PackagingError::MissingVariable(LONG_NAME))
    }

    pub fn require_vendor(&self) -> Result<&str> {
        self.vendor
            .as_deref()
            .ok_or(PackagingError::MissingVariable(VENDOR))
    }

    pub fn require_description(&self) -> Result<&str> {
        self.description
            .as_deref()
            .ok_or(PackagingError::MissingVariable(DESCRIPTION))
    }

    /// Copyright text, with escape sequences expanded.
    pub fn require_copyright(&self) -> Result<&str> {
        self.copyright
            .as_deref()
            .ok_or(PackagingError::MissingVariable(COPYRIGHT_FILE))
    }

    pub fn require_hpux_copyright(&self) -> Result<&str> {
        self.hpux_copyright
            .as_deref()
            .ok_or(PackagingError::MissingVariable(HPUX_COPYRIGHT))
    }

    pub fn require_short_name_prefix(&self) -> Result<&str> {
        self.short_name_prefix
            .as_deref()
            .ok_or(PackagingError::MissingVariable(SHORT_NAME_PREFIX))
    }

    pub fn require_shell_header(&self) -> Result<&str> {
        self.shell_header
            .as_deref()
            .ok_or(PackagingError::MissingVariable(SHELL_HEADER))
    }

    pub fn require_architecture(&self) -> Result<&str> {
        self.architecture
            .as_deref()
            .ok_or(PackagingError::MissingVariable(PFARCH))
    }

    pub fn require_platform_major(&self) -> Result<&str> {
        self.platform_major
            .as_deref()
            .ok_or(PackagingError::MissingVariable(PFMAJOR))
    }

    pub fn require_platform_minor(&self) -> Result<u32> {
        self.platform_minor
            .ok_or(PackagingError::MissingVariable(PFMINOR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variables(pairs: &[(&str, &str)]) -> Variables {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn versions_without_release() -> Result<()> {
        let config =
            PackageConfig::from_variables(&variables(&[(SHORT_NAME, "foo"), (VERSION, "1.0")]))?;

        assert_eq!(config.fullversion(), "1.0");
        assert_eq!(config.fullversion_dashed(), "1.0");

        Ok(())
    }

    #[test]
    fn versions_with_release() -> Result<()> {
        let config = PackageConfig::from_variables(&variables(&[
            (SHORT_NAME, "foo"),
            (VERSION, "1.0"),
            (RELEASE, "12"),
        ]))?;

        assert_eq!(config.fullversion(), "1.0.12");
        assert_eq!(config.fullversion_dashed(), "1.0-12");

        Ok(())
    }

    #[test]
    fn optional_values_absent() -> Result<()> {
        let config =
            PackageConfig::from_variables(&variables(&[(SHORT_NAME, "foo"), (VERSION, "1.0")]))?;

        assert!(!config.skip_build);
        assert!(config.output_file.is_none());
        assert!(matches!(
            config.require_architecture(),
            Err(PackagingError::MissingVariable(PFARCH))
        ));
        assert!(matches!(
            config.require_short_name_prefix(),
            Err(PackagingError::MissingVariable(SHORT_NAME_PREFIX))
        ));
        assert!(matches!(
            config.require_shell_header(),
            Err(PackagingError::MissingVariable(SHELL_HEADER))
        ));
        assert!(matches!(
            config.require_copyright(),
            Err(PackagingError::MissingVariable(COPYRIGHT_FILE))
        ));

        Ok(())
    }

    #[test]
    fn missing_required() {
        let res = PackageConfig::from_variables(&variables(&[(SHORT_NAME, "foo")]));
        assert!(matches!(res, Err(PackagingError::MissingVariable(VERSION))));

        let res = PackageConfig::from_variables(&variables(&[(VERSION, "1.0")]));
        assert!(matches!(
            res,
            Err(PackagingError::MissingVariable(SHORT_NAME))
        ));
    }

    #[test]
    fn skip_flag_is_presence_checked() -> Result<()> {
        let config = PackageConfig::from_variables(&variables(&[
            (SHORT_NAME, "foo"),
            (VERSION, "1.0"),
            (SKIP_BUILDING_PACKAGE, ""),
        ]))?;
        assert!(config.skip_build);

        Ok(())
    }

    #[test]
    fn invalid_minor_version() {
        let res = PackageConfig::from_variables(&variables(&[
            (SHORT_NAME, "foo"),
            (VERSION, "1.0"),
            (PFMINOR, "v3"),
        ]));
        assert!(matches!(
            res,
            Err(PackagingError::InvalidVariable { key: PFMINOR, .. })
        ));
    }

    #[test]
    fn copyright_escapes() -> Result<()> {
        let config = PackageConfig::from_variables(&variables(&[
            (SHORT_NAME, "foo"),
            (VERSION, "1.0"),
            (COPYRIGHT_FILE, "Copyright (c) Foo\\n\\tAll rights reserved.\\n"),
        ]))?;
        assert_eq!(
            config.require_copyright()?,
            "Copyright (c) Foo\n\tAll rights reserved.\n"
        );

        Ok(())
    }
}
