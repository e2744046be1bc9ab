// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! HP-UX software depots built with `swpackage`. */

use {
    crate::{
        command::{CommandRunner, Invocation},
        config::PackageConfig,
        error::Result,
        finalizer::write_package_filename,
        generator::{BuildPaths, PackageGenerator, PackageInputs, Platform},
        io::{create_dir_all, write_text},
        model::{Phase, Sections},
        script::ScriptBuilder,
    },
    log::{info, warn},
    std::path::{Path, PathBuf},
};

const SWPACKAGE: &str = "/usr/sbin/swpackage";

/// Minor OS versions at or above this are HP-UX 11i v3.
const HPUX_11IV3_MINOR: u32 = 30;

/// Map an architecture identifier to the tag used in depot filenames.
pub fn architecture_tag(architecture: &str) -> &str {
    if architecture == "pa-risc" {
        "parisc"
    } else {
        architecture
    }
}

/// The HP-UX release tag for a minor OS version.
pub fn os_version_tag(minor: u32) -> &'static str {
    if minor < HPUX_11IV3_MINOR {
        "11iv2"
    } else {
        "11iv3"
    }
}

/// Generates HP-UX depots.
pub struct HpuxDepotGenerator<'a> {
    paths: &'a BuildPaths,
    config: PackageConfig,
    sections: &'a Sections,
    runner: &'a dyn CommandRunner,
    temp_dir: PathBuf,
}

impl<'a> HpuxDepotGenerator<'a> {
    /// Construct an instance, creating its private temporary directory.
    pub fn new(inputs: PackageInputs<'a>) -> Result<Self> {
        let config = PackageConfig::from_variables(inputs.variables)?;
        config.require_architecture()?;
        config.require_vendor()?;
        config.require_description()?;
        config.require_hpux_copyright()?;
        config.require_short_name_prefix()?;
        config.require_shell_header()?;

        let temp_dir = inputs.paths.intermediate_dir.join("pkg-tmp");
        create_dir_all(&temp_dir)?;

        Ok(Self {
            paths: inputs.paths,
            config,
            sections: inputs.sections,
            runner: inputs.runner,
            temp_dir,
        })
    }

    pub fn config(&self) -> &PackageConfig {
        &self.config
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    pub fn specification_path(&self) -> PathBuf {
        self.temp_dir.join("product_specification")
    }

    pub fn configure_path(&self) -> PathBuf {
        self.temp_dir.join("configure.sh")
    }

    pub fn unconfigure_path(&self) -> PathBuf {
        self.temp_dir.join("unconfigure.sh")
    }

    pub fn preinstall_path(&self) -> PathBuf {
        self.temp_dir.join("preinstall.sh")
    }

    pub fn postremove_path(&self) -> PathBuf {
        self.temp_dir.join("postremove.sh")
    }

    /// Content of the `product_specification` file.
    pub fn render_specification(&self) -> Result<String> {
        let config = &self.config;
        let vendor_tag = config.require_short_name_prefix()?;
        let revision = config.fullversion_dashed();
        let machine_type = if config.require_architecture()? == "ia64" {
            "ia64*"
        } else {
            "9000*"
        };

        let mut lines = vec![
            "depot".to_string(),
            "  layout_version   1.0".to_string(),
            String::new(),
            "# Vendor definition:".to_string(),
            "vendor".to_string(),
            format!("  tag           {}", vendor_tag),
            format!("  title         {}", config.require_vendor()?),
            "category".to_string(),
            format!("  tag           {}", config.short_name),
            format!("  revision      {}", revision),
            "end".to_string(),
            String::new(),
            "# Product definition:".to_string(),
            "product".to_string(),
            format!("  tag            {}", config.short_name),
            format!("  revision       {}", revision),
            "  architecture   HP-UX_B.11.00_32/64".to_string(),
            format!("  vendor_tag     {}", vendor_tag),
            String::new(),
            format!("  title          {}", config.short_name),
        ];
        if let Some(release) = &config.release {
            lines.push(format!("  number         {}", release));
        }
        lines.extend([
            format!("  category_tag   {}", config.short_name),
            String::new(),
            format!("  description    {}", config.require_description()?),
            format!("  copyright      {}", config.require_hpux_copyright()?),
            format!("  machine_type   {}", machine_type),
            "  os_name        HP-UX".to_string(),
            "  os_release     ?.11.*".to_string(),
            "  os_version     ?".to_string(),
            String::new(),
            "  directory      /".to_string(),
            "  is_locatable   false".to_string(),
            String::new(),
            "  # Fileset definitions:".to_string(),
            "  fileset".to_string(),
            "    tag          core".to_string(),
            format!("    title        {} Core", config.short_name),
            format!("    revision     {}", revision),
            String::new(),
            "    # Dependencies".to_string(),
        ]);
        lines.extend(
            self.sections
                .dependencies
                .iter()
                .map(|dep| format!("    prerequisites {}", dep)),
        );
        lines.extend([
            "    # Control files:".to_string(),
            format!("    configure     {}", self.configure_path().display()),
            format!("    unconfigure   {}", self.unconfigure_path().display()),
            format!("    preinstall    {}", self.preinstall_path().display()),
            format!("    postremove    {}", self.postremove_path().display()),
            String::new(),
            "    # Files:".to_string(),
        ]);

        let staging_dir = self.paths.staging_dir.display().to_string();
        lines.extend(
            self.sections
                .iter_entries()
                .filter(|entry| entry.is_package_content())
                .map(|entry| {
                    let ownership = entry.ownership();
                    format!(
                        "    file -m {} -o {} -g {} {}{} {}",
                        ownership.permissions,
                        ownership.owner,
                        ownership.group,
                        staging_dir,
                        entry.staged_location(),
                        entry.staged_location()
                    )
                }),
        );

        lines.extend([
            String::new(),
            "  end # core".to_string(),
            String::new(),
            "end  # SD".to_string(),
        ]);

        Ok(lines.into_iter().map(|l| l + "\n").collect())
    }

    fn preinstall_script(&self) -> Result<ScriptBuilder<'_>> {
        Ok(ScriptBuilder::new(self.sections, Phase::Preinstall)
            .header(self.config.require_shell_header()?)
            .backup_conffiles(self.sections))
    }

    fn configure_script(&self) -> Result<ScriptBuilder<'_>> {
        Ok(ScriptBuilder::new(self.sections, Phase::Postinstall)
            .header(self.config.require_shell_header()?)
            .restore_conffiles(self.sections))
    }

    fn generate_scripts(&self) -> Result<()> {
        self.preinstall_script()?.write(&self.preinstall_path())?;
        self.configure_script()?.write(&self.configure_path())?;
        ScriptBuilder::new(self.sections, Phase::Preuninstall).write(&self.unconfigure_path())?;
        ScriptBuilder::new(self.sections, Phase::Postuninstall).write(&self.postremove_path())?;

        Ok(())
    }
}

impl<'a> PackageGenerator for HpuxDepotGenerator<'a> {
    fn platform(&self) -> Platform {
        Platform::Hpux
    }

    fn generate_package_description_files(&self) -> Result<()> {
        write_text(&self.specification_path(), &self.render_specification()?)?;
        self.generate_scripts()
    }

    fn package_filename(&self) -> Result<String> {
        Ok(match &self.config.output_file {
            Some(name) => format!("{}.depot", name),
            None => format!(
                "{}-{}.hpux.{}.{}.depot",
                self.config.short_name,
                self.config.fullversion_dashed(),
                os_version_tag(self.config.require_platform_minor()?),
                architecture_tag(self.config.require_architecture()?)
            ),
        })
    }

    fn build_package(&self) -> Result<Option<String>> {
        let filename = self.package_filename()?;

        if self.config.skip_build {
            warn!("skipping build of {}", filename);
            return Ok(None);
        }

        let depot_path = self.paths.target_dir.join(&filename);
        info!("building {}", depot_path.display());

        let invocation = Invocation::new(SWPACKAGE)
            .arg("-s")
            .arg(self.specification_path().display())
            .args(["-x", "run_as_superuser=false", "-x"])
            .arg(format!(
                "admin_directory={}",
                self.paths.intermediate_dir.display()
            ))
            .args(["-x", "media_type=tape", "@"])
            .arg(depot_path.display());

        self.runner
            .run(&invocation)?
            .check("swpackage returned non-zero status", SWPACKAGE)?;

        write_package_filename(&self.paths.target_dir, &filename)?;

        Ok(Some(filename))
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            config::{
                Variables, DESCRIPTION, HPUX_COPYRIGHT, LONG_NAME, OUTPUTFILE, PFARCH, PFMINOR,
                RELEASE, SHELL_HEADER, SHORT_NAME, SHORT_NAME_PREFIX, SKIP_BUILDING_PACKAGE,
                VENDOR, VERSION,
            },
            error::PackagingError,
            finalizer::PACKAGE_FILENAME_FILE,
            model::{DirType, FileType},
            testutil::{dir, file, link, variables, RecordingRunner},
        },
        indoc::formatdoc,
        tempfile::TempDir,
    };

    struct Fixture {
        _temp: TempDir,
        paths: BuildPaths,
        variables: Variables,
        sections: Sections,
        runner: RecordingRunner,
    }

    impl Fixture {
        fn new(extra: &[(&str, &str)], sections: Sections) -> Result<Self> {
            let temp = TempDir::new()?;
            let paths = BuildPaths::new(
                temp.path().join("intermediate"),
                temp.path().join("target"),
                temp.path().join("staging"),
            );
            std::fs::create_dir_all(&paths.target_dir)?;

            let mut vars = variables(&[
                (SHORT_NAME, "foo"),
                (VERSION, "1.0"),
                (LONG_NAME, "Foo Agent"),
                (RELEASE, "1"),
                (PFARCH, "ia64"),
                (SHORT_NAME_PREFIX, "ACME"),
                (VENDOR, "Acme Corp"),
                (DESCRIPTION, "Foo monitoring agent"),
                (HPUX_COPYRIGHT, "Copyright Acme Corp"),
                (SHELL_HEADER, "#!/bin/sh"),
            ]);
            vars.extend(variables(extra));

            Ok(Self {
                _temp: temp,
                paths,
                variables: vars,
                sections,
                runner: RecordingRunner::default(),
            })
        }

        fn generator(&self) -> Result<HpuxDepotGenerator<'_>> {
            HpuxDepotGenerator::new(PackageInputs {
                paths: &self.paths,
                variables: &self.variables,
                sections: &self.sections,
                runner: &self.runner,
            })
        }
    }

    fn sections() -> Sections {
        Sections {
            files: vec![
                file("/etc/opt/foo/foo.conf", FileType::Conffile),
                file("/opt/foo/bin/foo", FileType::Regular),
                file("/etc/opt/foo/log.conf", FileType::Conffile),
            ],
            directories: vec![
                dir("/opt", DirType::Sysdir),
                dir("/opt/foo", DirType::Regular),
            ],
            links: vec![link("/usr/bin/foo", "/opt/foo/bin/foo")],
            dependencies: vec!["OS-Core.CORE2-KRN,r>=B.11.23".to_string()],
            ..Sections::default()
        }
        .with_script(Phase::Preinstall, ["echo preinstall"])
        .with_script(Phase::Postinstall, ["echo configure"])
        .with_script(Phase::Preuninstall, ["echo unconfigure"])
        .with_script(Phase::Postuninstall, ["echo postremove"])
    }

    #[test]
    fn ia64_scenario() -> Result<()> {
        let fixture = Fixture::new(&[(PFMINOR, "31")], Sections::default())?;
        let generator = fixture.generator()?;

        let spec = generator.render_specification()?;
        assert!(spec.lines().any(|l| l == "  machine_type   ia64*"));
        assert!(spec.lines().any(|l| l == "  number         1"));
        assert_eq!(
            generator.package_filename()?,
            "foo-1.0-1.hpux.11iv3.ia64.depot"
        );

        let fixture = Fixture::new(&[(PFMINOR, "23")], Sections::default())?;
        assert_eq!(
            fixture.generator()?.package_filename()?,
            "foo-1.0-1.hpux.11iv2.ia64.depot"
        );

        Ok(())
    }

    #[test]
    fn parisc() -> Result<()> {
        let mut fixture = Fixture::new(&[(PFMINOR, "11"), (PFARCH, "pa-risc")], sections())?;
        fixture.variables.remove(RELEASE);
        let generator = fixture.generator()?;

        let spec = generator.render_specification()?;
        assert!(spec.lines().any(|l| l == "  machine_type   9000*"));
        assert!(!spec.contains("  number "));
        assert_eq!(generator.package_filename()?, "foo-1.0.hpux.11iv2.parisc.depot");

        Ok(())
    }

    #[test]
    fn tags() {
        assert_eq!(architecture_tag("pa-risc"), "parisc");
        assert_eq!(architecture_tag("ia64"), "ia64");
        assert_eq!(os_version_tag(0), "11iv2");
        assert_eq!(os_version_tag(29), "11iv2");
        assert_eq!(os_version_tag(30), "11iv3");
        assert_eq!(os_version_tag(31), "11iv3");
    }

    #[test]
    fn specification() -> Result<()> {
        let fixture = Fixture::new(&[], sections())?;
        let generator = fixture.generator()?;
        let staging = fixture.paths.staging_dir.display().to_string();

        assert_eq!(
            generator.render_specification()?,
            formatdoc! {"
                depot
                  layout_version   1.0

                # Vendor definition:
                vendor
                  tag           ACME
                  title         Acme Corp
                category
                  tag           foo
                  revision      1.0-1
                end

                # Product definition:
                product
                  tag            foo
                  revision       1.0-1
                  architecture   HP-UX_B.11.00_32/64
                  vendor_tag     ACME

                  title          foo
                  number         1
                  category_tag   foo

                  description    Foo monitoring agent
                  copyright      Copyright Acme Corp
                  machine_type   ia64*
                  os_name        HP-UX
                  os_release     ?.11.*
                  os_version     ?

                  directory      /
                  is_locatable   false

                  # Fileset definitions:
                  fileset
                    tag          core
                    title        foo Core
                    revision     1.0-1

                    # Dependencies
                    prerequisites OS-Core.CORE2-KRN,r>=B.11.23
                    # Control files:
                    configure     {configure}
                    unconfigure   {unconfigure}
                    preinstall    {preinstall}
                    postremove    {postremove}

                    # Files:
                    file -m 644 -o root -g sys {staging}/etc/opt/foo/foo.conf /etc/opt/foo/foo.conf
                    file -m 644 -o root -g sys {staging}/opt/foo/bin/foo /opt/foo/bin/foo
                    file -m 644 -o root -g sys {staging}/etc/opt/foo/log.conf /etc/opt/foo/log.conf
                    file -m 755 -o root -g sys {staging}/opt/foo /opt/foo
                    file -m 777 -o root -g sys {staging}/usr/bin/foo /usr/bin/foo

                  end # core

                end  # SD
                ",
                configure = generator.configure_path().display(),
                unconfigure = generator.unconfigure_path().display(),
                preinstall = generator.preinstall_path().display(),
                postremove = generator.postremove_path().display(),
                staging = staging,
            }
        );

        Ok(())
    }

    #[test]
    fn scripts() -> Result<()> {
        let fixture = Fixture::new(&[(SHELL_HEADER, "#!/usr/bin/sh")], sections())?;
        let generator = fixture.generator()?;
        generator.generate_package_description_files()?;

        let preinstall = std::fs::read_to_string(generator.preinstall_path())?;
        let configure = std::fs::read_to_string(generator.configure_path())?;

        assert!(preinstall.starts_with("#!/usr/bin/sh\n\nBackupConfigurationFile() {\n"));
        assert!(preinstall.ends_with(
            "echo preinstall\n\
             BackupConfigurationFile /etc/opt/foo/foo.conf\n\
             BackupConfigurationFile /etc/opt/foo/log.conf\n\
             exit 0\n"
        ));
        assert!(configure.starts_with("#!/usr/bin/sh\n\nRestoreConfigurationFile() {\n"));
        assert!(configure.ends_with(
            "RestoreConfigurationFile /etc/opt/foo/foo.conf\n\
             RestoreConfigurationFile /etc/opt/foo/log.conf\n\
             echo configure\n\
             exit 0\n"
        ));

        let backups = preinstall
            .lines()
            .filter_map(|l| l.strip_prefix("BackupConfigurationFile "))
            .collect::<Vec<_>>();
        let restores = configure
            .lines()
            .filter_map(|l| l.strip_prefix("RestoreConfigurationFile "))
            .collect::<Vec<_>>();
        assert_eq!(backups.len(), fixture.sections.conffiles().count());
        assert_eq!(backups, restores);

        assert_eq!(
            std::fs::read_to_string(generator.unconfigure_path())?,
            "echo unconfigure\nexit 0\n"
        );
        assert_eq!(
            std::fs::read_to_string(generator.postremove_path())?,
            "echo postremove\nexit 0\n"
        );
        assert!(generator.specification_path().exists());
        assert!(fixture.runner.invocations().is_empty());

        Ok(())
    }

    #[test]
    fn build() -> Result<()> {
        let fixture = Fixture::new(&[(PFMINOR, "31")], sections())?;
        let generator = fixture.generator()?;

        let filename = generator.build_package()?;
        assert_eq!(filename.as_deref(), Some("foo-1.0-1.hpux.11iv3.ia64.depot"));

        let invocations = fixture.runner.invocations();
        assert_eq!(invocations.len(), 1);
        assert_eq!(invocations[0].program, "/usr/sbin/swpackage");
        assert_eq!(
            invocations[0].args,
            vec![
                "-s".to_string(),
                generator.specification_path().display().to_string(),
                "-x".to_string(),
                "run_as_superuser=false".to_string(),
                "-x".to_string(),
                format!(
                    "admin_directory={}",
                    fixture.paths.intermediate_dir.display()
                ),
                "-x".to_string(),
                "media_type=tape".to_string(),
                "@".to_string(),
                fixture
                    .paths
                    .target_dir
                    .join("foo-1.0-1.hpux.11iv3.ia64.depot")
                    .display()
                    .to_string(),
            ]
        );

        let recorded =
            std::fs::read_to_string(fixture.paths.target_dir.join(PACKAGE_FILENAME_FILE))?;
        assert_eq!(recorded.strip_suffix('\n'), filename.as_deref());

        Ok(())
    }

    #[test]
    fn build_with_output_file() -> Result<()> {
        let fixture = Fixture::new(&[(OUTPUTFILE, "foo-custom")], sections())?;

        assert_eq!(
            fixture.generator()?.build_package()?.as_deref(),
            Some("foo-custom.depot")
        );

        Ok(())
    }

    #[test]
    fn build_skipped() -> Result<()> {
        let fixture = Fixture::new(
            &[(PFMINOR, "31"), (SKIP_BUILDING_PACKAGE, "")],
            sections(),
        )?;

        assert_eq!(fixture.generator()?.build_package()?, None);
        assert!(fixture.runner.invocations().is_empty());

        Ok(())
    }

    #[test]
    fn swpackage_failure() -> Result<()> {
        let mut fixture = Fixture::new(&[(PFMINOR, "31")], sections())?;
        fixture.runner = std::mem::take(&mut fixture.runner).respond(SWPACKAGE, 1, "");

        let res = fixture.generator()?.build_package();
        assert!(matches!(
            res,
            Err(PackagingError::ToolFailed {
                step: "swpackage returned non-zero status",
                status: Some(1),
                ..
            })
        ));
        assert!(!fixture.paths.target_dir.join(PACKAGE_FILENAME_FILE).exists());

        Ok(())
    }

    #[test]
    fn architecture_required() -> Result<()> {
        let mut fixture = Fixture::new(&[], sections())?;
        fixture.variables.remove(PFARCH);

        assert!(matches!(
            fixture.generator(),
            Err(PackagingError::MissingVariable(PFARCH))
        ));

        Ok(())
    }

    fn assert_required(key: &'static str) -> Result<()> {
        let mut fixture = Fixture::new(&[], sections())?;
        fixture.variables.remove(key);

        match fixture.generator() {
            Err(PackagingError::MissingVariable(missing)) => assert_eq!(missing, key),
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("{} should be required", key),
        }

        Ok(())
    }

    #[test]
    fn vendor_required() -> Result<()> {
        assert_required(VENDOR)
    }

    #[test]
    fn description_required() -> Result<()> {
        assert_required(DESCRIPTION)
    }

    #[test]
    fn hpux_copyright_required() -> Result<()> {
        assert_required(HPUX_COPYRIGHT)
    }

    #[test]
    fn short_name_prefix_required() -> Result<()> {
        assert_required(SHORT_NAME_PREFIX)
    }

    #[test]
    fn shell_header_required() -> Result<()> {
        assert_required(SHELL_HEADER)
    }

    #[test]
    fn minor_version_required_for_filename() -> Result<()> {
        let fixture = Fixture::new(&[], sections())?;

        assert!(matches!(
            fixture.generator()?.build_package(),
            Err(PackagingError::MissingVariable(PFMINOR))
        ));

        Ok(())
    }
}
