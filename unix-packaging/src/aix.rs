// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! AIX Licensed Program Product (LPP) packages.

An LPP is a `backup` format archive of the staging tree. Its first member is
an `lpp_name` file describing the fileset, and the fileset's installation
metadata lives in a `liblpp.a` archive at `usr/lpp/<fileset>/liblpp.a`.
*/

use {
    crate::{
        command::{CommandRunner, Invocation},
        config::PackageConfig,
        error::{PackagingError, Result},
        finalizer::write_package_filename,
        generator::{BuildPaths, PackageGenerator, PackageInputs, Platform},
        io::{create_dir_all, write_text},
        model::{Phase, Sections, StagedEntry},
        script::ScriptBuilder,
        size::{measure_staging_tree, top_level_entries, SizeEntry},
    },
    log::{info, warn},
    std::path::{Path, PathBuf},
    walkdir::WalkDir,
};

const LPP_NAME: &str = "lpp_name";

/// Script filename suffixes and the phases they run.
const SCRIPTS: [(&str, Phase); 5] = [
    ("pre_i", Phase::Preinstall),
    ("pre_rm", Phase::Preupgrade),
    ("config", Phase::Postinstall),
    ("unconfig", Phase::Preuninstall),
    ("unpost_i", Phase::Postuninstall),
];

/// Generates AIX LPP packages.
pub struct AixLppGenerator<'a> {
    paths: &'a BuildPaths,
    config: PackageConfig,
    sections: &'a Sections,
    runner: &'a dyn CommandRunner,
    temp_dir: PathBuf,
    fileset_name: String,
}

impl<'a> AixLppGenerator<'a> {
    /// Construct an instance, creating its private temporary directory.
    pub fn new(inputs: PackageInputs<'a>) -> Result<Self> {
        let config = PackageConfig::from_variables(inputs.variables)?;
        config.require_long_name()?;
        config.require_copyright()?;

        let temp_dir = inputs.paths.intermediate_dir.join("lpp-tmp");
        create_dir_all(&temp_dir)?;

        let fileset_name = format!("{}.rte", config.short_name);

        Ok(Self {
            paths: inputs.paths,
            config,
            sections: inputs.sections,
            runner: inputs.runner,
            temp_dir,
            fileset_name,
        })
    }

    pub fn config(&self) -> &PackageConfig {
        &self.config
    }

    /// Name of the fileset. `<short name>.rte`.
    pub fn fileset_name(&self) -> &str {
        &self.fileset_name
    }

    /// Directory holding the members of `liblpp.a`.
    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    pub fn lpp_name_path(&self) -> PathBuf {
        self.paths.staging_dir.join(LPP_NAME)
    }

    pub fn liblpp_path(&self) -> PathBuf {
        self.paths
            .staging_dir
            .join("usr")
            .join("lpp")
            .join(&self.fileset_name)
            .join("liblpp.a")
    }

    /// Path of a `<fileset>.<suffix>` file in the temporary directory.
    pub fn fileset_file_path(&self, suffix: &str) -> PathBuf {
        self.temp_dir.join(format!("{}.{}", self.fileset_name, suffix))
    }

    pub fn productid_path(&self) -> PathBuf {
        self.temp_dir.join("productid")
    }

    /// Content of the `lpp_name` file.
    pub fn render_lpp_name(&self, sizes: &[SizeEntry]) -> Result<String> {
        let mut s = format!("4 R I {} {{\n", self.fileset_name);
        s.push_str(&format!(
            "{} {} 1 N U en_US {}\n",
            self.fileset_name,
            self.config.fullversion(),
            self.config.require_long_name()?
        ));
        s.push_str("[\n");
        for dep in &self.sections.dependencies {
            s.push_str(dep);
            s.push('\n');
        }
        s.push_str("%\n");
        s.push_str(&render_sizes(sizes));
        s.push_str("%\n%\n%\n");
        s.push_str("]\n}\n");

        Ok(s)
    }

    /// Content of the `.al` file listing archive members.
    ///
    /// `./lpp_name` comes first, then package directories, files, and links.
    pub fn render_al(&self) -> String {
        let mut lines = vec![format!("./{}", LPP_NAME)];

        lines.extend(
            self.sections
                .directories
                .iter()
                .filter(|d| d.is_package_content())
                .map(|d| d.dotted_location()),
        );
        lines.extend(self.sections.files.iter().map(|f| f.dotted_location()));
        lines.extend(self.sections.links.iter().map(|l| l.dotted_location()));

        lines.into_iter().map(|l| l + "\n").collect()
    }

    /// Content of the `.cfgfiles` file listing configuration files to preserve.
    pub fn render_cfgfiles(&self) -> String {
        self.sections
            .conffiles()
            .map(|f| format!("{} preserve\n", f.dotted_location()))
            .collect()
    }

    /// Content of the `.inventory` file.
    pub fn render_inventory(&self) -> String {
        let mut s = String::new();

        for d in &self.sections.directories {
            push_inventory_header(&mut s, d);
            s.push_str(&format!("   class = apply,inventory,{}\n", self.fileset_name));
            s.push_str("   type = DIRECTORY\n\n");
        }

        for f in &self.sections.files {
            push_inventory_header(&mut s, f);
            s.push_str("   type = FILE\n");
            s.push_str("   size = \n");
            s.push_str("   checksum = \n\n");
        }

        for l in &self.sections.links {
            push_inventory_header(&mut s, l);
            s.push_str("   type = SYMLINK\n");
            s.push_str(&format!("   target = {}\n\n", l.base_location));
        }

        s
    }

    /// Content of the `productid` file.
    pub fn render_productid(&self) -> String {
        format!("{},{}", self.config.short_name, self.config.fullversion())
    }

    fn generate_scripts(&self) -> Result<()> {
        for (suffix, phase) in SCRIPTS {
            ScriptBuilder::new(self.sections, phase).write(&self.fileset_file_path(suffix))?;
        }

        Ok(())
    }

    fn generate_liblpp(&self, sizes: &[SizeEntry]) -> Result<()> {
        write_text(&self.fileset_file_path("al"), &self.render_al())?;
        write_text(&self.fileset_file_path("cfgfiles"), &self.render_cfgfiles())?;
        write_text(&self.fileset_file_path("copyright"), self.config.require_copyright()?)?;
        write_text(&self.fileset_file_path("inventory"), &self.render_inventory())?;
        write_text(&self.fileset_file_path("size"), &render_sizes(sizes))?;
        write_text(&self.productid_path(), &self.render_productid())?;

        let invocation = Invocation::new("ar")
            .arg("-vqg")
            .arg(self.liblpp_path().display())
            .args(top_level_entries(&self.temp_dir)?.iter().map(|p| p.display()))
            .arg(self.lpp_name_path().display());

        self.runner
            .run(&invocation)?
            .check("unable to create lpp package", "ar")?;

        Ok(())
    }

    /// Content fed to `backup` on stdin: every path in the staging tree.
    ///
    /// `./lpp_name` is listed first. Other paths follow in file name order.
    pub fn backup_file_list(&self) -> Result<String> {
        let lpp_name_path = self.lpp_name_path();
        if !lpp_name_path.is_file() {
            return Err(PackagingError::io_path(
                lpp_name_path,
                std::io::ErrorKind::NotFound.into(),
            ));
        }

        let staging_dir = &self.paths.staging_dir;
        let mut s = format!("./{}\n", LPP_NAME);

        for entry in WalkDir::new(staging_dir).min_depth(1).sort_by_file_name() {
            let entry = entry?;
            let rel_path = match entry.path().strip_prefix(staging_dir) {
                Ok(p) => p,
                Err(_) => continue,
            };

            if rel_path == Path::new(LPP_NAME) {
                continue;
            }

            s.push_str(&format!("./{}\n", rel_path.display()));
        }

        Ok(s)
    }
}

fn render_sizes(sizes: &[SizeEntry]) -> String {
    sizes
        .iter()
        .map(|e| format!("/{} {}\n", e.name, e.size))
        .collect()
}

fn push_inventory_header(s: &mut String, entry: &dyn StagedEntry) {
    let ownership = entry.ownership();

    s.push_str(&format!("{}:\n", entry.staged_location()));
    s.push_str(&format!("   owner = {}\n", ownership.owner));
    s.push_str(&format!("   group = {}\n", ownership.group));
    s.push_str(&format!("   mode = {}\n", ownership.permissions));
}

impl<'a> PackageGenerator for AixLppGenerator<'a> {
    fn platform(&self) -> Platform {
        Platform::Aix
    }

    fn generate_package_description_files(&self) -> Result<()> {
        self.generate_scripts()?;

        // Staging content written below must exist before it is measured.
        write_text(&self.lpp_name_path(), "")?;
        if let Some(parent) = self.liblpp_path().parent() {
            create_dir_all(parent)?;
        }

        let sizes = measure_staging_tree(self.runner, &self.paths.staging_dir)?;
        write_text(&self.lpp_name_path(), &self.render_lpp_name(&sizes)?)?;

        self.generate_liblpp(&sizes)
    }

    fn package_filename(&self) -> Result<String> {
        Ok(match &self.config.output_file {
            Some(name) => format!("{}.lpp", name),
            None => format!(
                "{}-{}.aix.{}.{}.lpp",
                self.config.short_name,
                self.config.fullversion_dashed(),
                self.config.require_platform_major()?,
                self.config.require_architecture()?
            ),
        })
    }

    fn build_package(&self) -> Result<Option<String>> {
        let filename = self.package_filename()?;

        if self.config.skip_build {
            warn!("skipping build of {}", filename);
            return Ok(None);
        }

        let lpp_path = self.paths.target_dir.join(&filename);
        info!("building {}", lpp_path.display());

        let invocation = Invocation::new("backup")
            .arg("-ivqf")
            .arg(lpp_path.display())
            .dir(&self.paths.staging_dir)
            .stdin(self.backup_file_list()?);

        self.runner
            .run(&invocation)?
            .check("unable to create lpp file", "backup")?;

        write_package_filename(&self.paths.target_dir, &filename)?;

        Ok(Some(filename))
    }
}
