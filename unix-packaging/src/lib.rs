// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*!
Native packaging for commercial Unix platforms.

This crate turns a platform independent description of a package (its
files, directories, symbolic links, dependencies, and lifecycle scripts)
into the descriptor files required by a platform's packaging tools, then
drives those tools to produce an installable artifact.

Supported formats:

* AIX Licensed Program Products (`.lpp`), built with `ar` and `backup`.
* HP-UX depots (`.depot`), built with `swpackage`.

Packages are described by [config::Variables] and [model::Sections]. A
[generator::GeneratorRegistry] constructs the [generator::PackageGenerator]
for a [generator::Platform]. External processes are run through a
[command::CommandRunner], so the exact command lines can be inspected
without the platform tools being installed.

```rust,ignore
use unix_packaging::{
    BuildPaths, GeneratorRegistry, PackageInputs, Platform, Sections, SystemCommandRunner,
};

let paths = BuildPaths::new("build/intermediate", "build/target", "build/staging");
let generator = GeneratorRegistry::with_defaults().create(
    Platform::Hpux,
    PackageInputs {
        paths: &paths,
        variables: &variables,
        sections: &sections,
        runner: &SystemCommandRunner,
    },
)?;

generator.generate_package_description_files()?;
generator.build_package()?;
```
*/

pub mod aix;
pub mod command;
pub mod config;
pub mod error;
pub mod finalizer;
pub mod generator;
pub mod hpux;
pub mod io;
pub mod model;
pub mod script;
pub mod size;

#[cfg(test)]
mod testutil;

pub use {
    command::{CommandRunner, Invocation, InvocationOutput, SystemCommandRunner},
    config::{PackageConfig, Variables},
    error::{PackagingError, Result},
    generator::{
        BuildPaths, GeneratorRegistry, PackageGenerator, PackageInputs, Platform,
    },
    model::{
        DirEntry, DirType, FileEntry, FileType, LinkEntry, Ownership, Permissions, Phase,
        Sections, StagedEntry,
    },
};
