// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Assembly of lifecycle shell scripts. */

use {
    crate::{
        error::Result,
        io::write_text,
        model::{Phase, Sections},
    },
    std::path::Path,
};

/// Shell function moving a configuration file out of the way before install.
pub const BACKUP_CONFIGURATION_FILE: &str = r#"
BackupConfigurationFile() {
    mv "$1" "$1.swsave" > /dev/null 2>&1
}
"#;

/// Shell function putting a configuration file saved by
/// [BACKUP_CONFIGURATION_FILE] back in place.
pub const RESTORE_CONFIGURATION_FILE: &str = r#"
RestoreConfigurationFile() {
    mv "$1.swsave" "$1"
}
"#;

/// Concatenate lines, terminating each with a newline.
pub fn join_lines<'a>(lines: impl IntoIterator<Item = &'a String>) -> String {
    lines.into_iter().fold(String::new(), |mut acc, line| {
        acc.push_str(line);
        acc.push('\n');
        acc
    })
}

/// Builds the text of a lifecycle script.
///
/// Scripts consist of an optional interpreter header, shell function
/// definitions, lines emitted before the authored body, the authored body,
/// lines emitted after it, and a final `exit 0`.
#[derive(Clone, Debug, Default)]
pub struct ScriptBuilder<'a> {
    header: Option<&'a str>,
    functions: Vec<&'static str>,
    prologue: Vec<String>,
    body: &'a [String],
    epilogue: Vec<String>,
}

impl<'a> ScriptBuilder<'a> {
    /// Start a script whose authored body is the given phase's lines.
    pub fn new(sections: &'a Sections, phase: Phase) -> Self {
        Self {
            body: sections.script(phase),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn header(mut self, header: &'a str) -> Self {
        self.header = Some(header);
        self
    }

    /// Define a shell function ahead of everything else but the header.
    #[must_use]
    pub fn function(mut self, definition: &'static str) -> Self {
        self.functions.push(definition);
        self
    }

    /// Emit `BackupConfigurationFile <path>` for every conffile, after the body.
    #[must_use]
    pub fn backup_conffiles(mut self, sections: &Sections) -> Self {
        self.functions.push(BACKUP_CONFIGURATION_FILE);
        self.epilogue.extend(
            sections
                .conffiles()
                .map(|f| format!("BackupConfigurationFile {}", f.staged_location)),
        );
        self
    }

    /// Emit `RestoreConfigurationFile <path>` for every conffile, before the body.
    #[must_use]
    pub fn restore_conffiles(mut self, sections: &Sections) -> Self {
        self.functions.push(RESTORE_CONFIGURATION_FILE);
        self.prologue.extend(
            sections
                .conffiles()
                .map(|f| format!("RestoreConfigurationFile {}", f.staged_location)),
        );
        self
    }

    /// Obtain the script text.
    pub fn render(&self) -> String {
        let mut s = String::new();

        if let Some(header) = self.header {
            s.push_str(header);
            s.push('\n');
        }
        for function in &self.functions {
            s.push_str(function);
        }
        s.push_str(&join_lines(&self.prologue));
        s.push_str(&join_lines(self.body));
        s.push_str(&join_lines(&self.epilogue));
        s.push_str("exit 0\n");

        s
    }

    /// Write the script text to a path.
    pub fn write(&self, path: &Path) -> Result<()> {
        write_text(path, &self.render())
    }
}
