// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use {
    crate::{
        command::{CommandRunner, Invocation, InvocationOutput},
        config::Variables,
        error::Result,
        model::{DirEntry, DirType, FileEntry, FileType, LinkEntry, Ownership, Permissions},
    },
    std::{cell::RefCell, collections::HashMap},
};

/// A [CommandRunner] that records invocations instead of running them.
///
/// Programs exit 0 with empty output unless a response is registered.
#[derive(Default)]
pub struct RecordingRunner {
    responses: HashMap<String, InvocationOutput>,
    invocations: RefCell<Vec<Invocation>>,
}

impl RecordingRunner {
    pub fn respond(mut self, program: &str, status: i32, stdout: &str) -> Self {
        self.responses.insert(
            program.to_string(),
            InvocationOutput {
                status: Some(status),
                stdout: stdout.as_bytes().to_vec(),
                stderr: vec![],
            },
        );
        self
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.borrow().clone()
    }

    pub fn programs(&self) -> Vec<String> {
        self.invocations
            .borrow()
            .iter()
            .map(|x| x.program.clone())
            .collect()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, invocation: &Invocation) -> Result<InvocationOutput> {
        self.invocations.borrow_mut().push(invocation.clone());

        Ok(self
            .responses
            .get(&invocation.program)
            .cloned()
            .unwrap_or(InvocationOutput {
                status: Some(0),
                ..Default::default()
            }))
    }
}

pub fn variables(pairs: &[(&str, &str)]) -> Variables {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn root_sys(mode: u32) -> Ownership {
    Ownership::new("root", "sys", Permissions(mode))
}

pub fn file(path: &str, file_type: FileType) -> FileEntry {
    FileEntry::new(path, file_type, root_sys(0o644))
}

pub fn dir(path: &str, dir_type: DirType) -> DirEntry {
    DirEntry::new(path, dir_type, root_sys(0o755))
}

pub fn link(path: &str, target: &str) -> LinkEntry {
    LinkEntry::new(path, target, root_sys(0o777))
}
