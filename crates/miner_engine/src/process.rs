use std::ffi::OsString;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};

use miner_logging::miner_warn;

use crate::{FinishedWork, SpawnError, Spawner, WorkUnit, WorkerHandle};

/// Runs each unit as `<program> <base_args..> mine-item-data <slug>`.
#[derive(Debug, Clone)]
pub struct ProcessSpawner {
    program: PathBuf,
    base_args: Vec<OsString>,
    subcommand: Vec<OsString>,
}

impl ProcessSpawner {
    pub fn new(program: impl Into<PathBuf>, base_args: Vec<OsString>) -> Self {
        Self {
            program: program.into(),
            base_args,
            subcommand: vec![OsString::from("mine-item-data")],
        }
    }

    /// Re-invoke the running executable.
    pub fn current_exe(base_args: Vec<OsString>) -> Result<Self, SpawnError> {
        let program = std::env::current_exe().map_err(|err| SpawnError {
            unit: "<all>".to_string(),
            message: format!("cannot locate own executable: {err}"),
        })?;
        Ok(Self::new(program, base_args))
    }

    /// Replace the `mine-item-data` subcommand words placed before the slug.
    pub fn with_subcommand(mut self, words: Vec<OsString>) -> Self {
        self.subcommand = words;
        self
    }

    fn command_line(&self, unit: &WorkUnit) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(
            self.base_args
                .iter()
                .chain(&self.subcommand)
                .map(|arg| arg.to_string_lossy().into_owned()),
        );
        parts.push(unit.id.clone());
        parts.join(" ")
    }
}

impl Spawner for ProcessSpawner {
    type Handle = ProcessHandle;

    fn start(&mut self, unit: &WorkUnit) -> Result<ProcessHandle, SpawnError> {
        let spawn_error = |err: std::io::Error| SpawnError {
            unit: unit.id.clone(),
            message: err.to_string(),
        };

        // Output goes to an anonymous temp file so a chatty worker never blocks on a full pipe.
        let capture = tempfile::tempfile().map_err(spawn_error)?;
        let stdout = capture.try_clone().map_err(spawn_error)?;
        let stderr = capture.try_clone().map_err(spawn_error)?;

        let child = Command::new(&self.program)
            .args(&self.base_args)
            .args(&self.subcommand)
            .arg(&unit.id)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .spawn()
            .map_err(spawn_error)?;

        Ok(ProcessHandle {
            child,
            capture,
            command_line: self.command_line(unit),
            status: None,
            wait_error: None,
        })
    }
}

pub struct ProcessHandle {
    child: Child,
    capture: File,
    command_line: String,
    status: Option<ExitStatus>,
    wait_error: Option<String>,
}

impl ProcessHandle {
    fn read_capture(&mut self) -> String {
        let mut bytes = Vec::new();
        let read = self
            .capture
            .seek(SeekFrom::Start(0))
            .and_then(|_| self.capture.read_to_end(&mut bytes));
        if let Err(err) = read {
            miner_warn!("could not read output of {}: {}", self.command_line, err);
        }
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl WorkerHandle for ProcessHandle {
    fn is_running(&mut self) -> bool {
        if self.status.is_some() || self.wait_error.is_some() {
            return false;
        }
        match self.child.try_wait() {
            Ok(Some(status)) => {
                self.status = Some(status);
                false
            }
            Ok(None) => true,
            Err(err) => {
                self.wait_error = Some(err.to_string());
                false
            }
        }
    }

    fn kill(&mut self) {
        if let Err(err) = self.child.kill() {
            miner_warn!("could not kill {}: {}", self.command_line, err);
        }
        match self.child.wait() {
            Ok(status) => self.status = Some(status),
            Err(err) => self.wait_error = Some(err.to_string()),
        }
    }

    fn finish(mut self) -> FinishedWork {
        if self.status.is_none() && self.wait_error.is_none() {
            match self.child.wait() {
                Ok(status) => self.status = Some(status),
                Err(err) => self.wait_error = Some(err.to_string()),
            }
        }
        let output = self.read_capture();
        let (success, message) = match (&self.status, &self.wait_error) {
            (Some(status), _) => (
                status.success(),
                format!("{} exited with {}", self.command_line, status),
            ),
            (None, Some(err)) => (false, format!("{}: {}", self.command_line, err)),
            (None, None) => (false, format!("{}: exit status unknown", self.command_line)),
        };
        FinishedWork {
            success,
            message,
            output,
        }
    }
}
