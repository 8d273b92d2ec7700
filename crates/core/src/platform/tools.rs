use super::DiagnosticTools;
use crate::error::{CoreError, Result};
use serde_json::Value;
use std::{
    env,
    ffi::OsStr,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};
use tracing::trace;

/// Runs diagnostic binaries found on `PATH`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTools;

impl SystemTools {
    pub fn new() -> Self {
        Self
    }
}

impl DiagnosticTools for SystemTools {
    fn locate(&self, program: &str) -> Option<PathBuf> {
        let paths = env::var_os("PATH")?;
        locate_in(&paths, program)
    }

    fn run_json(&self, program: &Path, args: &[&str]) -> Result<Value> {
        trace!(program = %program.display(), ?args, "running diagnostic tool");

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()?;

        if !output.status.success() {
            return Err(CoreError::tool(
                program.display().to_string(),
                output.status.to_string(),
            ));
        }

        Ok(serde_json::from_slice(&output.stdout)?)
    }
}

/// First executable `program` in a `PATH`-style directory list
fn locate_in(paths: &OsStr, program: &str) -> Option<PathBuf> {
    env::split_paths(paths)
        .flat_map(|dir| candidates(&dir, program))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(windows)]
fn candidates(dir: &Path, program: &str) -> Vec<PathBuf> {
    vec![dir.join(format!("{program}.exe")), dir.join(program)]
}

#[cfg(not(windows))]
fn candidates(dir: &Path, program: &str) -> Vec<PathBuf> {
    vec![dir.join(program)]
}
