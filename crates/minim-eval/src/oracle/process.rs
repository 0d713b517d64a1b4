//! Software-environment oracles.

use super::EnvironmentOracle;
use crate::error::EnvironmentError;
use async_trait::async_trait;
use tokio::process::Command;

/// Runs commands as child processes.
///
/// The command is split on whitespace into a program and its arguments; no
/// shell is involved. Output is stdout followed by stderr, since many tools
/// print version banners to stderr. The child is killed if the call is
/// dropped, which is how the per-call timeout stops it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironmentOracle;

#[async_trait]
impl EnvironmentOracle for ProcessEnvironmentOracle {
    async fn run(&self, command: &str) -> Result<String, EnvironmentError> {
        let mut words = command.split_whitespace();
        let program = words.next().ok_or(EnvironmentError::EmptyCommand)?;

        let output = Command::new(program)
            .args(words)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| EnvironmentError::Spawn {
                program: program.to_string(),
                reason: e.to_string(),
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            return Err(EnvironmentError::Exit {
                code: output.status.code(),
                stderr,
            });
        }
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&stderr);
        Ok(text)
    }
}

/// Refuses every command. Used unless `allow_commands` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledEnvironmentOracle;

#[async_trait]
impl EnvironmentOracle for DisabledEnvironmentOracle {
    async fn run(&self, _command: &str) -> Result<String, EnvironmentError> {
        Err(EnvironmentError::Disabled)
    }
}
