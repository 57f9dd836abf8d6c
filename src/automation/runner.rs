//! Command runner
//!
//! Runs one shell command per call with a hard timeout. Every fault
//! (spawn failure, timeout, non-UTF-8 output) is folded into a failing
//! [`CommandOutput`] so callers only ever see exit code and text.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;

use super::types::CommandOutput;

/// Seam between the executor and the OS
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command once. Never fails; faults become return code 1.
    async fn run(&self, command: &str) -> CommandOutput;
}

/// Runs commands through `sh -c` with captured stdout
#[derive(Debug, Clone)]
pub struct ShellRunner {
    timeout: Duration,
}

impl ShellRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command: &str) -> CommandOutput {
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Own process group, so a timeout also takes down the script's children
        #[cfg(unix)]
        cmd.process_group(0);

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::error!("Failed to spawn command '{}': {}", command, e);
                return CommandOutput::failure(e);
            }
        };
        let pid = child.id();

        match timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => match String::from_utf8(output.stdout) {
                Ok(text) => CommandOutput {
                    return_code: output.status.code().unwrap_or(-1),
                    output: text,
                },
                Err(e) => {
                    tracing::error!("Command output is not valid UTF-8: {}", e);
                    CommandOutput::failure(e)
                }
            },
            Ok(Err(e)) => {
                tracing::error!("Failed to wait for command '{}': {}", command, e);
                CommandOutput::failure(e)
            }
            Err(_) => {
                kill_process_group(pid);
                let message =
                    format!("Command '{}' timed out after {:?}", command, self.timeout);
                tracing::error!("{}", message);
                CommandOutput::failure(message)
            }
        }
    }
}

#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    if let Some(pid) = pid {
        // The group id equals the leader's pid because of process_group(0)
        let result = unsafe { libc::killpg(pid as libc::pid_t, libc::SIGKILL) };
        if result != 0 {
            tracing::debug!("Process group {} already gone", pid);
        }
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}
