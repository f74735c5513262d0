use anyhow::{Context, Result};
use std::process::{Command, Stdio};

/// Starts configured application commands, detached from this process.
pub trait Launcher: Send + Sync {
    fn spawn(&self, cmd: &str) -> Result<()>;
}

/// Runs commands through `sh -c` so the configured string gets ordinary
/// shell word-splitting, quoting and expansion. The child is never waited
/// on; once spawned its lifecycle belongs to the session, not to us.
pub struct ShellLauncher;

impl Launcher for ShellLauncher {
    fn spawn(&self, cmd: &str) -> Result<()> {
        Command::new("sh")
            .arg("-c")
            .arg(cmd)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to spawn: {cmd}"))?;
        Ok(())
    }
}
