use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

/// One window from the compositor's live client list.
#[derive(Debug, Clone, Deserialize)]
pub struct Window {
    /// Opaque stable identifier of the window (e.g. "0x55d2f8a0").
    pub address: String,
    #[serde(default)]
    class: Option<String>,
}

impl Window {
    #[cfg(test)]
    pub fn new(address: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            class: Some(class.into()),
        }
    }

    /// Window class string. A class the compositor reports as missing or
    /// null is normalized to the empty string.
    pub fn class(&self) -> &str {
        self.class.as_deref().unwrap_or("")
    }
}

/// Command/query surface of the windowing system. Orchestration logic only
/// sees this trait, so tests can substitute a scripted fake.
#[async_trait]
pub trait Compositor: Send + Sync {
    /// Snapshot of the currently live windows. An empty list means "no
    /// windows", not an error.
    async fn clients(&self) -> Result<Vec<Window>>;

    /// Issues a single dispatch command, e.g. "workspace 3".
    async fn dispatch(&self, command: &str) -> Result<()>;

    /// Issues several dispatch commands as one batched request.
    async fn dispatch_batch(&self, commands: &[String]) -> Result<()>;
}

/// Talks to a running Hyprland instance through the `hyprctl` binary.
pub struct HyprctlCompositor;

impl HyprctlCompositor {
    async fn hyprctl(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("hyprctl")
            .args(args)
            .output()
            .await
            .context("Failed to run hyprctl (is Hyprland running?)")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("hyprctl {} failed: {}", args.join(" "), stderr.trim());
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl Compositor for HyprctlCompositor {
    async fn clients(&self) -> Result<Vec<Window>> {
        let stdout = self.hyprctl(&["-j", "clients"]).await?;
        parse_clients(&stdout)
    }

    async fn dispatch(&self, command: &str) -> Result<()> {
        let mut args = vec!["dispatch"];
        args.extend(command.split_whitespace());
        self.hyprctl(&args).await?;
        Ok(())
    }

    async fn dispatch_batch(&self, commands: &[String]) -> Result<()> {
        let batch = batch_arg(commands);
        self.hyprctl(&["--batch", batch.as_str()]).await?;
        Ok(())
    }
}

/// Parses the JSON client list printed by `hyprctl -j clients`. An empty or
/// whitespace-only answer means no windows.
fn parse_clients(raw: &str) -> Result<Vec<Window>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw).context("Failed to parse client list JSON")
}

/// Joins dispatch commands into the single argument `hyprctl --batch` expects:
/// "dispatch workspace 3; dispatch workspace 5".
fn batch_arg(commands: &[String]) -> String {
    commands
        .iter()
        .map(|c| format!("dispatch {c}"))
        .collect::<Vec<_>>()
        .join("; ")
}
