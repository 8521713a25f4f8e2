//! Rendered strategy: one headless browser process per fetch.
//!
//! Every session gets a throw-away profile directory and runs the browser
//! with `--dump-dom`, which navigates, lets scripts and network activity settle
//! within a virtual-time budget, prints the serialized DOM and exits.
//!
//! Teardown is tied to ownership. On Unix the browser leads its own process
//! group, and a [`SessionGroup`] guard kills that whole group (renderer and
//! zygote children included) when the fetch returns or is dropped. Elsewhere
//! `kill_on_drop` covers the top-level process. The profile is a
//! [`tempfile::TempDir`] removed on every path.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{info, instrument, warn};
use url::Url;

use super::Fetcher;
use crate::error::FetchError;
use crate::utils::truncate_for_log;

/// Fetcher that renders pages in a Chromium-compatible headless browser.
#[derive(Debug, Clone)]
pub struct BrowserFetcher {
    binary: PathBuf,
    user_agent: String,
    budget: Duration,
    timeout: Duration,
}

impl BrowserFetcher {
    /// * `binary` - Browser executable, looked up on `PATH` if not absolute
    /// * `budget` - Virtual time granted to scripts before the DOM is captured
    /// * `timeout` - Wall-clock deadline for the whole session
    pub fn new(
        binary: impl Into<PathBuf>,
        user_agent: impl Into<String>,
        budget: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            binary: binary.into(),
            user_agent: user_agent.into(),
            budget,
            timeout,
        }
    }

    fn args(&self, profile: &std::path::Path, url: &Url) -> Vec<String> {
        vec![
            "--headless=new".to_string(),
            "--disable-gpu".to_string(),
            "--no-sandbox".to_string(),
            "--disable-setuid-sandbox".to_string(),
            "--no-first-run".to_string(),
            format!("--user-agent={}", self.user_agent),
            format!("--user-data-dir={}", profile.display()),
            format!("--virtual-time-budget={}", self.budget.as_millis()),
            "--dump-dom".to_string(),
            url.to_string(),
        ]
    }

    fn render_error(&self, url: &Url, reason: impl Into<String>) -> FetchError {
        FetchError::Render {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}

/// Kills the browser's process group on drop.
#[derive(Debug)]
#[cfg_attr(not(unix), allow(dead_code))]
struct SessionGroup {
    pgid: Option<u32>,
}

impl Drop for SessionGroup {
    fn drop(&mut self) {
        #[cfg(unix)]
        if let Some(pgid) = self.pgid.and_then(|id| libc::pid_t::try_from(id).ok()) {
            // ESRCH once every member has exited; nothing to clean up then.
            unsafe {
                libc::killpg(pgid, libc::SIGKILL);
            }
        }
    }
}

#[async_trait]
impl Fetcher for BrowserFetcher {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let profile = tempfile::Builder::new().prefix("khnews-profile-").tempdir()?;
        let t0 = std::time::Instant::now();

        let mut command = Command::new(&self.binary);
        command
            .args(self.args(profile.path(), url))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);

        let child = command.spawn().map_err(|e| {
            self.render_error(url, format!("launching {}: {e}", self.binary.display()))
        })?;
        let _group = SessionGroup { pgid: child.id() };

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| self.render_error(url, e.to_string()))?,
            Err(_) => {
                warn!(after_ms = self.timeout.as_millis() as u64, "Rendering session timed out; killed");
                return Err(FetchError::Timeout {
                    url: url.to_string(),
                    after: self.timeout,
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(self.render_error(
                url,
                format!("browser exited with {}: {}", output.status, truncate_for_log(stderr.trim(), 300)),
            ));
        }

        let dom = String::from_utf8_lossy(&output.stdout).into_owned();
        if dom.trim().is_empty() {
            return Err(self.render_error(url, "browser produced an empty document"));
        }

        info!(
            bytes = dom.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Rendered document"
        );
        drop(profile);
        Ok(dom)
    }
}
