use crate::metrics::MetricError;
use crate::model::Target;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core::time::Duration;
use std::path::Path;
use tokio::process::Command;

const LOG_TARGET: &str = "vcs";

/// Shallow-clone depth; enough history for the trailing authorship window.
const CLONE_DEPTH: u32 = 400;

/// One commit's authorship record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub author_email: String,
    pub timestamp: DateTime<Utc>,
}

/// Commit history for one repository checkout, newest first.
#[derive(Debug, Clone, Default)]
pub struct CommitHistory {
    pub commits: Vec<CommitRecord>,
}

impl CommitHistory {
    /// Timestamp of the most recent commit.
    #[must_use]
    pub fn last_commit_at(&self) -> Option<DateTime<Utc>> {
        self.commits.iter().map(|c| c.timestamp).max()
    }
}

/// Version-control query capability consumed by the history-based plugins.
#[async_trait]
pub trait CommitLog: Send + Sync {
    /// Fetch the commit history (author identities and timestamps) for a target.
    async fn history(&self, target: &Target) -> Result<CommitHistory, MetricError>;
}

/// Production [`CommitLog`] backed by the `git` command line.
///
/// Shallow-clones the target into a temporary directory without blob
/// contents, then reads `git log`. Each subprocess runs under its own fixed
/// timeout and is killed on drop.
#[derive(Debug, Clone)]
pub struct GitCli {
    clone_timeout: Duration,
    log_timeout: Duration,
}

impl GitCli {
    #[must_use]
    pub const fn new(clone_timeout: Duration, log_timeout: Duration) -> Self {
        Self { clone_timeout, log_timeout }
    }

    async fn run_git(args: &[&str], cwd: Option<&Path>, timeout: Duration) -> Result<std::process::Output, MetricError> {
        let mut command = Command::new("git");
        let _ = command
            .args(args)
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = cwd {
            let _ = command.current_dir(dir);
        }

        let child = command
            .spawn()
            .map_err(|e| MetricError::service("git", None, format!("could not spawn git: {e}")))?;

        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(MetricError::service("git", None, format!("'git {}' failed to run: {e}", args.join(" ")))),
            Err(_) => Err(MetricError::timeout(
                "git",
                format!("'git {}' timed out after {} seconds", args.join(" "), timeout.as_secs()),
            )),
        }
    }

    async fn clone_repo(&self, target: &Target, dest: &Path) -> Result<(), MetricError> {
        let dest_str = dest
            .to_str()
            .ok_or_else(|| MetricError::computation("git", "invalid UTF-8 in checkout path"))?;
        let depth = CLONE_DEPTH.to_string();

        log::debug!(target: LOG_TARGET, "Cloning '{}' for history analysis", target.url());

        let output = Self::run_git(
            &["clone", "--depth", &depth, "--filter=blob:none", target.url().as_str(), dest_str],
            None,
            self.clone_timeout,
        )
        .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MetricError::service("git", None, format!("git clone of '{}' failed: {}", target.url(), stderr.trim())));
        }

        Ok(())
    }

    async fn read_log(&self, checkout: &Path) -> Result<CommitHistory, MetricError> {
        // %ae = author email, %ct = committer timestamp (unix seconds)
        let output = Self::run_git(&["log", "--format=%ae %ct"], Some(checkout), self.log_timeout).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MetricError::service("git", None, format!("git log failed: {}", stderr.trim())));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_log(&stdout))
    }
}

fn parse_log(stdout: &str) -> CommitHistory {
    let commits = stdout
        .lines()
        .filter_map(|line| {
            let (email, ts) = line.trim().rsplit_once(' ')?;
            let seconds: i64 = ts.parse().ok()?;
            let timestamp = DateTime::from_timestamp(seconds, 0)?;
            if email.is_empty() {
                return None;
            }
            Some(CommitRecord {
                author_email: email.to_string(),
                timestamp,
            })
        })
        .collect();

    CommitHistory { commits }
}

#[async_trait]
impl CommitLog for GitCli {
    async fn history(&self, target: &Target) -> Result<CommitHistory, MetricError> {
        let tmp = tempfile::tempdir().map_err(|e| MetricError::computation("git", format!("could not create temp directory: {e}")))?;
        let checkout = tmp.path().join("repo");

        self.clone_repo(target, &checkout).await?;
        let history = self.read_log(&checkout).await?;

        log::debug!(target: LOG_TARGET, "Read {} commits for '{}'", history.commits.len(), target.name());
        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_lines() {
        let history = parse_log("alice@example.com 1700000000\nBOB@example.com 1690000000\n");
        assert_eq!(history.commits.len(), 2);
        assert_eq!(history.commits[0].author_email, "alice@example.com");
        assert_eq!(history.commits[0].timestamp, DateTime::from_timestamp(1_700_000_000, 0).unwrap());
    }

    #[test]
    fn test_parse_log_skips_malformed_lines() {
        let history = parse_log("noseparator\nalice@example.com notanumber\n 1700000000\nok@example.com 1700000000\n");
        assert_eq!(history.commits.len(), 1);
        assert_eq!(history.commits[0].author_email, "ok@example.com");
    }

    #[test]
    fn test_last_commit_at_takes_newest() {
        let history = parse_log("a@x.com 100\nb@x.com 300\nc@x.com 200\n");
        assert_eq!(history.last_commit_at(), DateTime::from_timestamp(300, 0));
    }

    #[test]
    fn test_empty_history() {
        let history = parse_log("");
        assert!(history.commits.is_empty());
        assert_eq!(history.last_commit_at(), None);
    }
}
