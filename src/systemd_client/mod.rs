//! Read-only introspection of user-scoped systemd units
//!
//! Every query spawns a fresh `systemctl` or `journalctl` process and maps its
//! text output into typed records. Tool failures degrade to an absent status or
//! an empty log tail; only cancellation surfaces as an error.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::process::{Cancelled, CommandRunner, TokioCommandRunner};

mod journal;
mod status;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UnitStatus {
    pub unit: String,
    pub active_state: String,
    pub sub_state: String,
    pub result: Option<String>,
    pub n_restarts: Option<u32>,
    pub exec_main_status: Option<String>,
    pub main_pid: Option<String>,
    pub active_enter_timestamp: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LogLine {
    pub timestamp: Option<DateTime<FixedOffset>>,
    pub unit: String,
    pub message: String,
    pub priority: Option<String>,
}

#[async_trait]
pub trait UnitProvider: Send + Sync {
    async fn unit_status(
        &self,
        unit: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<UnitStatus>, Cancelled>;

    async fn tail_logs(
        &self,
        unit: &str,
        lines: i64,
        min_priority: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<LogLine>, Cancelled>;
}

/// Names or paths of the external tools, resolved through `PATH` when bare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub systemctl: String,
    pub journalctl: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            systemctl: "systemctl".to_string(),
            journalctl: "journalctl".to_string(),
        }
    }
}

pub struct SystemdCliClient {
    tools: ToolPaths,
    runner: Arc<dyn CommandRunner>,
}

impl SystemdCliClient {
    pub fn new(tools: ToolPaths) -> Self {
        Self::with_runner(tools, Arc::new(TokioCommandRunner::new()))
    }

    pub fn with_runner(tools: ToolPaths, runner: Arc<dyn CommandRunner>) -> Self {
        Self { tools, runner }
    }
}

#[async_trait]
impl UnitProvider for SystemdCliClient {
    async fn unit_status(
        &self,
        unit: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<UnitStatus>, Cancelled> {
        status::query_unit_status(self.runner.as_ref(), &self.tools.systemctl, unit, cancel).await
    }

    async fn tail_logs(
        &self,
        unit: &str,
        lines: i64,
        min_priority: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<LogLine>, Cancelled> {
        journal::tail_unit_log(
            self.runner.as_ref(),
            &self.tools.journalctl,
            unit,
            lines,
            min_priority,
            cancel,
        )
        .await
    }
}
