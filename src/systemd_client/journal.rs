use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::domain::utils::clamp_log_lines;
use crate::process::{Cancelled, CommandRunner};

use super::LogLine;

pub(super) fn journal_args(unit: &str, lines: i64, min_priority: &str) -> Vec<String> {
    vec![
        "--user".to_string(),
        "-u".to_string(),
        unit.to_string(),
        "-n".to_string(),
        lines.to_string(),
        "-o".to_string(),
        "short-iso".to_string(),
        "--no-pager".to_string(),
        "-p".to_string(),
        min_priority.to_string(),
    ]
}

pub(super) async fn tail_unit_log(
    runner: &dyn CommandRunner,
    journalctl: &str,
    unit: &str,
    requested_lines: i64,
    min_priority: &str,
    cancel: &CancellationToken,
) -> Result<Vec<LogLine>, Cancelled> {
    let lines = clamp_log_lines(requested_lines);
    let output = runner
        .run(journalctl, &journal_args(unit, lines, min_priority), cancel)
        .await?;

    if !output.success() {
        warn!(
            unit = %unit,
            exit_code = output.exit_code,
            stderr = %output.stderr.trim(),
            "journalctl failed"
        );
        return Ok(Vec::new());
    }

    Ok(map_log_lines(unit, min_priority, &output.stdout))
}

// short-iso lines embed their own timestamp; it is left in the message.
fn map_log_lines(unit: &str, min_priority: &str, stdout: &str) -> Vec<LogLine> {
    stdout
        .split('\n')
        .filter(|segment| !segment.is_empty())
        .map(|segment| LogLine {
            timestamp: None,
            unit: unit.to_string(),
            message: segment.trim_end().to_string(),
            priority: Some(min_priority.to_string()),
        })
        .collect()
}
