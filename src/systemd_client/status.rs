use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::domain::properties::{parse_systemd_timestamp, PropertyMap};
use crate::process::{Cancelled, CommandRunner};

use super::UnitStatus;

const UNKNOWN_STATE: &str = "unknown";

pub(super) const STATUS_PROPERTIES: [&str; 8] = [
    "Id",
    "ActiveState",
    "SubState",
    "Result",
    "NRestarts",
    "ExecMainStatus",
    "MainPID",
    "ActiveEnterTimestamp",
];

pub(super) fn status_args(unit: &str) -> Vec<String> {
    let mut args = vec![
        "--user".to_string(),
        "show".to_string(),
        "--no-pager".to_string(),
    ];
    for property in STATUS_PROPERTIES {
        args.push("-p".to_string());
        args.push(property.to_string());
    }
    args.push(unit.to_string());
    args
}

pub(super) async fn query_unit_status(
    runner: &dyn CommandRunner,
    systemctl: &str,
    unit: &str,
    cancel: &CancellationToken,
) -> Result<Option<UnitStatus>, Cancelled> {
    let output = runner.run(systemctl, &status_args(unit), cancel).await?;
    if !output.success() {
        warn!(
            unit = %unit,
            exit_code = output.exit_code,
            stderr = %output.stderr.trim(),
            "systemctl show failed"
        );
        return Ok(None);
    }

    Ok(Some(map_unit_status(unit, &PropertyMap::parse(&output.stdout))))
}

fn map_unit_status(unit: &str, properties: &PropertyMap) -> UnitStatus {
    let state = |key: &str| {
        properties
            .non_blank(key)
            .unwrap_or(UNKNOWN_STATE)
            .to_string()
    };
    let optional = |key: &str| properties.non_blank(key).map(str::to_string);

    UnitStatus {
        unit: unit.to_string(),
        active_state: state("ActiveState"),
        sub_state: state("SubState"),
        result: optional("Result"),
        n_restarts: properties
            .get("NRestarts")
            .and_then(|value| value.parse::<u32>().ok()),
        exec_main_status: optional("ExecMainStatus"),
        main_pid: optional("MainPID"),
        active_enter_timestamp: parse_systemd_timestamp(properties.get("ActiveEnterTimestamp")),
    }
}
