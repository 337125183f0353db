//! ハードウェアUUIDリーダー
//!
//! `system_profiler SPHardwareDataType` の出力から `Hardware UUID:` 行を拾う。
//! 読み取り専用。この値を書き換える手段は提供しない。

use std::process::Command;

use crp_domain::DomainError;
use crp_domain::port::driven::HardwareIdReader;
use tracing::debug;

const PROFILER: &str = "system_profiler";
const DATA_TYPE: &str = "SPHardwareDataType";
const UUID_LABEL: &str = "Hardware UUID";

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProfilerReader;

impl SystemProfilerReader {
    pub fn new() -> Self {
        Self
    }
}

impl HardwareIdReader for SystemProfilerReader {
    fn read_hardware_uuid(&self) -> Result<Option<String>, DomainError> {
        let output = Command::new(PROFILER).arg(DATA_TYPE).output().map_err(|e| {
            DomainError::from_io(format!("run {PROFILER} {DATA_TYPE}"), &e)
        })?;
        if !output.status.success() {
            return Err(DomainError::Unknown(format!(
                "{PROFILER} {DATA_TYPE} exited with {}",
                output.status
            )));
        }
        let text = String::from_utf8_lossy(&output.stdout);
        let value = parse_hardware_uuid(&text);
        debug!(found = value.is_some(), "hardware uuid parsed");
        Ok(value)
    }
}

/// ラベル付きの UUID 行を探し、コロン以降を返す
pub fn parse_hardware_uuid(output: &str) -> Option<String> {
    output
        .lines()
        .filter(|line| line.contains(UUID_LABEL))
        .find_map(|line| {
            let (_, value) = line.split_once(':')?;
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        })
}
