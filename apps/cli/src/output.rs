//! 表示とJSON出力

use std::io::{self, Write};
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use crp_composition::app::EnvironmentStatus;
use crp_composition::domain::model::{
    NativeChange, PlatformProfile, ResetFailure, ResetReport, RestoreOutcome, StageStatus,
    ToolConfig,
};
use crp_composition::domain::port::driving::BackupSummary;
use serde::Serialize;

pub fn format_time(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

pub fn print_reset_plan(profile: &PlatformProfile) {
    println!("Reset plan ({}):", profile.platform());
    println!("  Process:        {}", profile.process_name());
    for target in profile.native_targets() {
        println!("  Native:         {}", target.describe());
    }
    println!("  Identity store: {}", profile.identity_store_path().display());
}

fn stage_label(status: &StageStatus) -> String {
    match status {
        StageStatus::Committed => "committed".into(),
        StageStatus::Failed(reason) => format!("failed ({reason})"),
        StageStatus::NotRun => "not run".into(),
    }
}

pub fn write_reset_report(out: &mut dyn Write, report: &ResetReport) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Stages:")?;
    for record in &report.stages {
        writeln!(out, "  {:<16} {}", record.stage.name(), stage_label(&record.status))?;
    }
    if let Some(change) = &report.native_change {
        match change {
            NativeChange::MachineGuidReplaced { previous, new } => {
                writeln!(out, "MachineGuid:      {previous} -> {new}")?;
            }
            NativeChange::HardwareUuidRecorded { value } => {
                writeln!(
                    out,
                    "Hardware UUID:    {} (unchanged)",
                    value.as_deref().unwrap_or("not found")
                )?;
            }
            NativeChange::ImageRepacked {
                output,
                patched_files,
            } => {
                writeln!(out, "Repacked image:   {}", output.display())?;
                for file in patched_files {
                    writeln!(out, "  patched {}", file.display())?;
                }
            }
        }
    }
    if let Some(set) = &report.identifiers {
        writeln!(out, "New identifiers:")?;
        for (key, value) in set.entries() {
            writeln!(out, "  {key:<24} {value}")?;
        }
    }
    if !report.backups.is_empty() {
        writeln!(out, "Backups:")?;
        for record in &report.backups {
            writeln!(out, "  [{}] {}", record.kind.label(), record.path.display())?;
        }
    }
    Ok(())
}

pub fn print_restore_outcome(outcome: &RestoreOutcome) {
    match outcome {
        RestoreOutcome::Restored { kind, target } => {
            println!("Restored {} -> {}", kind.label(), target);
        }
        RestoreOutcome::DisplayOnly { kind, value } => {
            println!("{} is read-only; recorded value: {}", kind.label(), value);
        }
    }
}

pub fn print_backups(root: &Path, list: &[BackupSummary]) {
    if list.is_empty() {
        println!("No backups under {}", root.display());
        return;
    }
    println!("Backups under {} ({}):", root.display(), list.len());
    for item in list {
        println!(
            "  {}  {:<14} {:>9.1} KB  {}",
            format_time(item.captured_at),
            item.kind.label(),
            item.size_kb,
            item.path.display()
        );
    }
}

pub fn print_status(status: &EnvironmentStatus) {
    println!("Platform:       {}", status.platform);
    println!(
        "Process:        {} ({})",
        status.process_name,
        if status.process_running { "running" } else { "not running" }
    );
    println!(
        "Identity store: {} ({})",
        status.identity_store.display(),
        if status.identity_store_present { "present" } else { "missing" }
    );
    for target in &status.native_targets {
        println!("Native:         {target}");
    }
    println!(
        "Backups:        {} in {}",
        status.backup_count,
        status.backup_root.display()
    );
}

// ---------- JSON DTO ----------

#[derive(Serialize)]
pub struct JsonBackup {
    kind: &'static str,
    file_name: String,
    captured_at: String,
    size_kb: f64,
    path: String,
}

impl From<&BackupSummary> for JsonBackup {
    fn from(item: &BackupSummary) -> Self {
        Self {
            kind: item.kind.category(),
            file_name: item.file_name.clone(),
            captured_at: DateTime::<Local>::from(item.captured_at).to_rfc3339(),
            size_kb: item.size_kb,
            path: item.path.display().to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct JsonStatus {
    platform: &'static str,
    process_name: String,
    process_running: bool,
    identity_store: String,
    identity_store_present: bool,
    native_targets: Vec<String>,
    backup_root: String,
    backup_count: usize,
}

impl From<&EnvironmentStatus> for JsonStatus {
    fn from(s: &EnvironmentStatus) -> Self {
        Self {
            platform: s.platform.as_str(),
            process_name: s.process_name.clone(),
            process_running: s.process_running,
            identity_store: s.identity_store.display().to_string(),
            identity_store_present: s.identity_store_present,
            native_targets: s.native_targets.clone(),
            backup_root: s.backup_root.display().to_string(),
            backup_count: s.backup_count,
        }
    }
}

#[derive(Serialize)]
struct JsonStage {
    stage: &'static str,
    status: String,
}

#[derive(Serialize)]
pub struct JsonReport {
    platform: &'static str,
    complete: bool,
    stages: Vec<JsonStage>,
    identifiers: Option<serde_json::Map<String, serde_json::Value>>,
    backups: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failed_stage: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn json_report(report: &ResetReport) -> JsonReport {
    JsonReport {
        platform: report.platform.as_str(),
        complete: report.is_complete(),
        stages: report
            .stages
            .iter()
            .map(|r| JsonStage {
                stage: r.stage.name(),
                status: stage_label(&r.status),
            })
            .collect(),
        identifiers: report.identifiers.as_ref().map(|set| {
            set.entries()
                .iter()
                .map(|(k, v)| (k.to_string(), serde_json::Value::from(*v)))
                .collect()
        }),
        backups: report
            .backups
            .iter()
            .map(|r| r.path.display().to_string())
            .collect(),
        failed_stage: None,
        error: None,
    }
}

/// 失敗時のレポート。どのステージで何が起きたかも載せる
pub fn json_failure_report(failure: &ResetFailure) -> JsonReport {
    JsonReport {
        failed_stage: Some(failure.stage.name()),
        error: Some(failure.error.to_string()),
        ..json_report(&failure.report)
    }
}

#[derive(Serialize)]
pub struct JsonConfig {
    process_name: Option<String>,
    appimage_path: Option<String>,
    poll_interval_ms: u64,
    wait_timeout_secs: Option<u64>,
}

impl From<&ToolConfig> for JsonConfig {
    fn from(cfg: &ToolConfig) -> Self {
        Self {
            process_name: cfg.process_name.clone(),
            appimage_path: cfg.appimage_path.as_ref().map(|p| p.display().to_string()),
            poll_interval_ms: cfg.poll_interval_ms,
            wait_timeout_secs: cfg.wait_timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crp_composition::domain::model::{Platform, Stage};

    #[test]
    fn json_report_lists_stage_states() {
        let mut report = ResetReport::new(Platform::Linux);
        report.mark(Stage::ProcessGuard, StageStatus::Committed);
        report.mark(Stage::NativeMutation, StageStatus::Failed("boom".into()));

        let value = serde_json::to_value(json_report(&report)).unwrap();
        assert_eq!(value["platform"], "linux");
        assert_eq!(value["complete"], false);
        assert_eq!(value["stages"][0]["status"], "committed");
        assert_eq!(value["stages"][1]["status"], "failed (boom)");
        assert_eq!(value["stages"][2]["status"], "not run");
        assert!(value["identifiers"].is_null());
        assert!(value.get("error").is_none());
    }

    #[test]
    fn text_report_lists_stages_and_backups() {
        let mut report = ResetReport::new(Platform::Windows);
        report.mark(Stage::ProcessGuard, StageStatus::Committed);
        let mut out = Vec::new();
        write_reset_report(&mut out, &report).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Stages:"));
        assert!(text.contains("committed"));
        assert!(!text.contains("Backups:"));
    }
}
