//! コンソール向け StatusSink
//!
//! 状態通知を1行ずつ書き出し、同じ内容を tracing にも流す。

use std::io::{self, Write};
use std::sync::Mutex;

use crp_domain::model::{Severity, Stage};
use crp_domain::port::driven::StatusSink;
use tracing::{error, info, warn};

pub struct ConsoleStatusSink<W: Write = io::Stdout> {
    out: Mutex<W>,
}

impl ConsoleStatusSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleStatusSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_line(&self, line: &str) {
        let mut out = match self.out.lock() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        };
        // 表示先が閉じていても処理は続ける
        let _ = writeln!(out, "{line}");
        let _ = out.flush();
    }
}

fn marker(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "[*]",
        Severity::Warning => "[!]",
        Severity::Error => "[x]",
        Severity::Success => "[+]",
    }
}

pub fn format_status(message: &str, severity: Severity) -> String {
    format!("{} {}", marker(severity), message)
}

impl<W: Write> StatusSink for ConsoleStatusSink<W> {
    fn status(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Warning => warn!(target: "status", "{message}"),
            Severity::Error => error!(target: "status", "{message}"),
            Severity::Info | Severity::Success => info!(target: "status", "{message}"),
        }
        self.write_line(&format_status(message, severity));
    }

    fn progress(&self, stage_index: usize, percent: u8) {
        // ステージ開始時だけ見出しを出す
        if percent != 0 {
            return;
        }
        let name = Stage::ALL
            .get(stage_index)
            .map(|s| s.name())
            .unwrap_or("stage");
        self.write_line(&format!(
            "==> [{}/{}] {}",
            stage_index + 1,
            Stage::ALL.len(),
            name
        ));
    }
}
