//! ツール設定と待機ポリシー

use std::path::PathBuf;
use std::time::Duration;

use crate::error::DomainError;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
pub const MIN_POLL_INTERVAL_MS: u64 = 50;
pub const MAX_POLL_INTERVAL_MS: u64 = 60_000;

/// プロセス終了待ちのポリシー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub poll_interval: Duration,
    /// None なら無期限（キャンセルのみで中断）
    pub timeout: Option<Duration>,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            timeout: None,
        }
    }
}

/// 永続化される既定値（すべて任意）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolConfig {
    /// 監視プロセス名の上書き
    pub process_name: Option<String>,
    /// Linux で使う AppImage の既定パス
    pub appimage_path: Option<PathBuf>,
    pub poll_interval_ms: u64,
    pub wait_timeout_secs: Option<u64>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            process_name: None,
            appimage_path: None,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            wait_timeout_secs: None,
        }
    }
}

impl ToolConfig {
    pub fn validate(&self) -> Result<(), DomainError> {
        if !(MIN_POLL_INTERVAL_MS..=MAX_POLL_INTERVAL_MS).contains(&self.poll_interval_ms) {
            return Err(DomainError::InvalidInput(format!(
                "poll_interval_ms must be between {} and {} (got {})",
                MIN_POLL_INTERVAL_MS, MAX_POLL_INTERVAL_MS, self.poll_interval_ms
            )));
        }
        if self.wait_timeout_secs == Some(0) {
            return Err(DomainError::InvalidInput(
                "wait_timeout_secs must be greater than 0".into(),
            ));
        }
        if let Some(name) = &self.process_name {
            if name.trim().is_empty() {
                return Err(DomainError::InvalidInput("process_name is empty".into()));
            }
        }
        Ok(())
    }

    pub fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            timeout: self.wait_timeout_secs.map(Duration::from_secs),
        }
    }
}
