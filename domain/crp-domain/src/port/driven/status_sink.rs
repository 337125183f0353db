//! 状態・進捗通知ポート
//!
//! ブロッキング呼び出しの最中に同期的に届く。表示は呼び出し側の責務。

use crate::model::Severity;

pub trait StatusSink {
    fn status(&self, message: &str, severity: Severity);

    /// (ステージ番号, 進捗率 0-100)
    fn progress(&self, stage_index: usize, percent: u8);

    fn info(&self, message: &str) {
        self.status(message, Severity::Info);
    }
    fn warn(&self, message: &str) {
        self.status(message, Severity::Warning);
    }
    fn error(&self, message: &str) {
        self.status(message, Severity::Error);
    }
    fn success(&self, message: &str) {
        self.status(message, Severity::Success);
    }
}

/// 何も表示しないシンク
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStatusSink;

impl StatusSink for NullStatusSink {
    fn status(&self, _message: &str, _severity: Severity) {}
    fn progress(&self, _stage_index: usize, _percent: u8) {}
}
