//! ドメインエラー型
//!
//! 各バリアントは利用者が手動で修正・再試行できるよう、
//! 対象パスやコマンドなどの詳細を文字列で保持する。

use std::io;
use thiserror::Error;

/// ドメイン層のエラー型
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// 呼び出し側が渡したパス・値が不正
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 期待したファイルやバックアップが存在しない
    #[error("Not found: {0}")]
    NotFound(String),

    /// 対象アプリケーションが起動中
    #[error("Process still running: {0}")]
    ProcessStillRunning(String),

    /// 識別子ストア（storage.json）が見つからない
    #[error("Identity store not found: {0}")]
    StoreNotFound(String),

    /// 識別子ストアが JSON オブジェクトとして解釈できない
    #[error("Identity store corrupt ({path}): {detail}")]
    StoreCorrupt { path: String, detail: String },

    /// 展開/再パッケージツールの失敗
    #[error("Repack failed: {0}")]
    RepackFailed(String),

    /// 復元先が存在しない、または指定されていない
    #[error("Restore target unavailable: {0}")]
    TargetUnavailable(String),

    /// OS レベルのアクセス拒否（昇格なしのレジストリ書き込みなど）
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// 待機の期限切れ
    #[error("Timeout: {0}")]
    Timeout(String),

    /// 呼び出し側によるキャンセル
    #[error("Cancelled: {0}")]
    Cancelled(String),

    /// このプラットフォームでは扱えない操作
    #[error("Unsupported on this platform: {0}")]
    Unsupported(String),

    /// ファイルI/Oエラー
    #[error("IO error: {0}")]
    IoError(String),

    /// 不明なエラー
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl DomainError {
    /// `std::io::Error` を種別に応じて分類する
    pub fn from_io(context: impl AsRef<str>, err: &io::Error) -> Self {
        let context = context.as_ref();
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound(format!("{context}: {err}")),
            io::ErrorKind::PermissionDenied => {
                Self::PermissionDenied(format!("{context}: {err}"))
            }
            _ => Self::IoError(format!("{context}: {err}")),
        }
    }

    /// 待機系の中断（タイムアウト/キャンセル）か
    pub fn is_interrupted_wait(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Cancelled(_))
    }
}
