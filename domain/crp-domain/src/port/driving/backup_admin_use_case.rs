//! バックアップ管理ユースケースポート

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::DomainError;
use crate::model::{BackupRecord, StoreKind};

/// 一覧表示用の要約
#[derive(Debug, Clone, PartialEq)]
pub struct BackupSummary {
    pub kind: StoreKind,
    pub file_name: String,
    pub captured_at: SystemTime,
    pub size_kb: f64,
    pub path: PathBuf,
}

impl From<&BackupRecord> for BackupSummary {
    fn from(record: &BackupRecord) -> Self {
        Self {
            kind: record.kind,
            file_name: record.file_name(),
            captured_at: record.captured_at,
            size_kb: record.size_kb(),
            path: record.path.clone(),
        }
    }
}

pub trait BackupAdminUseCase {
    /// 新しい順に並べた一覧
    fn list_backups(&self) -> Result<Vec<BackupSummary>, DomainError>;

    /// パスで指定した1件を解決
    fn find_backup(&self, path: &Path) -> Result<BackupRecord, DomainError>;

    /// 1件削除（ルート外のパスは InvalidInput）
    fn delete_backup(&self, path: &Path) -> Result<BackupRecord, DomainError>;

    /// 全削除
    fn clear_backups(&self) -> Result<(), DomainError>;
}
