//! バックアップ管理ユースケース（一覧・1件削除・全削除）

use std::cmp::Reverse;
use std::path::Path;

use crp_domain::DomainError;
use crp_domain::model::BackupRecord;
use crp_domain::port::driving::{BackupAdminUseCase, BackupSummary};
use tracing::{info, warn};

use crate::AppService;

impl BackupAdminUseCase for AppService<'_> {
    fn list_backups(&self) -> Result<Vec<BackupSummary>, DomainError> {
        let mut records: Vec<BackupRecord> = Vec::new();
        for entry in self.deps.backups.list() {
            match entry {
                Ok(record) => records.push(record),
                // 列挙中に消えたファイルなどは一覧から外すだけ
                Err(err) => warn!(error = %err, "skipping unreadable backup entry"),
            }
        }
        records.sort_by_key(|r| Reverse((r.captured_at, r.file_name())));
        Ok(records.iter().map(BackupSummary::from).collect())
    }

    fn find_backup(&self, path: &Path) -> Result<BackupRecord, DomainError> {
        self.deps.backups.record_for(path)
    }

    fn delete_backup(&self, path: &Path) -> Result<BackupRecord, DomainError> {
        let record = self.deps.backups.record_for(path)?;
        self.deps.backups.delete(&record)?;
        info!(path = %record.path.display(), kind = ?record.kind, "backup deleted");
        Ok(record)
    }

    fn clear_backups(&self) -> Result<(), DomainError> {
        self.deps.backups.clear()
    }
}
