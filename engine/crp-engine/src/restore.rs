//! 復元ワークフロー
//!
//! 書き戻し先はバックアップ記録のストア種別で決める。
//! 上書きされる現在値のバックアップは取らない（一方向）。

use crp_domain::DomainError;
use crp_domain::model::{
    BackupRecord, PlatformProfile, RestoreOutcome, StoreKind, MACHINE_GUID_KEY,
    MACHINE_GUID_VALUE,
};
use crp_domain::port::driven::{BackupStore, IdentityStore, MachineGuidStore, StatusSink};
use tracing::info;

pub struct RestoreDeps<'a> {
    pub backups: &'a dyn BackupStore,
    pub identity: &'a dyn IdentityStore,
    pub machine_guid: &'a dyn MachineGuidStore,
}

pub struct RestoreCoordinator<'a> {
    deps: RestoreDeps<'a>,
}

impl<'a> RestoreCoordinator<'a> {
    pub fn new(deps: RestoreDeps<'a>) -> Self {
        Self { deps }
    }

    pub fn restore(
        &self,
        record: &BackupRecord,
        profile: &PlatformProfile,
        sink: &dyn StatusSink,
    ) -> Result<RestoreOutcome, DomainError> {
        info!(kind = ?record.kind, path = %record.path.display(), "restore requested");
        let outcome = match record.kind {
            StoreKind::IdentityStore => {
                let dest = profile.identity_store_path();
                if !self.deps.identity.exists(dest) {
                    return Err(DomainError::TargetUnavailable(dest.display().to_string()));
                }
                self.deps.backups.restore_file(record, dest)?;
                RestoreOutcome::Restored {
                    kind: record.kind,
                    target: dest.display().to_string(),
                }
            }
            StoreKind::MachineGuid => {
                let value = self.deps.backups.read_value(record)?;
                if value.is_empty() {
                    return Err(DomainError::InvalidInput(format!(
                        "backup {} is empty",
                        record.path.display()
                    )));
                }
                let target = format!(r"HKLM\{}\{}", MACHINE_GUID_KEY, MACHINE_GUID_VALUE);
                // 値が読めない（キーが無い・非Windows）なら書き戻し先なし
                self.deps.machine_guid.read().map_err(|err| match err {
                    DomainError::NotFound(detail) | DomainError::Unsupported(detail) => {
                        DomainError::TargetUnavailable(format!("{target}: {detail}"))
                    }
                    other => other,
                })?;
                self.deps.machine_guid.write(&value)?;
                RestoreOutcome::Restored {
                    kind: record.kind,
                    target,
                }
            }
            StoreKind::AppImage => {
                let dest = profile.app_image().ok_or_else(|| {
                    DomainError::TargetUnavailable(
                        "no AppImage destination supplied for restore".into(),
                    )
                })?;
                self.deps.backups.restore_file(record, dest)?;
                RestoreOutcome::Restored {
                    kind: record.kind,
                    target: dest.display().to_string(),
                }
            }
            StoreKind::HardwareUuid => {
                let value = self.deps.backups.read_value(record)?;
                sink.info(&format!(
                    "Hardware UUID cannot be written back; recorded value: {value}"
                ));
                return Ok(RestoreOutcome::DisplayOnly {
                    kind: record.kind,
                    value,
                });
            }
            StoreKind::Other => {
                return Err(DomainError::InvalidInput(format!(
                    "cannot determine restore target for {}",
                    record.path.display()
                )));
            }
        };

        if let RestoreOutcome::Restored { target, .. } = &outcome {
            sink.success(&format!("Restored {} to {}", record.file_name(), target));
        }
        Ok(outcome)
    }
}
