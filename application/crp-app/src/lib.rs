//! crp-app: アプリケーション層のファサード。
//! Engine のワークフローとドメインポートを束ね、リセット・復元・
//! バックアップ管理・状態確認のユースケースを提供する。

use crp_domain::DomainError;
use crp_domain::model::{
    BackupRecord, IdentifierSet, PlatformProfile, ResetFailure, ResetReport, RestoreOutcome,
};
use crp_domain::port::driven::{
    BackupStore, HardwareIdReader, IdentityStore, ImageRepacker, MachineGuidStore, ProcessProbe,
    RandomSource, StatusSink,
};
use crp_domain::port::driving::{ResetOptions, ResetUseCase};
use crp_domain::service::IdentifierFactory;
use crp_engine::{ResetDeps, ResetOrchestrator, RestoreCoordinator, RestoreDeps};

pub mod admin;
pub mod status;

pub use status::EnvironmentStatus;

pub struct AppDeps<'a> {
    pub probe: &'a dyn ProcessProbe,
    pub backups: &'a dyn BackupStore,
    pub identity: &'a dyn IdentityStore,
    pub machine_guid: &'a dyn MachineGuidStore,
    pub hardware: &'a dyn HardwareIdReader,
    pub repacker: &'a dyn ImageRepacker,
    pub random: &'a dyn RandomSource,
}

pub struct AppService<'a> {
    deps: AppDeps<'a>,
}

impl<'a> AppService<'a> {
    pub fn new(deps: AppDeps<'a>) -> Self {
        Self { deps }
    }

    /// 書き込みなしで新しい識別子セットを生成する
    pub fn preview_identifiers(&self) -> IdentifierSet {
        IdentifierFactory::new(self.deps.random).new_set()
    }

    fn orchestrator(&self) -> ResetOrchestrator<'_> {
        ResetOrchestrator::new(ResetDeps {
            probe: self.deps.probe,
            backups: self.deps.backups,
            identity: self.deps.identity,
            machine_guid: self.deps.machine_guid,
            hardware: self.deps.hardware,
            repacker: self.deps.repacker,
            random: self.deps.random,
        })
    }

    fn coordinator(&self) -> RestoreCoordinator<'_> {
        RestoreCoordinator::new(RestoreDeps {
            backups: self.deps.backups,
            identity: self.deps.identity,
            machine_guid: self.deps.machine_guid,
        })
    }
}

impl ResetUseCase for AppService<'_> {
    fn reset(
        &self,
        profile: &PlatformProfile,
        options: &ResetOptions,
        sink: &dyn StatusSink,
    ) -> Result<ResetReport, ResetFailure> {
        self.orchestrator().reset(profile, options, sink)
    }

    fn restore(
        &self,
        record: &BackupRecord,
        profile: &PlatformProfile,
        sink: &dyn StatusSink,
    ) -> Result<RestoreOutcome, DomainError> {
        self.coordinator().restore(record, profile, sink)
    }
}

#[cfg(test)]
pub(crate) mod testing;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;
    use crp_domain::model::{NativeTarget, Stage, StageStatus, StoreKind, TELEMETRY_KEYS};
    use crp_domain::port::driven::NullStatusSink;
    use crp_domain::port::driving::BackupAdminUseCase;
    use std::fs;

    #[test]
    fn reset_end_to_end_keeps_unrelated_keys() {
        let h = Harness::new();
        let original = r#"{"window.zoomLevel": 1, "recent": ["/a", "/b"], "telemetry.machineId": "old"}"#;
        fs::write(h.store_path(), original).unwrap();
        let app = h.app();

        let report = app
            .reset(&h.profile(vec![]), &ResetOptions::default(), &NullStatusSink)
            .unwrap();

        assert!(report.is_complete());
        assert_eq!(report.backups.len(), 1);
        assert_eq!(report.backups[0].kind, StoreKind::IdentityStore);
        assert_eq!(fs::read_to_string(&report.backups[0].path).unwrap(), original);

        let set = report.identifiers.as_ref().unwrap();
        let text = fs::read_to_string(h.store_path()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        for key in TELEMETRY_KEYS {
            assert!(json[key].is_string(), "{key} missing");
        }
        assert_eq!(json["telemetry.machineId"], set.machine_id());
        assert_eq!(json["window.zoomLevel"], 1);
        assert_eq!(json["recent"], serde_json::json!(["/a", "/b"]));
    }

    #[test]
    fn backup_then_restore_is_byte_identical() {
        let h = Harness::new();
        let original = "{\r\n  \"keep\": \"me\",\r\n  \"telemetry.sqmId\": \"{OLD}\"\r\n}\r\n";
        fs::write(h.store_path(), original).unwrap();
        let app = h.app();
        let profile = h.profile(vec![]);

        let report = app
            .reset(&profile, &ResetOptions::default(), &NullStatusSink)
            .unwrap();
        assert_ne!(fs::read_to_string(h.store_path()).unwrap(), original);

        let record = app.find_backup(&report.backups[0].path).unwrap();
        let outcome = app.restore(&record, &profile, &NullStatusSink).unwrap();

        assert!(matches!(
            outcome,
            RestoreOutcome::Restored { kind: StoreKind::IdentityStore, .. }
        ));
        assert_eq!(fs::read(h.store_path()).unwrap(), original.as_bytes());
    }

    #[test]
    fn missing_store_after_native_stage_reports_committed_stage() {
        let h = Harness::new();
        let app = h.app();
        let profile = h.profile(vec![NativeTarget::RegistryMachineGuid]);

        let failure = app
            .reset(&profile, &ResetOptions::default(), &NullStatusSink)
            .unwrap_err();

        assert_eq!(failure.stage, Stage::IdentityStore);
        assert!(matches!(failure.error, DomainError::StoreNotFound(_)));
        assert_eq!(
            failure.report.status_of(Stage::NativeMutation),
            &StageStatus::Committed
        );
        // MachineGuid のバックアップは実ファイルとして残る
        assert_eq!(failure.report.backups.len(), 1);
        let record = &failure.report.backups[0];
        assert_eq!(record.kind, StoreKind::MachineGuid);
        assert_eq!(
            fs::read_to_string(&record.path).unwrap().trim(),
            testing::INITIAL_GUID
        );
        assert_ne!(h.guid.current(), testing::INITIAL_GUID);

        // 記録から MachineGuid を戻せる
        let restored = app
            .restore(&app.find_backup(&record.path).unwrap(), &profile, &NullStatusSink)
            .unwrap();
        assert!(matches!(restored, RestoreOutcome::Restored { .. }));
        assert_eq!(h.guid.current(), testing::INITIAL_GUID);
    }

    #[test]
    fn running_process_blocks_without_touching_store() {
        let h = Harness::new();
        h.probe.set_running(vec!["/usr/bin/cursor".into()]);
        fs::write(h.store_path(), "{}").unwrap();
        let app = h.app();

        let failure = app
            .reset(&h.profile(vec![]), &ResetOptions::default(), &NullStatusSink)
            .unwrap_err();

        assert_eq!(failure.stage, Stage::ProcessGuard);
        assert!(matches!(failure.error, DomainError::ProcessStillRunning(_)));
        assert_eq!(fs::read_to_string(h.store_path()).unwrap(), "{}");
        assert!(app.list_backups().unwrap().is_empty());
    }

    #[test]
    fn preview_does_not_write_anything() {
        let h = Harness::new();
        let app = h.app();
        let a = app.preview_identifiers();
        let b = app.preview_identifiers();
        assert_ne!(a.machine_id(), b.machine_id());
        assert!(!h.store_path().exists());
        assert!(app.list_backups().unwrap().is_empty());
    }
}
