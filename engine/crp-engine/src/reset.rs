//! リセットワークフロー
//!
//! ステージは必ず プロセス確認 → ネイティブ変更 → storage.json の順に実行する。
//! 後段が失敗しても確定済みのステージは巻き戻さず、レポートで確定範囲を返す。

use crp_domain::DomainError;
use crp_domain::model::{
    NativeChange, NativeTarget, PlatformProfile, ResetFailure, ResetReport, Stage, StageStatus,
    StoreKind, TextPatch, MACHINE_GUID_VALUE,
};
use crp_domain::port::driven::{
    BackupStore, HardwareIdReader, IdentityStore, ImageRepacker, MachineGuidStore, ProcessProbe,
    RandomSource, StatusSink,
};
use crp_domain::port::driving::ResetOptions;
use crp_domain::service::IdentifierFactory;
use tracing::{info, warn};

use crate::process_guard::ProcessGuard;

pub struct ResetDeps<'a> {
    pub probe: &'a dyn ProcessProbe,
    pub backups: &'a dyn BackupStore,
    pub identity: &'a dyn IdentityStore,
    pub machine_guid: &'a dyn MachineGuidStore,
    pub hardware: &'a dyn HardwareIdReader,
    pub repacker: &'a dyn ImageRepacker,
    pub random: &'a dyn RandomSource,
}

pub struct ResetOrchestrator<'a> {
    deps: ResetDeps<'a>,
}

impl<'a> ResetOrchestrator<'a> {
    pub fn new(deps: ResetDeps<'a>) -> Self {
        Self { deps }
    }

    pub fn reset(
        &self,
        profile: &PlatformProfile,
        options: &ResetOptions,
        sink: &dyn StatusSink,
    ) -> Result<ResetReport, ResetFailure> {
        let mut report = ResetReport::new(profile.platform());
        info!(platform = %profile.platform(), "reset started");

        self.run_stage(Stage::ProcessGuard, &mut report, sink, |_, _| {
            self.ensure_stopped(profile, options, sink)
        })?;
        self.run_stage(Stage::NativeMutation, &mut report, sink, |this, report| {
            this.mutate_native(profile, report, sink)
        })?;
        self.run_stage(Stage::IdentityStore, &mut report, sink, |this, report| {
            this.mutate_identity_store(profile, report, sink)
        })?;

        info!(backups = report.backups.len(), "reset completed");
        sink.success("Reset completed. Restart the editor to pick up the new identifiers.");
        Ok(report)
    }

    /// 1ステージを実行し、結果をレポートへ記録する
    fn run_stage<F>(
        &self,
        stage: Stage,
        report: &mut ResetReport,
        sink: &dyn StatusSink,
        body: F,
    ) -> Result<(), ResetFailure>
    where
        F: FnOnce(&Self, &mut ResetReport) -> Result<(), DomainError>,
    {
        sink.progress(stage.index(), 0);
        match body(self, report) {
            Ok(()) => {
                report.mark(stage, StageStatus::Committed);
                sink.progress(stage.index(), 100);
                Ok(())
            }
            Err(error) => {
                warn!(stage = %stage, error = %error, "reset stage failed");
                report.mark(stage, StageStatus::Failed(error.to_string()));
                sink.error(&format!("{} stage failed: {}", stage, error));
                let committed = report.committed_stages();
                if committed.contains(&Stage::NativeMutation) {
                    sink.warn("Native identity change remains applied; restore it from the backups if needed.");
                }
                Err(ResetFailure {
                    stage,
                    error,
                    report: report.clone(),
                })
            }
        }
    }

    fn ensure_stopped(
        &self,
        profile: &PlatformProfile,
        options: &ResetOptions,
        sink: &dyn StatusSink,
    ) -> Result<(), DomainError> {
        let guard = ProcessGuard::new(self.deps.probe);
        let name = profile.process_name();
        if !guard.is_running(name) {
            return Ok(());
        }
        if !options.wait_for_exit {
            return Err(DomainError::ProcessStillRunning(format!(
                "{name} is running; close it and retry"
            )));
        }
        guard.wait_until_stopped(name, &options.wait, &options.cancel, sink)?;
        sink.info(&format!("{name} has exited"));
        Ok(())
    }

    fn mutate_native(
        &self,
        profile: &PlatformProfile,
        report: &mut ResetReport,
        sink: &dyn StatusSink,
    ) -> Result<(), DomainError> {
        if profile.native_targets().is_empty() {
            sink.info("No native identity records for this platform");
            return Ok(());
        }
        for target in profile.native_targets() {
            let change = match target {
                NativeTarget::RegistryMachineGuid => self.replace_machine_guid(report, sink)?,
                NativeTarget::HardwareUuid => self.record_hardware_uuid(report, sink)?,
                NativeTarget::AppImage { image } => self.repack_image(image, report, sink)?,
            };
            report.native_change = Some(change);
        }
        Ok(())
    }

    fn replace_machine_guid(
        &self,
        report: &mut ResetReport,
        sink: &dyn StatusSink,
    ) -> Result<NativeChange, DomainError> {
        let previous = self.deps.machine_guid.read()?;
        let record =
            self.deps
                .backups
                .backup_value(StoreKind::MachineGuid, MACHINE_GUID_VALUE, &previous)?;
        sink.info(&format!("MachineGuid backed up to {}", record.path.display()));
        report.backups.push(record);

        let new = IdentifierFactory::new(self.deps.random).new_machine_guid();
        self.deps.machine_guid.write(&new)?;
        sink.success(&format!("MachineGuid updated: {previous} -> {new}"));
        Ok(NativeChange::MachineGuidReplaced { previous, new })
    }

    fn record_hardware_uuid(
        &self,
        report: &mut ResetReport,
        sink: &dyn StatusSink,
    ) -> Result<NativeChange, DomainError> {
        let value = self.deps.hardware.read_hardware_uuid()?;
        match &value {
            Some(uuid) => {
                let record =
                    self.deps
                        .backups
                        .backup_value(StoreKind::HardwareUuid, "HardwareUUID", uuid)?;
                sink.info(&format!(
                    "Hardware UUID {uuid} recorded to {} (read-only, not changed)",
                    record.path.display()
                ));
                report.backups.push(record);
            }
            None => sink.warn("Hardware UUID not found in system_profiler output"),
        }
        Ok(NativeChange::HardwareUuidRecorded { value })
    }

    fn repack_image(
        &self,
        image: &std::path::Path,
        report: &mut ResetReport,
        sink: &dyn StatusSink,
    ) -> Result<NativeChange, DomainError> {
        let record = self.deps.backups.backup_file(StoreKind::AppImage, image)?;
        sink.info(&format!("AppImage backed up to {}", record.path.display()));
        report.backups.push(record);

        sink.info("Extracting and patching AppImage...");
        let outcome = self
            .deps
            .repacker
            .repack(image, &TextPatch::machine_id_patches())?;
        if outcome.patched_files.is_empty() {
            sink.warn("No machine-id invocation found in the AppImage scripts");
        }
        sink.success(&format!("Patched AppImage written to {}", outcome.output.display()));
        Ok(NativeChange::ImageRepacked {
            output: outcome.output,
            patched_files: outcome.patched_files,
        })
    }

    fn mutate_identity_store(
        &self,
        profile: &PlatformProfile,
        report: &mut ResetReport,
        sink: &dyn StatusSink,
    ) -> Result<(), DomainError> {
        let path = profile.identity_store_path();
        if !self.deps.identity.exists(path) {
            return Err(DomainError::StoreNotFound(path.display().to_string()));
        }

        let record = self.deps.backups.backup_file(StoreKind::IdentityStore, path)?;
        sink.info(&format!("storage.json backed up to {}", record.path.display()));
        report.backups.push(record);

        let set = IdentifierFactory::new(self.deps.random).new_set();
        self.deps.identity.merge_identifiers(path, &set)?;
        for (key, value) in set.entries() {
            sink.info(&format!("{key} = {value}"));
        }
        report.identifiers = Some(set);
        Ok(())
    }
}
