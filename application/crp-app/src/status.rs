//! 環境の状態確認（書き込みなし）

use std::path::PathBuf;

use crp_domain::model::{Platform, PlatformProfile};
use crp_engine::ProcessGuard;

use crate::AppService;

#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentStatus {
    pub platform: Platform,
    pub process_name: String,
    pub process_running: bool,
    pub identity_store: PathBuf,
    pub identity_store_present: bool,
    pub native_targets: Vec<String>,
    pub backup_root: PathBuf,
    pub backup_count: usize,
}

impl AppService<'_> {
    pub fn status(&self, profile: &PlatformProfile) -> EnvironmentStatus {
        let store = profile.identity_store_path();
        EnvironmentStatus {
            platform: profile.platform(),
            process_name: profile.process_name().to_string(),
            process_running: ProcessGuard::new(self.deps.probe).is_running(profile.process_name()),
            identity_store: store.to_path_buf(),
            identity_store_present: self.deps.identity.exists(store),
            native_targets: profile
                .native_targets()
                .iter()
                .map(|t| t.describe())
                .collect(),
            backup_root: self.deps.backups.root().to_path_buf(),
            backup_count: self.deps.backups.list().filter(|r| r.is_ok()).count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::Harness;
    use crp_domain::model::{NativeTarget, StoreKind};
    use crp_domain::port::driven::BackupStore;
    use std::fs;

    #[test]
    fn status_reflects_process_store_and_backups() {
        let h = Harness::new();
        let profile = h.profile(vec![NativeTarget::HardwareUuid]);

        let before = h.app().status(&profile);
        assert!(!before.process_running);
        assert!(!before.identity_store_present);
        assert_eq!(before.backup_count, 0);
        assert_eq!(before.native_targets.len(), 1);

        fs::write(h.store_path(), "{}").unwrap();
        h.backups
            .backup_file(StoreKind::IdentityStore, &h.store_path())
            .unwrap();
        h.probe.set_running(vec!["Cursor".into()]);

        let after = h.app().status(&profile);
        assert!(after.process_running);
        assert!(after.identity_store_present);
        assert_eq!(after.backup_count, 1);
        assert_eq!(after.process_name, "cursor");
    }
}
