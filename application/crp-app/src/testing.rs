//! 実ファイルシステムのアダプターとネイティブ系モックを組み合わせたテスト環境

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crp_adapter_fs::{FsBackupStore, JsonIdentityStore};
use crp_domain::DomainError;
use crp_domain::model::{NativeTarget, Platform, PlatformProfile, TextPatch};
use crp_domain::port::driven::{
    Clock, HardwareIdReader, ImageRepacker, MachineGuidStore, ProcessProbe, RandomSource,
    RepackOutcome,
};

use crate::{AppDeps, AppService};

pub const INITIAL_GUID: &str = "0d5e3c1a-7f44-4e0b-9a61-2b8f6c3d9e10";
pub const STAMP: &str = "20240102_030405";

pub struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }

    fn backup_stamp(&self) -> String {
        STAMP.to_string()
    }
}

#[derive(Default)]
pub struct FakeProbe(RefCell<Vec<String>>);

impl FakeProbe {
    pub fn set_running(&self, names: Vec<String>) {
        *self.0.borrow_mut() = names;
    }
}

impl ProcessProbe for FakeProbe {
    fn process_names(&self) -> Result<Vec<String>, DomainError> {
        Ok(self.0.borrow().clone())
    }
}

pub struct FakeGuid(RefCell<String>);

impl FakeGuid {
    pub fn current(&self) -> String {
        self.0.borrow().clone()
    }
}

impl MachineGuidStore for FakeGuid {
    fn read(&self) -> Result<String, DomainError> {
        Ok(self.current())
    }

    fn write(&self, guid: &str) -> Result<(), DomainError> {
        *self.0.borrow_mut() = guid.to_string();
        Ok(())
    }
}

pub struct NoHardware;

impl HardwareIdReader for NoHardware {
    fn read_hardware_uuid(&self) -> Result<Option<String>, DomainError> {
        Ok(None)
    }
}

pub struct NoRepack;

impl ImageRepacker for NoRepack {
    fn repack(&self, image: &Path, _patches: &[TextPatch]) -> Result<RepackOutcome, DomainError> {
        Err(DomainError::RepackFailed(format!("not available: {}", image.display())))
    }
}

/// xorshift64
pub struct SeqRandom(Cell<u64>);

impl RandomSource for SeqRandom {
    fn fill_bytes(&self, buf: &mut [u8]) {
        for b in buf.iter_mut() {
            let mut x = self.0.get();
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            self.0.set(x);
            *b = (x >> 24) as u8;
        }
    }
}

pub struct Harness {
    dir: tempfile::TempDir,
    pub backups: FsBackupStore<FixedClock>,
    pub identity: JsonIdentityStore,
    pub probe: FakeProbe,
    pub guid: FakeGuid,
    pub hardware: NoHardware,
    pub repacker: NoRepack,
    pub random: SeqRandom,
}

impl Harness {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("home")).unwrap();
        let backups = FsBackupStore::new(dir.path().join("CursorResetPlus").join("backups"), FixedClock);
        Self {
            dir,
            backups,
            identity: JsonIdentityStore::new(),
            probe: FakeProbe::default(),
            guid: FakeGuid(RefCell::new(INITIAL_GUID.to_string())),
            hardware: NoHardware,
            repacker: NoRepack,
            random: SeqRandom(Cell::new(0x9E37_79B9_7F4A_7C15)),
        }
    }

    pub fn store_path(&self) -> PathBuf {
        self.dir.path().join("home").join("storage.json")
    }

    pub fn profile(&self, targets: Vec<NativeTarget>) -> PlatformProfile {
        PlatformProfile::new(Platform::Linux, self.store_path(), targets)
    }

    pub fn app(&self) -> AppService<'_> {
        AppService::new(AppDeps {
            probe: &self.probe,
            backups: &self.backups,
            identity: &self.identity,
            machine_guid: &self.guid,
            hardware: &self.hardware,
            repacker: &self.repacker,
            random: &self.random,
        })
    }
}
