//! エンジンのテスト用モックポート

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crp_domain::DomainError;
use crp_domain::model::{BackupRecord, IdentifierSet, Severity, StoreKind, TextPatch};
use crp_domain::port::driven::{
    BackupIter, BackupStore, HardwareIdReader, IdentityStore, ImageRepacker, MachineGuidStore,
    ProcessProbe, RandomSource, RepackOutcome, StatusSink,
};

/// 呼ばれるたびに台本の次の一覧を返す（最後の一覧は繰り返す）
pub struct ScriptedProbe {
    script: RefCell<VecDeque<Vec<String>>>,
    fail: bool,
    calls: Cell<usize>,
}

impl ScriptedProbe {
    pub fn new(script: Vec<Vec<&str>>) -> Self {
        Self {
            script: RefCell::new(
                script
                    .into_iter()
                    .map(|names| names.into_iter().map(String::from).collect())
                    .collect(),
            ),
            fail: false,
            calls: Cell::new(0),
        }
    }

    pub fn always(names: Vec<&str>) -> Self {
        Self::new(vec![names])
    }

    pub fn idle() -> Self {
        Self::new(vec![vec![]])
    }

    pub fn failing() -> Self {
        Self {
            script: RefCell::new(VecDeque::new()),
            fail: true,
            calls: Cell::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl ProcessProbe for ScriptedProbe {
    fn process_names(&self) -> Result<Vec<String>, DomainError> {
        self.calls.set(self.calls.get() + 1);
        if self.fail {
            return Err(DomainError::Unknown("process list unavailable".into()));
        }
        let mut script = self.script.borrow_mut();
        if script.len() > 1 {
            Ok(script.pop_front().unwrap_or_default())
        } else {
            Ok(script.front().cloned().unwrap_or_default())
        }
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub events: RefCell<Vec<(String, Severity)>>,
    pub progress: RefCell<Vec<(usize, u8)>>,
}

impl RecordingSink {
    pub fn with_severity(&self, severity: Severity) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter(|(_, s)| *s == severity)
            .map(|(m, _)| m.clone())
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.with_severity(Severity::Warning)
    }
}

impl StatusSink for RecordingSink {
    fn status(&self, message: &str, severity: Severity) {
        self.events.borrow_mut().push((message.to_string(), severity));
    }

    fn progress(&self, stage_index: usize, percent: u8) {
        self.progress.borrow_mut().push((stage_index, percent));
    }
}

/// メモリ上のバックアップストア
pub struct MemoryBackups {
    root: PathBuf,
    pub records: RefCell<Vec<BackupRecord>>,
    pub values: RefCell<Vec<(PathBuf, String)>>,
    pub restored: RefCell<Vec<(PathBuf, PathBuf)>>,
}

impl MemoryBackups {
    pub fn new() -> Self {
        Self {
            root: PathBuf::from("/backups"),
            records: RefCell::new(Vec::new()),
            values: RefCell::new(Vec::new()),
            restored: RefCell::new(Vec::new()),
        }
    }

    fn push(&self, kind: StoreKind, source: String, name: String, size: u64) -> BackupRecord {
        let record = BackupRecord {
            kind,
            source,
            captured_at: SystemTime::now(),
            size,
            path: self.root.join(kind.category()).join(name),
        };
        self.records.borrow_mut().push(record.clone());
        record
    }
}

impl BackupStore for MemoryBackups {
    fn root(&self) -> &Path {
        &self.root
    }

    fn backup_file(&self, kind: StoreKind, source: &Path) -> Result<BackupRecord, DomainError> {
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".into());
        Ok(self.push(kind, source.display().to_string(), name, 0))
    }

    fn backup_value(
        &self,
        kind: StoreKind,
        label: &str,
        contents: &str,
    ) -> Result<BackupRecord, DomainError> {
        let record = self.push(
            kind,
            label.to_string(),
            format!("{label}.txt"),
            contents.len() as u64,
        );
        self.values
            .borrow_mut()
            .push((record.path.clone(), contents.to_string()));
        Ok(record)
    }

    fn list(&self) -> BackupIter<'_> {
        let records = self.records.borrow().clone();
        Box::new(records.into_iter().map(Ok))
    }

    fn delete(&self, record: &BackupRecord) -> Result<(), DomainError> {
        let mut records = self.records.borrow_mut();
        let before = records.len();
        records.retain(|r| r.path != record.path);
        if records.len() == before {
            return Err(DomainError::NotFound(record.path.display().to_string()));
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), DomainError> {
        self.records.borrow_mut().clear();
        Ok(())
    }

    fn restore_file(&self, record: &BackupRecord, dest: &Path) -> Result<(), DomainError> {
        self.restored
            .borrow_mut()
            .push((record.path.clone(), dest.to_path_buf()));
        Ok(())
    }

    fn read_value(&self, record: &BackupRecord) -> Result<String, DomainError> {
        self.values
            .borrow()
            .iter()
            .find(|(p, _)| *p == record.path)
            .map(|(_, v)| v.trim().to_string())
            .ok_or_else(|| DomainError::NotFound(record.path.display().to_string()))
    }

    fn record_for(&self, path: &Path) -> Result<BackupRecord, DomainError> {
        self.records
            .borrow()
            .iter()
            .find(|r| r.path == path)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(path.display().to_string()))
    }
}

pub struct MockIdentity {
    pub present: bool,
    pub merged: RefCell<Vec<(PathBuf, IdentifierSet)>>,
}

impl MockIdentity {
    pub fn present() -> Self {
        Self {
            present: true,
            merged: RefCell::new(Vec::new()),
        }
    }

    pub fn missing() -> Self {
        Self {
            present: false,
            merged: RefCell::new(Vec::new()),
        }
    }
}

impl IdentityStore for MockIdentity {
    fn exists(&self, _path: &Path) -> bool {
        self.present
    }

    fn merge_identifiers(&self, path: &Path, set: &IdentifierSet) -> Result<(), DomainError> {
        self.merged
            .borrow_mut()
            .push((path.to_path_buf(), set.clone()));
        Ok(())
    }
}

pub struct MockGuid {
    pub value: RefCell<String>,
    pub deny_write: bool,
    pub missing: bool,
}

impl MockGuid {
    pub fn new(value: &str) -> Self {
        Self {
            value: RefCell::new(value.to_string()),
            deny_write: false,
            missing: false,
        }
    }
}

impl MachineGuidStore for MockGuid {
    fn read(&self) -> Result<String, DomainError> {
        if self.missing {
            return Err(DomainError::NotFound("MachineGuid".into()));
        }
        Ok(self.value.borrow().clone())
    }

    fn write(&self, guid: &str) -> Result<(), DomainError> {
        if self.deny_write {
            return Err(DomainError::PermissionDenied("MachineGuid".into()));
        }
        *self.value.borrow_mut() = guid.to_string();
        Ok(())
    }
}

pub struct MockHardware(pub Option<String>);

impl HardwareIdReader for MockHardware {
    fn read_hardware_uuid(&self) -> Result<Option<String>, DomainError> {
        Ok(self.0.clone())
    }
}

pub struct MockRepacker {
    pub fail: bool,
    pub calls: RefCell<Vec<PathBuf>>,
}

impl MockRepacker {
    pub fn ok() -> Self {
        Self {
            fail: false,
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl ImageRepacker for MockRepacker {
    fn repack(&self, image: &Path, patches: &[TextPatch]) -> Result<RepackOutcome, DomainError> {
        self.calls.borrow_mut().push(image.to_path_buf());
        if self.fail {
            return Err(DomainError::RepackFailed("--appimage-extract exited with 1".into()));
        }
        Ok(RepackOutcome {
            output: PathBuf::from("/scratch/Cursor.AppImage"),
            patched_files: patches.iter().map(|p| p.relative_path.clone()).collect(),
        })
    }
}

/// 呼ぶたびに値が変わる決定的な乱数
pub struct CountingRandom(pub Cell<u8>);

impl Default for CountingRandom {
    fn default() -> Self {
        Self(Cell::new(1))
    }
}

impl RandomSource for CountingRandom {
    fn fill_bytes(&self, buf: &mut [u8]) {
        for byte in buf.iter_mut() {
            let next = self.0.get().wrapping_mul(29).wrapping_add(7);
            self.0.set(next);
            *byte = next;
        }
    }
}
