//! 種別ディレクトリ方式のバックアップストア
//!
//! レイアウト: `<root>/<category>/<stem>_<%Y%m%d_%H%M%S>[_<n>].<ext>`

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crp_domain::DomainError;
use crp_domain::model::{BackupRecord, StoreKind};
use crp_domain::port::driven::{BackupIter, BackupStore, Clock};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::fsutil::overwrite_preserving_mode;

/// 衝突回避の連番の上限
const MAX_COLLISION_SUFFIX: u32 = 10_000;

pub struct FsBackupStore<C: Clock> {
    root: PathBuf,
    clock: C,
}

impl<C: Clock> FsBackupStore<C> {
    pub fn new(root: impl Into<PathBuf>, clock: C) -> Self {
        Self {
            root: root.into(),
            clock,
        }
    }

    fn category_dir(&self, kind: StoreKind) -> Result<PathBuf, DomainError> {
        let dir = self.root.join(kind.category());
        fs::create_dir_all(&dir)
            .map_err(|e| DomainError::from_io(format!("create {}", dir.display()), &e))?;
        Ok(dir)
    }

    /// 既存ファイルと重ならない名前で空ファイルを確保する
    fn reserve(&self, dir: &Path, stem: &str, ext: Option<&str>) -> Result<PathBuf, DomainError> {
        let stamp = self.clock.backup_stamp();
        for n in 0..MAX_COLLISION_SUFFIX {
            let base = if n == 0 {
                format!("{stem}_{stamp}")
            } else {
                format!("{stem}_{stamp}_{n}")
            };
            let name = match ext {
                Some(ext) => format!("{base}.{ext}"),
                None => base,
            };
            let candidate = dir.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&candidate) {
                Ok(_) => return Ok(candidate),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(DomainError::from_io(
                        format!("create {}", candidate.display()),
                        &e,
                    ))
                }
            }
        }
        Err(DomainError::IoError(format!(
            "no free backup name for {stem} in {}",
            dir.display()
        )))
    }

    /// ルート配下に収まっているか（シンボリックリンク等も解決して判定）
    fn ensure_inside_root(&self, path: &Path) -> Result<(), DomainError> {
        let root = self
            .root
            .canonicalize()
            .map_err(|e| DomainError::from_io(format!("resolve {}", self.root.display()), &e))?;
        let target = path
            .canonicalize()
            .map_err(|e| DomainError::from_io(format!("resolve {}", path.display()), &e))?;
        if target == root || !target.starts_with(&root) {
            return Err(DomainError::InvalidInput(format!(
                "{} is outside the backup directory {}",
                path.display(),
                self.root.display()
            )));
        }
        Ok(())
    }

    fn record_at(&self, path: &Path, meta: &fs::Metadata) -> BackupRecord {
        let kind = kind_for(&self.root, path);
        BackupRecord {
            kind,
            source: kind.label().to_string(),
            captured_at: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            size: meta.len(),
            path: path.to_path_buf(),
        }
    }
}

/// 親ディレクトリがカテゴリならその種別、そうでなければ名前から推定
fn kind_for(root: &Path, path: &Path) -> StoreKind {
    let category = path
        .parent()
        .filter(|parent| *parent != root)
        .and_then(|parent| parent.file_name())
        .and_then(|name| StoreKind::from_category(&name.to_string_lossy()));
    category.unwrap_or_else(|| {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        StoreKind::infer_from_file_name(&name)
    })
}

impl<C: Clock> BackupStore for FsBackupStore<C> {
    fn root(&self) -> &Path {
        &self.root
    }

    fn backup_file(&self, kind: StoreKind, source: &Path) -> Result<BackupRecord, DomainError> {
        if !source.is_file() {
            return Err(DomainError::NotFound(format!(
                "backup source {}",
                source.display()
            )));
        }
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| kind.category().to_string());
        let ext = source.extension().map(|e| e.to_string_lossy().into_owned());

        let dir = self.category_dir(kind)?;
        let dest = self.reserve(&dir, &stem, ext.as_deref())?;
        let size = fs::copy(source, &dest).map_err(|e| {
            let _ = fs::remove_file(&dest);
            DomainError::from_io(
                format!("copy {} -> {}", source.display(), dest.display()),
                &e,
            )
        })?;

        info!(kind = ?kind, source = %source.display(), backup = %dest.display(), "backup created");
        Ok(BackupRecord {
            kind,
            source: source.display().to_string(),
            captured_at: self.clock.now(),
            size,
            path: dest,
        })
    }

    fn backup_value(
        &self,
        kind: StoreKind,
        label: &str,
        contents: &str,
    ) -> Result<BackupRecord, DomainError> {
        let dir = self.category_dir(kind)?;
        let dest = self.reserve(&dir, label, Some("txt"))?;
        fs::write(&dest, contents.as_bytes())
            .map_err(|e| DomainError::from_io(format!("write {}", dest.display()), &e))?;

        info!(kind = ?kind, backup = %dest.display(), "value backup created");
        Ok(BackupRecord {
            kind,
            source: label.to_string(),
            captured_at: self.clock.now(),
            size: contents.len() as u64,
            path: dest,
        })
    }

    fn list(&self) -> BackupIter<'_> {
        if !self.root.is_dir() {
            return Box::new(std::iter::empty());
        }
        let iter = WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_map(move |entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        return Some(Err(DomainError::IoError(format!(
                            "walk {}: {e}",
                            self.root.display()
                        ))))
                    }
                };
                if !entry.file_type().is_file() {
                    return None;
                }
                Some(
                    entry
                        .metadata()
                        .map(|meta| self.record_at(entry.path(), &meta))
                        .map_err(|e| {
                            DomainError::IoError(format!("stat {}: {e}", entry.path().display()))
                        }),
                )
            });
        Box::new(iter)
    }

    fn delete(&self, record: &BackupRecord) -> Result<(), DomainError> {
        if !record.path.is_file() {
            return Err(DomainError::NotFound(format!(
                "backup {}",
                record.path.display()
            )));
        }
        self.ensure_inside_root(&record.path)?;
        fs::remove_file(&record.path)
            .map_err(|e| DomainError::from_io(format!("remove {}", record.path.display()), &e))?;
        debug!(path = %record.path.display(), "backup deleted");
        Ok(())
    }

    fn clear(&self) -> Result<(), DomainError> {
        if self.root.exists() {
            fs::remove_dir_all(&self.root).map_err(|e| {
                DomainError::IoError(format!(
                    "clear {} failed, directory is in an unknown state: {e}",
                    self.root.display()
                ))
            })?;
        }
        fs::create_dir_all(&self.root).map_err(|e| {
            DomainError::IoError(format!(
                "recreate {} failed, directory is in an unknown state: {e}",
                self.root.display()
            ))
        })?;
        info!(root = %self.root.display(), "backups cleared");
        Ok(())
    }

    fn restore_file(&self, record: &BackupRecord, dest: &Path) -> Result<(), DomainError> {
        let data = fs::read(&record.path)
            .map_err(|e| DomainError::from_io(format!("read {}", record.path.display()), &e))?;
        overwrite_preserving_mode(dest, &data)?;
        info!(backup = %record.path.display(), dest = %dest.display(), "backup restored");
        Ok(())
    }

    fn read_value(&self, record: &BackupRecord) -> Result<String, DomainError> {
        let text = fs::read_to_string(&record.path)
            .map_err(|e| DomainError::from_io(format!("read {}", record.path.display()), &e))?;
        Ok(text.trim().to_string())
    }

    fn record_for(&self, path: &Path) -> Result<BackupRecord, DomainError> {
        let meta = fs::metadata(path)
            .map_err(|e| DomainError::from_io(format!("backup {}", path.display()), &e))?;
        if !meta.is_file() {
            return Err(DomainError::InvalidInput(format!(
                "{} is not a file",
                path.display()
            )));
        }
        self.ensure_inside_root(path)?;
        Ok(self.record_at(path, &meta))
    }
}
