//! 書き込みヘルパー

use std::fs::{self, Permissions};
use std::io::{self, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crp_domain::DomainError;
use tracing::warn;

pub(crate) fn ensure_parent_dir(path: &Path) -> Result<(), DomainError> {
    let Some(dir) = path.parent() else {
        return Ok(());
    };
    fs::create_dir_all(dir).map_err(|e| DomainError::from_io(format!("create {}", dir.display()), &e))
}

/// 一時ファイルに書いてから rename する
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> Result<(), DomainError> {
    ensure_parent_dir(path)?;
    let tmp_path = path.with_extension(format!("tmp.{}", unique_suffix()));
    {
        let mut f = fs::File::create(&tmp_path)
            .map_err(|e| DomainError::from_io("create temp file", &e))?;
        f.write_all(data)
            .map_err(|e| DomainError::from_io("write temp file", &e))?;
        let _ = f.sync_all();
    }
    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        DomainError::from_io(format!("rename into {}", path.display()), &e)
    })
}

/// ファイルをその場で上書きする（無ければ親ディレクトリごと作る）。
/// 読み取り専用なら一時的に解除し、書き込みの成否によらず元の属性へ戻す。
pub(crate) fn overwrite_preserving_mode(path: &Path, data: &[u8]) -> Result<(), DomainError> {
    let original = match fs::metadata(path) {
        Ok(meta) => meta.permissions(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            ensure_parent_dir(path)?;
            return fs::write(path, data)
                .map_err(|e| DomainError::from_io(format!("write {}", path.display()), &e));
        }
        Err(e) => return Err(DomainError::from_io(format!("stat {}", path.display()), &e)),
    };
    let was_readonly = original.readonly();
    if was_readonly {
        fs::set_permissions(path, writable(&original))
            .map_err(|e| DomainError::from_io(format!("clear read-only {}", path.display()), &e))?;
    }

    let result = fs::write(path, data)
        .map_err(|e| DomainError::from_io(format!("write {}", path.display()), &e));

    if was_readonly {
        if let Err(e) = fs::set_permissions(path, original) {
            warn!(path = %path.display(), error = %e, "failed to restore file mode");
        }
    }
    result
}

#[cfg(unix)]
fn writable(perm: &Permissions) -> Permissions {
    use std::os::unix::fs::PermissionsExt;
    Permissions::from_mode(perm.mode() | 0o200)
}

#[cfg(not(unix))]
#[allow(clippy::permissions_set_readonly_false)]
fn writable(perm: &Permissions) -> Permissions {
    let mut perm = perm.clone();
    perm.set_readonly(false);
    perm
}

fn unique_suffix() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("{}.{}", std::process::id(), nanos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overwrite_restores_read_only_flag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locked.json");
        fs::write(&path, b"old").unwrap();
        let mut perm = fs::metadata(&path).unwrap().permissions();
        perm.set_readonly(true);
        fs::set_permissions(&path, perm).unwrap();

        overwrite_preserving_mode(&path, b"new").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"new");
        assert!(fs::metadata(&path).unwrap().permissions().readonly());

        // tempdir の後始末のため書き込み可能に戻す
        let perm = writable(&fs::metadata(&path).unwrap().permissions());
        fs::set_permissions(&path, perm).unwrap();
    }

    #[test]
    fn overwrite_creates_missing_file_and_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone").join("Cursor.AppImage");
        overwrite_preserving_mode(&path, b"image").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"image");
    }

    #[test]
    fn atomic_write_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config").join("config.json");
        write_atomic(&path, b"{}").unwrap();
        write_atomic(&path, b"{\"a\":1}").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"a\":1}");
        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".tmp."))
            .collect();
        assert!(leftovers.is_empty());
    }
}
