//! バックアップ記録

use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// バックアップ元ストアの種別。
///
/// バックアップルート直下のカテゴリディレクトリ名がそのまま種別タグになる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKind {
    /// storage.json
    IdentityStore,
    /// Windows レジストリの MachineGuid
    MachineGuid,
    /// macOS のハードウェアUUID（表示のみ）
    HardwareUuid,
    /// Linux の AppImage
    AppImage,
    /// 判別できないファイル
    Other,
}

impl StoreKind {
    /// 既知の種別（カテゴリディレクトリを持つもの）
    pub const KNOWN: [StoreKind; 4] = [
        StoreKind::IdentityStore,
        StoreKind::MachineGuid,
        StoreKind::HardwareUuid,
        StoreKind::AppImage,
    ];

    /// カテゴリディレクトリ名
    pub fn category(&self) -> &'static str {
        match self {
            StoreKind::IdentityStore => "storage",
            StoreKind::MachineGuid => "MachineGuid",
            StoreKind::HardwareUuid => "HardwareUUID",
            StoreKind::AppImage => "AppImage",
            StoreKind::Other => "other",
        }
    }

    /// ディレクトリ名から種別を得る（大文字小文字は無視）
    pub fn from_category(name: &str) -> Option<Self> {
        Self::KNOWN
            .iter()
            .copied()
            .find(|kind| kind.category().eq_ignore_ascii_case(name))
    }

    /// カテゴリ外のファイル向けの推定（旧ツールのバックアップ互換）
    pub fn infer_from_file_name(file_name: &str) -> Self {
        let lower = file_name.to_ascii_lowercase();
        let stem = lower.rsplit_once('.').map(|(s, _)| s).unwrap_or(&lower);
        if lower.ends_with(".json") {
            StoreKind::IdentityStore
        } else if lower.ends_with(".appimage") {
            StoreKind::AppImage
        } else if stem.contains("machineguid") {
            StoreKind::MachineGuid
        } else if stem.contains("hardwareuuid") {
            StoreKind::HardwareUuid
        } else {
            StoreKind::Other
        }
    }

    /// 書き戻し可能か（ハードウェアUUIDは表示のみ）
    pub fn is_restorable(&self) -> bool {
        matches!(
            self,
            StoreKind::IdentityStore | StoreKind::MachineGuid | StoreKind::AppImage
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            StoreKind::IdentityStore => "storage.json",
            StoreKind::MachineGuid => "MachineGuid",
            StoreKind::HardwareUuid => "Hardware UUID",
            StoreKind::AppImage => "AppImage",
            StoreKind::Other => "unknown",
        }
    }
}

/// ディスク上のバックアップ1件。作成後は変更しない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRecord {
    /// 元ストアの種別
    pub kind: StoreKind,
    /// 元の場所（パスまたはレジストリ値の表記）
    pub source: String,
    /// 取得時刻
    pub captured_at: SystemTime,
    /// バイト数
    pub size: u64,
    /// バックアップファイルの絶対パス
    pub path: PathBuf,
}

impl BackupRecord {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// KB 単位のサイズ（表示用）
    pub fn size_kb(&self) -> f64 {
        self.size as f64 / 1024.0
    }
}
