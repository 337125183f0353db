//! 対象プラットフォームとプロファイル

use std::fmt;
use std::path::{Path, PathBuf};

/// レジストリ上の MachineGuid の場所
pub const MACHINE_GUID_KEY: &str = r"SOFTWARE\Microsoft\Cryptography";
pub const MACHINE_GUID_VALUE: &str = "MachineGuid";

/// 対象OS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
}

impl Platform {
    pub fn all() -> &'static [Platform] {
        &[Platform::Windows, Platform::MacOs, Platform::Linux]
    }

    /// ビルド対象OSから自動判定（Windows/macOS 以外は Linux 扱い）
    pub fn detect() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::MacOs => "macos",
            Platform::Linux => "linux",
        }
    }

    /// 大文字小文字を無視して解釈（"darwin" も macOS として受け付ける）
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "windows" | "win" | "win32" => Some(Platform::Windows),
            "macos" | "mac" | "darwin" | "osx" => Some(Platform::MacOs),
            "linux" => Some(Platform::Linux),
            _ => None,
        }
    }

    /// 対象IDEのプロセス名（既定値）
    pub fn default_process_name(&self) -> &'static str {
        match self {
            Platform::Windows => "cursor.exe",
            Platform::MacOs => "Cursor",
            Platform::Linux => "cursor",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// OS 固有の識別子レコード
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeTarget {
    /// HKLM 配下の MachineGuid（書き換え対象）
    RegistryMachineGuid,
    /// ハードウェアUUID（読み取りと記録のみ）
    HardwareUuid,
    /// 利用者が指定した AppImage（展開→パッチ→再パッケージ）
    AppImage { image: PathBuf },
}

impl NativeTarget {
    pub fn describe(&self) -> String {
        match self {
            NativeTarget::RegistryMachineGuid => {
                format!(r"HKLM\{}\{}", MACHINE_GUID_KEY, MACHINE_GUID_VALUE)
            }
            NativeTarget::HardwareUuid => "Hardware UUID (read-only)".to_string(),
            NativeTarget::AppImage { image } => format!("AppImage {}", image.display()),
        }
    }
}

/// 1回のリセットで使うプロファイル。実行中に差し替えない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformProfile {
    platform: Platform,
    identity_store_path: PathBuf,
    native_targets: Vec<NativeTarget>,
    process_name: String,
}

impl PlatformProfile {
    pub fn new(
        platform: Platform,
        identity_store_path: impl Into<PathBuf>,
        native_targets: Vec<NativeTarget>,
    ) -> Self {
        Self {
            platform,
            identity_store_path: identity_store_path.into(),
            native_targets,
            process_name: platform.default_process_name().to_string(),
        }
    }

    /// 監視するプロセス名を差し替える
    pub fn with_process_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.trim().is_empty() {
            self.process_name = name.trim().to_string();
        }
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn identity_store_path(&self) -> &Path {
        &self.identity_store_path
    }

    pub fn native_targets(&self) -> &[NativeTarget] {
        &self.native_targets
    }

    pub fn process_name(&self) -> &str {
        &self.process_name
    }

    /// プロファイルに含まれる AppImage のパス（Linux のみ）
    pub fn app_image(&self) -> Option<&Path> {
        self.native_targets.iter().find_map(|t| match t {
            NativeTarget::AppImage { image } => Some(image.as_path()),
            _ => None,
        })
    }
}
