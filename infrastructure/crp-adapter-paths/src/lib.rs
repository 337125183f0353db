//! CursorResetPlus の既定パス解決
//!
//! storage.json の場所は OS の慣例パスから決定的に組み立てる（ディスクには触れない）。
//! AppImage だけは利用者指定のため、リセット時に限り存在確認を行う。

use std::path::{Path, PathBuf};

use crp_domain::DomainError;
use crp_domain::model::{NativeTarget, Platform, PlatformProfile};

/// 製品ルートのディレクトリ名（ホーム直下）
pub const PRODUCT_DIR_NAME: &str = "CursorResetPlus";
/// 製品ルートを上書きする環境変数
pub const HOME_ENV: &str = "CRP_HOME";

/// 製品ルートとその配下
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDirs {
    root: PathBuf,
}

impl ProductDirs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 上書き指定があればそれを、無ければ `~/CursorResetPlus`
    pub fn resolve(override_root: Option<PathBuf>) -> Result<Self, DomainError> {
        if let Some(root) = override_root.filter(|p| !p.as_os_str().is_empty()) {
            return Ok(Self::new(root));
        }
        Ok(Self::new(home_dir()?.join(PRODUCT_DIR_NAME)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// バックアップルート（種別ごとのサブディレクトリを持つ）
    pub fn backups(&self) -> PathBuf {
        self.root.join("backups")
    }

    pub fn logs(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// AppImage の展開・再パッケージ用
    pub fn temp(&self) -> PathBuf {
        self.root.join("temp")
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("config").join("config.json")
    }
}

fn home_dir() -> Result<PathBuf, DomainError> {
    dirs::home_dir().ok_or_else(|| DomainError::NotFound("home directory".into()))
}

/// storage.json の既定パス（純粋関数）
///
/// - Windows: `%APPDATA%\Cursor\User\globalStorage\storage.json`
/// - macOS: `~/Library/Application Support/Cursor/User/globalStorage/storage.json`
/// - Linux: `~/.config/Cursor/User/globalStorage/storage.json`
pub fn identity_store_path_in(platform: Platform, home: &Path, appdata: Option<&Path>) -> PathBuf {
    let base = match platform {
        Platform::Windows => appdata
            .map(Path::to_path_buf)
            .unwrap_or_else(|| home.join("AppData").join("Roaming")),
        Platform::MacOs => home.join("Library").join("Application Support"),
        Platform::Linux => home.join(".config"),
    };
    base.join("Cursor")
        .join("User")
        .join("globalStorage")
        .join("storage.json")
}

/// 実行環境から storage.json の既定パスを求める
pub fn default_identity_store_path(platform: Platform) -> Result<PathBuf, DomainError> {
    let home = home_dir()?;
    let appdata = std::env::var_os("APPDATA")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);
    Ok(identity_store_path_in(platform, &home, appdata.as_deref()))
}

/// プラットフォームごとのネイティブ識別子レコード（リセット用）。
/// Linux では AppImage が実在することまで確認する。
pub fn native_targets_for(
    platform: Platform,
    appimage: Option<&Path>,
) -> Result<Vec<NativeTarget>, DomainError> {
    match (platform, declared_image(appimage)) {
        (Platform::Linux, None) => Err(DomainError::InvalidInput(
            "an AppImage path is required on Linux".into(),
        )),
        (Platform::Linux, Some(image)) if !image.is_file() => Err(DomainError::InvalidInput(
            format!("AppImage not found: {}", image.display()),
        )),
        _ => Ok(declared_targets_for(platform, appimage)),
    }
}

/// 復元・一覧用のネイティブ識別子レコード。
/// 復元はファイルを作り直せるので AppImage の存在は問わない。
pub fn declared_targets_for(platform: Platform, appimage: Option<&Path>) -> Vec<NativeTarget> {
    match platform {
        Platform::Windows => vec![NativeTarget::RegistryMachineGuid],
        Platform::MacOs => vec![NativeTarget::HardwareUuid],
        Platform::Linux => declared_image(appimage)
            .map(|image| NativeTarget::AppImage {
                image: image.to_path_buf(),
            })
            .into_iter()
            .collect(),
    }
}

fn declared_image(appimage: Option<&Path>) -> Option<&Path> {
    appimage.filter(|p| !p.as_os_str().is_empty())
}

/// 1回のリセットで使うプロファイルを組み立てる
pub fn resolve_profile_in(
    platform: Platform,
    store_path: PathBuf,
    appimage: Option<&Path>,
    process_name: Option<&str>,
) -> Result<PlatformProfile, DomainError> {
    let targets = native_targets_for(platform, appimage)?;
    let profile = PlatformProfile::new(platform, store_path, targets);
    Ok(match process_name {
        Some(name) => profile.with_process_name(name),
        None => profile,
    })
}

/// 実行環境の既定パスでプロファイルを解決する
pub fn resolve_profile(
    platform: Platform,
    appimage: Option<&Path>,
    process_name: Option<&str>,
) -> Result<PlatformProfile, DomainError> {
    let store_path = default_identity_store_path(platform)?;
    resolve_profile_in(platform, store_path, appimage, process_name)
}
