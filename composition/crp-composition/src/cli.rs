//! CLI 用ランタイム配線。
//! 製品ディレクトリ・設定・各アダプタをここで組み立てる。

use std::path::{Path, PathBuf};

use anyhow::Context;
use crp_adapter_appimage::AppImageRepacker;
use crp_adapter_clock::ClockAdapter;
use crp_adapter_fs::{FsBackupStore, FsConfigRepository, JsonIdentityStore};
use crp_adapter_hardware::SystemProfilerReader;
use crp_adapter_paths::{self as paths, ProductDirs};
use crp_adapter_process::SysinfoProbe;
use crp_adapter_registry::{is_elevated, MachineGuidRegistry};
use crp_app::{AppDeps, AppService};
use crp_domain::model::{
    CancellationToken, Platform, PlatformProfile, ToolConfig, WaitPolicy,
};
use crp_domain::port::driven::ConfigRepository;
use crp_domain::port::driving::ResetOptions;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::Result;

/// CLI実行ファイル用の依存関係
pub struct CliRuntime {
    dirs: ProductDirs,
    config_repo: FsConfigRepository,
    config: ToolConfig,
    clock: ClockAdapter,
    backups: FsBackupStore<ClockAdapter>,
    identity: JsonIdentityStore,
    machine_guid: MachineGuidRegistry,
    hardware: SystemProfilerReader,
    repacker: AppImageRepacker,
    probe: SysinfoProbe,
}

impl CliRuntime {
    /// 製品ルートを解決し、設定を読み込んで組み立てる
    pub fn new(home: Option<PathBuf>) -> Result<Self> {
        let dirs = ProductDirs::resolve(home).context("resolve product directory")?;
        Self::with_dirs(dirs)
    }

    pub fn with_dirs(dirs: ProductDirs) -> Result<Self> {
        let config_repo = FsConfigRepository::new(dirs.config_file());
        let config = config_repo
            .load()
            .with_context(|| format!("load {}", config_repo.path().display()))?;
        debug!(root = %dirs.root().display(), ?config, "runtime configured");

        let clock = ClockAdapter::new();
        Ok(Self {
            backups: FsBackupStore::new(dirs.backups(), clock),
            repacker: AppImageRepacker::new(dirs.temp()),
            dirs,
            config_repo,
            config,
            clock,
            identity: JsonIdentityStore::new(),
            machine_guid: MachineGuidRegistry::new(),
            hardware: SystemProfilerReader::new(),
            probe: SysinfoProbe::new(),
        })
    }

    /// アプリケーションサービス取得
    pub fn app(&self) -> AppService<'_> {
        AppService::new(AppDeps {
            probe: &self.probe,
            backups: &self.backups,
            identity: &self.identity,
            machine_guid: &self.machine_guid,
            hardware: &self.hardware,
            repacker: &self.repacker,
            random: &self.clock,
        })
    }

    pub fn dirs(&self) -> &ProductDirs {
        &self.dirs
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        self.config_repo.path()
    }

    pub fn config_exists(&self) -> bool {
        self.config_repo.exists()
    }

    /// 設定保存
    pub fn save_config(&self, config: &ToolConfig) -> Result<()> {
        self.config_repo
            .save(config)
            .with_context(|| format!("save {}", self.config_repo.path().display()))
    }

    /// 明示指定がなければ実行中の OS
    pub fn platform(&self, explicit: Option<Platform>) -> Platform {
        explicit.unwrap_or_else(Platform::detect)
    }

    fn appimage<'p>(&'p self, explicit: Option<&'p Path>) -> Option<&'p Path> {
        explicit.or(self.config.appimage_path.as_deref())
    }

    /// リセット用プロファイル（Linux は AppImage 必須）
    pub fn reset_profile(
        &self,
        platform: Option<Platform>,
        appimage: Option<&Path>,
    ) -> Result<PlatformProfile> {
        let platform = self.platform(platform);
        paths::resolve_profile(
            platform,
            self.appimage(appimage),
            self.config.process_name.as_deref(),
        )
        .with_context(|| format!("resolve {platform} profile"))
    }

    /// 復元・状態表示用プロファイル（AppImage が無くても組み立てる）
    pub fn inspect_profile(
        &self,
        platform: Option<Platform>,
        appimage: Option<&Path>,
    ) -> Result<PlatformProfile> {
        let platform = self.platform(platform);
        let store = paths::default_identity_store_path(platform)
            .with_context(|| format!("resolve {platform} identity store"))?;
        let targets = paths::declared_targets_for(platform, self.appimage(appimage));
        let profile = PlatformProfile::new(platform, store, targets);
        Ok(match self.config.process_name.as_deref() {
            Some(name) => profile.with_process_name(name),
            None => profile,
        })
    }

    /// CLI フラグ > 設定ファイル > 既定値 の順で待機ポリシーを決める
    pub fn wait_policy(&self, timeout_secs: Option<u64>) -> WaitPolicy {
        let mut policy = self.config.wait_policy();
        if let Some(secs) = timeout_secs {
            policy.timeout = Some(Duration::from_secs(secs));
        }
        policy
    }

    pub fn reset_options(
        &self,
        wait_for_exit: bool,
        timeout_secs: Option<u64>,
        cancel: CancellationToken,
    ) -> ResetOptions {
        ResetOptions {
            wait_for_exit,
            wait: self.wait_policy(timeout_secs),
            cancel,
        }
    }

    /// Windows で昇格していなければ警告を返す
    pub fn elevation_warning(&self, platform: Platform) -> Option<String> {
        if platform != Platform::Windows || !cfg!(windows) || is_elevated() {
            return None;
        }
        let msg = "Not running as Administrator: the MachineGuid registry write will be denied.";
        warn!("{msg}");
        Some(msg.to_string())
    }
}
