//! 設定ファイル（config/config.json）

use std::fs;
use std::path::{Path, PathBuf};

use crp_domain::DomainError;
use crp_domain::model::{ToolConfig, DEFAULT_POLL_INTERVAL_MS};
use crp_domain::port::driven::ConfigRepository;
use serde::{Deserialize, Serialize};

use crate::fsutil::write_atomic;

#[derive(Debug, Clone)]
pub struct FsConfigRepository {
    path: PathBuf,
}

impl FsConfigRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigRepository for FsConfigRepository {
    fn load(&self) -> Result<ToolConfig, DomainError> {
        if !self.path.exists() {
            return Ok(ToolConfig::default());
        }
        let data = fs::read_to_string(&self.path)
            .map_err(|e| DomainError::from_io(format!("read {}", self.path.display()), &e))?;
        let dto: ConfigDto = serde_json::from_str(&data).map_err(|e| {
            DomainError::InvalidInput(format!("config {}: {e}", self.path.display()))
        })?;
        let config = ToolConfig::from(dto);
        config.validate()?;
        Ok(config)
    }

    fn save(&self, config: &ToolConfig) -> Result<(), DomainError> {
        config.validate()?;
        let data = serde_json::to_string_pretty(&ConfigDto::from(config))
            .map_err(|e| DomainError::Unknown(format!("serialize config: {e}")))?;
        write_atomic(&self.path, data.as_bytes())
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }
}

// ---------- DTO 定義 ----------

#[derive(Serialize, Deserialize)]
struct ConfigDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    process_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    appimage_path: Option<String>,
    #[serde(default = "default_poll_interval_ms")]
    poll_interval_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    wait_timeout_secs: Option<u64>,
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

impl From<&ToolConfig> for ConfigDto {
    fn from(cfg: &ToolConfig) -> Self {
        Self {
            process_name: cfg.process_name.clone(),
            appimage_path: cfg
                .appimage_path
                .as_ref()
                .map(|p| p.display().to_string()),
            poll_interval_ms: cfg.poll_interval_ms,
            wait_timeout_secs: cfg.wait_timeout_secs,
        }
    }
}

impl From<ConfigDto> for ToolConfig {
    fn from(dto: ConfigDto) -> Self {
        Self {
            process_name: dto.process_name.filter(|s| !s.trim().is_empty()),
            appimage_path: dto
                .appimage_path
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            poll_interval_ms: dto.poll_interval_ms,
            wait_timeout_secs: dto.wait_timeout_secs,
        }
    }
}
