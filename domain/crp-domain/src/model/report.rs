//! リセット/復元の結果レポート
//!
//! リセットはストア横断のトランザクションを持たないため、
//! どのステージまで確定したかを必ず呼び出し側へ返す。

use std::fmt;
use std::path::PathBuf;

use crate::error::DomainError;
use crate::model::{BackupRecord, IdentifierSet, Platform, StoreKind};

/// リセットのステージ（実行順）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    ProcessGuard,
    NativeMutation,
    IdentityStore,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::ProcessGuard, Stage::NativeMutation, Stage::IdentityStore];

    /// 進捗通知で使うステージ番号
    pub fn index(&self) -> usize {
        match self {
            Stage::ProcessGuard => 0,
            Stage::NativeMutation => 1,
            Stage::IdentityStore => 2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Stage::ProcessGuard => "process guard",
            Stage::NativeMutation => "native identity",
            Stage::IdentityStore => "identity store",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageStatus {
    Committed,
    Failed(String),
    NotRun,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRecord {
    pub stage: Stage,
    pub status: StageStatus,
}

/// ネイティブステージで行った変更
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeChange {
    /// レジストリの MachineGuid を置換
    MachineGuidReplaced { previous: String, new: String },
    /// ハードウェアUUIDを記録のみ（取得できなければ None）
    HardwareUuidRecorded { value: Option<String> },
    /// AppImage を再パッケージ
    ImageRepacked {
        output: PathBuf,
        patched_files: Vec<PathBuf>,
    },
}

/// リセット1回分の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetReport {
    pub platform: Platform,
    pub stages: Vec<StageRecord>,
    /// 書き込んだ識別子（JSONステージが確定した場合のみ）
    pub identifiers: Option<IdentifierSet>,
    /// 作成したバックアップ（作成順）
    pub backups: Vec<BackupRecord>,
    pub native_change: Option<NativeChange>,
}

impl ResetReport {
    /// 全ステージ未実行で初期化
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            stages: Stage::ALL
                .iter()
                .map(|&stage| StageRecord {
                    stage,
                    status: StageStatus::NotRun,
                })
                .collect(),
            identifiers: None,
            backups: Vec::new(),
            native_change: None,
        }
    }

    pub fn mark(&mut self, stage: Stage, status: StageStatus) {
        if let Some(record) = self.stages.iter_mut().find(|r| r.stage == stage) {
            record.status = status;
        }
    }

    pub fn status_of(&self, stage: Stage) -> &StageStatus {
        self.stages
            .iter()
            .find(|r| r.stage == stage)
            .map(|r| &r.status)
            .unwrap_or(&StageStatus::NotRun)
    }

    /// 確定したステージ（実行順）
    pub fn committed_stages(&self) -> Vec<Stage> {
        self.stages
            .iter()
            .filter(|r| r.status == StageStatus::Committed)
            .map(|r| r.stage)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.stages.iter().all(|r| r.status == StageStatus::Committed)
    }
}

/// 途中で失敗したリセット。確定済みステージはロールバックしない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetFailure {
    pub stage: Stage,
    pub error: DomainError,
    pub report: ResetReport,
}

// 原因は `source()` で辿れるので Display には含めない
impl fmt::Display for ResetFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reset failed at {} stage", self.stage)?;
        let committed = self.report.committed_stages();
        if !committed.is_empty() {
            let names: Vec<&str> = committed.iter().map(|s| s.name()).collect();
            write!(f, " (already committed: {})", names.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ResetFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// 復元の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// 書き戻した（target はパスまたはレジストリ値の表記）
    Restored { kind: StoreKind, target: String },
    /// 書き戻せない種別。記録値を表示するだけ
    DisplayOnly { kind: StoreKind, value: String },
}
