//! リセット/復元ユースケースポート

use crate::error::DomainError;
use crate::model::{
    BackupRecord, CancellationToken, PlatformProfile, ResetFailure, ResetReport, RestoreOutcome,
    WaitPolicy,
};
use crate::port::driven::StatusSink;

/// リセットの実行オプション
#[derive(Debug, Clone, Default)]
pub struct ResetOptions {
    /// 対象プロセスが起動中なら終了まで待つ（false なら即失敗）
    pub wait_for_exit: bool,
    pub wait: WaitPolicy,
    pub cancel: CancellationToken,
}

pub trait ResetUseCase {
    /// プロセス確認 → ネイティブ変更 → storage.json の順に実行する
    fn reset(
        &self,
        profile: &PlatformProfile,
        options: &ResetOptions,
        sink: &dyn StatusSink,
    ) -> Result<ResetReport, ResetFailure>;

    /// バックアップ1件を元の場所へ書き戻す
    fn restore(
        &self,
        record: &BackupRecord,
        profile: &PlatformProfile,
        sink: &dyn StatusSink,
    ) -> Result<RestoreOutcome, DomainError>;
}
