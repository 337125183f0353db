//! バックアップストアポート

use std::path::Path;

use crate::error::DomainError;
use crate::model::{BackupRecord, StoreKind};

/// バックアップ列挙の結果（1件ずつ遅延評価）
pub type BackupIter<'a> = Box<dyn Iterator<Item = Result<BackupRecord, DomainError>> + 'a>;

/// 種別ごとのカテゴリディレクトリにバックアップを保存するストア。
/// 既存のバックアップは上書きしない。
pub trait BackupStore {
    /// バックアップルート
    fn root(&self) -> &Path;

    /// ファイルをコピーしてバックアップ
    fn backup_file(&self, kind: StoreKind, source: &Path) -> Result<BackupRecord, DomainError>;

    /// 抽出した値（レジストリ値など）をテキストとして保存
    fn backup_value(
        &self,
        kind: StoreKind,
        label: &str,
        contents: &str,
    ) -> Result<BackupRecord, DomainError>;

    /// ルート配下の全ファイルを発見順に列挙（呼ぶたびに最初から）
    fn list(&self) -> BackupIter<'_>;

    /// 1件削除（既に無ければ NotFound）
    fn delete(&self, record: &BackupRecord) -> Result<(), DomainError>;

    /// ルートを削除して作り直す
    fn clear(&self) -> Result<(), DomainError>;

    /// バックアップの内容で dest を上書き
    fn restore_file(&self, record: &BackupRecord, dest: &Path) -> Result<(), DomainError>;

    /// 値バックアップの中身を読む（前後の空白は除去）
    fn read_value(&self, record: &BackupRecord) -> Result<String, DomainError>;

    /// パスからレコードを組み立てる（存在しなければ NotFound）
    fn record_for(&self, path: &Path) -> Result<BackupRecord, DomainError>;
}
