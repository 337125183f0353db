//! プロセス列挙ポート

use crate::error::DomainError;

pub trait ProcessProbe {
    /// 実行中プロセスの実行ファイル名を1回だけ列挙
    fn process_names(&self) -> Result<Vec<String>, DomainError>;
}
