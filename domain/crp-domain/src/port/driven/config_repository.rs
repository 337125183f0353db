//! 設定リポジトリポート

use crate::error::DomainError;
use crate::model::ToolConfig;

/// 設定ストレージポート
pub trait ConfigRepository {
    /// 設定を読込（ファイルが無ければ既定値）
    fn load(&self) -> Result<ToolConfig, DomainError>;

    /// 設定を保存
    fn save(&self, config: &ToolConfig) -> Result<(), DomainError>;

    /// 設定ファイルの存在確認
    fn exists(&self) -> bool;
}
