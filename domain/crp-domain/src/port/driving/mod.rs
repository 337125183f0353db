//! 駆動ポート（外部から呼び出されるユースケースの入口）
//!
//! アプリケーション層のサービスが実装する。

mod backup_admin_use_case;
mod reset_use_case;

pub use backup_admin_use_case::*;
pub use reset_use_case::*;
