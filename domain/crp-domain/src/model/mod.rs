//! ドメインモデル
//!
//! 値オブジェクト、レポート、設定型を定義

mod backup;         // バックアップ記録とストア種別
mod cancel;         // キャンセルトークン
mod config;         // ツール設定、待機ポリシー
mod identifier_set; // テレメトリ識別子セット
mod patch;          // AppImage 内スクリプトのパッチ
mod platform;       // プラットフォームとプロファイル
mod report;         // リセット/復元の結果
mod status;         // 状態通知の重要度

pub use backup::*;
pub use cancel::*;
pub use config::*;
pub use identifier_set::*;
pub use patch::*;
pub use platform::*;
pub use report::*;
pub use status::*;
