//! CursorResetPlus ドメイン層
//!
//! 識別子リセットの中核モデルとポート定義。I/O は一切行わない。
//! ヘキサゴナルアーキテクチャの最内層。

pub mod error;   // ドメインエラー定義
pub mod model;   // ドメインモデル（値オブジェクト、レポート、設定）
pub mod port;    // ポート（driven）
pub mod service; // ドメインサービス

pub use error::DomainError; // エラー型を再エクスポート

pub type Result<T> = std::result::Result<T, DomainError>;
