//! ポート定義
//!
//! driven: ドメインが外部に求める機能（アダプタが実装）
//! driving: 外部から呼び出されるユースケースの入口（アプリ層が実装）

pub mod driven;
pub mod driving;
