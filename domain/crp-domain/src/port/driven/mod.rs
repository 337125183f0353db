//! 駆動ポート（出力インターフェース）。
//!
//! ドメインが外部に求める機能を定義する。
//! インフラ層のアダプタが実装する。

mod backup_store;
mod clock;
mod config_repository;
mod hardware_id_reader;
mod identity_store;
mod image_repacker;
mod machine_guid_store;
mod process_probe;
mod random_source;
mod status_sink;

pub use backup_store::*;
pub use clock::*;
pub use config_repository::*;
pub use hardware_id_reader::*;
pub use identity_store::*;
pub use image_repacker::*;
pub use machine_guid_store::*;
pub use process_probe::*;
pub use random_source::*;
pub use status_sink::*;
