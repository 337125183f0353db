//! ファイルシステムアダプター（バックアップ/識別子ストア/設定の永続化）

mod backup_store;
mod config_repository;
mod fsutil;
mod identity_store;

pub use backup_store::FsBackupStore;
pub use config_repository::FsConfigRepository;
pub use identity_store::JsonIdentityStore;
