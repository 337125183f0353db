pub mod identifier_service;
pub mod process_match;

// 便宜のため再エクスポート
pub use identifier_service::{IdentifierFactory, MAC_MACHINE_ID_TEMPLATE};
pub use process_match::{is_target_process, normalize_process_name};
