//! crp-engine: 識別子リセット／復元／プロセス終了待ちのワークフローを実装する層。
//! ドメイン（crp-domain）のポートにのみ依存する。
//!
//! すべて同期のブロッキング呼び出し。同時に複数のリセットを走らせないことは
//! 呼び出し側が保証する（内部ロックは持たない）。

pub mod process_guard;
pub mod reset;
pub mod restore;

#[cfg(test)]
mod testing;

pub use process_guard::ProcessGuard;
pub use reset::{ResetDeps, ResetOrchestrator};
pub use restore::{RestoreCoordinator, RestoreDeps};
