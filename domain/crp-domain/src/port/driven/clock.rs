//! 時刻ポート

use std::time::SystemTime;

pub trait Clock {
    fn now(&self) -> SystemTime;

    /// バックアップ名に使う秒精度のローカル時刻（`%Y%m%d_%H%M%S`）
    fn backup_stamp(&self) -> String;
}
