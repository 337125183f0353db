//! 時刻・乱数アダプター

use std::time::SystemTime;

use crp_domain::port::driven::{Clock, RandomSource};
use rand::RngCore;

/// バックアップ名のタイムスタンプ書式（ローカル時刻・秒精度）
pub const BACKUP_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Default, Clone, Copy)]
pub struct ClockAdapter;

impl ClockAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for ClockAdapter {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }

    fn backup_stamp(&self) -> String {
        chrono::Local::now().format(BACKUP_STAMP_FORMAT).to_string()
    }
}

impl RandomSource for ClockAdapter {
    fn fill_bytes(&self, buf: &mut [u8]) {
        rand::thread_rng().fill_bytes(buf);
    }
}
