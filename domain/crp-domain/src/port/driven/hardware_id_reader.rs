//! ハードウェアUUID読み取りポート（macOS）

use crate::error::DomainError;

pub trait HardwareIdReader {
    /// コマンド出力から UUID 行を探す。行が無ければ Ok(None)
    fn read_hardware_uuid(&self) -> Result<Option<String>, DomainError>;
}
