//! MachineGuid（Windows レジストリ）ポート

use crate::error::DomainError;

pub trait MachineGuidStore {
    fn read(&self) -> Result<String, DomainError>;

    /// 書き込みには管理者権限が必要（無ければ PermissionDenied）
    fn write(&self, guid: &str) -> Result<(), DomainError>;
}
