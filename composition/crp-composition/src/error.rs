//! 最上位エラーと終了コード
//!
//! 内側の層は `DomainError` / `ResetFailure` を返し、ここでは anyhow で文脈を足す。

use crp_domain::DomainError;
use crp_domain::model::ResetFailure;

pub type Result<T> = anyhow::Result<T>;

/// プロセス終了コード
pub mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const FAILURE: u8 = 1;
    pub const INVALID_INPUT: u8 = 2;
    pub const PROCESS_RUNNING: u8 = 3;
    pub const PERMISSION_DENIED: u8 = 4;
    pub const INTERRUPTED: u8 = 5;
    pub const STORE_MISSING: u8 = 6;
}

fn code_for_domain(err: &DomainError) -> u8 {
    match err {
        DomainError::InvalidInput(_) | DomainError::TargetUnavailable(_) => {
            exit_codes::INVALID_INPUT
        }
        DomainError::ProcessStillRunning(_) => exit_codes::PROCESS_RUNNING,
        DomainError::PermissionDenied(_) => exit_codes::PERMISSION_DENIED,
        DomainError::Timeout(_) | DomainError::Cancelled(_) => exit_codes::INTERRUPTED,
        DomainError::StoreNotFound(_) | DomainError::NotFound(_) => exit_codes::STORE_MISSING,
        _ => exit_codes::FAILURE,
    }
}

/// エラー連鎖から最初に見つかったドメインエラーで終了コードを決める
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    for cause in err.chain() {
        if let Some(domain) = cause.downcast_ref::<DomainError>() {
            return code_for_domain(domain);
        }
        if let Some(failure) = cause.downcast_ref::<ResetFailure>() {
            return code_for_domain(&failure.error);
        }
    }
    exit_codes::FAILURE
}
