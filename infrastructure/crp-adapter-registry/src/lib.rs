//! MachineGuid レジストリアダプター
//!
//! `HKLM\SOFTWARE\Microsoft\Cryptography` の `MachineGuid`（REG_SZ）を読み書きする。
//! 32bit プロセスからでも 64bit ビューを開く。書き込みには管理者権限が必要。

use crp_domain::DomainError;
use crp_domain::port::driven::MachineGuidStore;

/// プラットフォーム中立のハンドル
#[derive(Debug, Default, Clone, Copy)]
pub struct MachineGuidRegistry;

impl MachineGuidRegistry {
    pub fn new() -> Self {
        Self
    }
}

impl MachineGuidStore for MachineGuidRegistry {
    fn read(&self) -> Result<String, DomainError> {
        read_machine_guid_impl()
    }

    fn write(&self, guid: &str) -> Result<(), DomainError> {
        let guid = guid.trim();
        if guid.is_empty() {
            return Err(DomainError::InvalidInput("MachineGuid value is empty".into()));
        }
        write_machine_guid_impl(guid)
    }
}

/// 管理者として実行中か（Windows 以外は常に false）
pub fn is_elevated() -> bool {
    is_elevated_impl()
}

#[cfg(windows)]
use windows_impl::{is_elevated_impl, read_machine_guid_impl, write_machine_guid_impl};

#[cfg(not(windows))]
fn read_machine_guid_impl() -> Result<String, DomainError> {
    Err(DomainError::Unsupported(
        "MachineGuid exists only in the Windows registry".into(),
    ))
}

#[cfg(not(windows))]
fn write_machine_guid_impl(_guid: &str) -> Result<(), DomainError> {
    Err(DomainError::Unsupported(
        "MachineGuid exists only in the Windows registry".into(),
    ))
}

#[cfg(not(windows))]
fn is_elevated_impl() -> bool {
    false
}

#[cfg(windows)]
mod windows_impl {
    use super::*;
    use crp_domain::model::{MACHINE_GUID_KEY, MACHINE_GUID_VALUE};
    use tracing::info;
    use windows::Win32::Foundation::{
        CloseHandle, ERROR_ACCESS_DENIED, ERROR_FILE_NOT_FOUND, ERROR_PATH_NOT_FOUND,
        ERROR_SUCCESS, HANDLE, WIN32_ERROR,
    };
    use windows::Win32::Security::{
        GetTokenInformation, TokenElevation, TOKEN_ELEVATION, TOKEN_QUERY,
    };
    use windows::Win32::System::Registry::{
        HKEY, HKEY_LOCAL_MACHINE, KEY_QUERY_VALUE, KEY_SET_VALUE, KEY_WOW64_64KEY, REG_SAM_FLAGS,
        REG_SZ, RRF_RT_REG_SZ, RegCloseKey, RegGetValueW, RegOpenKeyExW, RegSetValueExW,
    };
    use windows::Win32::System::Threading::{GetCurrentProcess, OpenProcessToken};
    use windows::core::PCWSTR;

    fn to_wide(s: &str) -> Vec<u16> {
        let mut wide: Vec<u16> = s.encode_utf16().collect();
        wide.push(0);
        wide
    }

    fn map_win32_error(status: WIN32_ERROR, action: &str) -> DomainError {
        let target = format!(r"HKLM\{}\{}", MACHINE_GUID_KEY, MACHINE_GUID_VALUE);
        if status == ERROR_ACCESS_DENIED {
            return DomainError::PermissionDenied(format!(
                "{action} {target}: run as administrator"
            ));
        }
        if status == ERROR_FILE_NOT_FOUND || status == ERROR_PATH_NOT_FOUND {
            return DomainError::NotFound(target);
        }
        DomainError::Unknown(format!("{action} {target}: status={}", status.0))
    }

    fn open_key(sam: REG_SAM_FLAGS, action: &str) -> Result<HKEY, DomainError> {
        let wide_path = to_wide(MACHINE_GUID_KEY); // API呼び出し中にVecを生存させる
        let mut key: HKEY = HKEY::default();
        let status = unsafe {
            RegOpenKeyExW(
                HKEY_LOCAL_MACHINE,
                PCWSTR(wide_path.as_ptr()),
                Some(0),
                sam | KEY_WOW64_64KEY,
                &mut key,
            )
        };
        if status != ERROR_SUCCESS {
            return Err(map_win32_error(status, action));
        }
        Ok(key)
    }

    pub(super) fn read_machine_guid_impl() -> Result<String, DomainError> {
        let key = open_key(KEY_QUERY_VALUE, "open")?;
        let value_name = to_wide(MACHINE_GUID_VALUE);

        // サイズ取得
        let mut size_bytes: u32 = 0;
        let status = unsafe {
            RegGetValueW(
                key,
                PCWSTR::null(),
                PCWSTR(value_name.as_ptr()),
                RRF_RT_REG_SZ,
                None,
                None,
                Some(&mut size_bytes),
            )
        };
        if status != ERROR_SUCCESS {
            let _ = unsafe { RegCloseKey(key) };
            return Err(map_win32_error(status, "read"));
        }

        let mut buffer: Vec<u16> = vec![0u16; (size_bytes as usize).div_ceil(2)];
        let status = unsafe {
            RegGetValueW(
                key,
                PCWSTR::null(),
                PCWSTR(value_name.as_ptr()),
                RRF_RT_REG_SZ,
                None,
                Some(buffer.as_mut_ptr() as *mut _),
                Some(&mut size_bytes),
            )
        };
        let _ = unsafe { RegCloseKey(key) };
        if status != ERROR_SUCCESS {
            return Err(map_win32_error(status, "read"));
        }

        // size_bytesは終端nullを含む
        let char_len = (size_bytes as usize / 2).saturating_sub(1);
        buffer.truncate(char_len);
        while matches!(buffer.last(), Some(0)) {
            buffer.pop();
        }
        Ok(String::from_utf16_lossy(&buffer))
    }

    pub(super) fn write_machine_guid_impl(guid: &str) -> Result<(), DomainError> {
        let key = open_key(KEY_SET_VALUE, "open for write")?;
        let value_name = to_wide(MACHINE_GUID_VALUE);
        let data = to_wide(guid);
        let status = unsafe {
            RegSetValueExW(
                key,
                PCWSTR(value_name.as_ptr()),
                Some(0),
                REG_SZ,
                Some(std::slice::from_raw_parts(
                    data.as_ptr() as *const u8,
                    data.len() * 2,
                )),
            )
        };
        let _ = unsafe { RegCloseKey(key) };
        if status != ERROR_SUCCESS {
            return Err(map_win32_error(status, "write"));
        }
        info!(value = MACHINE_GUID_VALUE, "registry value written");
        Ok(())
    }

    pub(super) fn is_elevated_impl() -> bool {
        unsafe {
            let mut token = HANDLE::default();
            if OpenProcessToken(GetCurrentProcess(), TOKEN_QUERY, &mut token).is_err() {
                return false;
            }

            let mut elevation = TOKEN_ELEVATION::default();
            let mut size = std::mem::size_of::<TOKEN_ELEVATION>() as u32;
            let result = GetTokenInformation(
                token,
                TokenElevation,
                Some(&mut elevation as *mut _ as *mut _),
                size,
                &mut size,
            );
            let _ = CloseHandle(token);

            result.is_ok() && elevation.TokenIsElevated != 0
        }
    }
}

#[cfg(all(test, not(windows)))]
mod tests {
    use super::*;

    #[test]
    fn non_windows_reports_unsupported() {
        let registry = MachineGuidRegistry::new();
        assert!(matches!(registry.read(), Err(DomainError::Unsupported(_))));
        assert!(matches!(
            registry.write("0f0e0d0c-0b0a-4908-8706-050403020100"),
            Err(DomainError::Unsupported(_))
        ));
        assert!(!is_elevated());
    }

    #[test]
    fn empty_value_is_rejected_before_touching_registry() {
        assert!(matches!(
            MachineGuidRegistry::new().write("  "),
            Err(DomainError::InvalidInput(_))
        ));
    }
}
