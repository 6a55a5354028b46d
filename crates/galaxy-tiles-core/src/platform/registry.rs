//! Access to the Start layout policy values.
//!
//! [`ConfigStore`] is the seam the applier talks to. On Windows it is backed
//! by the current user's registry key; tests provide an in-memory store.

use std::io;

/// A typed policy value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    /// `REG_EXPAND_SZ`
    ExpandString(String),
    /// `REG_DWORD`
    DWord(u32),
    /// Any other value type, kept as raw bytes.
    Other { kind: u32, data: Vec<u8> },
}

/// Key-value access to one configuration key.
pub trait ConfigStore {
    /// Read a value. A missing value is `Ok(None)`.
    fn get_value(&self, name: &str) -> io::Result<Option<ConfigValue>>;

    /// Create or overwrite a value.
    fn set_value(&mut self, name: &str, value: &ConfigValue) -> io::Result<()>;

    /// Delete a value. Deleting a missing value succeeds.
    fn delete_value(&mut self, name: &str) -> io::Result<()>;
}

#[cfg(windows)]
pub use windows_registry::RegistryStore;

#[cfg(windows)]
#[allow(unsafe_code)]
mod windows_registry {
    use super::{ConfigStore, ConfigValue};
    use std::io;
    use std::ptr;
    use tracing::debug;
    use windows_sys::Win32::Foundation::{ERROR_FILE_NOT_FOUND, ERROR_SUCCESS, WIN32_ERROR};
    use windows_sys::Win32::System::Registry::{
        RegCloseKey, RegCreateKeyExW, RegDeleteValueW, RegQueryValueExW, RegSetValueExW, HKEY,
        HKEY_CURRENT_USER, KEY_ALL_ACCESS, REG_DWORD, REG_EXPAND_SZ, REG_OPTION_NON_VOLATILE,
        REG_SZ, REG_VALUE_TYPE,
    };

    fn wide(value: &str) -> Vec<u16> {
        value.encode_utf16().chain(std::iter::once(0)).collect()
    }

    fn check(status: WIN32_ERROR) -> io::Result<()> {
        if status == ERROR_SUCCESS {
            Ok(())
        } else {
            Err(io::Error::from_raw_os_error(status as i32))
        }
    }

    /// A key below `HKEY_CURRENT_USER`, opened with full access.
    pub struct RegistryStore {
        key: HKEY,
        path: String,
    }

    impl RegistryStore {
        /// Open `path`, creating the key when it does not exist yet.
        pub fn open_current_user(path: &str) -> io::Result<Self> {
            let subkey = wide(path);
            let mut key: HKEY = ptr::null_mut();
            // SAFETY: `subkey` is NUL-terminated and outlives the call; `key`
            // is a valid out pointer. Null class, security and disposition
            // pointers are allowed by the API.
            let status = unsafe {
                RegCreateKeyExW(
                    HKEY_CURRENT_USER,
                    subkey.as_ptr(),
                    0,
                    ptr::null(),
                    REG_OPTION_NON_VOLATILE,
                    KEY_ALL_ACCESS,
                    ptr::null(),
                    &mut key,
                    ptr::null_mut(),
                )
            };
            check(status)?;
            debug!("Opened HKCU\\{}", path);
            Ok(Self {
                key,
                path: path.to_string(),
            })
        }

        pub fn path(&self) -> &str {
            &self.path
        }
    }

    impl ConfigStore for RegistryStore {
        fn get_value(&self, name: &str) -> io::Result<Option<ConfigValue>> {
            let name_w = wide(name);
            let mut kind: REG_VALUE_TYPE = 0;
            let mut size: u32 = 0;

            // SAFETY: `self.key` is open for the lifetime of `self`; a null data
            // pointer asks only for type and size.
            let status = unsafe {
                RegQueryValueExW(
                    self.key,
                    name_w.as_ptr(),
                    ptr::null(),
                    &mut kind,
                    ptr::null_mut(),
                    &mut size,
                )
            };
            if status == ERROR_FILE_NOT_FOUND {
                return Ok(None);
            }
            check(status)?;

            let mut data = vec![0u8; size as usize];
            // SAFETY: `data` holds exactly `size` writable bytes.
            let status = unsafe {
                RegQueryValueExW(
                    self.key,
                    name_w.as_ptr(),
                    ptr::null(),
                    &mut kind,
                    data.as_mut_ptr(),
                    &mut size,
                )
            };
            if status == ERROR_FILE_NOT_FOUND {
                return Ok(None);
            }
            check(status)?;
            data.truncate(size as usize);

            let value = match kind {
                REG_DWORD if data.len() >= 4 => {
                    ConfigValue::DWord(u32::from_le_bytes([data[0], data[1], data[2], data[3]]))
                }
                REG_SZ | REG_EXPAND_SZ => {
                    let units: Vec<u16> = data
                        .chunks_exact(2)
                        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                        .collect();
                    let text = String::from_utf16_lossy(&units);
                    ConfigValue::ExpandString(text.trim_end_matches('\0').to_string())
                }
                other => ConfigValue::Other { kind: other, data },
            };
            Ok(Some(value))
        }

        fn set_value(&mut self, name: &str, value: &ConfigValue) -> io::Result<()> {
            let name_w = wide(name);
            let (kind, data): (REG_VALUE_TYPE, Vec<u8>) = match value {
                ConfigValue::ExpandString(text) => (
                    REG_EXPAND_SZ,
                    wide(text).iter().flat_map(|unit| unit.to_le_bytes()).collect(),
                ),
                ConfigValue::DWord(number) => (REG_DWORD, number.to_le_bytes().to_vec()),
                ConfigValue::Other { kind, data } => (*kind, data.clone()),
            };

            // SAFETY: `data` is valid for `data.len()` bytes for the duration of
            // the call.
            let status = unsafe {
                RegSetValueExW(
                    self.key,
                    name_w.as_ptr(),
                    0,
                    kind,
                    data.as_ptr(),
                    data.len() as u32,
                )
            };
            check(status)
        }

        fn delete_value(&mut self, name: &str) -> io::Result<()> {
            let name_w = wide(name);
            // SAFETY: `self.key` is open and `name_w` is NUL-terminated.
            let status = unsafe { RegDeleteValueW(self.key, name_w.as_ptr()) };
            if status == ERROR_FILE_NOT_FOUND {
                return Ok(());
            }
            check(status)
        }
    }

    impl Drop for RegistryStore {
        fn drop(&mut self) {
            // SAFETY: the key was opened by `open_current_user` and is closed
            // exactly once.
            unsafe {
                RegCloseKey(self.key);
            }
        }
    }

}
