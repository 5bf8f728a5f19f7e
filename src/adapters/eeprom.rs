//! Fixed-slot settings store adapter.
//!
//! Implements [`SlotStorage`] for the four persisted tunables.
//!
//! - **`target_os = "espidf"`** — one 4-byte NVS blob per [`SettingKey`]
//!   in the `hotplate` namespace.  ESP-IDF NVS commits are atomic per
//!   `nvs_commit()`.
//! - **`not(target_os = "espidf")`** — a flat 16-byte image that starts
//!   erased (all `0xFF`), like factory-fresh EEPROM.  Erased slots
//!   decode to NaN, which [`load_or_default`](crate::settings::load_or_default)
//!   replaces with factory defaults.

use crate::app::ports::SlotStorage;
use crate::error::StorageError;
use crate::settings::{SLOT_SIZE, SettingKey};
use log::info;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
const NAMESPACE: &[u8] = b"hotplate\0";

#[cfg(not(target_os = "espidf"))]
const IMAGE_SIZE: usize = SettingKey::ALL.len() * SLOT_SIZE;

pub struct EepromAdapter {
    #[cfg(not(target_os = "espidf"))]
    image: [u8; IMAGE_SIZE],
}

impl Default for EepromAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl EepromAdapter {
    /// Create the adapter.  On device this initialises NVS flash, erasing
    /// the partition on a version mismatch; a failure there is logged and
    /// later reads fall back to defaults.
    pub fn new() -> Self {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
            // single main-task context before any concurrent NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                log::warn!("EepromAdapter: erasing and re-initialising NVS partition");
                unsafe {
                    nvs_flash_erase();
                    nvs_flash_init();
                }
            } else if ret != ESP_OK {
                log::warn!("EepromAdapter: nvs_flash_init failed ({})", ret);
            }
            info!("EepromAdapter: ESP-IDF NVS backend");
            Self {}
        }

        #[cfg(not(target_os = "espidf"))]
        {
            info!("EepromAdapter: simulation backend (erased image)");
            Self {
                image: [0xFF; IMAGE_SIZE],
            }
        }
    }

    /// Open the settings namespace, execute a closure with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        let ret = unsafe { nvs_open(NAMESPACE.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }

    /// NUL-terminated NVS key for a slot.
    #[cfg(target_os = "espidf")]
    fn key_cstr(key: SettingKey) -> [u8; 16] {
        let mut key_buf = [0u8; 16];
        let kb = key.name().as_bytes();
        let kl = kb.len().min(15);
        key_buf[..kl].copy_from_slice(&kb[..kl]);
        key_buf
    }
}

impl SlotStorage for EepromAdapter {
    fn read_slot(&self, key: SettingKey) -> Result<[u8; 4], StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let off = key.offset();
            let mut out = [0u8; SLOT_SIZE];
            out.copy_from_slice(&self.image[off..off + SLOT_SIZE]);
            Ok(out)
        }

        #[cfg(target_os = "espidf")]
        {
            let key_buf = Self::key_cstr(key);
            let result = Self::with_nvs_handle(false, |handle| {
                let mut out = [0u8; SLOT_SIZE];
                let mut size = out.len();
                let ret = unsafe {
                    nvs_get_blob(
                        handle,
                        key_buf.as_ptr() as *const _,
                        out.as_mut_ptr() as *mut _,
                        &mut size,
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                if size != SLOT_SIZE {
                    return Err(ESP_ERR_NVS_INVALID_LENGTH as i32);
                }
                Ok(out)
            });
            match result {
                Ok(out) => Ok(out),
                Err(e) if e == ESP_ERR_NVS_NOT_FOUND as i32 => Err(StorageError::NotFound),
                Err(e) if e == ESP_ERR_NVS_INVALID_LENGTH as i32 => Err(StorageError::Truncated),
                Err(_) => Err(StorageError::IoError),
            }
        }
    }

    fn write_slot(&mut self, key: SettingKey, value: [u8; 4]) -> Result<(), StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let off = key.offset();
            self.image[off..off + SLOT_SIZE].copy_from_slice(&value);
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let key_buf = Self::key_cstr(key);
            let result = Self::with_nvs_handle(true, |handle| {
                let ret = unsafe {
                    nvs_set_blob(
                        handle,
                        key_buf.as_ptr() as *const _,
                        value.as_ptr() as *const _,
                        value.len(),
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(())
            });
            result.map_err(|e| {
                log::warn!("EepromAdapter: NVS write error {} for {}", e, key.name());
                StorageError::IoError
            })
        }
    }
}
