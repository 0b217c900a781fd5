//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`StoragePort`] on the default NVS partition through
//! `EspNvs`, one handle per call.  `set_blob` and `remove` commit before
//! returning, so every write is atomic.  The simulation backend is an
//! in-memory map (dev/test only).

use log::info;
#[cfg(target_os = "espidf")]
use log::warn;

use crate::app::ports::{StorageError, StoragePort};

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};
#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::{ESP_ERR_NVS_NOT_ENOUGH_SPACE, ESP_ERR_NVS_NOT_FOUND, EspError};

pub struct NvsAdapter {
    #[cfg(target_os = "espidf")]
    partition: EspDefaultNvsPartition,
    #[cfg(not(target_os = "espidf"))]
    store: HashMap<String, Vec<u8>>,
}

impl NvsAdapter {
    /// Take the default NVS partition.
    ///
    /// The partition is erased and re-initialised if it is full or was
    /// written by a newer NVS version.
    pub fn new() -> Result<Self, StorageError> {
        #[cfg(target_os = "espidf")]
        {
            let partition = EspDefaultNvsPartition::take().map_err(|e| {
                warn!("NvsAdapter: partition unavailable ({})", e);
                StorageError::IoError
            })?;
            info!("NvsAdapter: ESP-IDF NVS initialised");
            Ok(Self { partition })
        }

        #[cfg(not(target_os = "espidf"))]
        {
            info!("NvsAdapter: simulation backend");
            Ok(Self {
                store: HashMap::new(),
            })
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{}::{}", namespace, key)
    }

    #[cfg(target_os = "espidf")]
    fn open(&self, namespace: &str, read_write: bool) -> Result<EspNvs<NvsDefault>, EspError> {
        EspNvs::new(self.partition.clone(), namespace, read_write)
    }

    /// A namespace never written is reported as not-found on open.
    #[cfg(target_os = "espidf")]
    fn storage_error(op: &str, namespace: &str, key: &str, e: EspError) -> StorageError {
        match e.code() {
            c if c == ESP_ERR_NVS_NOT_FOUND as i32 => StorageError::NotFound,
            c if c == ESP_ERR_NVS_NOT_ENOUGH_SPACE as i32 => {
                warn!("NvsAdapter: {} {}::{}: partition full", op, namespace, key);
                StorageError::Full
            }
            _ => {
                warn!("NvsAdapter: {} {}::{} failed ({})", op, namespace, key, e);
                StorageError::IoError
            }
        }
    }
}

impl StoragePort for NvsAdapter {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            match self.store.get(&composite) {
                Some(data) => {
                    let len = data.len().min(buf.len());
                    buf[..len].copy_from_slice(&data[..len]);
                    Ok(len)
                }
                None => Err(StorageError::NotFound),
            }
        }

        #[cfg(target_os = "espidf")]
        {
            let err = |e| Self::storage_error("read", namespace, key, e);
            let nvs = self.open(namespace, false).map_err(err)?;
            match nvs.blob_len(key).map_err(err)? {
                None => Err(StorageError::NotFound),
                // Oversized blobs are reported at the buffer length so the
                // caller still sees the size mismatch.
                Some(len) if len > buf.len() => Ok(buf.len()),
                Some(_) => match nvs.get_blob(key, buf).map_err(err)? {
                    Some(data) => Ok(data.len()),
                    None => Err(StorageError::NotFound),
                },
            }
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            self.store.insert(composite, data.to_vec());
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let err = |e| Self::storage_error("write", namespace, key, e);
            let mut nvs = self.open(namespace, true).map_err(err)?;
            nvs.set_blob(key, data).map_err(err)
        }
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            self.store.remove(&composite);
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let err = |e| Self::storage_error("delete", namespace, key, e);
            let mut nvs = self.open(namespace, true).map_err(err)?;
            nvs.remove(key).map(|_| ()).map_err(err)
        }
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        #[cfg(not(target_os = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            self.store.contains_key(&composite)
        }

        #[cfg(target_os = "espidf")]
        {
            self.open(namespace, false)
                .and_then(|nvs| nvs.contains(key))
                .unwrap_or(false)
        }
    }
}
