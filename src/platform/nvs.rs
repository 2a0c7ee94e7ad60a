//! Framebuffer blob in the default NVS partition

use esp_idf_svc::nvs::{EspNvs, EspNvsPartition, NvsDefault};
use esp_idf_svc::sys::{EspError, ESP_ERR_NVS_NOT_FOUND};

use crate::framebuffer::{BlobStore, STORAGE_NAMESPACE};

/// Opens the `storage` namespace for every operation and closes it again
pub struct NvsBlobStore {
    partition: EspNvsPartition<NvsDefault>,
}

impl NvsBlobStore {
    pub fn new(partition: EspNvsPartition<NvsDefault>) -> Self {
        Self { partition }
    }

    fn open(&self) -> Result<EspNvs<NvsDefault>, EspError> {
        EspNvs::new(self.partition.clone(), STORAGE_NAMESPACE, true)
    }
}

impl BlobStore for NvsBlobStore {
    type Error = EspError;

    fn blob_len(&mut self, key: &str) -> Result<Option<usize>, Self::Error> {
        self.open()?.blob_len(key)
    }

    fn read_blob(&mut self, key: &str, buf: &mut [u8]) -> Result<(), Self::Error> {
        match self.open()?.get_blob(key, buf)? {
            Some(_) => Ok(()),
            None => Err(EspError::from_infallible::<ESP_ERR_NVS_NOT_FOUND>()),
        }
    }

    fn write_blob(&mut self, key: &str, data: &[u8]) -> Result<(), Self::Error> {
        self.open()?.set_blob(key, data)
    }

    /// `set_blob` already commits before returning
    fn commit(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
