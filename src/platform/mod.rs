//! ESP-IDF glue: flash storage, soft-AP, upload endpoint and deep sleep

pub mod nvs;
pub mod power;
pub mod softap;
pub mod upload;

pub use nvs::NvsBlobStore;
pub use power::DeepSleep;
pub use softap::AccessPoint;
pub use upload::UploadServer;
