//! Radio off and deep sleep
//!
//! No wake-up source is configured, the frame only comes back on reset.

use std::convert::Infallible;

use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};
use log::{info, warn};

use crate::lifecycle::PowerControl;

pub struct DeepSleep {
    wifi: BlockingWifi<EspWifi<'static>>,
}

impl DeepSleep {
    pub fn new(wifi: BlockingWifi<EspWifi<'static>>) -> Self {
        Self { wifi }
    }
}

impl PowerControl for DeepSleep {
    type Error = Infallible;

    #[allow(unreachable_code)]
    fn suspend(&mut self) -> Result<(), Self::Error> {
        if let Err(e) = self.wifi.stop() {
            warn!("Failed to stop WiFi: {}", e);
        }

        // one tick for the radio to shut down
        FreeRtos::delay_ms(10);

        info!("Entering deep sleep");
        unsafe { esp_idf_svc::sys::esp_deep_sleep_start() };

        Ok(())
    }
}
