use anyhow::{anyhow, Result};
use embedded_svc::wifi::{AccessPointConfiguration, AuthMethod, Configuration};
use esp_idf_svc::eventloop::{EspSubscription, EspSystemEventLoop, System};
use esp_idf_svc::hal::modem::Modem;
use esp_idf_svc::nvs::{EspNvsPartition, NvsDefault};
use esp_idf_svc::wifi::{BlockingWifi, EspWifi, WifiEvent};
use log::info;

use crate::inbox::Uploader;

#[derive(Debug)]
pub struct AccessPoint<'a> {
    pub ssid: &'a str,
    pub auth_method: AuthMethod,
    pub max_connections: u16,
}

impl<'a> AccessPoint<'a> {
    /// Open network taking a single station
    pub const fn new(ssid: &'a str) -> Self {
        Self {
            ssid,
            auth_method: AuthMethod::None,
            max_connections: 1,
        }
    }

    /// Bring up the access point and wait for its interface
    pub fn start(
        &self,
        modem: Modem,
        sys_loop: EspSystemEventLoop,
        nvs: EspNvsPartition<NvsDefault>,
    ) -> Result<BlockingWifi<EspWifi<'static>>> {
        let mut wifi = BlockingWifi::wrap(
            EspWifi::new(modem, sys_loop.clone(), Some(nvs))?,
            sys_loop,
        )?;

        let ap_config = Configuration::AccessPoint(AccessPointConfiguration {
            ssid: self
                .ssid
                .try_into()
                .map_err(|_| anyhow!("SSID '{}' is too long", self.ssid))?,
            auth_method: self.auth_method,
            max_connections: self.max_connections,
            ..Default::default()
        });

        wifi.set_configuration(&ap_config)?;
        wifi.start()?;
        wifi.wait_netif_up()?;

        let ip_info = wifi.wifi().ap_netif().get_ip_info()?;
        info!("Set up softAP with IP: {}", ip_info.ip);
        info!("SoftAP '{}' ready, no password", self.ssid);

        Ok(wifi)
    }
}

/// Forward stations joining and leaving to the control loop
///
/// The subscription stops when the returned handle is dropped.
pub fn forward_station_events(
    sys_loop: &EspSystemEventLoop,
    uploader: Uploader,
) -> Result<EspSubscription<'static, System>> {
    let subscription = sys_loop.subscribe::<WifiEvent, _>(move |event| match event {
        WifiEvent::ApStaConnected(..) => {
            info!("Station joined");
            uploader.station_joined();
        }
        WifiEvent::ApStaDisconnected(..) => {
            info!("Station left");
            uploader.station_left();
        }
        _ => {}
    })?;

    Ok(subscription)
}
