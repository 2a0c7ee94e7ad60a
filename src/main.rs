#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::delay::Delay;
#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::gpio;
#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::peripherals::Peripherals;
#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::prelude::*;
#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::spi;

#[cfg(target_os = "espidf")]
use paperframe::platform::{softap, AccessPoint, DeepSleep, NvsBlobStore, UploadServer};
#[cfg(target_os = "espidf")]
use paperframe::{
    gd7965::FRAMEBUFFER_SIZE, inbox, Config, Controller, FrameStore, Gd7965, MonotonicClock,
    Pins, Timing,
};

// https://docs.esp-rs.org/esp-idf-svc/esp_idf_svc/
#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    // It is necessary to call this function once. Otherwise some patches to the runtime
    // implemented by esp-idf-sys might not link properly. See https://github.com/esp-rs/esp-idf-template/issues/71
    esp_idf_svc::sys::link_patches();

    // Bind the log crate to the ESP Logging facilities
    esp_idf_svc::log::EspLogger::initialize_default();

    // Captive clients send lots of invalid requests, keep the server quiet
    for tag in [c"httpd_uri", c"httpd_txrx", c"httpd_parse"] {
        unsafe {
            esp_idf_svc::sys::esp_log_level_set(
                tag.as_ptr(),
                esp_idf_svc::sys::esp_log_level_t_ESP_LOG_ERROR,
            );
        }
    }

    log::info!("PaperFrame v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::default();

    let peripherals = Peripherals::take()?;
    let pins = peripherals.pins;
    let sys_loop = esp_idf_svc::eventloop::EspSystemEventLoop::take()?;
    let nvs = esp_idf_svc::nvs::EspDefaultNvsPartition::take()?;

    let (uploader, inbox) = inbox::channel(FRAMEBUFFER_SIZE);

    let wifi = AccessPoint::new(config.ssid).start(peripherals.modem, sys_loop.clone(), nvs.clone())?;
    let _station_events = softap::forward_station_events(&sys_loop, uploader.clone())?;
    let _upload_server = UploadServer::start(uploader)?;

    log::info!(
        "Display on SDA {}, SCK {}, CS {}, DC {}, RST {}, BUSY {}",
        Pins::SDA,
        Pins::SCK,
        Pins::CS,
        Pins::DC,
        Pins::RST,
        Pins::BSY
    );
    let spi_driver = spi::SpiDriver::new(
        peripherals.spi2,
        pins.gpio13,                    // SCK - Pins::SCK
        pins.gpio14,                    // SDA - Pins::SDA
        Option::<gpio::AnyIOPin>::None, // 3-wire, reads come back on SDA
        &spi::SpiDriverConfig::new().dma(spi::Dma::Auto(4096)),
    )?;
    let spi_bus = spi::SpiBusDriver::new(
        spi_driver,
        &spi::SpiConfig::new()
            .baudrate(Pins::SPI_CLOCK_HZ.Hz().into())
            .data_mode(spi::config::MODE_0)
            .duplex(spi::config::Duplex::Half3Wire),
    )?;

    let display = Gd7965::new(
        spi_bus,
        gpio::PinDriver::output(pins.gpio15)?, // Pins::CS
        gpio::PinDriver::output(pins.gpio27)?, // Pins::DC
        gpio::PinDriver::output(pins.gpio26)?, // Pins::RST
        gpio::PinDriver::input(pins.gpio25)?,  // Pins::BSY
        Delay::default(),
        Timing::default(),
    );

    let mut controller = Controller::new(
        display,
        FrameStore::new(NvsBlobStore::new(nvs)),
        DeepSleep::new(wifi),
        MonotonicClock::new(),
        inbox,
        config,
    );

    controller.start();
    controller.run();

    Ok(())
}

#[cfg(not(target_os = "espidf"))]
fn main() -> anyhow::Result<()> {
    anyhow::bail!("the firmware only runs on ESP-IDF targets, run `cargo test --lib` on the host")
}
