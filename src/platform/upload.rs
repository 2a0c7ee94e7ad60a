//! `POST /upload` endpoint
//!
//! The request body is the framebuffer in the panel's native two-plane
//! format, no decoding happens on the device.

use embedded_svc::http::Headers;
use esp_idf_svc::http::server::{Configuration, EspHttpServer};
use esp_idf_svc::http::Method;
use esp_idf_svc::io::{Read, Write};
use log::*;

use crate::inbox::{UploadError, Uploader};

pub struct UploadServer {
    _server: EspHttpServer<'static>,
}

impl UploadServer {
    pub fn start(uploader: Uploader) -> anyhow::Result<Self> {
        let server_config = Configuration {
            stack_size: 10240,
            lru_purge_enable: true,
            ..Default::default()
        };
        let mut server = EspHttpServer::new(&server_config)?;

        server.fn_handler::<anyhow::Error, _>("/upload", Method::Post, move |mut req| {
            let Some(content_len) = req.content_len() else {
                warn!("Upload without Content-Length");
                req.into_status_response(411)?;
                return Ok(());
            };
            let content_len = usize::try_from(content_len).unwrap_or(usize::MAX);

            let status = match uploader.receive(content_len, |buf: &mut [u8]| req.read(buf)) {
                Ok(()) => 200,
                Err(UploadError::TooLarge { .. }) => 413,
                Err(UploadError::Busy) => 503,
                Err(e) => {
                    error!("Upload failed: {}", e);
                    500
                }
            };

            let mut resp = req.into_status_response(status)?;
            resp.flush()?;
            Ok(())
        })?;

        info!("Upload server started on port 80");

        Ok(Self { _server: server })
    }
}
