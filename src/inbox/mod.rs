//! Hand-off between the upload handler and the control loop
//!
//! The HTTP server task owns an [`Uploader`], the control loop owns the
//! [`Inbox`]. Only one image can be in flight: the uploader claims a shared
//! pending flag before reading, and the loop releases it once the image is
//! in the framebuffer.
//!
//! The image buffer travels back with the release and is reused by the next
//! upload, so at most one framebuffer-sized mailbox is allocated.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};

use log::{debug, info, warn};

pub mod types;
pub use types::*;

/// Create a connected uploader/inbox pair for images of at most `capacity` bytes
pub fn channel(capacity: usize) -> (Uploader, Inbox) {
    let (tx, rx) = mpsc::channel();
    let pending = Arc::new(AtomicBool::new(false));
    let spare = Arc::new(Mutex::new(None));

    let uploader = Uploader {
        tx,
        pending: pending.clone(),
        spare: spare.clone(),
        capacity,
    };
    let inbox = Inbox { rx, pending, spare };

    (uploader, inbox)
}

/// Sending side, cloned into every network callback
#[derive(Clone)]
pub struct Uploader {
    tx: Sender<Signal>,
    pending: Arc<AtomicBool>,
    spare: Mailbox,
    capacity: usize,
}

/// Image buffer handed back by the control loop
type Mailbox = Arc<Mutex<Option<Vec<u8>>>>;

impl Uploader {
    /// Largest image accepted
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Receive an image of `content_len` bytes from `read`
    ///
    /// `read` behaves like `std::io::Read::read`: it fills part of the buffer
    /// and returns how much, `0` meaning end of stream. Oversized uploads are
    /// refused before `read` is called.
    pub fn receive<E, F>(&self, content_len: usize, mut read: F) -> Result<(), UploadError<E>>
    where
        E: core::fmt::Debug,
        F: FnMut(&mut [u8]) -> Result<usize, E>,
    {
        if content_len > self.capacity {
            warn!(
                "Rejecting upload of {} bytes, framebuffer holds {}",
                content_len, self.capacity
            );
            return Err(UploadError::TooLarge {
                len: content_len,
                capacity: self.capacity,
            });
        }

        if self
            .pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Rejecting upload, previous image still pending");
            return Err(UploadError::Busy);
        }

        let mut image = take_spare(&self.spare);
        let result = match read_exact(&mut image, content_len, &mut read) {
            Ok(()) => self
                .tx
                .send(Signal::ImageReceived(image))
                .map_err(|_| UploadError::Closed),
            Err(e) => {
                put_spare(&self.spare, image);
                Err(e)
            }
        };

        match result {
            Ok(()) => {
                info!("Received image of {} bytes", content_len);
                Ok(())
            }
            Err(e) => {
                self.pending.store(false, Ordering::Release);
                Err(e)
            }
        }
    }

    pub fn station_joined(&self) {
        self.send(Signal::StationJoined);
    }

    pub fn station_left(&self) {
        self.send(Signal::StationLeft);
    }

    fn send(&self, signal: Signal) {
        if self.tx.send(signal).is_err() {
            debug!("Display loop is gone, dropping signal");
        }
    }
}

fn take_spare(spare: &Mailbox) -> Vec<u8> {
    spare
        .lock()
        .ok()
        .and_then(|mut slot| slot.take())
        .unwrap_or_default()
}

fn put_spare(spare: &Mailbox, mut image: Vec<u8>) {
    image.clear();
    if let Ok(mut slot) = spare.lock() {
        *slot = Some(image);
    }
}

/// Fill `image` with exactly `len` bytes, reusing its allocation
fn read_exact<E, F>(image: &mut Vec<u8>, len: usize, read: &mut F) -> Result<(), UploadError<E>>
where
    E: core::fmt::Debug,
    F: FnMut(&mut [u8]) -> Result<usize, E>,
{
    image.clear();
    image.resize(len, 0);
    let mut received = 0;

    while received < len {
        match read(&mut image[received..]).map_err(UploadError::Read)? {
            0 => {
                warn!("Upload ended after {} of {} bytes", received, len);
                return Err(UploadError::Truncated {
                    received,
                    expected: len,
                });
            }
            n => received += n,
        }
    }

    Ok(())
}

/// Receiving side, owned by the control loop
pub struct Inbox {
    rx: Receiver<Signal>,
    pending: Arc<AtomicBool>,
    spare: Mailbox,
}

impl Inbox {
    /// Next signal, if any, without blocking
    pub fn poll(&self) -> Option<Signal> {
        match self.rx.try_recv() {
            Ok(signal) => Some(signal),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// An image was accepted and not yet released
    pub fn is_image_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Hand the image buffer back and allow the next upload
    ///
    /// Call once the image is in the framebuffer.
    pub fn consumed(&self, image: Vec<u8>) {
        put_spare(&self.spare, image);
        self.pending.store(false, Ordering::Release);
    }
}
