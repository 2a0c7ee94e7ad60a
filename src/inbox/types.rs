//! Types for the upload hand-off

/// Events handed from the network side to the control loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// A complete image arrived
    ImageReceived(Vec<u8>),
    /// A station associated with the access point
    StationJoined,
    /// A station left the access point
    StationLeft,
}

/// Upload refused or abandoned
#[derive(Debug, thiserror::Error)]
pub enum UploadError<E: core::fmt::Debug> {
    #[error("upload of {len} bytes exceeds the {capacity} byte framebuffer")]
    TooLarge { len: usize, capacity: usize },
    #[error("previous image has not been shown yet")]
    Busy,
    #[error("reading the upload failed: {0:?}")]
    Read(E),
    #[error("upload ended after {received} of {expected} bytes")]
    Truncated { received: usize, expected: usize },
    #[error("display loop is gone")]
    Closed,
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signal::ImageReceived(image) => write!(f, "Image received ({} bytes)", image.len()),
            Signal::StationJoined => write!(f, "Station joined"),
            Signal::StationLeft => write!(f, "Station left"),
        }
    }
}
