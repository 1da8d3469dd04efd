//! Pin sink: hands finished images to whatever hosts pin windows.
//!
//! The overlay process does not own windows itself; a host (the compositor
//! frontend or the CLI) receives [`PinRequest`]s over a channel.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::dependencies::PinHost;
use super::types::{CaptureError, PinRequest};

/// [`PinHost`] that forwards requests over a bounded `tokio` channel.
#[derive(Debug, Clone)]
pub struct ChannelPinHost {
    sender: mpsc::Sender<PinRequest>,
}

impl ChannelPinHost {
    /// Creates the host and the receiving end for the window owner.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<PinRequest>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl PinHost for ChannelPinHost {
    async fn create_pin_window(&self, request: PinRequest) -> Result<(), CaptureError> {
        log::debug!(
            "pin request {}x{} at ({}, {})",
            request.width,
            request.height,
            request.x,
            request.y
        );
        self.sender
            .send(request)
            .await
            .map_err(|_| CaptureError::PinError("pin host is gone".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> PinRequest {
        PinRequest {
            image: vec![1, 2, 3],
            x: 10.0,
            y: 20.0,
            width: 30.0,
            height: 40.0,
        }
    }

    #[tokio::test]
    async fn forwards_requests() {
        let (host, mut rx) = ChannelPinHost::new(4);
        host.create_pin_window(request()).await.unwrap();
        assert_eq!(rx.recv().await, Some(request()));
    }

    #[tokio::test]
    async fn closed_receiver_is_an_error() {
        let (host, rx) = ChannelPinHost::new(1);
        drop(rx);
        assert!(matches!(
            host.create_pin_window(request()).await,
            Err(CaptureError::PinError(_))
        ));
    }
}
