//! Chunked request body with progress reporting
//!
//! The HTTP client polls the body from its own connection task, so progress
//! is not delivered through a callback here. Each chunk handed to the
//! transport publishes the cumulative byte count on a channel, and the task
//! that owns the request drains that channel between polls of the request
//! future.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;

use crate::app::models::TransferProgress;

/// Receiving end of a [`ProgressBody`]
pub type ProgressReceiver = mpsc::UnboundedReceiver<TransferProgress>;

/// Stream adapter counting the bytes of every chunk it yields
pub struct ProgressBody<S> {
    inner: S,
    sent: u64,
    total: u64,
    tx: mpsc::UnboundedSender<TransferProgress>,
}

impl<S> ProgressBody<S> {
    /// Wrap `inner`, announcing `total` as the expected size
    pub fn new(inner: S, total: u64) -> (Self, ProgressReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let body = Self {
            inner,
            sent: 0,
            total,
            tx,
        };
        (body, rx)
    }
}

impl<S, B, E> Stream for ProgressBody<S>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
{
    type Item = Result<B, E>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        let polled = Pin::new(&mut this.inner).poll_next(cx);
        if let Poll::Ready(Some(Ok(chunk))) = &polled {
            let len = chunk.as_ref().len() as u64;
            if len > 0 {
                this.sent += len;
                // Receiver gone means nobody is watching; the upload goes on.
                let _ = this
                    .tx
                    .send(TransferProgress::new(this.sent, this.total.max(this.sent)));
            }
        }
        polled
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::{stream, StreamExt};

    #[tokio::test]
    async fn test_reports_cumulative_bytes() {
        let chunks: Vec<Result<Vec<u8>, std::io::Error>> =
            vec![Ok(vec![0; 100]), Ok(vec![]), Ok(vec![0; 50]), Ok(vec![0; 10])];
        let (body, mut rx) = ProgressBody::new(stream::iter(chunks), 160);

        let collected: Vec<_> = body.collect().await;
        assert_eq!(collected.len(), 4);

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event.bytes_transferred);
        }
        assert_eq!(events, vec![100, 150, 160]);
    }

    #[tokio::test]
    async fn test_errors_pass_through_uncounted() {
        let chunks: Vec<Result<Vec<u8>, std::io::Error>> = vec![
            Ok(vec![0; 8]),
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk")),
        ];
        let (mut body, mut rx) = ProgressBody::new(stream::iter(chunks), 16);

        assert!(body.next().await.unwrap().is_ok());
        assert!(body.next().await.unwrap().is_err());
        assert_eq!(rx.try_recv().unwrap(), TransferProgress::new(8, 16));
        assert!(rx.try_recv().is_err());
    }
}
