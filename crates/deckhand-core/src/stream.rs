// ── Event stream adapter ──
//
// Wraps the broadcast subscription as a `futures_core::Stream` for use
// with `StreamExt` combinators.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use crate::model::DeckEvent;

/// `Stream` of deck events.
///
/// A consumer that falls behind the broadcast buffer skips the missed
/// events and continues with the most recent ones; status snapshots
/// supersede each other, so dropped intermediates are not a loss.
pub struct EventStream {
    inner: BroadcastStream<DeckEvent>,
}

impl EventStream {
    pub(crate) fn new(rx: broadcast::Receiver<DeckEvent>) -> Self {
        Self {
            inner: BroadcastStream::new(rx),
        }
    }
}

impl Stream for EventStream {
    type Item = DeckEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(event))) => return Poll::Ready(Some(event)),
                // Lagged: skip what was missed and keep reading.
                Poll::Ready(Some(Err(BroadcastStreamRecvError::Lagged(_)))) => {}
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
