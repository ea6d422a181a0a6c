// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Slot-holding wrapper for streamed upstream responses.

use crate::slot::Slot;
use futures_util::stream::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};

/// A response stream that keeps its call slot until it ends.
///
/// Ends after the inner stream is exhausted or after yielding the first
/// error item; the slot is released at that point (or on drop).
pub struct GuardedStream<S> {
    inner: S,
    slot: Option<Slot>,
}

impl<S> GuardedStream<S> {
    pub(crate) fn new(inner: S, slot: Slot) -> Self {
        Self { inner, slot: Some(slot) }
    }

    /// Whether the slot is still held.
    pub fn is_holding(&self) -> bool {
        self.slot.is_some()
    }

    fn finish(&mut self) {
        if let Some(mut slot) = self.slot.take() {
            slot.release_now();
        }
    }
}

impl<S, T, E> Stream for GuardedStream<S>
where
    S: Stream<Item = Result<T, E>> + Unpin,
{
    type Item = Result<T, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.slot.is_none() {
            return Poll::Ready(None);
        }
        match Pin::new(&mut this.inner).poll_next(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(None) => {
                this.finish();
                Poll::Ready(None)
            }
            Poll::Ready(Some(Err(e))) => {
                this.finish();
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(Some(Ok(item))) => Poll::Ready(Some(Ok(item))),
        }
    }
}
