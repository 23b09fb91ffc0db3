use crate::lifecycle::HasLifecycle;
use futures_core::stream::Stream;
use pin_project::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Combinators for watching a store's state stream.
pub trait SliceStreamExt: Stream {
    /// Yields items until one satisfies `test`; that item is the last one yielded.
    ///
    /// ```
    /// use futures_signals::signal::SignalExt;
    /// use slicerx::SliceStreamExt;
    ///
    /// async fn example() {
    ///     let stream = futures_signals::signal::always(0)
    ///         .to_stream()
    ///         .stop_if(|&value| value > 5);
    /// }
    /// ```
    fn stop_if<F>(self, test: F) -> StopIf<Self, F>
    where
        F: FnMut(&Self::Item) -> bool,
        Self: Sized,
    {
        StopIf {
            stream: self,
            stopped: false,
            test,
        }
    }

    /// Yields states until a task that was seen pending has been fulfilled or rejected.
    ///
    /// Settled states from earlier runs do not end the stream, so a subscriber can watch a
    /// task that is started again. States without lifecycle fields never end it.
    fn until_settled(self) -> UntilSettled<Self>
    where
        Self: Sized,
        Self::Item: HasLifecycle,
    {
        UntilSettled {
            stream: self,
            seen_busy: false,
            stopped: false,
        }
    }
}

impl<T: ?Sized> SliceStreamExt for T where T: Stream {}

#[pin_project(project = StopIfProj)]
#[derive(Debug)]
#[must_use = "Streams do nothing unless polled"]
pub struct StopIf<A, B> {
    #[pin]
    stream: A,
    stopped: bool,
    test: B,
}

impl<A, B> Stream for StopIf<A, B>
where
    A: Stream,
    B: FnMut(&A::Item) -> bool,
{
    type Item = A::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let StopIfProj {
            stream,
            stopped,
            test,
        } = self.project();

        if *stopped {
            return Poll::Ready(None);
        }
        match stream.poll_next(cx) {
            Poll::Ready(Some(value)) => {
                *stopped = test(&value);
                Poll::Ready(Some(value))
            }
            Poll::Ready(None) => {
                *stopped = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

#[pin_project(project = UntilSettledProj)]
#[derive(Debug)]
#[must_use = "Streams do nothing unless polled"]
pub struct UntilSettled<A> {
    #[pin]
    stream: A,
    seen_busy: bool,
    stopped: bool,
}

impl<A> Stream for UntilSettled<A>
where
    A: Stream,
    A::Item: HasLifecycle,
{
    type Item = A::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let UntilSettledProj {
            stream,
            seen_busy,
            stopped,
        } = self.project();

        if *stopped {
            return Poll::Ready(None);
        }
        match stream.poll_next(cx) {
            Poll::Ready(Some(state)) => {
                if let Some(lifecycle) = state.lifecycle() {
                    if lifecycle.status.is_busy() {
                        *seen_busy = true;
                    } else if *seen_busy && lifecycle.status.is_settled() {
                        *stopped = true;
                    }
                }
                Poll::Ready(Some(state))
            }
            Poll::Ready(None) => {
                *stopped = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
