//! Frame driven polling of single threaded futures.
//!
//! There is no executor: async requests are stored next to the state they will mutate and
//! polled once per frame. Completion on the platform side (a resolved JS promise, a finished
//! read) wakes nothing, the next frame simply sees the value.

use std::task::{Context, Poll};

use futures::{FutureExt, future::LocalBoxFuture, task::noop_waker_ref};

/// Polls `future` once and returns its output if it is done. A finished future must not be
/// polled again, callers drop it as soon as this returns `Some`.
pub fn poll_now<T>(future: &mut LocalBoxFuture<'_, T>) -> Option<T> {
    let mut cx = Context::from_waker(noop_waker_ref());
    match future.poll_unpin(&mut cx) {
        Poll::Ready(value) => Some(value),
        Poll::Pending => None,
    }
}

#[cfg(test)]
mod tests {
    use futures::channel::oneshot;

    use super::*;

    #[test]
    fn ready_future_resolves_on_first_poll() {
        let mut fut = async { 7 }.boxed_local();
        assert_eq!(poll_now(&mut fut), Some(7));
    }

    #[test]
    fn pending_future_resolves_after_completion() {
        let (tx, rx) = oneshot::channel::<u32>();
        let mut fut = async move { rx.await.unwrap_or(0) }.boxed_local();
        assert_eq!(poll_now(&mut fut), None);
        assert_eq!(poll_now(&mut fut), None);
        tx.send(3).unwrap();
        assert_eq!(poll_now(&mut fut), Some(3));
    }
}
