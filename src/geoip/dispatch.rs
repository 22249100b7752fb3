//! Offloading blocking lookups onto a background worker.
//!
//! Inside a Tokio runtime jobs run on the blocking pool; without one they get
//! a dedicated thread. Either way the caller receives a [`Pending`] future
//! that always resolves: a job that panics or vanishes yields `T::default()`.
//! There is no retry, cancellation or timeout. Dropping a `Pending` detaches
//! the job, which still runs to completion.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::warn;

/// The eventual result of an offloaded job.
#[must_use = "a Pending result does nothing unless awaited or waited on"]
pub struct Pending<T> {
    inner: Inner<T>,
}

enum Inner<T> {
    Task(JoinHandle<T>),
    Thread(oneshot::Receiver<T>),
    Ready(Option<T>),
}

// No field is structurally pinned.
impl<T> Unpin for Pending<T> {}

/// Run `job` on a background worker.
pub fn offload<T, F>(job: F) -> Pending<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + Default + 'static,
{
    if let Ok(handle) = Handle::try_current() {
        return Pending {
            inner: Inner::Task(handle.spawn_blocking(job)),
        };
    }

    let (tx, rx) = oneshot::channel();
    let spawned = std::thread::Builder::new()
        .name("geoip-query".into())
        .spawn(move || {
            // The receiver may already be gone; nobody is waiting then.
            let _ = tx.send(job());
        });

    match spawned {
        Ok(_) => Pending {
            inner: Inner::Thread(rx),
        },
        Err(e) => {
            warn!(error = %e, "could not start GeoIP worker thread");
            Pending {
                inner: Inner::Ready(Some(T::default())),
            }
        }
    }
}

impl<T: Default> Pending<T> {
    /// Block the current thread until the job finishes.
    ///
    /// Must not be called from async code; `.await` the `Pending` there.
    pub fn wait(self) -> T {
        futures::executor::block_on(self)
    }
}

impl<T: Default> Future for Pending<T> {
    type Output = T;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        match &mut self.get_mut().inner {
            Inner::Task(handle) => Pin::new(handle).poll(cx).map(|joined| {
                joined.unwrap_or_else(|e| {
                    warn!(error = %e, "GeoIP task did not complete");
                    T::default()
                })
            }),
            Inner::Thread(rx) => Pin::new(rx).poll(cx).map(|received| {
                received.unwrap_or_else(|_| {
                    warn!("GeoIP worker thread exited without a result");
                    T::default()
                })
            }),
            Inner::Ready(value) => Poll::Ready(value.take().unwrap_or_default()),
        }
    }
}
