use std::future::Future;

use maybe_sync::MaybeSend;
use tokio::task::JoinHandle;

/// Runs the future on the current tokio runtime. Must be called from within a runtime context.
pub fn spawn<T>(future: T) -> JoinHandle<T::Output>
where
    T: Future + MaybeSend + 'static,
    T::Output: MaybeSend + 'static,
{
    tokio::spawn(future)
}
