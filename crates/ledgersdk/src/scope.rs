//! Scoped acquisition.
//!
//! The core never releases anything on its own. Call sites that want a
//! handle to be released no matter how their work ends wrap that work in
//! `scoped`.

use std::future::Future;

use ledgercore::Result;

/// Something that can release handles of type `H`.
#[async_trait::async_trait]
pub trait Release<H: Send + 'static>: Send + Sync {
    async fn release(&self, handle: H) -> Result<()>;
}

/// Runs `body` with `handle`, then releases it whether or not `body` failed.
///
/// The body's error takes precedence over a release error; a release error
/// is returned only when the body succeeded.
pub async fn scoped<H, R, F, Fut, T>(releaser: &R, handle: H, body: F) -> Result<T>
where
    H: Copy + Send + std::fmt::Display + 'static,
    R: Release<H> + ?Sized,
    F: FnOnce(H) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let result = body(handle).await;
    let released = releaser.release(handle).await;

    match (result, released) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(release_error)) => {
            tracing::warn!(%handle, error = %release_error, "release after a failed scope also failed");
            Err(e)
        }
    }
}
