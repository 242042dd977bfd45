use std::future::Future;
use std::time::Duration;

use futures::future::{select, Either};

use crate::error::AppError;

/// Sleep on whichever timer the current target provides.
#[cfg(feature = "hydrate")]
pub async fn sleep(duration: Duration) {
    gloo_timers::future::sleep(duration).await;
}

#[cfg(all(feature = "ssr", not(feature = "hydrate")))]
pub async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}

/// Without a timer backend the deadline never fires.
#[cfg(not(any(feature = "ssr", feature = "hydrate")))]
pub async fn sleep(_duration: Duration) {
    futures::future::pending::<()>().await;
}

/// Resolve `fut`, or fail with [`AppError::Timeout`] once `deadline` fires.
pub async fn with_deadline<T, F, D>(fut: F, deadline: D, what: &str) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
    D: Future<Output = ()>,
{
    let fut = std::pin::pin!(fut);
    let deadline = std::pin::pin!(deadline);

    match select(fut, deadline).await {
        Either::Left((result, _)) => result,
        Either::Right(((), _)) => Err(AppError::Timeout(format!("{what} did not complete in time"))),
    }
}
