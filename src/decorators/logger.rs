use std::{fmt::Display, future::Future, time::Instant};
use tracing::{error, info};

/// Logs the start, duration and outcome of `fut`, returning its output
/// untouched.
pub async fn log_call<Fut, T, E>(name: &str, fut: Fut) -> Result<T, E>
where
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    info!("Starting API call: {}", name);
    let start = Instant::now();

    let result = fut.await;
    let elapsed = start.elapsed().as_secs_f64();

    match &result {
        Ok(_) => info!("API call {} completed in {:.2}s", name, elapsed),
        Err(e) => error!("API call {} failed after {:.2}s: {}", name, elapsed, e),
    }

    result
}
