use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::info;

/// Exponential backoff delay with ±30% jitter.
pub fn calculate_backoff_delay(attempt: u32, base_delay_ms: u64) -> Duration {
    // Cap the exponent to prevent overflow
    let capped_attempt = attempt.min(10);

    let base_delay = base_delay_ms.saturating_mul(2_u64.saturating_pow(capped_attempt));

    let jitter_factor = rand::thread_rng().gen_range(0.7..1.3);
    let delay_with_jitter = (base_delay as f64 * jitter_factor).round() as u64;

    Duration::from_millis(delay_with_jitter)
}

/// How often a failed fetch or model call is attempted again.
///
/// The default makes a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            base_backoff_ms: 1000,
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self::default()
    }

    /// Run `op` until it succeeds, fails with an error `retriable` rejects,
    /// or the retry budget is spent.
    pub async fn run<T, E, F, Fut>(
        &self,
        what: &str,
        mut op: F,
        retriable: impl Fn(&E) -> bool,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.max_retries && retriable(&err) => {
                    let delay = calculate_backoff_delay(attempt, self.base_backoff_ms);
                    attempt += 1;
                    info!(
                        error = %err,
                        delay_ms = delay.as_millis() as u64,
                        "{} failed, retrying (attempt {}/{})",
                        what,
                        attempt + 1,
                        self.max_retries + 1
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
