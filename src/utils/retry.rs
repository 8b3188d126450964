//! Fixed-interval retry combinator.

use std::thread;
use std::time::Duration;

/// Run `op` up to `retries + 1` times, sleeping `interval` between attempts.
///
/// Returns the first success, or the error of the last attempt. There is no
/// backoff growth and the sleep is a plain blocking wait.
pub fn with_retry<T, E, F>(retries: u32, interval: Duration, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
{
    let mut remaining = retries;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(e) if remaining == 0 => return Err(e),
            Err(_) => {
                log::debug!("Attempt failed, {} retries left", remaining);
                remaining -= 1;
                if !interval.is_zero() {
                    thread::sleep(interval);
                }
            }
        }
    }
}
