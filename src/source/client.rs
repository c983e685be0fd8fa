use crate::config::SourceLocation;
use crate::error::AppError;
use governor::clock::{Clock, DefaultClock};
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::fs;
use std::num::NonZeroU32;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

const MAX_RETRIES: u32 = 3;

/// Fetches published sheet exports over HTTP or reads them from disk.
pub struct SheetClient {
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl SheetClient {
    pub fn new() -> Self {
        // 2 requests per second
        let quota = Quota::per_second(NonZeroU32::new(2).unwrap_or(NonZeroU32::MIN));
        SheetClient {
            rate_limiter: RateLimiter::direct(quota),
        }
    }

    /// Returns the raw CSV body of one table.
    pub fn fetch(&self, table: &str, location: &SourceLocation) -> Result<String, AppError> {
        match location {
            SourceLocation::File(path) => {
                debug!(table, path = %path.display(), "reading table from file");
                fs::read_to_string(path).map_err(|e| {
                    AppError::csv(table, format!("cannot read {}: {}", path.display(), e))
                })
            }
            SourceLocation::Url(url) => self.execute_request(table, url),
        }
    }

    /// Blocks until the limiter admits one more request.
    fn wait_for_slot(&self) {
        while let Err(not_until) = self.rate_limiter.check() {
            thread::sleep(not_until.wait_time_from(DefaultClock::default().now()));
        }
    }

    fn execute_request(&self, table: &str, url: &str) -> Result<String, AppError> {
        let mut retry_count = 0;

        loop {
            self.wait_for_slot();
            debug!(table, url, "fetching table");

            let response = ureq::get(url)
                .set("User-Agent", concat!("bey_meta/", env!("CARGO_PKG_VERSION")))
                .call();

            match response {
                Ok(resp) => {
                    return resp
                        .into_string()
                        .map_err(|e| AppError::HttpError(e.to_string()));
                }
                Err(ureq::Error::Status(429, _)) => {
                    if retry_count >= MAX_RETRIES {
                        return Err(AppError::RateLimited(table.to_string()));
                    }
                    let wait_ms = 2000 * (retry_count + 1) as u64;
                    warn!(table, wait_ms, "rate limited, retrying");
                    thread::sleep(Duration::from_millis(wait_ms));
                    retry_count += 1;
                }
                Err(ureq::Error::Status(code, _)) => {
                    return Err(AppError::HttpError(format!(
                        "{} table returned HTTP {}",
                        table, code
                    )));
                }
                Err(e) => {
                    return Err(AppError::HttpError(e.to_string()));
                }
            }
        }
    }
}

impl Default for SheetClient {
    fn default() -> Self {
        SheetClient::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_fetch_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ratchets.csv");
        fs::write(&path, "Ratchet\n3-60\n").unwrap();
        let body = SheetClient::new()
            .fetch("ratchet", &SourceLocation::File(path))
            .unwrap();
        assert_eq!(body, "Ratchet\n3-60\n");
    }

    #[test]
    fn test_wait_for_slot_sleeps_until_quota_refills() {
        let client = SheetClient::new();
        let start = std::time::Instant::now();
        // burst of two, then one more slot every 500 ms
        for _ in 0..3 {
            client.wait_for_slot();
        }
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(400), "waited {:?}", elapsed);
        assert!(elapsed < Duration::from_secs(2), "waited {:?}", elapsed);
    }

    #[test]
    fn test_missing_file_names_table() {
        let err = SheetClient::new()
            .fetch("bit", &SourceLocation::File(PathBuf::from("/nonexistent/bits.csv")))
            .unwrap_err();
        assert!(err.to_string().contains("bit table"));
    }
}
