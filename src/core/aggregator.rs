use crate::core::date_chunker::DateChunker;
use crate::domain::model::{DateWindow, Order};
use crate::domain::ports::OrderFetcher;
use crate::utils::error::{AuditError, Result};
use std::str::FromStr;
use std::time::Duration;

/// 單一時間窗抓取失敗時的處理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowErrorPolicy {
    /// The window contributes zero orders.
    #[default]
    Skip,
    Abort,
    /// Re-fetch up to `attempts` more times, then skip.
    Retry { attempts: u32, delay: Duration },
}

impl WindowErrorPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            WindowErrorPolicy::Skip => "skip",
            WindowErrorPolicy::Abort => "abort",
            WindowErrorPolicy::Retry { .. } => "retry",
        }
    }
}

impl FromStr for WindowErrorPolicy {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(WindowErrorPolicy::Skip),
            "abort" => Ok(WindowErrorPolicy::Abort),
            "retry" => Ok(WindowErrorPolicy::Retry {
                attempts: 3,
                delay: Duration::from_secs(1),
            }),
            other => Err(AuditError::InvalidConfigValueError {
                field: "on_window_error".to_string(),
                value: other.to_string(),
                reason: "Expected one of: skip, abort, retry".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchStats {
    pub windows_requested: usize,
    pub windows_failed: usize,
    pub retries: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub orders: Vec<Order>,
    pub stats: FetchStats,
}

pub struct OrderAggregator<'a, F: OrderFetcher + ?Sized> {
    fetcher: &'a F,
    policy: WindowErrorPolicy,
}

impl<'a, F: OrderFetcher + ?Sized> OrderAggregator<'a, F> {
    pub fn new(fetcher: &'a F, policy: WindowErrorPolicy) -> Self {
        Self { fetcher, policy }
    }

    /// Fetches every (organization, window) pair in order and concatenates the batches.
    pub async fn aggregate(
        &self,
        token: &str,
        organization_ids: &[String],
        chunker: &DateChunker,
    ) -> Result<Aggregation> {
        let mut aggregation = Aggregation::default();

        if chunker.is_empty() {
            tracing::warn!("Date range collapsed after clamping to now; nothing to fetch");
            return Ok(aggregation);
        }

        for org_id in organization_ids {
            let before = aggregation.orders.len();
            for window in chunker.windows() {
                aggregation.stats.windows_requested += 1;
                match self.fetch_window(token, org_id, &window, &mut aggregation.stats).await? {
                    Some(batch) => {
                        tracing::debug!(
                            "Fetched {} orders for {} [{} .. {})",
                            batch.len(),
                            org_id,
                            window.start_wire(),
                            window.end_wire()
                        );
                        aggregation.orders.extend(batch);
                    }
                    None => aggregation.stats.windows_failed += 1,
                }
            }
            tracing::info!(
                "Organization {}: {} orders",
                org_id,
                aggregation.orders.len() - before
            );
        }

        Ok(aggregation)
    }

    /// `Ok(None)` means the window was given up on and contributes nothing.
    async fn fetch_window(
        &self,
        token: &str,
        org_id: &str,
        window: &DateWindow,
        stats: &mut FetchStats,
    ) -> Result<Option<Vec<Order>>> {
        let (extra_attempts, delay) = match self.policy {
            WindowErrorPolicy::Retry { attempts, delay } => (attempts, delay),
            _ => (0, Duration::ZERO),
        };

        let mut attempt = 0;
        loop {
            match self.fetcher.fetch(token, org_id, window).await {
                Ok(batch) => return Ok(Some(batch)),
                Err(e) if !e.is_transport() => return Err(e),
                Err(e) if self.policy == WindowErrorPolicy::Abort => {
                    tracing::error!(
                        "Window [{} .. {}) for {} failed: {}",
                        window.start_wire(),
                        window.end_wire(),
                        org_id,
                        e
                    );
                    return Err(e);
                }
                Err(e) if attempt < extra_attempts => {
                    attempt += 1;
                    stats.retries += 1;
                    tracing::warn!(
                        "Window [{} .. {}) for {} failed ({}), retry {}/{}",
                        window.start_wire(),
                        window.end_wire(),
                        org_id,
                        e,
                        attempt,
                        extra_attempts
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        "Skipping window [{} .. {}) for {}: {}",
                        window.start_wire(),
                        window.end_wire(),
                        org_id,
                        e
                    );
                    return Ok(None);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::date_chunker::parse_timestamp;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves scripted responses keyed by (org, window start); records every call.
    struct ScriptedFetcher {
        failures: Mutex<HashMap<(String, String), usize>>,
        calls: Mutex<Vec<(String, String)>>,
        decode_error_on: Option<String>,
    }

    impl ScriptedFetcher {
        fn new() -> Self {
            Self {
                failures: Mutex::new(HashMap::new()),
                calls: Mutex::new(Vec::new()),
                decode_error_on: None,
            }
        }

        fn fail(self, org: &str, start: &str, times: usize) -> Self {
            self.failures
                .lock()
                .unwrap()
                .insert((org.to_string(), start.to_string()), times);
            self
        }

        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl OrderFetcher for ScriptedFetcher {
        async fn fetch(&self, _token: &str, org: &str, window: &DateWindow) -> Result<Vec<Order>> {
            let key = (org.to_string(), window.start_wire());
            self.calls.lock().unwrap().push(key.clone());

            if self.decode_error_on.as_deref() == Some(org) {
                let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
                return Err(AuditError::SerializationError(err));
            }

            let mut failures = self.failures.lock().unwrap();
            if let Some(left) = failures.get_mut(&key) {
                if *left > 0 {
                    *left -= 1;
                    return Err(AuditError::HttpStatusError {
                        status: 500,
                        url: "http://mock/deliveries".to_string(),
                    });
                }
            }

            Ok(vec![Order::new(json!({
                "number": format!("{}@{}", org, window.start_wire())
            }))])
        }
    }

    fn three_day_chunker() -> DateChunker {
        DateChunker::new(
            parse_timestamp("2024-05-01 00:00:00.000").unwrap(),
            parse_timestamp("2024-05-04 00:00:00.000").unwrap(),
            parse_timestamp("2024-06-01 00:00:00.000").unwrap(),
        )
    }

    fn numbers(orders: &[Order]) -> Vec<String> {
        orders.iter().filter_map(Order::number).collect()
    }

    fn orgs(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_order_is_windows_then_organizations() {
        let fetcher = ScriptedFetcher::new();
        let aggregator = OrderAggregator::new(&fetcher, WindowErrorPolicy::Skip);

        let result = aggregator
            .aggregate("tok", &orgs(&["a", "b"]), &three_day_chunker())
            .await
            .unwrap();

        assert_eq!(
            numbers(&result.orders),
            vec![
                "a@2024-05-01 00:00:00.000",
                "a@2024-05-02 00:00:00.000",
                "a@2024-05-03 00:00:00.000",
                "b@2024-05-01 00:00:00.000",
                "b@2024-05-02 00:00:00.000",
                "b@2024-05-03 00:00:00.000",
            ]
        );
        assert_eq!(result.stats.windows_requested, 6);
        assert_eq!(result.stats.windows_failed, 0);
    }

    #[tokio::test]
    async fn test_skip_policy_isolates_failed_window() {
        let fetcher = ScriptedFetcher::new().fail("a", "2024-05-02 00:00:00.000", 1);
        let aggregator = OrderAggregator::new(&fetcher, WindowErrorPolicy::Skip);

        let result = aggregator
            .aggregate("tok", &orgs(&["a"]), &three_day_chunker())
            .await
            .unwrap();

        assert_eq!(
            numbers(&result.orders),
            vec!["a@2024-05-01 00:00:00.000", "a@2024-05-03 00:00:00.000"]
        );
        assert_eq!(result.stats.windows_failed, 1);
        assert_eq!(fetcher.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_abort_policy_surfaces_error() {
        let fetcher = ScriptedFetcher::new().fail("a", "2024-05-02 00:00:00.000", 1);
        let aggregator = OrderAggregator::new(&fetcher, WindowErrorPolicy::Abort);

        let result = aggregator
            .aggregate("tok", &orgs(&["a"]), &three_day_chunker())
            .await;

        assert!(matches!(result, Err(AuditError::HttpStatusError { status: 500, .. })));
        assert_eq!(fetcher.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_retry_policy_recovers_window() {
        let fetcher = ScriptedFetcher::new().fail("a", "2024-05-01 00:00:00.000", 2);
        let policy = WindowErrorPolicy::Retry {
            attempts: 2,
            delay: Duration::ZERO,
        };
        let aggregator = OrderAggregator::new(&fetcher, policy);

        let result = aggregator
            .aggregate("tok", &orgs(&["a"]), &three_day_chunker())
            .await
            .unwrap();

        assert_eq!(result.orders.len(), 3);
        assert_eq!(result.stats.retries, 2);
        assert_eq!(result.stats.windows_failed, 0);
    }

    #[tokio::test]
    async fn test_retry_policy_gives_up_and_skips() {
        let fetcher = ScriptedFetcher::new().fail("a", "2024-05-01 00:00:00.000", 10);
        let policy = WindowErrorPolicy::Retry {
            attempts: 1,
            delay: Duration::ZERO,
        };
        let aggregator = OrderAggregator::new(&fetcher, policy);

        let result = aggregator
            .aggregate("tok", &orgs(&["a"]), &three_day_chunker())
            .await
            .unwrap();

        assert_eq!(result.orders.len(), 2);
        assert_eq!(result.stats.windows_failed, 1);
        // 1 initial + 1 retry for the failing window, 1 each for the others
        assert_eq!(fetcher.calls().len(), 4);
    }

    #[tokio::test]
    async fn test_non_transport_error_is_not_swallowed() {
        let mut fetcher = ScriptedFetcher::new();
        fetcher.decode_error_on = Some("a".to_string());
        let aggregator = OrderAggregator::new(&fetcher, WindowErrorPolicy::Skip);

        let result = aggregator
            .aggregate("tok", &orgs(&["a"]), &three_day_chunker())
            .await;

        assert!(matches!(result, Err(AuditError::SerializationError(_))));
    }

    #[tokio::test]
    async fn test_collapsed_range_fetches_nothing() {
        let fetcher = ScriptedFetcher::new();
        let aggregator = OrderAggregator::new(&fetcher, WindowErrorPolicy::Skip);
        let chunker = DateChunker::new(
            parse_timestamp("2024-05-01 00:00:00.000").unwrap(),
            parse_timestamp("2024-05-04 00:00:00.000").unwrap(),
            parse_timestamp("2024-04-01 00:00:00.000").unwrap(),
        );

        let result = aggregator
            .aggregate("tok", &orgs(&["a"]), &chunker)
            .await
            .unwrap();

        assert!(result.orders.is_empty());
        assert!(fetcher.calls().is_empty());
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("skip".parse::<WindowErrorPolicy>().unwrap(), WindowErrorPolicy::Skip);
        assert_eq!("ABORT".parse::<WindowErrorPolicy>().unwrap(), WindowErrorPolicy::Abort);
        assert!(matches!(
            "retry".parse::<WindowErrorPolicy>().unwrap(),
            WindowErrorPolicy::Retry { attempts: 3, .. }
        ));
        assert!("ignore".parse::<WindowErrorPolicy>().is_err());
    }
}
