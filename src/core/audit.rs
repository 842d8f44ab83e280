use crate::core::aggregator::{FetchStats, OrderAggregator, WindowErrorPolicy};
use crate::core::date_chunker::DateChunker;
use crate::core::summary::SummaryEngine;
use crate::domain::model::{Order, Organization, SummaryRecord};
use crate::domain::ports::{CredentialProvider, OrderFetcher, OrganizationLister, Selector};
use crate::utils::error::Result;
use chrono::NaiveDateTime;

/// 一次稽核執行的結果
#[derive(Debug, Clone)]
pub struct AuditOutcome {
    pub organizations: Vec<Organization>,
    pub orders: Vec<Order>,
    pub summary: SummaryRecord,
    pub stats: FetchStats,
}

pub struct AuditEngine<A, S>
where
    A: CredentialProvider + OrganizationLister + OrderFetcher,
    S: Selector,
{
    api: A,
    selector: S,
    policy: WindowErrorPolicy,
}

impl<A, S> AuditEngine<A, S>
where
    A: CredentialProvider + OrganizationLister + OrderFetcher,
    S: Selector,
{
    pub fn new(api: A, selector: S) -> Self {
        Self {
            api,
            selector,
            policy: WindowErrorPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: WindowErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub async fn run(
        &self,
        login: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<AuditOutcome> {
        let now = chrono::Local::now().naive_local();
        self.run_at(login, start, end, now).await
    }

    /// Same as [`AuditEngine::run`] with an explicit "now" for the range clamp.
    pub async fn run_at(
        &self,
        login: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
        now: NaiveDateTime,
    ) -> Result<AuditOutcome> {
        tracing::info!("Requesting access token");
        let token = self.api.acquire(login).await?;

        let candidates = self.api.list(&token).await?;
        tracing::info!("{} organizations available", candidates.len());

        let organizations = self.selector.select(&candidates)?;
        let ids: Vec<String> = organizations.iter().map(|o| o.id.clone()).collect();
        tracing::info!("Selected organizations: {}", ids.join(", "));

        let chunker = DateChunker::new(start, end, now);
        let aggregation = OrderAggregator::new(&self.api, self.policy)
            .aggregate(&token, &ids, &chunker)
            .await?;

        tracing::info!(
            "Collected {} orders from {} windows ({} failed, policy: {})",
            aggregation.orders.len(),
            aggregation.stats.windows_requested,
            aggregation.stats.windows_failed,
            self.policy.name()
        );

        let summary = SummaryEngine::new().summarize(&aggregation.orders);

        Ok(AuditOutcome {
            organizations,
            orders: aggregation.orders,
            summary,
            stats: aggregation.stats,
        })
    }
}
