use crate::domain::model::{DateWindow, Order, Organization, SummaryRecord};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn token_url(&self) -> &str;
    fn organizations_url(&self) -> &str;
    fn deliveries_url(&self) -> &str;
    fn statuses(&self) -> &[String];
    fn request_timeout_seconds(&self) -> u64;
}

#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Exchanges an API login for an access token; fails with `AuthError` when none is issued.
    async fn acquire(&self, identity: &str) -> Result<String>;
}

#[async_trait]
pub trait OrganizationLister: Send + Sync {
    async fn list(&self, token: &str) -> Result<Vec<Organization>>;
}

#[async_trait]
pub trait OrderFetcher: Send + Sync {
    async fn fetch(&self, token: &str, organization_id: &str, window: &DateWindow)
        -> Result<Vec<Order>>;
}

pub trait Selector {
    /// Returns a non-empty subset of `candidates`, or `EmptySelection`.
    fn select(&self, candidates: &[Organization]) -> Result<Vec<Organization>>;
}

pub trait Presenter {
    fn report(
        &self,
        summary: &SummaryRecord,
        from: &str,
        to: &str,
        organizations: &[Organization],
    ) -> Result<()>;

    fn details(&self, orders: &[Order]) -> Result<()>;
}
