use crate::domain::model::{DateWindow, Order, Organization};
use crate::domain::ports::{ConfigProvider, CredentialProvider, OrderFetcher, OrganizationLister};
use crate::utils::error::{AuditError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrganizationsResponse {
    #[serde(default)]
    organizations: Vec<Organization>,
}

#[derive(Debug, Deserialize)]
struct DeliveriesResponse {
    #[serde(default, rename = "ordersByOrganizations")]
    orders_by_organizations: Vec<OrganizationOrders>,
}

#[derive(Debug, Deserialize)]
struct OrganizationOrders {
    #[serde(default)]
    orders: Vec<Value>,
}

/// Syrve Cloud API 客戶端，實作取 token、列組織與抓取外送訂單
#[derive(Debug, Clone)]
pub struct SyrveClient {
    client: Client,
    token_url: String,
    organizations_url: String,
    deliveries_url: String,
    statuses: Vec<String>,
}

impl SyrveClient {
    pub fn new<C: ConfigProvider>(config: &C) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds()))
            .build()?;

        Ok(Self {
            client,
            token_url: config.token_url().to_string(),
            organizations_url: config.organizations_url().to_string(),
            deliveries_url: config.deliveries_url().to_string(),
            statuses: config.statuses().to_vec(),
        })
    }

    fn ensure_success(response: Response) -> Result<Response> {
        let status = response.status();
        if !status.is_success() {
            return Err(AuditError::HttpStatusError {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }
        Ok(response)
    }

    /// Reads the body as JSON; undecodable bodies surface as `SerializationError`.
    async fn json_body<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl CredentialProvider for SyrveClient {
    async fn acquire(&self, identity: &str) -> Result<String> {
        tracing::debug!("POST {}", self.token_url);
        let response = self
            .client
            .post(&self.token_url)
            .json(&json!({ "apiLogin": identity }))
            .send()
            .await?;
        let response = Self::ensure_success(response)?;
        let body: TokenResponse = Self::json_body(response).await?;

        body.token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuditError::AuthError {
                message: "token endpoint returned no token".to_string(),
            })
    }
}

#[async_trait]
impl OrganizationLister for SyrveClient {
    async fn list(&self, token: &str) -> Result<Vec<Organization>> {
        tracing::debug!("GET {}", self.organizations_url);
        let response = self
            .client
            .get(&self.organizations_url)
            .bearer_auth(token)
            .send()
            .await?;
        let response = Self::ensure_success(response)?;
        let body: OrganizationsResponse = Self::json_body(response).await?;
        Ok(body.organizations)
    }
}

#[async_trait]
impl OrderFetcher for SyrveClient {
    async fn fetch(
        &self,
        token: &str,
        organization_id: &str,
        window: &DateWindow,
    ) -> Result<Vec<Order>> {
        let payload = json!({
            "organizationIds": [organization_id],
            "deliveryDateFrom": window.start_wire(),
            "deliveryDateTo": window.end_wire(),
            "statuses": self.statuses,
        });

        let response = self
            .client
            .post(&self.deliveries_url)
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await?;
        let response = Self::ensure_success(response)?;
        let body: DeliveriesResponse = Self::json_body(response).await?;

        Ok(body
            .orders_by_organizations
            .into_iter()
            .flat_map(|batch| batch.orders)
            .map(Order::new)
            .collect())
    }
}
