//! HTTP implementation of the service traits

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::config::ClientConfig;
use crate::traits::*;
use crate::types::*;

const USERS: &str = "Users";
const CUSTOMERS: &str = "Customers";
const STAFFS: &str = "Staffs";

/// JSON-over-HTTP client for the remote ledger API
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
}

impl RestClient {
    /// Build a client from validated settings
    pub fn new(config: &ClientConfig) -> HisabResult<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| HisabError::Config(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    /// Send a request and turn transport failures and non-2xx statuses into errors
    async fn send(&self, request: RequestBuilder, path: &str) -> HisabResult<Response> {
        let response = request.send().await.map_err(|e| {
            warn!(path, error = %e, "request failed");
            HisabError::Remote(format!("request to {path} failed: {e}"))
        })?;

        let status = response.status();
        debug!(path, status = status.as_u16(), "response received");

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::NOT_FOUND {
            return Err(HisabError::NotFound(path.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        warn!(path, status = status.as_u16(), "request rejected");
        Err(HisabError::Remote(format!("HTTP {status} from {path}: {body}")))
    }

    async fn decode<T: DeserializeOwned>(response: Response, path: &str) -> HisabResult<T> {
        response
            .json()
            .await
            .map_err(|e| HisabError::Decode(format!("unexpected response from {path}: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, i64)],
    ) -> HisabResult<T> {
        let response = self
            .send(self.request(Method::GET, path).query(query), path)
            .await?;
        Self::decode(response, path).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> HisabResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .send(self.request(Method::POST, path).json(body), path)
            .await?;
        Self::decode(response, path).await
    }

    async fn put_json<B>(&self, path: &str, body: &B) -> HisabResult<()>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.send(self.request(Method::PUT, path).json(body), path)
            .await?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> HisabResult<()> {
        self.send(self.request(Method::DELETE, path), path).await?;
        Ok(())
    }
}

#[async_trait]
impl UserService for RestClient {
    async fn list_users(&self) -> HisabResult<Vec<User>> {
        self.get_json(USERS, &[]).await
    }

    async fn get_user(&self, user_id: UserId) -> HisabResult<User> {
        self.get_json(&format!("{USERS}/{user_id}"), &[]).await
    }

    async fn create_user(&self, user: &User) -> HisabResult<User> {
        self.post_json(USERS, user).await
    }

    async fn update_user(&self, user_id: UserId, user: &User) -> HisabResult<()> {
        self.put_json(&format!("{USERS}/{user_id}"), user).await
    }

    async fn delete_user(&self, user_id: UserId) -> HisabResult<()> {
        self.delete(&format!("{USERS}/{user_id}")).await
    }
}

#[async_trait]
impl CustomerService for RestClient {
    async fn list_customers(&self) -> HisabResult<Vec<Customer>> {
        self.get_json(CUSTOMERS, &[]).await
    }

    async fn list_customers_for_user(&self, user_id: UserId) -> HisabResult<Vec<Customer>> {
        self.get_json(CUSTOMERS, &[("userID", user_id)]).await
    }

    async fn get_customer(&self, customer_id: CustomerId) -> HisabResult<Customer> {
        self.get_json(&format!("{CUSTOMERS}/{customer_id}"), &[])
            .await
    }

    async fn create_customer(&self, customer: &Customer) -> HisabResult<Customer> {
        self.post_json(CUSTOMERS, customer).await
    }

    async fn update_customer(
        &self,
        customer_id: CustomerId,
        customer: &Customer,
    ) -> HisabResult<()> {
        self.put_json(&format!("{CUSTOMERS}/{customer_id}"), customer)
            .await
    }

    async fn delete_customer(&self, customer_id: CustomerId) -> HisabResult<()> {
        self.delete(&format!("{CUSTOMERS}/{customer_id}")).await
    }
}

#[async_trait]
impl StaffService for RestClient {
    async fn list_staff(&self) -> HisabResult<Vec<Staff>> {
        self.get_json(STAFFS, &[]).await
    }

    async fn list_staff_for_user(&self, user_id: UserId) -> HisabResult<Vec<Staff>> {
        self.get_json(STAFFS, &[("userId", user_id)]).await
    }

    async fn create_staff(&self, staff: &Staff) -> HisabResult<Staff> {
        self.post_json(STAFFS, staff).await
    }

    async fn delete_staff(&self, staff_id: StaffId) -> HisabResult<()> {
        self.delete(&format!("{STAFFS}/{staff_id}")).await
    }
}
