//! HTTP client for the order API.
//!
//! [`ApiClient`] is what an ordering front end uses: it loads the catalog and submits
//! drafts through [`OrderGateway`], so an [`OrderDraft`](crate::core::OrderDraft) can
//! be submitted to a remote server the same way it is submitted in-process.

use super::{
    dto::{OrderResponse, OrderWithItemsResponse, ProductResponse},
    error::ApiError,
};
use crate::{
    core::{
        order::NewOrder,
        submission::{OrderGateway, OrderReceipt},
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

/// Thin typed wrapper over the REST endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Client for a server at `base_url`, e.g. `http://127.0.0.1:5000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `GET /api/products`
    pub async fn list_products(&self) -> Result<Vec<ProductResponse>> {
        let response = self.http.get(self.url("/api/products")).send().await?;
        read_json(response).await
    }

    /// `GET /api/orders`
    pub async fn list_orders(&self) -> Result<Vec<OrderResponse>> {
        let response = self.http.get(self.url("/api/orders")).send().await?;
        read_json(response).await
    }

    /// `GET /api/orders/{id}`
    ///
    /// # Errors
    /// Returns [`Error::OrderNotFound`] on a 404, [`Error::Remote`] for other failures.
    pub async fn get_order(&self, order_id: i64) -> Result<OrderWithItemsResponse> {
        let response = self
            .http
            .get(self.url(&format!("/api/orders/{order_id}")))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::OrderNotFound { id: order_id });
        }
        read_json(response).await
    }

    /// `POST /api/orders`
    #[instrument(skip_all, fields(store = %order.store_name))]
    pub async fn create_order(&self, order: &NewOrder) -> Result<OrderWithItemsResponse> {
        let response = self
            .http
            .post(self.url("/api/orders"))
            .json(order)
            .send()
            .await?;
        let created: OrderWithItemsResponse = read_json(response).await?;
        debug!(order_id = created.order.id, "Order accepted by server");
        Ok(created)
    }
}

impl OrderGateway for ApiClient {
    /// The server checks the delivery date against its own calendar.
    async fn submit_order(&self, order: &NewOrder, _today: NaiveDate) -> Result<OrderReceipt> {
        self.create_order(order)
            .await
            .map(|created| OrderReceipt::from(&created.order))
    }
}

/// Decodes a success body, or turns an error body into [`Error::Remote`].
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return response.json::<T>().await.map_err(Into::into);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiError>(&body)
        .map(|error| error.message)
        .unwrap_or(body);
    Err(Error::Remote {
        status: status.as_u16(),
        message,
    })
}
