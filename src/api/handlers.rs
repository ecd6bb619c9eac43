//! Request handlers.
//!
//! Handlers are thin: they extract, call into `core`, and map the result into a DTO or
//! an [`ApiErrorResponse`].

use super::{
    AppState,
    dto::{
        CreateProductRequest, HealthResponse, OrderResponse, OrderWithItemsResponse,
        ProductResponse, UpdateOrderStatusRequest, UpdateProductRequest,
    },
    error::ApiErrorResponse,
};
use crate::core::{order, order::NewOrder, product};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::{Local, NaiveDate};
use tracing::{info, instrument};

type ApiResult<T> = Result<T, ApiErrorResponse>;

/// Server-local calendar day used for delivery date checks.
fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Liveness probe.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// Products
// =============================================================================

/// `GET /api/products`
pub async fn list_products(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ProductResponse>>> {
    let products = product::list_products(&state.db)
        .await
        .map_err(|e| ApiErrorResponse::from_error(&e, "Failed to fetch products"))?;
    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}

/// `GET /api/products/{id}`
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ProductResponse>> {
    product::get_product_by_id(&state.db, id)
        .await
        .map_err(|e| ApiErrorResponse::from_error(&e, "Failed to fetch product"))?
        .map(|model| Json(model.into()))
        .ok_or_else(|| ApiErrorResponse::not_found("Product not found"))
}

/// `POST /api/products`
#[instrument(skip_all)]
pub async fn create_product(
    State(state): State<AppState>,
    body: Result<Json<CreateProductRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ProductResponse>)> {
    let Json(request) = body?;
    let created = product::create_product(&state.db, request.into())
        .await
        .map_err(|e| ApiErrorResponse::from_error(&e, "Failed to create product"))?;
    info!(product_id = created.id, "Product created");
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// `PATCH /api/products/{id}`
#[instrument(skip_all, fields(product_id = id))]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Result<Json<UpdateProductRequest>, JsonRejection>,
) -> ApiResult<Json<ProductResponse>> {
    let Json(request) = body?;
    let updated = product::update_product(&state.db, id, request.into())
        .await
        .map_err(|e| ApiErrorResponse::from_error(&e, "Failed to update product"))?;
    Ok(Json(updated.into()))
}

// =============================================================================
// Orders
// =============================================================================

/// `GET /api/orders`, newest first.
pub async fn list_orders(State(state): State<AppState>) -> ApiResult<Json<Vec<OrderResponse>>> {
    let orders = order::list_orders(&state.db)
        .await
        .map_err(|e| ApiErrorResponse::from_error(&e, "Failed to fetch orders"))?;
    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

/// `POST /api/orders`
///
/// Validates, persists the order and its lines, then attempts the notification email.
/// Responds 201 with the stored order.
#[instrument(skip_all)]
pub async fn create_order(
    State(state): State<AppState>,
    body: Result<Json<NewOrder>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<OrderWithItemsResponse>)> {
    let Json(new) = body?;
    let placed = state
        .orders
        .place(&new, today())
        .await
        .map_err(|e| ApiErrorResponse::from_error(&e, "Failed to create order"))?;
    Ok((StatusCode::CREATED, Json(placed.into())))
}

/// `GET /api/orders/{id}`, with each line's product.
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<OrderWithItemsResponse>> {
    order::get_order_with_items(&state.db, id)
        .await
        .map_err(|e| ApiErrorResponse::from_error(&e, "Failed to fetch order"))?
        .map(|details| Json(details.into()))
        .ok_or_else(|| ApiErrorResponse::not_found("Order not found"))
}

/// `PATCH /api/orders/{id}`
#[instrument(skip_all, fields(order_id = id))]
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Result<Json<UpdateOrderStatusRequest>, JsonRejection>,
) -> ApiResult<Json<OrderResponse>> {
    let Json(request) = body?;
    let updated = order::update_order_status(&state.db, id, request.status)
        .await
        .map_err(|e| ApiErrorResponse::from_error(&e, "Failed to update order"))?;
    Ok(Json(updated.into()))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        api::{error::ApiError, router},
        config::settings::Settings,
        test_utils::*,
    };
    use axum::{
        Router,
        body::Body,
        http::{Request, Response},
    };
    use http_body_util::BodyExt;
    use serde::de::DeserializeOwned;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn test_settings() -> Settings {
        Settings::from_lookup(|_| None).unwrap()
    }

    async fn create_test_app() -> (Router, AppState) {
        let db = setup_test_db().await.unwrap();
        let state = AppState::new(db, &test_settings());
        (router(state.clone()), state)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response<Body> {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        app.clone().oneshot(request).await.unwrap()
    }

    async fn read_json<T: DeserializeOwned>(response: Response<Body>) -> T {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    /// A delivery day that stays in the future whatever the machine clock says.
    fn tomorrow() -> String {
        (today() + chrono::Days::new(1)).to_string()
    }

    fn order_payload(product_id: i64) -> Value {
        json!({
            "storeName": "Forno Rossi",
            "customerName": "Maria",
            "deliveryDate": tomorrow(),
            "totalAmount": 19.25,
            "vatAmount": 1.75,
            "items": [
                {"productId": product_id, "quantity": 5, "unitPrice": 3.50, "subtotal": 17.50}
            ]
        })
    }

    #[tokio::test]
    async fn test_health_check() {
        let (app, _) = create_test_app().await;

        let response = send(&app, "GET", "/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let json: Value = read_json(response).await;
        assert_eq!(json["status"], "healthy");
    }

    #[tokio::test]
    async fn test_product_endpoints() {
        let (app, _) = create_test_app().await;

        let response = send(
            &app,
            "POST",
            "/api/products",
            Some(json!({
                "name": "Focaccia Genovese",
                "price": 4.00,
                "imageUrl": "/images/focaccia.jpg"
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let created: ProductResponse = read_json(response).await;
        assert_eq!(created.price, crate::core::Money::from_cents(400));

        let response = send(
            &app,
            "PATCH",
            &format!("/api/products/{}", created.id),
            Some(json!({"price": 4.20})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let updated: ProductResponse = read_json(response).await;
        assert_eq!(updated.price, crate::core::Money::from_cents(420));
        assert_eq!(updated.name, "Focaccia Genovese");

        let response = send(&app, "GET", "/api/products", None).await;
        let products: Vec<ProductResponse> = read_json(response).await;
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, updated.id);
        assert_eq!(products[0].price, updated.price);

        let response = send(&app, "GET", "/api/products/999", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_product_rejects_negative_price() {
        let (app, _) = create_test_app().await;

        let response = send(
            &app,
            "POST",
            "/api/products",
            Some(json!({"name": "Focaccia", "price": -1.00})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_order_round_trip() {
        let (app, state) = create_test_app().await;
        let pane = create_test_product(&state.db, "Pane Casereccio", 350)
            .await
            .unwrap();

        let response = send(&app, "POST", "/api/orders", Some(order_payload(pane.id))).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let created: OrderWithItemsResponse = read_json(response).await;
        assert_eq!(created.order.status, "pending");
        assert_eq!(created.items.len(), 1);

        let response = send(&app, "GET", &format!("/api/orders/{}", created.order.id), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let fetched: OrderWithItemsResponse = read_json(response).await;

        assert_eq!(fetched.order.store_name, "Forno Rossi");
        assert_eq!(fetched.order.customer_name.as_deref(), Some("Maria"));
        assert_eq!(fetched.order.total_amount.cents(), 1925);
        assert_eq!(fetched.order.vat_amount.cents(), 175);
        assert_eq!(fetched.items[0].quantity, 5);
        assert_eq!(fetched.items[0].subtotal.cents(), 1750);
        assert_eq!(
            fetched.items[0].product.as_ref().map(|p| p.name.as_str()),
            Some("Pane Casereccio")
        );

        let response = send(&app, "GET", "/api/orders", None).await;
        let orders: Vec<OrderResponse> = read_json(response).await;
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, created.order.id);
    }

    #[tokio::test]
    async fn test_create_order_rejects_empty_items() {
        let (app, _) = create_test_app().await;

        let mut payload = order_payload(1);
        payload["items"] = json!([]);
        payload["totalAmount"] = json!(0);
        payload["vatAmount"] = json!(0);

        let response = send(&app, "POST", "/api/orders", Some(payload)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ApiError = read_json(response).await;
        assert_eq!(error.message, "Order must include at least one item");
    }

    #[tokio::test]
    async fn test_create_order_rejects_mismatched_total() {
        let (app, state) = create_test_app().await;
        let pane = create_test_product(&state.db, "Pane Casereccio", 350)
            .await
            .unwrap();

        let mut payload = order_payload(pane.id);
        payload["totalAmount"] = json!(17.50);

        let response = send(&app, "POST", "/api/orders", Some(payload)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ApiError = read_json(response).await;
        let fields = error.errors.unwrap();
        assert_eq!(fields[0].field, "totalAmount");

        assert_eq!(count_orders(&state.db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_order_rejects_malformed_body() {
        let (app, _) = create_test_app().await;

        let response = send(&app, "POST", "/api/orders", Some(json!({"storeName": 42}))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ApiError = read_json(response).await;
        assert_eq!(error.message, "Invalid request body");
        assert_eq!(error.errors.unwrap()[0].field, "body");
    }

    #[tokio::test]
    async fn test_create_order_rejects_out_of_range_amount() {
        let (app, state) = create_test_app().await;
        let pane = create_test_product(&state.db, "Pane Casereccio", 350)
            .await
            .unwrap();

        let mut payload = order_payload(pane.id);
        payload["totalAmount"] = json!(7e28);

        let response = send(&app, "POST", "/api/orders", Some(payload)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ApiError = read_json(response).await;
        assert_eq!(error.message, "Invalid request body");

        let body = json!({"name": "Pane", "price": 7e28});
        let response = send(&app, "POST", "/api/products", Some(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_unknown_order_is_404() {
        let (app, _) = create_test_app().await;

        let response = send(&app, "GET", "/api/orders/42", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let error: ApiError = read_json(response).await;
        assert_eq!(error.message, "Order not found");
    }

    #[tokio::test]
    async fn test_update_order_status_endpoint() {
        let (app, state) = create_test_app().await;
        let pane = create_test_product(&state.db, "Pane Casereccio", 350)
            .await
            .unwrap();
        let response = send(&app, "POST", "/api/orders", Some(order_payload(pane.id))).await;
        let created: OrderWithItemsResponse = read_json(response).await;
        let uri = format!("/api/orders/{}", created.order.id);

        let response = send(&app, "PATCH", &uri, Some(json!({"status": "completed"}))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let updated: OrderResponse = read_json(response).await;
        assert_eq!(updated.status, "completed");

        let response = send(&app, "PATCH", &uri, Some(json!({"status": "pending"}))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(&app, "PATCH", &uri, Some(json!({"status": "shipped"}))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
