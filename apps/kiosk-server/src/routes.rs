//! # Routes
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  TraceLayer                      (request spans)                        │
//! │   └── SessionManagerLayer        (SQLite sessions, inactivity expiry)   │
//! │        └── require_write_token   (POST / PATCH / DELETE only)           │
//! │             ├── GET    /api/catalog                                     │
//! │             ├── GET    /api/cart                                        │
//! │             ├── GET    /api/cart/count                                  │
//! │             ├── POST   /api/cart/lines                                  │
//! │             ├── PATCH  /api/cart/lines/{line_id}                        │
//! │             ├── DELETE /api/cart/lines/{line_id}                        │
//! │             └── POST   /api/orders                                      │
//! │  GET /health                     (no session, no guard)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::middleware;
use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::commands::{cart, catalog, checkout, health};
use crate::guard;
use crate::sessions::session_layer;
use crate::state::AppState;

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    let sessions = session_layer(state.sessions.clone(), &state.config);

    let api = Router::new()
        .route("/api/catalog", get(catalog::get_catalog))
        .route("/api/cart", get(cart::get_cart))
        .route("/api/cart/count", get(cart::get_cart_count))
        .route("/api/cart/lines", post(cart::add_line))
        .route(
            "/api/cart/lines/{line_id}",
            patch(cart::update_line).delete(cart::remove_line),
        )
        .route("/api/orders", post(checkout::place_order))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            guard::require_write_token,
        ))
        .layer(sessions);

    Router::new()
        .route("/health", get(health::health))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// Route Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, HeaderName, Method, Request, StatusCode};
    use axum::response::Response;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use kiosk_db::{seed_default_menu, Database, DbConfig};

    use crate::guard::CSRF_HEADER;
    use crate::sessions::remove_expired;
    use crate::state::ConfigState;

    struct TestClient {
        app: Router,
        state: AppState,
        db: Database,
        cookie: Option<String>,
        token: Option<String>,
        headers: Vec<(HeaderName, &'static str)>,
    }

    impl TestClient {
        async fn new(config: ConfigState) -> Self {
            let db = Database::new(DbConfig::in_memory()).await.unwrap();
            seed_default_menu(&db).await.unwrap();
            let state = AppState::new(db.clone(), config).await.unwrap();
            TestClient {
                app: router(state.clone()),
                state,
                db,
                cookie: None,
                token: None,
                headers: Vec::new(),
            }
        }

        /// A second visitor of the same server.
        fn visitor(&self) -> Self {
            TestClient {
                app: self.app.clone(),
                state: self.state.clone(),
                db: self.db.clone(),
                cookie: None,
                token: None,
                headers: Vec::new(),
            }
        }

        async fn send(&mut self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
            let request = match body {
                Some(body) => self
                    .request(method, uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
                None => self.request(method, uri).body(Body::empty()).unwrap(),
            };
            self.dispatch(request).await
        }

        fn request(&self, method: Method, uri: &str) -> axum::http::request::Builder {
            let mut builder = Request::builder().method(method).uri(uri);
            for (name, value) in &self.headers {
                builder = builder.header(name, *value);
            }
            if let Some(cookie) = &self.cookie {
                builder = builder.header(header::COOKIE, cookie);
            }
            if let Some(token) = &self.token {
                builder = builder.header(CSRF_HEADER, token);
            }
            builder
        }

        async fn dispatch(&mut self, request: Request<Body>) -> (StatusCode, Value) {
            let response = self.app.clone().oneshot(request).await.unwrap();
            self.keep_cookie(&response);

            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let json = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, json)
        }

        fn keep_cookie(&mut self, response: &Response) {
            if let Some(value) = response.headers().get(header::SET_COOKIE) {
                let pair = value.to_str().unwrap().split(';').next().unwrap();
                self.cookie = Some(pair.to_string());
            }
        }

        /// Loads the catalog and remembers the write token.
        async fn open(&mut self) -> Value {
            let (status, body) = self.send(Method::GET, "/api/catalog", None).await;
            assert_eq!(status, StatusCode::OK);
            self.token = Some(body["csrf_token"].as_str().unwrap().to_string());
            body
        }
    }

    fn espresso_with_sugar() -> Value {
        json!({ "coffee_id": 1, "size_id": 1, "quantity": 2, "sweetener_ids": [1] })
    }

    #[tokio::test]
    async fn test_catalog_issues_token() {
        let mut client = TestClient::new(ConfigState::default()).await;
        let body = client.open().await;

        assert_eq!(body["catalog"]["coffees"].as_array().unwrap().len(), 4);
        assert_eq!(body["catalog"]["sizes"][0]["label"], "Small");
        assert_eq!(client.token.as_ref().unwrap().len(), 64);
        assert!(client.cookie.is_some());

        // Same session, same token
        let again = client.open().await;
        assert_eq!(again["csrf_token"], body["csrf_token"]);
    }

    #[tokio::test]
    async fn test_write_without_token_is_forbidden() {
        let mut client = TestClient::new(ConfigState::default()).await;

        let (status, body) = client
            .send(Method::POST, "/api/cart/lines", Some(espresso_with_sugar()))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Invalid or missing form token.");

        client.open().await;
        client.token = Some("0".repeat(64));
        let (status, _) = client
            .send(Method::POST, "/api/cart/lines", Some(espresso_with_sugar()))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        // Nothing reached the cart
        client.open().await;
        let (_, cart) = client.send(Method::GET, "/api/cart", None).await;
        assert_eq!(cart["cart_count"], 0);
    }

    #[tokio::test]
    async fn test_foreign_origin_is_forbidden() {
        let config = ConfigState {
            allowed_hosts: vec!["kiosk.example.com".to_string()],
            ..ConfigState::default()
        };
        let mut client = TestClient::new(config).await;
        client.open().await;

        let (status, body) = client
            .send(Method::POST, "/api/cart/lines", Some(espresso_with_sugar()))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Request origin could not be verified.");
    }

    #[tokio::test]
    async fn test_cross_site_write_rejected_by_default() {
        let mut client = TestClient::new(ConfigState::default()).await;
        client.headers = vec![
            (header::HOST, "kiosk.local"),
            (header::ORIGIN, "https://evil.example"),
        ];
        client.open().await;

        let (status, body) = client
            .send(Method::POST, "/api/cart/lines", Some(espresso_with_sugar()))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Request origin could not be verified.");

        // Same host, same session: accepted
        client.headers = vec![
            (header::HOST, "kiosk.local"),
            (header::ORIGIN, "http://kiosk.local"),
        ];
        let (status, _) = client
            .send(Method::POST, "/api/cart/lines", Some(espresso_with_sugar()))
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cart_round_trip() {
        let mut client = TestClient::new(ConfigState::default()).await;
        client.open().await;

        let (status, added) = client
            .send(Method::POST, "/api/cart/lines", Some(espresso_with_sugar()))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(added["message"], "Added to cart.");
        let line_id = added["line_id"].as_str().unwrap().to_string();

        let item = &added["cart"]["items"][0];
        assert_eq!(item["coffee"], "Espresso");
        assert_eq!(item["unit_price"], 2.6);
        assert_eq!(item["extras_total"], 0.2);
        assert_eq!(item["line_total"], 5.2);
        assert_eq!(item["sweeteners"], json!(["Sugar"]));
        assert_eq!(added["cart"]["cart_count"], 2);

        let (status, updated) = client
            .send(
                Method::PATCH,
                &format!("/api/cart/lines/{line_id}"),
                Some(json!({ "quantity": 40 })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["message"], "Cart updated.");
        assert_eq!(updated["cart"]["items"][0]["quantity"], 12);

        let (_, count) = client.send(Method::GET, "/api/cart/count", None).await;
        assert_eq!(count["cart_count"], 12);

        let (status, removed) = client
            .send(Method::DELETE, &format!("/api/cart/lines/{line_id}"), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(removed["message"], "Item removed.");
        assert_eq!(removed["cart"]["cart_count"], 0);
        assert_eq!(removed["cart"]["cart_total"], 0.0);

        // Removing again is still fine
        let (status, _) = client
            .send(Method::DELETE, &format!("/api/cart/lines/{line_id}"), None)
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cart_errors() {
        let mut client = TestClient::new(ConfigState::default()).await;
        client.open().await;

        let (status, body) = client
            .send(Method::POST, "/api/cart/lines", Some(json!({ "coffee_id": 99 })))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let messages: Vec<&str> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["message"].as_str().unwrap())
            .collect();
        assert_eq!(messages, ["Select a coffee.", "Select a size."]);

        let (status, body) = client
            .send(
                Method::PATCH,
                "/api/cart/lines/missing",
                Some(json!({ "quantity": 2 })),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Item not found in cart.");
    }

    #[tokio::test]
    async fn test_unreadable_body_lists_errors() {
        let mut client = TestClient::new(ConfigState::default()).await;
        client.open().await;

        let (status, body) = client
            .send(
                Method::POST,
                "/api/cart/lines",
                Some(json!({ "coffee_id": 1, "size_id": 1, "quantity": "abc" })),
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["errors"][0]["field"], "body");
        assert!(!body["errors"][0]["message"].as_str().unwrap().is_empty());

        // Not JSON at all
        let request = client
            .request(Method::POST, "/api/orders")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{customer_name"))
            .unwrap();
        let (status, body) = client.dispatch(request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"].as_array().unwrap().len(), 1);
        assert_eq!(client.db.orders().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_carts_are_per_session() {
        let config = ConfigState::default();
        let mut first = TestClient::new(config).await;
        first.open().await;
        first
            .send(Method::POST, "/api/cart/lines", Some(espresso_with_sugar()))
            .await;

        // A second visitor on the same server starts empty
        let mut second = first.visitor();
        second.open().await;
        let (_, cart) = second.send(Method::GET, "/api/cart", None).await;
        assert_eq!(cart["cart_count"], 0);

        let (_, cart) = first.send(Method::GET, "/api/cart", None).await;
        assert_eq!(cart["cart_count"], 2);
    }

    #[tokio::test]
    async fn test_place_order() {
        let mut client = TestClient::new(ConfigState::default()).await;
        client.open().await;

        let (status, body) = client
            .send(
                Method::POST,
                "/api/orders",
                Some(json!({
                    "customer_name": "  Ada Lovelace ",
                    "customer_email": "ADA@Example.com",
                    "coffee_id": 2,
                    "size_id": 2,
                    "quantity": 1,
                    "creamer_ids": [2]
                })),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED);
        let order = &body["order"];
        assert_eq!(order["customer"], "Ada Lovelace");
        assert_eq!(order["email"], "ada@example.com");
        assert_eq!(order["creamers"], json!(["Vanilla Creamer (flavored)"]));
        // Latte 3.40 + Medium 0.75 + Vanilla 0.35
        assert_eq!(order["order_total"], 4.5);
        assert_eq!(client.db.orders().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_order_validation_collects_errors() {
        let mut client = TestClient::new(ConfigState::default()).await;
        client.open().await;

        let (status, body) = client
            .send(
                Method::POST,
                "/api/orders",
                Some(json!({
                    "customer_name": "",
                    "customer_email": "not-an-email",
                    "coffee_id": 1,
                    "size_id": 1,
                    "quantity": 1
                })),
            )
            .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let fields: Vec<&str> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, ["customer_name", "customer_email"]);
        assert_eq!(client.db.orders().count().await.unwrap(), 0);
    }

    async fn session_rows(db: &Database) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tower_sessions")
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_expired_sessions_are_deleted() {
        let client = TestClient::new(ConfigState::default()).await;

        // Three cookieless visitors, three stored sessions
        for _ in 0..3 {
            let (status, _) = client.visitor().send(Method::GET, "/api/cart", None).await;
            assert_eq!(status, StatusCode::OK);
        }
        assert_eq!(session_rows(&client.db).await, 3);

        // Live sessions survive a sweep
        remove_expired(&client.state.carts, &client.state.sessions).await;
        assert_eq!(session_rows(&client.db).await, 3);

        sqlx::query("UPDATE tower_sessions SET expiry_date = 0")
            .execute(client.db.pool())
            .await
            .unwrap();
        remove_expired(&client.state.carts, &client.state.sessions).await;
        assert_eq!(session_rows(&client.db).await, 0);
    }

    #[tokio::test]
    async fn test_health() {
        let mut client = TestClient::new(ConfigState::default()).await;
        let (status, body) = client.send(Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["migrations"]["total"], body["migrations"]["applied"]);

        client.db.close().await;
        let (status, body) = client.send(Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "unavailable");
    }
}
