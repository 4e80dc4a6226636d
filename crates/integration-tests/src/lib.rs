//! Integration test harness for the Bazaar storefront.
//!
//! Each test starts two in-process servers on ephemeral ports:
//!
//! - a fake product service speaking the REST API the storefront consumes,
//!   backed by an in-memory catalog that records every request it receives
//! - the real storefront router, configured to talk to that fake
//!
//! Tests then drive the storefront over HTTP with `reqwest`, acting as the
//! browser, and inspect both the rendered pages and the requests the
//! storefront made.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bazaar-integration-tests
//! ```

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bazaar_core::{Price, Product, ProductId, Rating, RatingValue};
use bazaar_storefront::config::StorefrontConfig;
use bazaar_storefront::state::AppState;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use url::Url;

/// A request the fake product service received, e.g. `GET /items/abc123`.
pub type RecordedRequest = String;

#[derive(Default)]
struct Catalog {
    products: Vec<Product>,
    requests: Vec<RecordedRequest>,
    uploads: Vec<Vec<String>>,
    next_id: u32,
    unavailable: bool,
}

/// In-memory stand-in for the remote product service.
#[derive(Clone, Default)]
pub struct FakeProductService {
    catalog: Arc<Mutex<Catalog>>,
}

impl FakeProductService {
    /// A service preloaded with `products`.
    #[must_use]
    pub fn with_products(products: Vec<Product>) -> Self {
        let service = Self::default();
        service.catalog.lock().unwrap().products = products;
        service
    }

    /// Every request received so far, in arrival order.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.catalog.lock().unwrap().requests.clone()
    }

    /// File names of the images sent with each create request.
    #[must_use]
    pub fn uploads(&self) -> Vec<Vec<String>> {
        self.catalog.lock().unwrap().uploads.clone()
    }

    /// Current catalog contents.
    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        self.catalog.lock().unwrap().products.clone()
    }

    /// Make every endpoint answer `503 Service Unavailable`.
    pub fn go_down(&self) {
        self.catalog.lock().unwrap().unavailable = true;
    }

    /// Record a request and report whether the service is down.
    fn record(&self, request: String) -> bool {
        let mut catalog = self.catalog.lock().unwrap();
        catalog.requests.push(request);
        catalog.unavailable
    }

    fn router(self) -> Router {
        Router::new()
            .route("/items", get(search))
            .route("/items/{id}", get(detail))
            .route("/items/{id}/addrating", post(add_rating))
            .route("/create", post(create))
            .with_state(self)
    }
}

/// A product with the given id and name, one unit in stock, no ratings.
#[must_use]
pub fn product(id: &str, name: &str) -> Product {
    Product {
        id: ProductId::parse(id).unwrap(),
        name: name.to_string(),
        description: format!("{name} description"),
        price: Price::new(Decimal::new(1999, 2)).unwrap(),
        brand: "Acme".to_string(),
        stock: 1,
        category: "misc".to_string(),
        images: Vec::new(),
        ratings: Vec::new(),
        created_at: None,
    }
}

fn unavailable() -> Response {
    (StatusCode::SERVICE_UNAVAILABLE, "maintenance").into_response()
}

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    search: String,
}

async fn search(
    State(service): State<FakeProductService>,
    Query(params): Query<SearchParams>,
) -> Response {
    if service.record(format!("GET /items?search={}", params.search)) {
        return unavailable();
    }
    let needle = params.search.to_lowercase();
    let matches: Vec<Product> = service
        .products()
        .into_iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .collect();
    Json(matches).into_response()
}

async fn detail(State(service): State<FakeProductService>, Path(id): Path<String>) -> Response {
    if service.record(format!("GET /items/{id}")) {
        return unavailable();
    }
    service
        .products()
        .into_iter()
        .find(|p| p.id.as_str() == id)
        .map_or_else(
            || (StatusCode::NOT_FOUND, "product not found").into_response(),
            |p| Json(p).into_response(),
        )
}

#[derive(Deserialize)]
struct RatingBody {
    value: i64,
}

async fn add_rating(
    State(service): State<FakeProductService>,
    Path(id): Path<String>,
    Json(body): Json<RatingBody>,
) -> Response {
    if service.record(format!("POST /items/{id}/addrating value={}", body.value)) {
        return unavailable();
    }
    let Ok(value) = RatingValue::new(body.value) else {
        return (StatusCode::BAD_REQUEST, "rating out of range").into_response();
    };

    let mut catalog = service.catalog.lock().unwrap();
    let Some(product) = catalog.products.iter_mut().find(|p| p.id.as_str() == id) else {
        return (StatusCode::NOT_FOUND, "product not found").into_response();
    };
    product.ratings.push(Rating {
        value,
        created_at: None,
    });
    Json(product.clone()).into_response()
}

async fn create(State(service): State<FakeProductService>, mut multipart: Multipart) -> Response {
    if service.record("POST /create".to_string()) {
        return unavailable();
    }

    let mut created = product("pending", "");
    let mut files = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        if name == "images" {
            files.push(field.file_name().unwrap_or_default().to_string());
            let _ = field.bytes().await;
            continue;
        }
        let value = field.text().await.unwrap_or_default();
        match name.as_str() {
            "name" => created.name = value,
            "description" => created.description = value,
            "brand" => created.brand = value,
            "category" => created.category = value,
            "price" => {
                created.price = Decimal::from_str(&value)
                    .ok()
                    .and_then(|d| Price::new(d).ok())
                    .unwrap_or(Price::ZERO);
            }
            "stock" => created.stock = value.parse().unwrap_or_default(),
            _ => {}
        }
    }

    if created.name.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, "name is required").into_response();
    }

    let mut catalog = service.catalog.lock().unwrap();
    catalog.next_id += 1;
    created.id = ProductId::parse(&format!("new-{}", catalog.next_id)).unwrap();
    created.images = files
        .iter()
        .map(|f| format!("https://cdn.example.com/{f}"))
        .collect();
    catalog.uploads.push(files);
    catalog.products.push(created.clone());
    (StatusCode::CREATED, Json(created)).into_response()
}

async fn spawn(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// A running storefront wired to a running fake product service.
pub struct TestContext {
    /// The fake product service, for seeding and inspecting requests.
    pub service: FakeProductService,
    /// Base URL of the storefront, without trailing slash.
    pub storefront_url: String,
    /// Browser stand-in that does not follow redirects.
    pub client: Client,
}

impl TestContext {
    /// Start both servers.
    pub async fn start(service: FakeProductService) -> Self {
        let service_addr = spawn(service.clone().router()).await;

        let config = StorefrontConfig::with_service_url(
            Url::parse(&format!("http://{service_addr}/")).unwrap(),
        );
        let state = AppState::new(config).unwrap();
        let storefront_addr = spawn(bazaar_storefront::app(state)).await;

        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        Self {
            service,
            storefront_url: format!("http://{storefront_addr}"),
            client,
        }
    }

    /// Absolute storefront URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.storefront_url)
    }
}
