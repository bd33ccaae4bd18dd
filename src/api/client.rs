use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use super::http::{send_with_retry, RetryPolicy};
use super::types::{AddToCartRequest, RepositoryError, UpdateCartItemRequest};
use super::{CartRepository, ProductRepository};
use crate::catalog::{Page, Product, ProductFilter, ProductSort, ProductSummary};
use crate::domain::Cart;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default crate version (from Cargo.toml)
const DEFAULT_VERSION: &str = env!("CARGO_PKG_VERSION");

fn build_user_agent() -> String {
    format!("storefront-cart/{}", DEFAULT_VERSION)
}

/// Settings for [`HttpCartRepository`].
#[derive(Debug, Clone)]
pub struct HttpRepositoryConfig {
    /// API root, e.g. `http://localhost:3000/api/v1/`.
    pub base_url: Url,
    pub timeout: Duration,
    /// Applied to GET, PATCH and DELETE. POST is never retried.
    pub retry: RetryPolicy,
    pub user_agent: String,
}

impl HttpRepositoryConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
            user_agent: build_user_agent(),
        }
    }
}

/// Cart and product repository backed by the storefront REST API.
pub struct HttpCartRepository {
    client: Client,
    config: HttpRepositoryConfig,
}

impl HttpCartRepository {
    pub fn new(config: HttpRepositoryConfig) -> Result<Self, RepositoryError> {
        if config.base_url.cannot_be_a_base() {
            return Err(RepositoryError::Validation(format!(
                "Invalid base URL: {}",
                config.base_url
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RepositoryError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn base_url(&self) -> &Url {
        &self.config.base_url
    }

    /// `{base}/cart/{owner}[/{sku}]` with each segment percent-encoded.
    fn cart_url(&self, owner_id: &str, sku_id: Option<&str>) -> Url {
        let mut url = self.config.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("cart").push(owner_id);
            if let Some(sku_id) = sku_id {
                segments.push(sku_id);
            }
        }
        url
    }

    /// `{base}/products?...` with only the set criteria as parameters.
    fn products_url(&self, filter: &ProductFilter, page: usize, page_size: usize) -> Url {
        let mut url = self.config.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("products");
        }
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("page", &page.to_string())
                .append_pair("pageSize", &page_size.to_string());
            if let Some(q) = filter.query.as_deref().filter(|q| !q.is_empty()) {
                query.append_pair("query", q);
            }
            if let Some(category) = filter.category.as_deref().filter(|c| !c.is_empty()) {
                query.append_pair("category", category);
            }
            if !filter.tags.is_empty() {
                query.append_pair("tags", &filter.tags.join(","));
            }
            if let Some(min) = filter.min_price {
                query.append_pair("minPrice", &min.to_string());
            }
            if let Some(max) = filter.max_price {
                query.append_pair("maxPrice", &max.to_string());
            }
            if filter.sort != ProductSort::Default {
                query.append_pair("sort", filter.sort.as_str());
            }
        }
        url
    }

    /// `{base}/product/{id}`
    fn product_url(&self, product_id: &str) -> Url {
        let mut url = self.config.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("product").push(product_id);
        }
        url
    }

    async fn execute<B, T>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        retry: RetryPolicy,
    ) -> Result<T, RepositoryError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request_id = Uuid::new_v4().to_string();

        debug!("=== Storefront API Request ===");
        debug!("{} {}", method, url);
        debug!("Request ID: {}", request_id);

        let response = send_with_retry(retry, || {
            let mut request = self
                .client
                .request(method.clone(), url.clone())
                .header("User-Agent", &self.config.user_agent)
                .header("x-request-id", &request_id);
            if let Some(body) = body {
                request = request.json(body);
            }
            request
        })
        .await
        .map_err(|e| RepositoryError::network(url.as_str(), e))?;

        let status = response.status();
        debug!("=== Storefront API Response ===");
        debug!("Status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let err = RepositoryError::from_http_response(
                status.as_u16(),
                status.canonical_reason().unwrap_or(""),
                url.as_str(),
                &error_text,
            );
            warn!("Storefront API request failed: {}", err);
            return Err(err);
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| RepositoryError::network(url.as_str(), e))?;
        serde_json::from_str(&response_text).map_err(|e| RepositoryError::Server {
            status: status.as_u16(),
            message: format!("Failed to parse response from {}: {}", url, e),
        })
    }
}

#[async_trait]
impl CartRepository for HttpCartRepository {
    async fn get_cart(&self, owner_id: &str) -> Result<Cart, RepositoryError> {
        let url = self.cart_url(owner_id, None);
        self.execute::<(), _>(Method::GET, url, None, self.config.retry)
            .await
    }

    async fn add_to_cart(
        &self,
        owner_id: &str,
        sku_id: &str,
        quantity: u32,
    ) -> Result<Cart, RepositoryError> {
        let url = self.cart_url(owner_id, None);
        let body = AddToCartRequest {
            sku_id: sku_id.to_string(),
            quantity,
            added_at: chrono::Utc::now().timestamp_millis(),
        };
        self.execute(Method::POST, url, Some(&body), RetryPolicy::NONE)
            .await
    }

    async fn update_cart_item(
        &self,
        owner_id: &str,
        sku_id: &str,
        quantity: u32,
    ) -> Result<Cart, RepositoryError> {
        let url = self.cart_url(owner_id, Some(sku_id));
        let body = UpdateCartItemRequest { quantity };
        self.execute(Method::PATCH, url, Some(&body), self.config.retry)
            .await
    }

    async fn remove_from_cart(&self, owner_id: &str, sku_id: &str) -> Result<Cart, RepositoryError> {
        let url = self.cart_url(owner_id, Some(sku_id));
        self.execute::<(), _>(Method::DELETE, url, None, self.config.retry)
            .await
    }
}

#[async_trait]
impl ProductRepository for HttpCartRepository {
    async fn list_products(
        &self,
        filter: &ProductFilter,
        page: usize,
        page_size: usize,
    ) -> Result<Page<ProductSummary>, RepositoryError> {
        let url = self.products_url(filter, page, page_size);
        self.execute::<(), _>(Method::GET, url, None, self.config.retry)
            .await
    }

    async fn get_product(&self, product_id: &str) -> Result<Product, RepositoryError> {
        let url = self.product_url(product_id);
        self.execute::<(), _>(Method::GET, url, None, self.config.retry)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn repository(base: &str, retry: RetryPolicy) -> HttpCartRepository {
        let mut config = HttpRepositoryConfig::new(Url::parse(base).unwrap());
        config.retry = retry;
        HttpCartRepository::new(config).unwrap()
    }

    fn fast_retry(max_retries: usize) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            base_delay: Duration::from_millis(1),
        }
    }

    fn cart_body(uid: &str, sku: &str, quantity: u32) -> String {
        json!({
            "uid": uid,
            "items": [{
                "skuId": sku,
                "quantity": quantity,
                "addedAt": 1,
                "product": {"name": "T-shirt", "image": "", "price": 199, "attributes": {}}
            }],
            "totalPrice": 199 * quantity,
            "totalQuantity": quantity
        })
        .to_string()
    }

    #[test]
    fn test_cart_url_encodes_segments() {
        let repo = repository("http://localhost:3000/api/v1/", RetryPolicy::NONE);
        assert_eq!(
            repo.cart_url("1", None).as_str(),
            "http://localhost:3000/api/v1/cart/1"
        );
        assert_eq!(
            repo.cart_url("u 1", Some("sku/1")).as_str(),
            "http://localhost:3000/api/v1/cart/u%201/sku%2F1"
        );

        let repo = repository("http://localhost:3000/api/v1", RetryPolicy::NONE);
        assert_eq!(
            repo.cart_url("1", Some("a")).as_str(),
            "http://localhost:3000/api/v1/cart/1/a"
        );
    }

    #[tokio::test]
    async fn test_get_cart_success() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/cart/user1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(cart_body("user1", "skuId123", 2))
            .create_async()
            .await;

        let repo = repository(&server.url(), RetryPolicy::NONE);
        let cart = repo.get_cart("user1").await.unwrap();

        m.assert_async().await;
        assert_eq!(cart.owner_id, "user1");
        assert_eq!(cart.lines[0].sku_id, "skuId123");
        assert_eq!(cart.total_quantity, 2);
    }

    #[tokio::test]
    async fn test_add_to_cart_posts_body_once() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("POST", "/cart/1")
            .match_body(Matcher::PartialJson(json!({"skuId": "sku1", "quantity": 3})))
            .with_status(503)
            .expect(1)
            .create_async()
            .await;

        let repo = repository(&server.url(), fast_retry(3));
        let err = repo.add_to_cart("1", "sku1", 3).await.unwrap_err();

        m.assert_async().await;
        assert!(matches!(err, RepositoryError::Server { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_update_cart_item_patches_quantity() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("PATCH", "/cart/1/sku1")
            .match_body(Matcher::Json(json!({"quantity": 10})))
            .with_status(200)
            .with_body(cart_body("1", "sku1", 10))
            .create_async()
            .await;

        let repo = repository(&server.url(), RetryPolicy::NONE);
        let cart = repo.update_cart_item("1", "sku1", 10).await.unwrap();

        m.assert_async().await;
        assert_eq!(cart.lines[0].quantity, 10);
        assert_eq!(cart.total_price, 1990.0);
    }

    #[tokio::test]
    async fn test_idempotent_calls_retry_transient_status() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("DELETE", "/cart/1/sku1")
            .with_status(503)
            .with_body("busy")
            .expect(3)
            .create_async()
            .await;

        let repo = repository(&server.url(), fast_retry(2));
        let err = repo.remove_from_cart("1", "sku1").await.unwrap_err();

        m.assert_async().await;
        assert!(err.message().starts_with("API Error 503 Service Unavailable at "));
        assert!(err.message().ends_with("/cart/1/sku1: busy"));
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("PATCH", "/cart/1/missing")
            .with_status(400)
            .with_body(r#"{"error":"Item not found"}"#)
            .expect(1)
            .create_async()
            .await;

        let repo = repository(&server.url(), fast_retry(3));
        let err = repo.update_cart_item("1", "missing", 1).await.unwrap_err();

        m.assert_async().await;
        assert!(matches!(err, RepositoryError::Server { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_malformed_body_is_server_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/cart/1")
            .with_status(200)
            .with_body("<html>")
            .create_async()
            .await;

        let repo = repository(&server.url(), RetryPolicy::NONE);
        let err = repo.get_cart("1").await.unwrap_err();
        assert!(err.message().starts_with("Failed to parse response from "));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let repo = repository("http://127.0.0.1:9/", RetryPolicy::NONE);
        let err = repo.get_cart("1").await.unwrap_err();

        assert!(matches!(err, RepositoryError::Network(_)));
        assert!(err
            .message()
            .starts_with("Network error when fetching http://127.0.0.1:9/cart/1"));
    }

    #[test]
    fn test_rejects_non_base_url() {
        let config = HttpRepositoryConfig::new(Url::parse("mailto:cart@example.com").unwrap());
        assert!(HttpCartRepository::new(config).is_err());
    }

    #[test]
    fn test_products_url_carries_set_criteria() {
        let repo = repository("http://localhost:3000/api/v1/", RetryPolicy::NONE);
        assert_eq!(
            repo.products_url(&ProductFilter::default(), 1, 12).as_str(),
            "http://localhost:3000/api/v1/products?page=1&pageSize=12"
        );

        let filter = ProductFilter {
            query: Some("red shirt".to_string()),
            category: Some("clothes".to_string()),
            tags: vec!["hot".to_string(), "new".to_string()],
            min_price: Some(10.0),
            max_price: Some(99.5),
            sort: ProductSort::PriceDesc,
        };
        assert_eq!(
            repo.products_url(&filter, 2, 5).as_str(),
            "http://localhost:3000/api/v1/products?page=2&pageSize=5&query=red+shirt\
             &category=clothes&tags=hot%2Cnew&minPrice=10&maxPrice=99.5&sort=price_desc"
        );
        assert_eq!(
            repo.product_url("p 1").as_str(),
            "http://localhost:3000/api/v1/product/p%201"
        );
    }

    #[tokio::test]
    async fn test_list_products_decodes_page() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/products")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("page".into(), "1".into()),
                Matcher::UrlEncoded("pageSize".into(), "1".into()),
                Matcher::UrlEncoded("sort".into(), "sales".into()),
            ]))
            .with_status(200)
            .with_body(
                json!({
                    "items": [{"id": "p1", "name": "Red T-shirt", "category": "clothes",
                               "price": 49, "sales": 1200, "image": "", "tags": []}],
                    "total": 2,
                    "page": 1,
                    "pageSize": 1,
                    "hasMore": true
                })
                .to_string(),
            )
            .create_async()
            .await;

        let repo = repository(&server.url(), RetryPolicy::NONE);
        let filter = ProductFilter {
            sort: ProductSort::Sales,
            ..Default::default()
        };
        let page = repo.list_products(&filter, 1, 1).await.unwrap();

        m.assert_async().await;
        assert_eq!(page.total, 2);
        assert!(page.has_more);
        assert_eq!(page.items[0].price, 49.0);
    }

    #[tokio::test]
    async fn test_get_product_missing_is_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/product/p9")
            .with_status(404)
            .with_body("Not Found")
            .create_async()
            .await;

        let repo = repository(&server.url(), RetryPolicy::NONE);
        let err = repo.get_product("p9").await.unwrap_err();
        assert!(matches!(err, RepositoryError::Server { status: 404, .. }));
        assert!(err.message().ends_with("/product/p9: Not Found"));
    }
}
