//! Mock EcoBazaar API server for testing
//!
//! A small HTTP server that behaves like the storefront backend closely enough
//! to drive `ReqwestTransport` and the services over real sockets:
//! - POST /auth/login returns { token, user }
//! - GET /products/{id} returns a product
//! - GET /cart/{userId}, POST /cart/{userId}/items, DELETE /cart/{userId}/items/{itemId}
//! - GET /wishlist/{userId} returns bare entries, POST /wishlist/{userId} adds one
//! - wishlist removal answers on exactly one of the candidate shapes
//!
//! Everything except login and product reads requires `Authorization: Bearer <VALID_TOKEN>`.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use serde_json::{json, Value as JsonValue};

/// Which wishlist removal shape the mock backend accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalRoute {
    /// DELETE /wishlist/{userId}/{productId}
    PathParam,
    /// DELETE /wishlist/remove?userId=..&productId=..
    QueryParams,
    /// DELETE /wishlist/{userId}?productId=..
    RootWithQuery,
    /// DELETE /wishlist/{userId} with a JSON body
    Body,
}

/// Configuration for the mock backend
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Product ids already in user 1's wishlist
    pub wishlist_products: Vec<i64>,
    /// Product ids already in user 1's cart (quantity 1 each)
    pub cart_products: Vec<i64>,
    pub removal_route: RemovalRoute,
    /// Delay in milliseconds before responding
    pub delay_ms: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            wishlist_products: Vec::new(),
            cart_products: Vec::new(),
            removal_route: RemovalRoute::QueryParams,
            delay_ms: 0,
        }
    }
}

#[derive(Debug)]
struct MockState {
    config: MockConfig,
    /// (entry id, product id)
    wishlist: Vec<(i64, i64)>,
    /// (item id, product id, quantity)
    cart: Vec<(i64, i64, u32)>,
    next_id: i64,
}

impl MockState {
    fn new(config: MockConfig) -> Self {
        let mut next_id = 100;
        let wishlist = config
            .wishlist_products
            .iter()
            .map(|p| {
                next_id += 1;
                (next_id, *p)
            })
            .collect();
        let cart = config
            .cart_products
            .iter()
            .map(|p| {
                next_id += 1;
                (next_id, *p, 1)
            })
            .collect();
        Self {
            config,
            wishlist,
            cart,
            next_id,
        }
    }

    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Parsed inbound request
struct MockRequest {
    method: String,
    path: String,
    query: Vec<(String, String)>,
    authorized: bool,
    body: JsonValue,
}

impl MockRequest {
    fn query(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Mock storefront server for testing
pub struct MockStorefrontServer {
    port: u16,
    running: Arc<AtomicBool>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl MockStorefrontServer {
    pub const VALID_TOKEN: &'static str = "mock-token-1";

    /// Start a new mock server on a random available port
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();
        let state = Arc::new(Mutex::new(MockState::new(config)));

        // Non-blocking so stop() can end the accept loop
        listener.set_nonblocking(true)?;

        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let state = state.clone();
                        thread::spawn(move || {
                            let _ = stream.set_nonblocking(false);
                            handle_connection(stream, &state);
                        });
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(std::time::Duration::from_millis(10));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            thread_handle: Some(thread_handle),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockStorefrontServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn read_request(stream: &mut TcpStream) -> Option<MockRequest> {
    let mut reader = BufReader::new(stream);
    let mut first_line = String::new();
    reader.read_line(&mut first_line).ok()?;
    let mut parts = first_line.split_whitespace();
    let method = parts.next()?.to_string();
    let target = parts.next()?.to_string();

    let mut content_length = 0usize;
    let mut authorized = false;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).ok()? == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        let lower = line.to_lowercase();
        if let Some(value) = lower.strip_prefix("content-length:") {
            content_length = value.trim().parse().unwrap_or(0);
        }
        if lower == format!("authorization: bearer {}", MockStorefrontServer::VALID_TOKEN) {
            authorized = true;
        }
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).ok()?;
    let body = serde_json::from_slice(&body).unwrap_or(JsonValue::Null);

    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (
            path.to_string(),
            url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        ),
        None => (target, Vec::new()),
    };

    Some(MockRequest {
        method,
        path,
        query,
        authorized,
        body,
    })
}

fn handle_connection(mut stream: TcpStream, state: &Mutex<MockState>) {
    let Some(request) = read_request(&mut stream) else {
        send_response(&mut stream, 400, &json!({"error": "Invalid request"}));
        return;
    };

    let delay = state
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .config
        .delay_ms;
    if delay > 0 {
        thread::sleep(std::time::Duration::from_millis(delay));
    }

    let (status, body) = route(&request, state);
    send_response(&mut stream, status, &body);
}

fn route(request: &MockRequest, state: &Mutex<MockState>) -> (u16, JsonValue) {
    let segments: Vec<&str> = request.path.trim_matches('/').split('/').collect();
    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);

    match (request.method.as_str(), segments.as_slice()) {
        ("POST", ["auth", "login"]) => {
            if request.body["password"] == "wrong" {
                return (400, json!({"error": "Invalid email or password"}));
            }
            (
                200,
                json!({
                    "token": MockStorefrontServer::VALID_TOKEN,
                    "user": {
                        "id": 1,
                        "email": request.body["email"],
                        "firstName": "Ada",
                        "role": "USER"
                    }
                }),
            )
        }
        ("GET", ["products", id]) => match id.parse::<i64>() {
            Ok(id) => (200, product(id)),
            Err(_) => (404, json!({"error": "Product not found"})),
        },
        _ if !request.authorized => (401, json!({"error": "Unauthorized"})),
        ("GET", ["cart", "1"]) => {
            let items: Vec<JsonValue> = state
                .cart
                .iter()
                .map(|(item_id, product_id, quantity)| {
                    json!({
                        "id": item_id,
                        "productId": product_id,
                        "quantity": quantity,
                        "product": product(*product_id)
                    })
                })
                .collect();
            (200, json!({"id": 1, "items": items}))
        }
        ("POST", ["cart", "1", "items"]) => {
            let Some(product_id) = request.body["productId"].as_i64() else {
                return (400, json!({"error": "productId is required"}));
            };
            let quantity = request.body["quantity"].as_u64().unwrap_or(1) as u32;
            let item_id = state.next_id();
            state.cart.push((item_id, product_id, quantity));
            (200, json!({"message": "Added to cart"}))
        }
        ("DELETE", ["cart", "1", "items", item]) => {
            let before = state.cart.len();
            state.cart.retain(|(id, _, _)| id.to_string() != *item);
            if state.cart.len() == before {
                (404, json!({"error": "Cart item not found"}))
            } else {
                (204, JsonValue::Null)
            }
        }
        ("GET", ["wishlist", "1"]) => {
            let entries: Vec<JsonValue> = state
                .wishlist
                .iter()
                .map(|(entry_id, product_id)| json!({"id": entry_id, "productId": product_id}))
                .collect();
            (200, JsonValue::Array(entries))
        }
        ("POST", ["wishlist", "1"]) => {
            let Some(product_id) = request.body["productId"].as_i64() else {
                return (400, json!({"message": "productId is required"}));
            };
            let entry_id = state.next_id();
            state.wishlist.push((entry_id, product_id));
            (200, json!({"id": entry_id, "productId": product_id}))
        }
        ("DELETE", rest) => {
            let route = state.config.removal_route;
            let product_id = match (route, rest) {
                (RemovalRoute::PathParam, ["wishlist", "1", product]) => product.parse().ok(),
                (RemovalRoute::QueryParams, ["wishlist", "remove"])
                    if request.query("userId") == Some("1") =>
                {
                    request.query("productId").and_then(|p| p.parse().ok())
                }
                (RemovalRoute::RootWithQuery, ["wishlist", "1"]) => {
                    request.query("productId").and_then(|p| p.parse().ok())
                }
                (RemovalRoute::Body, ["wishlist", "1"]) if request.query.is_empty() => {
                    request.body["productId"].as_i64()
                }
                _ => None,
            };
            match product_id {
                Some(product_id) => {
                    state.wishlist.retain(|(_, p)| *p != product_id);
                    (200, json!({"message": "Removed from wishlist"}))
                }
                None => (404, json!({"error": "Endpoint not found"})),
            }
        }
        _ => (404, json!({"error": "Endpoint not found"})),
    }
}

fn product(id: i64) -> JsonValue {
    json!({
        "id": id,
        "name": format!("Eco Product {}", id),
        "price": 10.5 + id as f64,
        "carbonFootprint": 1.25,
        "ecoRating": "A"
    })
}

fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        _ => "Unknown",
    }
}

fn send_response(stream: &mut TcpStream, status: u16, body: &JsonValue) {
    let body = if body.is_null() {
        String::new()
    } else {
        body.to_string()
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text(status),
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_server_starts() {
        let server = MockStorefrontServer::start(MockConfig::default()).unwrap();
        assert!(server.port() > 0);
        assert!(server.base_url().starts_with("http://127.0.0.1:"));
    }

    #[test]
    fn test_seeded_state_gets_distinct_ids() {
        let state = MockState::new(MockConfig {
            wishlist_products: vec![3, 4],
            cart_products: vec![7],
            ..Default::default()
        });
        assert_eq!(state.wishlist, vec![(101, 3), (102, 4)]);
        assert_eq!(state.cart, vec![(103, 7, 1)]);
    }
}
