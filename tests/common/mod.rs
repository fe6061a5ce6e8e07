#![allow(dead_code)]

use actix_http::Request;
use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceResponse},
    http::header,
    middleware::Logger,
    test, web, App,
};
use farmstand::config::MutationPolicy;
use farmstand::routes::{self, health};
use farmstand::state::AppState;
use farmstand::store::MemoryStore;
use farmstand::uploads::MemoryImageStore;
use serde_json::{json, Value};
use std::sync::Arc;

pub const JWT_SECRET: &str = "integration-test-secret";
const BOUNDARY: &str = "farmstand-test-boundary";

/// Application state plus typed handles on the in-memory collaborators.
pub struct TestContext {
    pub state: web::Data<AppState>,
    pub store: Arc<MemoryStore>,
    pub images: Arc<MemoryImageStore>,
}

pub fn context(policy: MutationPolicy) -> TestContext {
    context_with_image_limit(policy, 5 * 1024 * 1024)
}

pub fn context_with_image_limit(policy: MutationPolicy, max_image_bytes: usize) -> TestContext {
    let store = Arc::new(MemoryStore::new());
    let images = Arc::new(MemoryImageStore::new());

    let mut state = AppState::in_memory(JWT_SECRET);
    state.store = store.clone();
    state.images = images.clone();
    state.mutation_policy = policy;
    state.max_image_bytes = max_image_bytes;

    TestContext {
        state: web::Data::new(state),
        store,
        images,
    }
}

pub async fn init_app(
    state: web::Data<AppState>,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(state)
            .wrap(Logger::default())
            .service(health::health)
            .service(web::scope("/api").configure(routes::config)),
    )
    .await
}

pub async fn register(
    app: &impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    username: &str,
    password: &str,
    role: Option<&str>,
) -> Value {
    let mut payload = json!({ "username": username, "password": password });
    if let Some(role) = role {
        payload["role"] = json!(role);
    }

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 201, "registration of {} failed", username);
    test::read_body_json(resp).await
}

/// Logs in and returns the bearer token.
pub async fn login(
    app: &impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    username: &str,
    password: &str,
) -> String {
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "username": username, "password": password }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 200, "login of {} failed", username);
    let body: Value = test::read_body_json(resp).await;
    body["token"]
        .as_str()
        .expect("login response carries a token")
        .to_string()
}

/// Registers and logs in a user; returns `(user id, token)`.
pub async fn sign_up(
    app: &impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    username: &str,
    role: &str,
) -> (String, String) {
    let user = register(app, username, "Password123!", Some(role)).await;
    let token = login(app, username, "Password123!").await;
    (user["id"].as_str().unwrap().to_string(), token)
}

/// One multipart part. A `filename` marks it as a file part.
pub fn part(name: &str, filename: Option<&str>, bytes: &[u8]) -> Vec<u8> {
    let mut body = match filename {
        Some(filename) => format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: image/png\r\n\r\n",
            BOUNDARY, name, filename
        ),
        None => format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n",
            BOUNDARY, name
        ),
    }
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(b"\r\n");
    body
}

/// Joins parts into a multipart/form-data body.
/// Returns the content type header value and the body.
pub fn multipart_body(parts: &[Vec<u8>]) -> (String, Vec<u8>) {
    let mut body = parts.concat();
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}

/// Encodes text fields and an optional `image` part as multipart/form-data.
pub fn multipart(fields: &[(&str, &str)], image: Option<(&str, &[u8])>) -> (String, Vec<u8>) {
    let mut parts: Vec<Vec<u8>> = fields
        .iter()
        .map(|(name, value)| part(name, None, value.as_bytes()))
        .collect();
    if let Some((filename, bytes)) = image {
        parts.push(part("image", Some(filename), bytes));
    }
    multipart_body(&parts)
}

pub fn form_request(
    request: test::TestRequest,
    token: Option<&str>,
    fields: &[(&str, &str)],
    image: Option<(&str, &[u8])>,
) -> Request {
    parts_request(request, token, multipart(fields, image))
}

pub fn parts_request(
    request: test::TestRequest,
    token: Option<&str>,
    (content_type, body): (String, Vec<u8>),
) -> Request {
    let mut request = request
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body);
    if let Some(token) = token {
        request = request.insert_header((header::AUTHORIZATION, format!("Bearer {}", token)));
    }
    request.to_request()
}

pub const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

/// Creates a product through the API and returns the `product` object.
pub async fn create_product(
    app: &impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    token: &str,
    name: &str,
    price: &str,
    quantity: &str,
) -> Value {
    let req = form_request(
        test::TestRequest::post().uri("/api/products"),
        Some(token),
        &[
            ("name", name),
            ("price", price),
            ("description", "Grown locally"),
            ("quantity", quantity),
        ],
        Some(("photo.png", PNG)),
    );
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 201, "creating {} failed", name);
    let body: Value = test::read_body_json(resp).await;
    body["product"].clone()
}
