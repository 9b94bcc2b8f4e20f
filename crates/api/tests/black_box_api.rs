use catalog_auth::{TokenClaims, TokenKind};
use catalog_core::UserId;
use catalog_infra::Config;
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{json, Value};

const SECRET: &str = "black-box-secret";
const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    async fn spawn_with(tweak: impl FnOnce(&mut Config)) -> Self {
        let mut config = Config {
            jwt_secret: SECRET.to_string(),
            media_root: std::env::temp_dir().join(format!("catalog-media-{}", uuid::Uuid::now_v7())),
            ..Config::default()
        };
        tweak(&mut config);

        // Same router as prod, bound to an ephemeral port.
        let app = catalog_api::app::build_app(config)
            .await
            .expect("failed to build app");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, client: reqwest::Client::new(), handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn register(&self, username: &str) -> Value {
        let res = self
            .client
            .post(self.url("/api/register/"))
            .json(&json!({"username": username, "email": format!("{username}@example.com"), "password": "s3cret-pass"}))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        res.json().await.unwrap()
    }

    async fn access_token(&self) -> String {
        let body = self.register("admin").await;
        body["access"].as_str().unwrap().to_string()
    }

    async fn create_brand(&self, token: &str, name: &str) -> i64 {
        let res = self
            .client
            .post(self.url("/api/brands/"))
            .bearer_auth(token)
            .json(&json!({"name": name}))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = res.json().await.unwrap();
        body["id"].as_i64().unwrap()
    }

    async fn create_category(&self, name: &str) -> i64 {
        let res = self
            .client
            .post(self.url("/api/categories/"))
            .json(&json!({"name": name}))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = res.json().await.unwrap();
        body["id"].as_i64().unwrap()
    }

    async fn create_product(&self, body: Value) -> reqwest::Response {
        self.client
            .post(self.url("/api/products/"))
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    async fn get_json(&self, path: &str) -> (StatusCode, Value) {
        let res = self.client.get(self.url(path)).send().await.unwrap();
        let status = res.status();
        let body = res.json().await.unwrap_or(Value::Null);
        (status, body)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(kind: TokenKind, expires_in: ChronoDuration) -> String {
    let now = Utc::now();
    let claims = TokenClaims {
        user_id: UserId::new(42),
        username: "minted".into(),
        token_type: kind,
        jti: uuid::Uuid::now_v7(),
        iat: now.timestamp(),
        exp: (now + expires_in).timestamp(),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

#[tokio::test]
async fn health_is_public() {
    let server = TestServer::spawn().await;
    let res = server.client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn brands_require_a_bearer_access_token() {
    let server = TestServer::spawn().await;

    let res = server.client.get(server.url("/api/brands/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server
        .client
        .post(server.url("/api/brands/"))
        .json(&json!({"name": "Apple"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server
        .client
        .get(server.url("/api/brands/"))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Refresh tokens are not accepted as bearer credentials.
    let refresh = mint_jwt(TokenKind::Refresh, ChronoDuration::minutes(10));
    let res = server
        .client
        .get(server.url("/api/brands/"))
        .bearer_auth(refresh)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let expired = mint_jwt(TokenKind::Access, ChronoDuration::minutes(-1));
    let res = server
        .client
        .get(server.url("/api/brands/"))
        .bearer_auth(expired)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let access = mint_jwt(TokenKind::Access, ChronoDuration::minutes(10));
    let res = server
        .client
        .get(server.url("/api/brands/"))
        .bearer_auth(access)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn categories_and_products_are_open() {
    let server = TestServer::spawn().await;

    let (status, body) = server.get_json("/api/categories/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = server.get_json("/api/products/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let id = server.create_category("Phones").await;
    let (status, body) = server.get_json(&format!("/api/categories/{id}/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": id, "name": "Phones"}));
}

#[tokio::test]
async fn register_then_obtain_and_refresh_tokens() {
    let server = TestServer::spawn().await;

    let body = server.register("alice").await;
    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "alice@example.com");
    assert!(body["id"].as_i64().is_some());
    assert!(body["access"].as_str().is_some());
    let refresh = body["refresh"].as_str().unwrap().to_string();

    // Same username again is a field error.
    let res = server
        .client
        .post(server.url("/api/register/"))
        .json(&json!({"username": "alice", "password": "x"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: Value = res.json().await.unwrap();
    assert!(err["fields"]["username"].is_array());

    let res = server
        .client
        .post(server.url("/api/token/"))
        .json(&json!({"username": "alice", "password": "s3cret-pass"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let pair: Value = res.json().await.unwrap();
    let access = pair["access"].as_str().unwrap().to_string();

    let res = server
        .client
        .get(server.url("/api/brands/"))
        .bearer_auth(&access)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = server
        .client
        .post(server.url("/api/token/"))
        .json(&json!({"username": "alice", "password": "wrong"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server
        .client
        .post(server.url("/api/token/refresh/"))
        .json(&json!({"refresh": refresh}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let refreshed: Value = res.json().await.unwrap();
    assert!(refreshed["access"].as_str().is_some());

    let res = server
        .client
        .post(server.url("/api/token/refresh/"))
        .json(&json!({"refresh": access}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn product_write_echo_and_read_shapes_differ() {
    let server = TestServer::spawn().await;
    let token = server.access_token().await;
    let apple = server.create_brand(&token, "Apple").await;

    let res = server
        .create_product(json!({"name": "iPhone", "brand": apple, "price": "999.99", "stock": 50}))
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    assert_eq!(created["brand"], json!(apple));
    assert_eq!(created["category"], json!([]));
    assert_eq!(created["price"], "999.99");
    assert!(created.get("total_price").is_none());
    let id = created["id"].as_i64().unwrap();

    let (status, read) = server.get_json(&format!("/api/products/{id}/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        read,
        json!({
            "id": id,
            "name": "iPhone",
            "brand": {"id": apple, "name": "Apple"},
            "category": [],
            "image": null,
            "file": null,
            "price": "999.99",
            "stock": 50,
            "total_price": "49999.50",
        })
    );

    let (_, list) = server.get_json("/api/products/").await;
    assert_eq!(list, json!([read]));
}

#[tokio::test]
async fn product_categories_are_nested_on_read() {
    let server = TestServer::spawn().await;
    let token = server.access_token().await;
    let brand = server.create_brand(&token, "Samsung").await;
    let phones = server.create_category("Phones").await;
    let android = server.create_category("Android").await;

    let res = server
        .create_product(json!({
            "name": "Galaxy", "brand": brand, "category": [android, phones],
            "price": 10, "stock": 3
        }))
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    let id = created["id"].as_i64().unwrap();

    let (_, read) = server.get_json(&format!("/api/products/{id}/")).await;
    let mut names: Vec<&str> = read["category"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    names.sort();
    assert_eq!(names, vec!["Android", "Phones"]);
    assert_eq!(read["total_price"], "30.00");
}

#[tokio::test]
async fn invalid_product_input_is_a_field_error_and_stores_nothing() {
    let server = TestServer::spawn().await;
    let token = server.access_token().await;
    let brand = server.create_brand(&token, "Apple").await;

    let res = server
        .create_product(json!({"name": "iPhone", "brand": brand, "price": "-1.00", "stock": 1}))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: Value = res.json().await.unwrap();
    assert_eq!(err["fields"]["price"], json!(["Price cannot be negative"]));

    let res = server
        .create_product(json!({"name": "x".repeat(101), "brand": brand, "price": "1", "stock": 1}))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server
        .create_product(json!({"name": "Ghost", "brand": 999, "price": "1", "stock": 1}))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: Value = res.json().await.unwrap();
    assert_eq!(
        err["fields"]["brand"],
        json!(["Invalid pk \"999\" - object does not exist."])
    );

    let res = server.create_product(json!({"name": "Partial"})).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: Value = res.json().await.unwrap();
    for field in ["brand", "price", "stock"] {
        assert!(err["fields"][field].is_array(), "{field} should be required");
    }

    let (_, list) = server.get_json("/api/products/").await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn negative_stock_is_only_caught_by_storage() {
    let server = TestServer::spawn().await;
    let token = server.access_token().await;
    let brand = server.create_brand(&token, "Apple").await;

    let res = server
        .create_product(json!({"name": "iPhone", "brand": brand, "price": "1", "stock": -5}))
        .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let err: Value = res.json().await.unwrap();
    assert_eq!(err["error"], "integrity_error");
    assert!(err.get("fields").is_none());
}

#[tokio::test]
async fn duplicate_names_conflict() {
    let server = TestServer::spawn().await;
    let token = server.access_token().await;
    let brand = server.create_brand(&token, "Apple").await;

    let res = server
        .client
        .post(server.url("/api/brands/"))
        .bearer_auth(&token)
        .json(&json!({"name": "Apple"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let product = json!({"name": "iPhone", "brand": brand, "price": "1", "stock": 1});
    assert_eq!(server.create_product(product.clone()).await.status(), StatusCode::CREATED);
    assert_eq!(server.create_product(product).await.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn deleting_a_brand_deletes_its_products() {
    let server = TestServer::spawn().await;
    let token = server.access_token().await;
    let brand = server.create_brand(&token, "Apple").await;

    let res = server
        .create_product(json!({"name": "iPhone", "brand": brand, "price": "1", "stock": 1}))
        .await;
    let product: Value = res.json().await.unwrap();
    let product_id = product["id"].as_i64().unwrap();

    let res = server
        .client
        .delete(server.url(&format!("/api/brands/{brand}/")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let (status, _) = server.get_json(&format!("/api/products/{product_id}/")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_category_keeps_products() {
    let server = TestServer::spawn().await;
    let token = server.access_token().await;
    let brand = server.create_brand(&token, "Apple").await;
    let phones = server.create_category("Phones").await;

    let res = server
        .create_product(json!({"name": "iPhone", "brand": brand, "category": [phones], "price": "1", "stock": 1}))
        .await;
    let product: Value = res.json().await.unwrap();
    let product_id = product["id"].as_i64().unwrap();

    let res = server
        .client
        .delete(server.url(&format!("/api/categories/{phones}/")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let (status, read) = server.get_json(&format!("/api/products/{product_id}/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(read["category"], json!([]));
}

#[tokio::test]
async fn patch_merges_and_put_requires_fields() {
    let server = TestServer::spawn().await;
    let token = server.access_token().await;
    let brand = server.create_brand(&token, "Apple").await;

    let res = server
        .create_product(json!({"name": "iPhone", "brand": brand, "price": "999.99", "stock": 50}))
        .await;
    let product: Value = res.json().await.unwrap();
    let id = product["id"].as_i64().unwrap();

    let res = server
        .client
        .patch(server.url(&format!("/api/products/{id}/")))
        .json(&json!({"stock": 2}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let patched: Value = res.json().await.unwrap();
    assert_eq!(patched["name"], "iPhone");
    assert_eq!(patched["stock"], 2);
    assert_eq!(patched["brand"], json!(brand));

    let res = server
        .client
        .put(server.url(&format!("/api/products/{id}/")))
        .json(&json!({"stock": 3}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server
        .client
        .patch(server.url(&format!("/api/products/{id}/")))
        .json(&json!({"price": "-5"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let (_, read) = server.get_json(&format!("/api/products/{id}/")).await;
    assert_eq!(read["stock"], 2);
    assert_eq!(read["total_price"], "1999.98");
}

#[tokio::test]
async fn unknown_or_malformed_ids_are_not_found() {
    let server = TestServer::spawn().await;

    let (status, _) = server.get_json("/api/products/999/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = server.get_json("/api/products/abc/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let res = server
        .client
        .delete(server.url("/api/categories/77/"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn multipart_upload_sets_absolute_locator_in_debug() {
    let server = TestServer::spawn_with(|config| config.debug = true).await;
    let token = server.access_token().await;
    let brand = server.create_brand(&token, "Apple").await;
    let phones = server.create_category("Phones").await;

    let form = reqwest::multipart::Form::new()
        .text("name", "iPhone")
        .text("brand", brand.to_string())
        .text("category", phones.to_string())
        .text("price", "999.99")
        .text("stock", "50")
        .part(
            "image",
            reqwest::multipart::Part::bytes(PNG.to_vec()).file_name("iphone.png"),
        );
    let res = server
        .client
        .post(server.url("/api/products/"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    assert_eq!(created["category"], json!([phones]));

    let image = created["image"].as_str().unwrap().to_string();
    assert!(
        image.starts_with(&format!("{}/media/products/", server.base_url)),
        "unexpected locator {image}"
    );

    let res = server.client.get(&image).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "image/png");
    assert_eq!(&res.bytes().await.unwrap()[..], PNG);
}

#[tokio::test]
async fn non_image_upload_is_rejected() {
    let server = TestServer::spawn().await;
    let token = server.access_token().await;
    let brand = server.create_brand(&token, "Apple").await;

    let form = reqwest::multipart::Form::new()
        .text("name", "iPhone")
        .text("brand", brand.to_string())
        .text("price", "1")
        .text("stock", "1")
        .part(
            "image",
            reqwest::multipart::Part::bytes(b"not an image".to_vec()).file_name("notes.txt"),
        );
    let res = server
        .client
        .post(server.url("/api/products/"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: Value = res.json().await.unwrap();
    assert!(err["fields"]["image"].is_array());
}

#[tokio::test]
async fn media_is_not_served_outside_debug() {
    let server = TestServer::spawn().await;
    let res = server
        .client
        .get(server.url("/media/products/anything.png"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn wrongly_typed_json_fields_are_field_errors() {
    let server = TestServer::spawn().await;
    let token = server.access_token().await;
    let brand = server.create_brand(&token, "Apple").await;

    let res = server
        .create_product(json!({"name": "iPhone", "brand": brand, "price": "abc", "stock": 1}))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: Value = res.json().await.unwrap();
    assert_eq!(err["error"], "validation_error");
    assert_eq!(err["fields"]["price"], json!(["A valid number is required."]));

    let res = server
        .create_product(json!({"name": "iPhone", "brand": brand, "price": "1", "stock": "many"}))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: Value = res.json().await.unwrap();
    assert_eq!(err["fields"]["stock"], json!(["A valid integer is required."]));

    let res = server
        .create_product(json!({"name": "iPhone", "brand": "x", "price": "1", "stock": 1}))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: Value = res.json().await.unwrap();
    assert_eq!(
        err["fields"]["brand"],
        json!(["Incorrect type. Expected pk value, received str."])
    );

    let res = server
        .create_product(json!({"name": 5, "brand": brand, "price": "1", "stock": 1}))
        .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: Value = res.json().await.unwrap();
    assert!(err["fields"]["name"].is_array());

    let res = server
        .client
        .post(server.url("/api/categories/"))
        .json(&json!({"name": 7}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: Value = res.json().await.unwrap();
    assert_eq!(err["fields"]["name"], json!(["Not a valid string."]));

    let res = server
        .client
        .post(server.url("/api/brands/"))
        .bearer_auth(&token)
        .json(&json!({"name": ["Apple"]}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: Value = res.json().await.unwrap();
    assert_eq!(err["fields"]["name"], json!(["Not a valid string."]));

    let (_, list) = server.get_json("/api/products/").await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn malformed_json_is_a_parse_error() {
    let server = TestServer::spawn().await;
    let res = server
        .client
        .post(server.url("/api/categories/"))
        .header("content-type", "application/json")
        .body("{\"name\": ")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: Value = res.json().await.unwrap();
    assert_eq!(err["error"], "parse_error");
}

#[tokio::test]
async fn stored_blob_names_must_fit_their_field() {
    let server = TestServer::spawn().await;
    let token = server.access_token().await;
    let brand = server.create_brand(&token, "Apple").await;

    let form = reqwest::multipart::Form::new()
        .text("name", "iPhone")
        .text("brand", brand.to_string())
        .text("price", "1")
        .text("stock", "1")
        .part(
            "file",
            reqwest::multipart::Part::bytes(b"plain notes".to_vec()).file_name("notes.txt"),
        );
    let res = server
        .client
        .post(server.url("/api/products/"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    let id = created["id"].as_i64().unwrap();
    assert!(created["file"].as_str().unwrap().ends_with("files/notes.txt"));

    // Image names must live under the image upload prefix.
    let res = server
        .client
        .patch(server.url(&format!("/api/products/{id}/")))
        .json(&json!({"image": "files/notes.txt"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: Value = res.json().await.unwrap();
    assert_eq!(err["fields"]["image"], json!(["The submitted file does not exist."]));

    let res = server
        .client
        .patch(server.url(&format!("/api/products/{id}/")))
        .json(&json!({"file": "../secret.txt"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let err: Value = res.json().await.unwrap();
    assert!(err["fields"]["file"].is_array());

    let res = server
        .client
        .patch(server.url(&format!("/api/products/{id}/")))
        .json(&json!({"file": "files/notes.txt", "stock": 3}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let (_, product) = server.get_json(&format!("/api/products/{id}/")).await;
    assert_eq!(product["image"], Value::Null);
    assert_eq!(product["stock"], 3);
}

#[tokio::test]
async fn names_are_stored_trimmed() {
    let server = TestServer::spawn().await;
    let token = server.access_token().await;

    let res = server
        .client
        .post(server.url("/api/brands/"))
        .bearer_auth(&token)
        .json(&json!({"name": "  Apple "}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    assert_eq!(created["name"], "Apple");

    let res = server
        .client
        .post(server.url("/api/brands/"))
        .bearer_auth(&token)
        .json(&json!({"name": "Apple"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let phones = server.create_category(" Phones ").await;
    let (_, category) = server.get_json(&format!("/api/categories/{phones}/")).await;
    assert_eq!(category["name"], "Phones");
}
