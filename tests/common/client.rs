//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per endpoint. When a route or request
//! format changes, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::json;
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    /// Logs in and returns the user id, panicking on failure.
    /// Most tests need ids for request bodies rather than the raw response.
    pub async fn user_id(&self, login_id: &str, password: &str) -> i64 {
        let response = self.login(login_id, password).await;
        assert_eq!(
            response.status(),
            reqwest::StatusCode::OK,
            "Login failed for {}",
            login_id
        );
        response.json::<serde_json::Value>().await.unwrap()["user_id"]
            .as_i64()
            .unwrap()
    }

    /// POST /api/v1/users/login
    pub async fn login(&self, login_id: &str, password: &str) -> Response {
        self.client
            .post(format!("{}/api/v1/users/login", self.base_url))
            .json(&json!({"login_id": login_id, "password": password}))
            .send()
            .await
            .expect("Login request failed")
    }

    /// POST /api/v1/users/signup
    pub async fn signup(&self, login_id: &str, password: &str) -> Response {
        self.client
            .post(format!("{}/api/v1/users/signup", self.base_url))
            .json(&json!({"login_id": login_id, "password": password}))
            .send()
            .await
            .expect("Signup request failed")
    }

    /// POST /api/v1/books
    pub async fn create_book(&self, user_id: i64, title: &str, description: &str) -> Response {
        self.client
            .post(format!("{}/api/v1/books", self.base_url))
            .json(&json!({"user_id": user_id, "title": title, "description": description}))
            .send()
            .await
            .expect("Create book request failed")
    }

    /// Creates a book and returns its id, panicking on failure.
    pub async fn create_book_id(&self, user_id: i64, title: &str, description: &str) -> i64 {
        let response = self.create_book(user_id, title, description).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        response.json::<serde_json::Value>().await.unwrap()["book_id"]
            .as_i64()
            .unwrap()
    }

    /// POST /api/v1/books/check
    pub async fn check_book(&self, book_id: i64, user_id: i64) -> Response {
        self.client
            .post(format!("{}/api/v1/books/check", self.base_url))
            .json(&json!({"book_id": book_id, "user_id": user_id}))
            .send()
            .await
            .expect("Check book request failed")
    }

    /// GET /api/v1/books/list
    pub async fn list_books(&self) -> Response {
        self.client
            .get(format!("{}/api/v1/books/list", self.base_url))
            .send()
            .await
            .expect("List books request failed")
    }

    /// PUT /api/v1/books/put
    pub async fn update_book(
        &self,
        book_id: i64,
        user_id: i64,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Response {
        self.client
            .put(format!("{}/api/v1/books/put", self.base_url))
            .json(&json!({
                "book_id": book_id,
                "user_id": user_id,
                "title": title,
                "description": description
            }))
            .send()
            .await
            .expect("Update book request failed")
    }

    /// DELETE /api/v1/books/delete
    pub async fn delete_book(&self, book_id: i64, user_id: i64) -> Response {
        self.client
            .delete(format!("{}/api/v1/books/delete", self.base_url))
            .json(&json!({"book_id": book_id, "user_id": user_id}))
            .send()
            .await
            .expect("Delete book request failed")
    }

    /// POST /api/v1/image
    pub async fn create_image(&self, image_url: &str, book_id: i64) -> Response {
        self.client
            .post(format!("{}/api/v1/image", self.base_url))
            .json(&json!({"image_url": image_url, "book_id": book_id}))
            .send()
            .await
            .expect("Create image request failed")
    }

    /// POST /api/v1/image with an explicit requesting user
    pub async fn create_image_as(&self, image_url: &str, book_id: i64, user_id: i64) -> Response {
        self.client
            .post(format!("{}/api/v1/image", self.base_url))
            .json(&json!({"image_url": image_url, "book_id": book_id, "user_id": user_id}))
            .send()
            .await
            .expect("Create image request failed")
    }

    /// POST /api/v1/image/check
    pub async fn check_image(&self, book_id: i64) -> Response {
        self.client
            .post(format!("{}/api/v1/image/check", self.base_url))
            .json(&json!({"book_id": book_id}))
            .send()
            .await
            .expect("Check image request failed")
    }

    /// POST /api/v1/image/check with an explicit requesting user
    pub async fn check_image_as(&self, book_id: i64, user_id: i64) -> Response {
        self.client
            .post(format!("{}/api/v1/image/check", self.base_url))
            .json(&json!({"book_id": book_id, "user_id": user_id}))
            .send()
            .await
            .expect("Check image request failed")
    }

    /// PUT /api/v1/image/put
    pub async fn update_image(&self, book_id: i64, user_id: i64, image_url: &str) -> Response {
        self.client
            .put(format!("{}/api/v1/image/put", self.base_url))
            .json(&json!({"book_id": book_id, "user_id": user_id, "image_url": image_url}))
            .send()
            .await
            .expect("Update image request failed")
    }

    /// GET of a server-relative path, e.g. an `/images/...` reference.
    pub async fn get_path(&self, relative: &str) -> Response {
        self.client
            .get(format!("{}{}", self.base_url, relative))
            .send()
            .await
            .expect("Static request failed")
    }
}
