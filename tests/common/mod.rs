#![allow(dead_code)]

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{header, redirect::Policy, Client, Response, StatusCode};
use serde_json::{json, Value};

use football_shop::auth::hash_password;
use football_shop::config::AppConfig;
use football_shop::render::Renderer;
use football_shop::routes;
use football_shop::state::AppState;

pub const PASSWORD: &str = "pw12345";

/// A router served on its own port inside the test's runtime, backed by a
/// fresh in-memory store.
pub struct TestApp {
    pub base_url: String,
    pub state: AppState,
}

pub async fn spawn_app() -> Result<TestApp> {
    spawn_app_with(|_| {}).await
}

pub async fn spawn_app_with(configure: impl FnOnce(&mut AppConfig)) -> Result<TestApp> {
    let mut config = AppConfig::development();
    config.catalog.seed_sample_items = false;
    config.security.enable_cors = false;
    configure(&mut config);

    let state = AppState::with_memory_store(config, Renderer::new()?);

    // Pick an unused port for isolation
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test listener")?;
    let app = routes::app(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let test_app = TestApp {
        base_url: format!("http://127.0.0.1:{}", port),
        state,
    };
    test_app.wait_ready(Duration::from_secs(5)).await?;
    Ok(test_app)
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = Client::new();
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    /// Creates an account directly in the store and returns its id.
    pub async fn create_user(&self, username: &str) -> Result<i64> {
        let hash = hash_password(PASSWORD)?;
        let user = self.state.users.create_user(username, &hash).await?;
        Ok(user.id)
    }

    /// Logs `client` in through the login route; the session cookie lands in its jar.
    pub async fn login(&self, client: &Client, username: &str) -> Result<Response> {
        let resp = client
            .post(self.url("/login/"))
            .form(&[("username", username), ("password", PASSWORD)])
            .send()
            .await?;
        Ok(resp)
    }

    /// A script client with its own account, already logged in.
    pub async fn script_user(&self, username: &str) -> Result<(Client, i64)> {
        let id = self.create_user(username).await?;
        let client = script_client()?;
        let resp = self.login(&client, username).await?;
        anyhow::ensure!(resp.status() == StatusCode::OK, "login failed: {}", resp.status());
        Ok((client, id))
    }

    /// A browser client with its own account, already logged in.
    pub async fn browser_user(&self, username: &str) -> Result<(Client, i64)> {
        let id = self.create_user(username).await?;
        let client = browser()?;
        let resp = self.login(&client, username).await?;
        anyhow::ensure!(resp.status() == StatusCode::SEE_OTHER, "login failed: {}", resp.status());
        Ok((client, id))
    }

    /// Creates an item through the API as `client` and returns the stored item.
    pub async fn create_item(&self, client: &Client, name: &str) -> Result<Value> {
        let resp = client
            .post(self.url("/api/create/"))
            .json(&item_payload(name))
            .send()
            .await?;
        anyhow::ensure!(resp.status() == StatusCode::CREATED, "create failed: {}", resp.status());
        let body: Value = resp.json().await?;
        Ok(body["item"].clone())
    }
}

/// Behaves like a browser: keeps cookies, does not follow redirects.
pub fn browser() -> Result<Client> {
    Ok(Client::builder().cookie_store(true).redirect(Policy::none()).build()?)
}

/// Behaves like the programmatic client: keeps cookies and asks for JSON.
pub fn script_client() -> Result<Client> {
    let mut headers = header::HeaderMap::new();
    headers.insert("X-Requested-With", header::HeaderValue::from_static("XMLHttpRequest"));
    Ok(Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .default_headers(headers)
        .build()?)
}

pub fn item_payload(name: &str) -> Value {
    json!({
        "name": name,
        "price": 1000,
        "description": "Match ball",
        "thumbnail": "http://x",
        "category": "Ball",
        "is_featured": false,
        "stock": 3,
    })
}

/// Value of the first `Set-Cookie` header for `name`, if any.
pub fn set_cookie<'a>(resp: &'a Response, name: &str) -> Option<&'a str> {
    let prefix = format!("{}=", name);
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&prefix))
}

pub fn location(resp: &Response) -> Option<&str> {
    resp.headers().get(header::LOCATION).and_then(|v| v.to_str().ok())
}
