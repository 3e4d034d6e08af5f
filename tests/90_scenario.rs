mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{set_cookie, spawn_app};

/// Register, log in, create an item with markup in it, list it back, log out.
#[tokio::test]
async fn register_login_create_list_logout() -> Result<()> {
    let app = spawn_app().await?;
    let client = common::script_client()?;

    let res = client
        .post(app.url("/register/"))
        .form(&[("username", "alice"), ("password1", "pw12345"), ("password2", "pw12345")])
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["status"], "success");

    let res = client
        .post(app.url("/login/"))
        .form(&[("username", "alice"), ("password", "pw12345")])
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let stamp = set_cookie(&res, "last_login").map(str::to_string);
    let body: Value = res.json().await?;
    assert_eq!(body["status"], true);
    assert_eq!(body["username"], "alice");

    let stamp = stamp.unwrap_or_default();
    let value = stamp.trim_start_matches("last_login=").split(';').next().unwrap_or_default();
    assert!(chrono::DateTime::parse_from_rfc3339(value).is_ok(), "bad last_login: {}", stamp);

    let res = client
        .post(app.url("/create_football_item/"))
        .json(&json!({
            "name": "Ball",
            "price": 1000,
            "description": "<b>x</b>",
            "category": "Ball",
            "thumbnail": "http://x",
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    let created = body["item"].clone();
    assert_eq!(created["description"], "x");

    let mine: Vec<Value> = client.get(app.url("/?filter=mine")).send().await?.json().await?;
    assert_eq!(mine, vec![created]);

    let res = client.post(app.url("/logout/")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let cleared = set_cookie(&res, "last_login").map(str::to_string).unwrap_or_default();
    assert!(cleared.starts_with("last_login=;"), "last_login not cleared: {}", cleared);
    assert!(cleared.contains("Max-Age=0"));
    let body: Value = res.json().await?;
    assert_eq!(body["status"], true);
    assert_eq!(body["message"], "Logout successful!");

    let res = client.get(app.url("/")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
