mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

// Search and fulfillment surface. Assertions that need stored rows are
// conditional on a 200 response so the suite passes with or without a
// reachable database.

#[tokio::test]
async fn by_search_rejects_unknown_sort_field() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/products/by/search", server.base_url))
        .json(&json!({ "sortBy": "salt", "order": "desc" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let payload = res.json::<serde_json::Value>().await?;
    assert_eq!(payload["error"], "Invalid sort field");
    Ok(())
}

#[tokio::test]
async fn by_search_returns_size_and_data() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/products/by/search", server.base_url))
        .json(&json!({
            "limit": 5,
            "skip": 0,
            "filters": { "price": [10, 50] }
        }))
        .send()
        .await?;

    if res.status() == StatusCode::OK {
        let payload = res.json::<serde_json::Value>().await?;
        let data = payload["data"].as_array().cloned().unwrap_or_default();
        assert_eq!(
            payload["size"].as_u64().unwrap_or_default() as usize,
            data.len(),
            "size must match the returned page: {}",
            payload
        );
        for product in &data {
            // Photo payloads are only served by the dedicated photo route
            assert!(product.get("photo_data").is_none(), "photo leaked: {}", product);
            let price = product["price"].as_f64().unwrap_or_default();
            assert!(
                (10.0..=50.0).contains(&price),
                "price outside the requested range: {}",
                product
            );
        }
    } else {
        // No database behind the server; still a terminal {error} response
        let payload = res.json::<serde_json::Value>().await?;
        assert!(payload.get("error").is_some(), "missing error body: {}", payload);
    }
    Ok(())
}

#[tokio::test]
async fn related_products_for_unknown_id_fail_with_fixed_message() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!(
            "{}/products/related/22222222-2222-2222-2222-222222222222",
            server.base_url
        ))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let payload = res.json::<serde_json::Value>().await?;
    assert!(payload.get("error").is_some(), "missing error body: {}", payload);
    Ok(())
}

#[tokio::test]
async fn payment_token_requires_a_session() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!(
            "{}/braintree/getToken/33333333-3333-3333-3333-333333333333",
            server.base_url
        ))
        .send()
        .await?;

    assert!(
        res.status() == StatusCode::BAD_REQUEST
            || res.status() == StatusCode::UNAUTHORIZED
            || res.status().is_server_error(),
        "expected middleware rejection, got {}",
        res.status()
    );
    Ok(())
}

#[tokio::test]
async fn order_creation_requires_a_session() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!(
            "{}/order/create/33333333-3333-3333-3333-333333333333",
            server.base_url
        ))
        .json(&json!({
            "order": { "products": [{ "_id": "44444444-4444-4444-4444-444444444444", "count": 2 }] }
        }))
        .send()
        .await?;

    assert!(
        res.status() == StatusCode::BAD_REQUEST
            || res.status() == StatusCode::UNAUTHORIZED
            || res.status().is_server_error(),
        "expected middleware rejection, got {}",
        res.status()
    );
    Ok(())
}

#[tokio::test]
async fn order_with_unknown_product_reports_update_failure() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    // Needs stored rows: skip when the database is down
    let health = client
        .get(format!("{}/health", server.base_url))
        .send()
        .await?;
    if health.status() != StatusCode::OK {
        return Ok(());
    }

    // Fresh account; ownership is enough for order placement
    let millis = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)?
        .as_millis();
    let email = format!("o-{}@test.com", millis);

    let signup = client
        .post(format!("{}/signup", server.base_url))
        .json(&json!({ "name": "Order Test", "email": email, "password": "secret1" }))
        .send()
        .await?;
    assert_eq!(signup.status(), StatusCode::CREATED, "signup failed");

    let signin = client
        .post(format!("{}/signin", server.base_url))
        .json(&json!({ "email": email, "password": "secret1" }))
        .send()
        .await?;
    assert_eq!(signin.status(), StatusCode::OK, "signin failed");
    let session = signin.json::<serde_json::Value>().await?;
    let token = session["token"].as_str().unwrap_or_default().to_string();
    let user_id = session["user"]["id"].as_str().unwrap_or_default().to_string();
    assert!(!token.is_empty() && !user_id.is_empty(), "incomplete session: {}", session);

    // A line item naming a product that does not exist must fail with the
    // single generic fulfillment message
    let res = client
        .post(format!("{}/order/create/{}", server.base_url, user_id))
        .header("authorization", format!("Bearer {}", token))
        .json(&json!({
            "order": { "products": [{ "_id": "44444444-4444-4444-4444-444444444444", "count": 2 }] }
        }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let payload = res.json::<serde_json::Value>().await?;
    assert_eq!(payload["error"], "Could not update product");
    Ok(())
}

#[tokio::test]
async fn used_categories_listing_answers_json() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/products/categories", server.base_url))
        .send()
        .await?;

    let status = res.status();
    let payload = res.json::<serde_json::Value>().await?;
    if status == StatusCode::OK {
        assert!(payload.is_array(), "expected an id array: {}", payload);
    } else {
        assert!(payload.get("error").is_some(), "missing error body: {}", payload);
    }
    Ok(())
}
