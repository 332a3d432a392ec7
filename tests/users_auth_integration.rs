mod common;

use chirpy::auth::{validate_access_token, Claims};
use common::{spawn_app, JWT_SECRET};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::{json, Value};

fn decode_claims(token: &str) -> Claims {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&["chirpy"]);
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(JWT_SECRET.as_bytes()),
        &validation,
    )
    .expect("Failed to decode token")
    .claims
}

// --- Registration ---

#[tokio::test]
async fn create_user_returns_201_without_password_hash() {
    let app = spawn_app().await;

    let response = app
        .post_users(&json!({ "email": "walt@breakingbad.com", "password": "04234" }))
        .await;

    assert_eq!(201, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["email"], "walt@breakingbad.com");
    assert_eq!(body["is_upgraded"], false);
    assert!(body["id"].as_str().is_some());
    assert!(body["created_at"].as_str().is_some());
    assert!(body["updated_at"].as_str().is_some());
    assert!(body.get("hashed_password").is_none());
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn create_user_returns_400_for_invalid_input() {
    let app = spawn_app().await;

    let test_cases = vec![
        (json!({ "password": "secret" }), "missing email"),
        (json!({ "email": "a@example.com" }), "missing password"),
        (json!({ "email": "", "password": "secret" }), "empty email"),
        (json!({ "email": "a@example.com", "password": "" }), "empty password"),
        (json!({ "email": "not-an-email", "password": "secret" }), "invalid email"),
    ];

    for (body, description) in test_cases {
        let response = app.post_users(&body).await;
        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 when the payload was {}.",
            description
        );
    }
}

#[tokio::test]
async fn create_user_returns_409_for_duplicate_email() {
    let app = spawn_app().await;
    let credentials = json!({ "email": "dup@example.com", "password": "secret" });

    assert_eq!(201, app.post_users(&credentials).await.status().as_u16());

    let response = app.post_users(&credentials).await;
    assert_eq!(409, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert!(body["error_id"].as_str().is_some());
}

// --- Login ---

#[tokio::test]
async fn login_returns_user_and_tokens() {
    let app = spawn_app().await;
    let credentials = json!({ "email": "saul@bettercall.com", "password": "123456" });
    app.post_users(&credentials).await;

    let response = app.post_login(&credentials).await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["email"], "saul@bettercall.com");
    assert_eq!(body["is_upgraded"], false);
    assert!(body.get("hashed_password").is_none());

    let token = body["token"].as_str().unwrap();
    let refresh_token = body["refresh_token"].as_str().unwrap();
    assert_eq!(refresh_token.len(), 64);
    assert!(refresh_token.chars().all(|c| c.is_ascii_hexdigit()));

    let user_id = validate_access_token(token, JWT_SECRET).expect("token should validate");
    assert_eq!(user_id.to_string(), body["id"].as_str().unwrap());

    let claims = decode_claims(token);
    assert_eq!(claims.exp - claims.iat, 3600);
}

#[tokio::test]
async fn login_honours_shorter_expiry_and_caps_longer_one() {
    let app = spawn_app().await;
    app.post_users(&json!({ "email": "jesse@example.com", "password": "pw" }))
        .await;

    let body: Value = app
        .post_login(&json!({ "email": "jesse@example.com", "password": "pw", "expires_in_seconds": 60 }))
        .await
        .json()
        .await
        .unwrap();
    let claims = decode_claims(body["token"].as_str().unwrap());
    assert_eq!(claims.exp - claims.iat, 60);

    let body: Value = app
        .post_login(&json!({ "email": "jesse@example.com", "password": "pw", "expires_in_seconds": 86400 }))
        .await
        .json()
        .await
        .unwrap();
    let claims = decode_claims(body["token"].as_str().unwrap());
    assert_eq!(claims.exp - claims.iat, 3600);
}

#[tokio::test]
async fn login_returns_401_for_wrong_password_or_unknown_email() {
    let app = spawn_app().await;
    app.post_users(&json!({ "email": "mike@example.com", "password": "right" }))
        .await;

    let wrong_password = app
        .post_login(&json!({ "email": "mike@example.com", "password": "wrong" }))
        .await;
    assert_eq!(401, wrong_password.status().as_u16());
    let wrong_password: Value = wrong_password.json().await.unwrap();

    let unknown_email = app
        .post_login(&json!({ "email": "nobody@example.com", "password": "right" }))
        .await;
    assert_eq!(401, unknown_email.status().as_u16());
    let unknown_email: Value = unknown_email.json().await.unwrap();

    // Same message either way
    assert_eq!(wrong_password["message"], unknown_email["message"]);
    assert_eq!(wrong_password["code"], unknown_email["code"]);
}

#[tokio::test]
async fn any_password_accepted_at_registration_can_log_in() {
    let app = spawn_app().await;
    let credentials = json!({ "email": "ws@example.com", "password": "   " });

    let response = app.post_users(&credentials).await;
    assert_eq!(201, response.status().as_u16());

    let response = app.post_login(&credentials).await;
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["email"], "ws@example.com");
}

#[tokio::test]
async fn login_returns_400_for_malformed_body() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/api/login"))
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

// --- Refresh and revoke ---

#[tokio::test]
async fn refresh_issues_new_access_token_until_revoked() {
    let app = spawn_app().await;
    let user = app.signup("gus@pollos.com", "chicken").await;

    let response = app
        .client
        .post(app.url("/api/refresh"))
        .bearer_auth(&user.refresh_token)
        .send()
        .await
        .unwrap();
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    let token = body["token"].as_str().unwrap();
    let user_id = validate_access_token(token, JWT_SECRET).unwrap();
    assert_eq!(user_id.to_string(), user.id);
    assert!(body.get("refresh_token").is_none());

    let response = app
        .client
        .post(app.url("/api/revoke"))
        .bearer_auth(&user.refresh_token)
        .send()
        .await
        .unwrap();
    assert_eq!(204, response.status().as_u16());

    let response = app
        .client
        .post(app.url("/api/refresh"))
        .bearer_auth(&user.refresh_token)
        .send()
        .await
        .unwrap();
    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn refresh_rejects_missing_unknown_or_access_tokens() {
    let app = spawn_app().await;
    let user = app.signup("hank@dea.gov", "minerals").await;

    let missing = app.client.post(app.url("/api/refresh")).send().await.unwrap();
    assert_eq!(401, missing.status().as_u16());

    let unknown = app
        .client
        .post(app.url("/api/refresh"))
        .bearer_auth("deadbeef")
        .send()
        .await
        .unwrap();
    assert_eq!(401, unknown.status().as_u16());

    let access_as_refresh = app
        .client
        .post(app.url("/api/refresh"))
        .bearer_auth(&user.token)
        .send()
        .await
        .unwrap();
    assert_eq!(401, access_as_refresh.status().as_u16());
}

#[tokio::test]
async fn revoke_is_idempotent_and_requires_credential() {
    let app = spawn_app().await;
    let user = app.signup("skyler@example.com", "carwash").await;

    for _ in 0..2 {
        let response = app
            .client
            .post(app.url("/api/revoke"))
            .bearer_auth(&user.refresh_token)
            .send()
            .await
            .unwrap();
        assert_eq!(204, response.status().as_u16());
    }

    let response = app.client.post(app.url("/api/revoke")).send().await.unwrap();
    assert_eq!(401, response.status().as_u16());
}

// --- Profile update ---

#[tokio::test]
async fn update_user_changes_credentials() {
    let app = spawn_app().await;
    let user = app.signup("old@example.com", "old-password").await;

    let response = app
        .client
        .put(app.url("/api/users"))
        .bearer_auth(&user.token)
        .json(&json!({ "email": "new@example.com", "password": "new-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["email"], "new@example.com");
    assert_eq!(body["id"].as_str().unwrap(), user.id);

    let old = app
        .post_login(&json!({ "email": "old@example.com", "password": "old-password" }))
        .await;
    assert_eq!(401, old.status().as_u16());

    let new = app
        .post_login(&json!({ "email": "new@example.com", "password": "new-password" }))
        .await;
    assert_eq!(200, new.status().as_u16());
}

#[tokio::test]
async fn update_user_requires_valid_access_token() {
    let app = spawn_app().await;
    let user = app.signup("lydia@example.com", "stevia").await;
    let body = json!({ "email": "x@example.com", "password": "y" });

    let missing = app
        .client
        .put(app.url("/api/users"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(401, missing.status().as_u16());

    let garbage = app
        .client
        .put(app.url("/api/users"))
        .bearer_auth("not.a.jwt")
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(401, garbage.status().as_u16());

    // A refresh token is not an access token
    let refresh = app
        .client
        .put(app.url("/api/users"))
        .bearer_auth(&user.refresh_token)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(401, refresh.status().as_u16());
}

#[tokio::test]
async fn update_user_returns_409_when_email_is_taken() {
    let app = spawn_app().await;
    app.signup("taken@example.com", "pw1").await;
    let user = app.signup("mine@example.com", "pw2").await;

    let response = app
        .client
        .put(app.url("/api/users"))
        .bearer_auth(&user.token)
        .json(&json!({ "email": "taken@example.com", "password": "pw2" }))
        .send()
        .await
        .unwrap();
    assert_eq!(409, response.status().as_u16());
}
