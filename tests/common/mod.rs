#![allow(dead_code)]

use serde_json::{json, Value};
use std::net::TcpListener;
use std::sync::Arc;

use chirpy::configuration::{
    ApplicationSettings, DatabaseSettings, JwtSettings, Settings, WebhookSettings,
};
use chirpy::startup::run;
use chirpy::store::{InMemoryStore, Store};

pub const JWT_SECRET: &str = "integration-test-secret";
pub const POLKA_KEY: &str = "integration-test-polka-key";

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

pub struct LoggedInUser {
    pub id: String,
    pub token: String,
    pub refresh_token: String,
}

fn test_settings(platform: &str) -> Settings {
    Settings {
        database: DatabaseSettings {
            username: "postgres".to_string(),
            password: "password".to_string(),
            port: 5432,
            host: "localhost".to_string(),
            database_name: "chirpy_test".to_string(),
            max_connections: 1,
            in_memory: true,
        },
        application: ApplicationSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            platform: platform.to_string(),
            static_dir: "./public".to_string(),
        },
        jwt: JwtSettings {
            secret: JWT_SECRET.to_string(),
        },
        webhook: WebhookSettings {
            polka_key: POLKA_KEY.to_string(),
        },
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_on_platform("dev").await
}

pub async fn spawn_app_on_platform(platform: &str) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
    let server = run(listener, store, test_settings(platform)).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn post_users(&self, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url("/api/users"))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_login(&self, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url("/api/login"))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_chirp(&self, token: &str, body: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/chirps"))
            .bearer_auth(token)
            .json(&json!({ "body": body }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Register and log in, returning the id and both tokens
    pub async fn signup(&self, email: &str, password: &str) -> LoggedInUser {
        let credentials = json!({ "email": email, "password": password });
        let response = self.post_users(&credentials).await;
        assert_eq!(201, response.status().as_u16());

        let response = self.post_login(&credentials).await;
        assert_eq!(200, response.status().as_u16());
        let body: Value = response.json().await.expect("Failed to parse response");

        LoggedInUser {
            id: body["id"].as_str().unwrap().to_string(),
            token: body["token"].as_str().unwrap().to_string(),
            refresh_token: body["refresh_token"].as_str().unwrap().to_string(),
        }
    }
}
