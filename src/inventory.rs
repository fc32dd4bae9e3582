//! Inventory polling over the game's HTTP API

use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::Deserialize;

use crate::error::Result;

/// Headers the web client sends alongside every API call
const BROWSER_HEADERS: [(&str, &str); 13] = [
    ("accept", "application/json"),
    ("accept-language", "en-US,en;q=0.6"),
    ("content-type", "application/json"),
    ("sec-ch-ua", "\"Chromium\";v=\"134\", \"Not:A-Brand\";v=\"24\", \"Brave\";v=\"134\""),
    ("sec-ch-ua-mobile", "?0"),
    ("sec-ch-ua-platform", "\"Windows\""),
    ("sec-fetch-dest", "empty"),
    ("sec-fetch-mode", "cors"),
    ("sec-fetch-site", "same-site"),
    ("sec-gpc", "1"),
    ("referer", "https://fishingfrenzy.co/"),
    ("referrer-policy", "strict-origin-when-cross-origin"),
    ("cache-control", "no-cache"),
];

/// Resource balance of one account
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inventory {
    #[serde(default, deserialize_with = "non_negative")]
    pub energy: u32,
    #[serde(default, deserialize_with = "lenient_number")]
    pub gold: f64,
    #[serde(default, alias = "fishPoints", deserialize_with = "lenient_number")]
    pub fish_point: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub exp: f64,
    #[serde(default, deserialize_with = "id_string")]
    pub user_id: Option<String>,
}

/// Informational fields: anything that is not a number reads as 0
fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_f64().unwrap_or(0.0))
}

/// User ids arrive as strings or numbers
fn id_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => None,
        serde_json::Value::String(id) => Some(id),
        other => Some(other.to_string()),
    })
}

/// Accept any JSON number (or null) and clamp it into `0..=u32::MAX`
fn non_negative<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0);
    Ok(value.clamp(0.0, u32::MAX as f64) as u32)
}

/// Thin wrapper around a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct InventoryClient {
    client: reqwest::Client,
    api_base: String,
}

impl InventoryClient {
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .default_headers(browser_headers())
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn inventory_url(&self) -> String {
        format!("{}/v1/inventory", self.api_base)
    }

    /// Fetch the current balance for `token`
    ///
    /// Zero energy is a normal result. Transport failures, timeouts and
    /// non-2xx statuses all surface as `FishingError::Http`.
    pub async fn fetch_inventory(&self, token: &str) -> Result<Inventory> {
        let response = self
            .client
            .get(self.inventory_url())
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?;

        let inventory = response.json::<Inventory>().await?;
        tracing::debug!(
            energy = inventory.energy,
            gold = inventory.gold,
            exp = inventory.exp,
            user = ?inventory.user_id,
            "Inventory fetched"
        );
        Ok(inventory)
    }
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in BROWSER_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorClass;

    #[test]
    fn test_parse_inventory() {
        let json = r#"{"energy": 7, "gold": 120.5, "fishPoint": 33, "exp": 900, "userId": "abc"}"#;
        let inv: Inventory = serde_json::from_str(json).unwrap();
        assert_eq!(inv.energy, 7);
        assert_eq!(inv.gold, 120.5);
        assert_eq!(inv.fish_point, 33.0);
        assert_eq!(inv.user_id.as_deref(), Some("abc"));
    }

    #[test]
    fn test_parse_inventory_lenient() {
        let inv: Inventory = serde_json::from_str(r#"{"fishPoints": 4}"#).unwrap();
        assert_eq!(inv.energy, 0);
        assert_eq!(inv.fish_point, 4.0);

        let inv: Inventory = serde_json::from_str(r#"{"energy": null}"#).unwrap();
        assert_eq!(inv.energy, 0);

        let inv: Inventory = serde_json::from_str(r#"{"energy": -3}"#).unwrap();
        assert_eq!(inv.energy, 0);
    }

    #[test]
    fn test_parse_inventory_odd_informational_fields() {
        let json = r#"{"energy": 5, "userId": 123456, "gold": null, "exp": "12", "fishPoint": {}}"#;
        let inv: Inventory = serde_json::from_str(json).unwrap();
        assert_eq!(inv.energy, 5);
        assert_eq!(inv.user_id.as_deref(), Some("123456"));
        assert_eq!(inv.gold, 0.0);
        assert_eq!(inv.exp, 0.0);
        assert_eq!(inv.fish_point, 0.0);

        let inv: Inventory = serde_json::from_str(r#"{"energy": 2, "userId": null}"#).unwrap();
        assert_eq!(inv.user_id, None);
    }

    #[test]
    fn test_inventory_url() {
        let client =
            InventoryClient::new("https://api.example.test/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.inventory_url(), "https://api.example.test/v1/inventory");
    }

    #[test]
    fn test_browser_headers() {
        let headers = browser_headers();
        assert_eq!(headers.get("referer").unwrap(), "https://fishingfrenzy.co/");
        assert_eq!(headers.get(header::PRAGMA).unwrap(), "no-cache");
        assert!(headers.get(header::AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transient() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client =
            InventoryClient::new(format!("http://{}", addr), Duration::from_secs(2)).unwrap();
        let err = client.fetch_inventory("token").await.unwrap_err();
        assert_eq!(err.kind(), ErrorClass::TransientNetwork);
    }

    /// Serve one canned HTTP response and hand back the raw request
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let n = socket.read(&mut buf).await.unwrap();
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&buf[..n]).to_string()
        });
        (base, handle)
    }

    #[tokio::test]
    async fn test_fetch_inventory_sends_bearer() {
        let (base, server) = serve_once("200 OK", r#"{"energy": 0, "gold": 10}"#).await;
        let client = InventoryClient::new(base, Duration::from_secs(5)).unwrap();

        let inv = client.fetch_inventory("secret-token").await.unwrap();
        assert_eq!(inv.energy, 0);
        assert_eq!(inv.gold, 10.0);

        let request = server.await.unwrap().to_lowercase();
        assert!(request.starts_with("get /v1/inventory"));
        assert!(request.contains("authorization: bearer secret-token"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_transient() {
        let (base, _server) = serve_once("401 Unauthorized", r#"{"message": "nope"}"#).await;
        let client = InventoryClient::new(base, Duration::from_secs(5)).unwrap();

        let err = client.fetch_inventory("expired").await.unwrap_err();
        assert_eq!(err.kind(), ErrorClass::TransientNetwork);
    }
}
