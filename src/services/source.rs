use crate::{
    config::{Config, SourceConfig},
    error::WhaleWatchError,
    services::normalizer::RawTransaction,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// A live provider of raw whale transfers.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(&self, token: Option<&str>) -> Result<Vec<RawTransaction>, WhaleWatchError>;
}

pub fn from_config(config: &Config) -> Result<Arc<dyn TransactionSource>> {
    let source: Arc<dyn TransactionSource> = match &config.source {
        SourceConfig::Bitquery {
            endpoint,
            api_key,
            network,
            min_amount,
            limit,
        } => Arc::new(BitquerySource::new(
            http_client(config.request_timeout)?,
            endpoint.clone(),
            api_key.clone(),
            network.clone(),
            *min_amount,
            *limit,
        )),
        SourceConfig::Rest { url } => Arc::new(RestSource::new(
            http_client(config.request_timeout)?,
            url.clone(),
        )),
        SourceConfig::Offline => {
            tracing::warn!("No live data source configured, serving fallback data only");
            Arc::new(OfflineSource)
        }
    };

    tracing::info!("Live data source: {}", source.name());
    Ok(source)
}

pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("whale-watch/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}

/// Plain JSON endpoint returning `{ "transactions": [...] }`.
pub struct RestSource {
    client: reqwest::Client,
    url: String,
}

impl RestSource {
    pub fn new(client: reqwest::Client, url: String) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl TransactionSource for RestSource {
    fn name(&self) -> &'static str {
        "rest"
    }

    async fn fetch(&self, token: Option<&str>) -> Result<Vec<RawTransaction>, WhaleWatchError> {
        let mut request = self.client.get(&self.url);
        if let Some(symbol) = token {
            request = request.query(&[("symbol", symbol)]);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(WhaleWatchError::UpstreamStatus(response.status().as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| WhaleWatchError::MalformedPayload(e.to_string()))?;

        let items = body
            .get("transactions")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                WhaleWatchError::MalformedPayload("missing `transactions` array".to_string())
            })?;

        tracing::debug!("Fetched {} transactions from {}", items.len(), self.url);
        Ok(items.iter().cloned().map(RawTransaction::Rest).collect())
    }
}

/// Bitquery GraphQL transfers, ranked by amount.
pub struct BitquerySource {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    network: String,
    min_amount: f64,
    limit: u32,
}

#[derive(Serialize)]
struct GraphQlRequest {
    query: String,
    variables: Value,
}

impl BitquerySource {
    pub fn new(
        client: reqwest::Client,
        endpoint: String,
        api_key: String,
        network: String,
        min_amount: f64,
        limit: u32,
    ) -> Self {
        Self {
            client,
            endpoint,
            api_key,
            network,
            min_amount,
            limit,
        }
    }

    fn build_request(&self, token: Option<&str>) -> GraphQlRequest {
        let (symbol_var, symbol_filter) = match token {
            Some(_) => (", $symbol: String!", ", Currency: {Symbol: {is: $symbol}}"),
            None => ("", ""),
        };

        let query = format!(
            r#"query WhaleTransfers($limit: Int!, $minAmount: String!{symbol_var}) {{
  EVM(network: {network}, dataset: realtime) {{
    Transfers(
      limit: {{count: $limit}}
      orderBy: {{descending: Transfer_Amount}}
      where: {{Transfer: {{Amount: {{ge: $minAmount}}{symbol_filter}}}}}
    ) {{
      Block {{ Time }}
      Transfer {{ Amount Currency {{ Symbol }} Sender Receiver }}
      Transaction {{ Hash }}
    }}
  }}
}}"#,
            symbol_var = symbol_var,
            network = self.network,
            symbol_filter = symbol_filter,
        );

        let mut variables = serde_json::json!({
            "limit": self.limit,
            "minAmount": self.min_amount.to_string(),
        });
        if let Some(symbol) = token {
            variables["symbol"] = Value::String(symbol.to_string());
        }

        GraphQlRequest { query, variables }
    }
}

#[async_trait]
impl TransactionSource for BitquerySource {
    fn name(&self) -> &'static str {
        "bitquery"
    }

    async fn fetch(&self, token: Option<&str>) -> Result<Vec<RawTransaction>, WhaleWatchError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.build_request(token))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(WhaleWatchError::UpstreamStatus(response.status().as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| WhaleWatchError::MalformedPayload(e.to_string()))?;

        extract_transfers(&body).map(|items| {
            tracing::debug!("Fetched {} transfers from {}", items.len(), self.endpoint);
            items.into_iter().map(RawTransaction::Transfer).collect()
        })
    }
}

/// Pull `data.<network>.Transfers` out of a GraphQL response.
fn extract_transfers(body: &Value) -> Result<Vec<Value>, WhaleWatchError> {
    if let Some(errors) = body.get("errors").and_then(Value::as_array) {
        if let Some(first) = errors.first() {
            let message = first
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown GraphQL error");
            return Err(WhaleWatchError::MalformedPayload(message.to_string()));
        }
    }

    body.get("data")
        .and_then(Value::as_object)
        .and_then(|data| {
            data.values()
                .find_map(|network| network.get("Transfers").and_then(Value::as_array))
        })
        .cloned()
        .ok_or_else(|| WhaleWatchError::MalformedPayload("missing `Transfers` array".to_string()))
}

/// Used when nothing is configured; every cycle falls back.
pub struct OfflineSource;

#[async_trait]
impl TransactionSource for OfflineSource {
    fn name(&self) -> &'static str {
        "offline"
    }

    async fn fetch(&self, _token: Option<&str>) -> Result<Vec<RawTransaction>, WhaleWatchError> {
        Err(WhaleWatchError::SourceUnavailable(
            "no live source configured".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;
    use tokio_test::assert_err;

    fn client() -> reqwest::Client {
        http_client(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn rest_source_returns_raw_items() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/whales")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "transactions": [
                        { "symbol": "ETH", "amount": "12.5", "from": "0xA", "to": "0xB", "hash": "0x1" }
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let source = RestSource::new(client(), format!("{}/api/whales", server.url()));
        let items = source.fetch(None).await.unwrap();

        mock.assert_async().await;
        assert_eq!(items.len(), 1);
        assert!(matches!(&items[0], RawTransaction::Rest(v) if v["symbol"] == "ETH"));
    }

    #[tokio::test]
    async fn rest_source_passes_selected_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/whales")
            .match_query(Matcher::UrlEncoded("symbol".into(), "USDT".into()))
            .with_status(200)
            .with_body(r#"{"transactions":[]}"#)
            .create_async()
            .await;

        let source = RestSource::new(client(), format!("{}/api/whales", server.url()));
        let items = source.fetch(Some("USDT")).await.unwrap();

        mock.assert_async().await;
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn rest_source_reports_bad_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/whales")
            .with_status(503)
            .create_async()
            .await;

        let source = RestSource::new(client(), format!("{}/api/whales", server.url()));
        let result = source.fetch(None).await;
        assert!(matches!(result, Err(WhaleWatchError::UpstreamStatus(503))));
    }

    #[tokio::test]
    async fn rest_source_rejects_unexpected_shape() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/whales")
            .with_status(200)
            .with_body(r#"{"items":[]}"#)
            .create_async()
            .await;

        let source = RestSource::new(client(), format!("{}/api/whales", server.url()));
        let result = source.fetch(None).await;
        assert!(matches!(result, Err(WhaleWatchError::MalformedPayload(_))));
    }

    #[tokio::test]
    async fn bitquery_source_sends_credential_and_reads_transfers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/graphql")
            .match_header("authorization", "Bearer test-key")
            .match_body(Matcher::PartialJson(json!({ "variables": { "symbol": "ETH", "limit": 5 } })))
            .with_status(200)
            .with_body(
                json!({
                    "data": { "EVM": { "Transfers": [
                        {
                            "Block": { "Time": "2024-05-01T12:00:00Z" },
                            "Transfer": {
                                "Amount": "900.5",
                                "Currency": { "Symbol": "ETH" },
                                "Sender": "0xs",
                                "Receiver": "0xr"
                            },
                            "Transaction": { "Hash": "0xh" }
                        }
                    ] } }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let source = BitquerySource::new(
            client(),
            format!("{}/graphql", server.url()),
            "test-key".to_string(),
            "eth".to_string(),
            100.0,
            5,
        );
        let items = source.fetch(Some("ETH")).await.unwrap();

        mock.assert_async().await;
        assert_eq!(items.len(), 1);
        assert!(matches!(&items[0], RawTransaction::Transfer(_)));
    }

    #[test]
    fn graphql_errors_are_malformed_payloads() {
        let body = json!({ "errors": [{ "message": "Unauthorized" }] });
        match extract_transfers(&body) {
            Err(WhaleWatchError::MalformedPayload(msg)) => assert_eq!(msg, "Unauthorized"),
            other => panic!("unexpected {:?}", other),
        }

        assert_err!(extract_transfers(&json!({ "data": { "EVM": {} } })));
        assert_err!(extract_transfers(&json!({ "data": null })));
    }

    #[test]
    fn query_omits_symbol_filter_without_token() {
        let source = BitquerySource::new(
            client(),
            "http://localhost/graphql".to_string(),
            "k".to_string(),
            "bsc".to_string(),
            250.0,
            10,
        );

        let plain = source.build_request(None);
        assert!(!plain.query.contains("$symbol"));
        assert!(plain.query.contains("EVM(network: bsc"));
        assert_eq!(plain.variables["minAmount"], "250");

        let filtered = source.build_request(Some("USDC"));
        assert!(filtered.query.contains("Currency: {Symbol: {is: $symbol}}"));
        assert_eq!(filtered.variables["symbol"], "USDC");
    }

    #[tokio::test]
    async fn offline_source_always_fails() {
        let result = OfflineSource.fetch(Some("ETH")).await;
        assert!(matches!(result, Err(WhaleWatchError::SourceUnavailable(_))));
    }
}
