use crate::{PayoutError, PayoutResult};
use async_trait::async_trait;
use lease_payout_lib::config::NodeConfig;
use lease_payout_types::prelude::*;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

#[cfg(feature = "metrics")]
use lease_payout_metrics::METRICS;

/// Read side of the node REST API consumed by the indexer.
#[async_trait]
pub trait NodeApi: Send + Sync {
    /// Current height of the chain.
    async fn chain_height(&self) -> PayoutResult<i64>;

    /// Blocks `start..=end`, transactions included.
    async fn blocks_range(&self, start: i64, end: i64) -> PayoutResult<Vec<NodeBlock>>;

    /// Address behind an alias name.
    async fn resolve_alias(&self, alias: &str) -> PayoutResult<String>;
}

/// Write side of the node REST API consumed by the transfer tooling.
#[async_trait]
pub trait TransferApi: Send + Sync {
    /// Submit a mass transfer and return the id of the created transaction.
    async fn mass_transfer(&self, request: &MassTransferRequest) -> PayoutResult<String>;

    /// Submit a single transfer and return the id of the created transaction.
    async fn transfer(&self, request: &TransferRequest) -> PayoutResult<String>;

    async fn asset_details(&self, asset_id: &str) -> PayoutResult<AssetDetails>;
}

/// HTTP client of the node. Every request carries the configured timeout.
#[derive(Clone, Debug)]
pub struct NodeClient {
    url: String,
    api_key: Option<String>,
    client: Client,
}

impl NodeClient {
    pub fn new(config: &NodeConfig) -> PayoutResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            client,
        })
    }

    fn target(&self, path: &str) -> String {
        format!("{}{path}", self.url)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> PayoutResult<T> {
        let url = self.target(path);
        debug!("GET {url}");

        #[cfg(feature = "metrics")]
        METRICS.node.requests.inc();

        let response = self.client.get(&url).send().await.map_err(count_error)?;
        decode(url, response).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> PayoutResult<T>
    where
        B: serde::Serialize + Sync,
        T: DeserializeOwned,
    {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            PayoutError::ConfigurationError(
                "a node API key is required to submit transfers".to_string(),
            )
        })?;

        let url = self.target(path);
        debug!("POST {url}");

        #[cfg(feature = "metrics")]
        METRICS.node.requests.inc();

        let response = self
            .client
            .post(&url)
            .header("api_key", api_key)
            .json(body)
            .send()
            .await
            .map_err(count_error)?;
        decode(url, response).await
    }
}

fn count_error(e: reqwest::Error) -> PayoutError {
    #[cfg(feature = "metrics")]
    METRICS.node.request_errors.inc();

    PayoutError::NetworkError(e)
}

async fn decode<T: DeserializeOwned>(url: String, response: Response) -> PayoutResult<T> {
    let status = response.status();
    if !status.is_success() {
        #[cfg(feature = "metrics")]
        METRICS.node.request_errors.inc();

        let message = response.text().await.unwrap_or_default();
        return Err(PayoutError::NodeResponseError {
            url,
            status: status.as_u16(),
            message,
        });
    }

    response.json::<T>().await.map_err(count_error)
}

#[async_trait]
impl NodeApi for NodeClient {
    async fn chain_height(&self) -> PayoutResult<i64> {
        let height: ChainHeight = self.get("/blocks/height").await?;
        Ok(height.height)
    }

    async fn blocks_range(&self, start: i64, end: i64) -> PayoutResult<Vec<NodeBlock>> {
        self.get(&format!("/blocks/seq/{start}/{end}")).await
    }

    async fn resolve_alias(&self, alias: &str) -> PayoutResult<String> {
        let address: AliasAddress = self.get(&format!("/alias/by-alias/{alias}")).await?;
        Ok(address.address)
    }
}

#[async_trait]
impl TransferApi for NodeClient {
    async fn mass_transfer(&self, request: &MassTransferRequest) -> PayoutResult<String> {
        let response: MassTransferResponse =
            self.post("/assets/masstransfer", request).await?;
        Ok(response.id)
    }

    async fn transfer(&self, request: &TransferRequest) -> PayoutResult<String> {
        let response: TransferResponse = self.post("/assets/transfer", request).await?;
        Ok(response.id)
    }

    async fn asset_details(&self, asset_id: &str) -> PayoutResult<AssetDetails> {
        self.get(&format!("/assets/details/{asset_id}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_trims_trailing_slash() {
        let config = NodeConfig {
            url: "http://127.0.0.1:6869/".to_string(),
            ..NodeConfig::default()
        };
        let client = NodeClient::new(&config).unwrap();

        assert_eq!(client.target("/blocks/height"), "http://127.0.0.1:6869/blocks/height");
    }

    #[tokio::test]
    async fn test_transfers_require_api_key() {
        let client = NodeClient::new(&NodeConfig::default()).unwrap();
        let request = MassTransferRequest {
            version: 1,
            asset_id: None,
            sender: "3PGenerator".to_string(),
            fee: 200000,
            transfers: vec![],
        };

        assert!(matches!(
            client.mass_transfer(&request).await,
            Err(PayoutError::ConfigurationError(_))
        ));
    }
}
