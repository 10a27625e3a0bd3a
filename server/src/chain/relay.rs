// HTTP client for the tournament-recording relay.
//
// POST <CHAIN_RELAY_URL>  { tournament_id, players, winner }
//                      -> { "tx_hash": "0x…" }

use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use tokio_retry::{
    strategy::{jitter, ExponentialBackoff},
    Retry,
};
use url::Url;

use super::TournamentRecord;

const ATTEMPTS: usize = 3;

#[derive(Debug, Deserialize)]
struct RelayResponse {
    tx_hash: String,
}

#[derive(Debug, Clone)]
pub struct RelayClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl RelayClient {
    pub fn new(endpoint: &str) -> anyhow::Result<Self> {
        let endpoint = Url::parse(endpoint).context("invalid CHAIN_RELAY_URL")?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("building relay HTTP client")?;
        Ok(RelayClient { http, endpoint })
    }

    /// Submit one record, retrying transient failures with backoff.
    /// Returns the transaction hash reported by the relay.
    pub async fn submit(&self, record: &TournamentRecord) -> anyhow::Result<String> {
        // waits 200ms, then 2s
        let strategy = ExponentialBackoff::from_millis(10)
            .factor(20)
            .max_delay(Duration::from_secs(5))
            .map(jitter)
            .take(ATTEMPTS - 1);

        let (http, endpoint) = (&self.http, &self.endpoint);
        Retry::spawn(strategy, move || async move {
            let resp = http
                .post(endpoint.clone())
                .json(record)
                .send()
                .await?
                .error_for_status()?;
            let body: RelayResponse = resp.json().await?;
            Ok::<_, reqwest::Error>(body.tx_hash)
        })
        .await
        .with_context(|| {
            format!(
                "relay rejected tournament {} after {ATTEMPTS} attempts",
                record.tournament_id
            )
        })
    }
}
