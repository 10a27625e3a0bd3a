//! Best-effort recording of finished tournaments on chain.
//!
//! The server never signs anything itself; it hands the result to a relay
//! service that owns the contract keys. Recording runs detached from the
//! request and its failures are only logged.

pub mod relay;

use serde::Serialize;

use crate::{config::Settings, game::types::TournamentId};

pub use relay::RelayClient;

/// Payload describing one finished tournament.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TournamentRecord {
    pub tournament_id: TournamentId,
    /// Distinct display names of everyone who played.
    pub players: Vec<String>,
    pub winner: String,
}

#[derive(Debug, Clone)]
pub enum ChainRecorder {
    Disabled,
    Relay(RelayClient),
}

impl ChainRecorder {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        Ok(match settings.chain_relay_url.as_deref() {
            Some(url) => ChainRecorder::Relay(RelayClient::new(url)?),
            None => ChainRecorder::Disabled,
        })
    }

    /// Fire-and-forget: spawn the submission and return immediately.
    pub fn spawn_record(&self, record: TournamentRecord) {
        match self {
            ChainRecorder::Disabled => {
                log::info!(
                    "chain recording disabled; tournament {} won by {}",
                    record.tournament_id,
                    record.winner
                );
            }
            ChainRecorder::Relay(client) => {
                let client = client.clone();
                tokio::spawn(async move {
                    match client.submit(&record).await {
                        Ok(hash) => log::info!(
                            "tournament {} recorded on chain: {hash}",
                            record.tournament_id
                        ),
                        Err(e) => log::warn!(
                            "recording tournament {} failed: {e:?}",
                            record.tournament_id
                        ),
                    }
                });
            }
        }
    }
}
