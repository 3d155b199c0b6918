// SPDX-License-Identifier: GPL-3.0-only

use std::future::Future;

use serde::de::DeserializeOwned;

use crate::entities::{PokemonDetail, PokemonPage};

pub const POKEAPI_BASE_URL: &str = "https://pokeapi.co/api/v2";

/// The only failure a fetch can produce. Every variant is reported to the user the same way.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("malformed response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

/// How a detail record is addressed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PokemonRef {
    /// Numeric id, expanded into the canonical detail URL
    Id(i64),
    /// Detail URL as handed out by the list endpoint
    Url(String),
}

impl From<i64> for PokemonRef {
    fn from(id: i64) -> Self {
        PokemonRef::Id(id)
    }
}

/// Read-only access to the Pokémon listing and detail records
pub trait PokemonSource: Clone + Send + Sync + 'static {
    /// Fetches the page starting at `offset` holding at most `limit` references
    fn list_page(
        &self,
        offset: u32,
        limit: u32,
    ) -> impl Future<Output = Result<PokemonPage, NetworkError>> + Send;

    /// Fetches the page a previous page's `next` cursor points to
    fn follow_page(
        &self,
        cursor: &str,
    ) -> impl Future<Output = Result<PokemonPage, NetworkError>> + Send;

    /// Fetches one full Pokémon record
    fn fetch_detail(
        &self,
        reference: &PokemonRef,
    ) -> impl Future<Output = Result<PokemonDetail, NetworkError>> + Send;
}

/// PokéAPI over HTTP. Every call is a fresh round trip, nothing is cached or retried.
#[derive(Debug, Clone)]
pub struct PokeApi {
    client: reqwest::Client,
    base_url: String,
}

impl Default for PokeApi {
    fn default() -> Self {
        Self::new(POKEAPI_BASE_URL)
    }
}

impl PokeApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn page_url(&self, offset: u32, limit: u32) -> String {
        format!("{}/pokemon/?offset={offset}&limit={limit}", self.base_url)
    }

    pub fn detail_url(&self, reference: &PokemonRef) -> String {
        match reference {
            PokemonRef::Id(id) => format!("{}/pokemon/{id}/", self.base_url),
            PokemonRef::Url(url) => url.clone(),
        }
    }

    /// Downloads the raw bytes of a sprite image
    pub async fn fetch_sprite(&self, url: &str) -> Result<Vec<u8>, NetworkError> {
        let response = self.send(url).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_error(url, &e))?;

        Ok(bytes.to_vec())
    }

    async fn send(&self, url: &str) -> Result<reqwest::Response, NetworkError> {
        tracing::debug!(%url, "GET");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, NetworkError> {
        let response = self.send(url).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(url, &e))?;

        serde_json::from_slice(&body).map_err(|e| NetworkError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

impl PokemonSource for PokeApi {
    async fn list_page(&self, offset: u32, limit: u32) -> Result<PokemonPage, NetworkError> {
        self.get_json(&self.page_url(offset, limit)).await
    }

    async fn follow_page(&self, cursor: &str) -> Result<PokemonPage, NetworkError> {
        self.get_json(cursor).await
    }

    async fn fetch_detail(&self, reference: &PokemonRef) -> Result<PokemonDetail, NetworkError> {
        self.get_json(&self.detail_url(reference)).await
    }
}

fn transport_error(url: &str, error: &reqwest::Error) -> NetworkError {
    NetworkError::Transport {
        url: url.to_string(),
        reason: error.to_string(),
    }
}
