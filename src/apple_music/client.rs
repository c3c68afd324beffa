use anyhow::Result;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::apple_music::{api_types, custom_types};
use crate::search::{Candidate, SearchAdapter};

const SEARCH_TYPES: &str = "songs,music-videos";

pub struct Client {
    client: reqwest::Client,
    storefront: String,
    limit: u8,
}

impl Client {
    pub fn new(
        developer_token: &str,
        origin_header: Option<String>,
        storefront: String,
        limit: u8,
    ) -> Result<Self> {
        let headers = {
            let mut headers = reqwest::header::HeaderMap::new();
            headers.insert(
                "Authorization",
                format!("Bearer {}", developer_token).try_into()?,
            );
            if let Some(origin) = origin_header {
                headers.insert("Origin", origin.try_into()?);
            }
            headers
        };
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;
        Ok(Self {
            client,
            storefront,
            limit,
        })
    }

    pub async fn search_catalog(&self, term: &str) -> Result<api_types::search::Root> {
        let limit = self.limit.to_string();
        let url = reqwest::Url::parse_with_params(
            &format!(
                "https://amp-api.music.apple.com/v1/catalog/{}/search",
                self.storefront,
            ),
            &[
                ("term", term),
                ("types", SEARCH_TYPES),
                ("limit", limit.as_str()),
            ],
        )?;
        Ok(self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }
}

/// Settings needed to build a [`Client`] on first use.
pub struct ClientSettings {
    pub developer_token: String,
    pub origin_header: Option<String>,
    pub storefront: String,
    pub limit: u8,
}

/// Catalog search client that is built at most once, on first use.
pub struct LazySearchClient {
    settings: ClientSettings,
    client: OnceCell<Client>,
}

impl LazySearchClient {
    pub fn new(settings: ClientSettings) -> Self {
        Self {
            settings,
            client: OnceCell::new(),
        }
    }

    async fn client(&self) -> Result<&Client> {
        self.client
            .get_or_try_init(|| async {
                debug!(storefront = %self.settings.storefront, "Building catalog client");
                Client::new(
                    &self.settings.developer_token,
                    self.settings.origin_header.clone(),
                    self.settings.storefront.clone(),
                    self.settings.limit,
                )
            })
            .await
    }
}

impl SearchAdapter for LazySearchClient {
    async fn prepare(&self) -> Result<()> {
        self.client().await?;
        Ok(())
    }

    async fn search(&self, query: &str) -> Result<Vec<Candidate>> {
        let root = self.client().await?.search_catalog(query).await?;
        let candidates = custom_types::candidates_from_search(root)?;
        debug!(query = %query, results = candidates.len(), "Catalog search");
        Ok(candidates)
    }
}
