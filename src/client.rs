//! Scores endpoint client

use async_trait::async_trait;

use crate::config::TallyConfig;
use crate::scores::Scores;
use crate::{Error, Result};

/// Anything that can produce the current score tuple
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScoreSource: Send + Sync {
    async fn fetch(&self) -> Result<Scores>;
}

/// Polls `GET {api_base_url}/scores` over HTTP
pub struct HttpScoreSource {
    client: reqwest::Client,
    url: String,
}

impl HttpScoreSource {
    pub fn new(config: &TallyConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("vote-tally/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            url: config.scores_url(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ScoreSource for HttpScoreSource {
    async fn fetch(&self) -> Result<Scores> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        tracing::debug!(url = %self.url, status = status.as_u16(), "Scores response");

        if !status.is_success() {
            return Err(Error::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let scores: Scores = serde_json::from_slice(&body)?;
        Ok(scores)
    }
}
