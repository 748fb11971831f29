use super::models::Post;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_POSTS_URL: &str = "https://jsonplaceholder.typicode.com/posts";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Request failed with status code {0}")]
    Status(u16),
    #[error("Unexpected response: {0}")]
    Decode(String),
}

pub trait PostSource: Send + Sync {
    fn fetch_posts(&self) -> Result<Vec<Post>, FetchError>;
}

pub struct HttpPostSource {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpPostSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("taskpad/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl PostSource for HttpPostSource {
    fn fetch_posts(&self) -> Result<Vec<Post>, FetchError> {
        debug!(url = %self.url, "fetching posts");

        let response = self
            .client
            .get(&self.url)
            .send()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let posts: Vec<Post> = response
            .json()
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        info!(url = %self.url, count = posts.len(), "posts fetched");
        Ok(posts)
    }
}
