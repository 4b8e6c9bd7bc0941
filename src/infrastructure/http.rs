use crate::error::SourceError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(8);

const USER_AGENT: &str = concat!("citescan/", env!("CARGO_PKG_VERSION"));

/// Builds the HTTP client shared by every portal adapter.
pub fn build_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(4))
        .timeout(timeout)
        .build()
}

/// One portal endpoint: a shared client plus the portal's base URL and
/// optional API key.
#[derive(Clone)]
pub struct PortalClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl PortalClient {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            api_key,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    pub async fn get_json<T>(&self, path: &str, query: &[(&str, &str)]) -> Result<T, SourceError>
    where
        T: DeserializeOwned,
    {
        let url = self.url(path);
        debug!(%url, "portal GET");
        let request = self.authorize(self.client.get(&url).query(query));
        let response = check_status(request.send().await?)?;
        Ok(response.json().await?)
    }

    pub async fn get_text(&self, path: &str, query: &[(&str, &str)]) -> Result<String, SourceError> {
        let url = self.url(path);
        debug!(%url, "portal GET");
        let request = self.authorize(self.client.get(&url).query(query));
        let response = check_status(request.send().await?)?;
        Ok(response.text().await?)
    }

    pub async fn post_form<T, F>(&self, path: &str, form: &F) -> Result<T, SourceError>
    where
        T: DeserializeOwned,
        F: Serialize + ?Sized,
    {
        let url = self.url(path);
        debug!(%url, "portal POST");
        let request = self.authorize(self.client.post(&url).form(form));
        let response = check_status(request.send().await?)?;
        Ok(response.json().await?)
    }
}

fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SourceError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(SourceError::UnexpectedStatus {
            status: status.as_u16(),
            url: response.url().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let client = build_client(DEFAULT_HTTP_TIMEOUT).unwrap();
        let portal = PortalClient::new(client, "https://portal.example.gov/", None);
        assert_eq!(portal.base_url(), "https://portal.example.gov");
        assert_eq!(
            portal.url("/api/v1/citations"),
            "https://portal.example.gov/api/v1/citations"
        );
    }
}
