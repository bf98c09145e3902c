use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, REFERER};
use reqwest::{redirect, Client};
use tracing::{info, warn};
use url::Url;

use crate::FetchError;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub timeout: Duration,
    pub redirect_limit: usize,
    pub user_agent: String,
    pub accept_language: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            redirect_limit: 5,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: "id-ID,id;q=0.9".to_string(),
        }
    }
}

/// Raw page as served, before any extraction.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub status: u16,
    /// Charset declared by the response, `utf-8` when absent.
    pub encoding: String,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    settings: FetchSettings,
}

impl PageFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(settings.timeout)
            .redirect(redirect::Policy::limited(settings.redirect_limit))
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client, settings })
    }

    /// Single GET. Any status in `200..500` yields the body; many sites serve
    /// the article behind a 4xx bot check.
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let target = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        info!(url = %target, "fetching article page");
        let response = self
            .client
            .get(target.clone())
            .headers(self.headers(&target))
            .send()
            .await?;

        let status = response.status();
        if !(200..500).contains(&status.as_u16()) {
            warn!(url = %target, %status, "page fetch rejected");
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: target.to_string(),
            });
        }
        if !status.is_success() {
            warn!(url = %target, %status, "continuing with non-success response body");
        }

        let encoding = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(declared_charset)
            .unwrap_or_else(|| "utf-8".to_string());
        let final_url = response.url().to_string();
        let body = response.text_with_charset(&encoding).await?;

        Ok(FetchedPage {
            url: final_url,
            status: status.as_u16(),
            encoding,
            body,
        })
    }

    fn headers(&self, target: &Url) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(HTML_ACCEPT));
        if let Ok(language) = HeaderValue::from_str(&self.settings.accept_language) {
            headers.insert(ACCEPT_LANGUAGE, language);
        }
        if let Ok(referer) = HeaderValue::from_str(target.as_str()) {
            headers.insert(REFERER, referer);
        }
        headers
    }
}

fn declared_charset(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .skip(1)
        .filter_map(|part| {
            let (key, value) = part.split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("charset")
                .then(|| value.trim().trim_matches(['"', '\'']).to_ascii_lowercase())
        })
        .find(|charset| !charset.is_empty())
}
