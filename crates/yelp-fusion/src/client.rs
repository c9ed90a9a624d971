//! Asynchronous Yelp Fusion client implementation.

use crate::models::{BusinessDetails, ReviewResults, SearchParams, SearchResults};
use crate::Result;
use reqwest::{redirect, Client, ClientBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use yelp_core::client::ClientConfig;
use yelp_core::query::escape;
use yelp_core::Error;
use url::Url;

/// Production endpoint for the Fusion v3 API.
pub const FUSION_BASE_URL: &str = "https://api.yelp.com/v3";

const USER_AGENT: &str = concat!("yelp-fusion/", env!("CARGO_PKG_VERSION"));

/// Builder for [`FusionClient`].
#[derive(Debug, Clone)]
pub struct FusionClientBuilder {
    api_key: SecretString,
    base_url: Option<Url>,
    http_config: ClientConfig,
}

impl FusionClientBuilder {
    /// Create a builder holding the given API key, targeting the production
    /// endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            base_url: None,
            http_config: ClientConfig::new(),
        }
    }

    /// Override the base URL (used to point tests at a local server).
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> Result<Self> {
        self.base_url = Some(parse_base_url(base_url.as_ref())?);
        Ok(self)
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Build the client instance.
    pub fn build(self) -> Result<FusionClient> {
        let base_url = match self.base_url {
            Some(url) => url,
            None => parse_base_url(FUSION_BASE_URL)?,
        };

        // Redirects stay unfollowed so the reviews route can observe 301
        // migration responses.
        let mut builder = ClientBuilder::new()
            .timeout(self.http_config.timeout)
            .connect_timeout(self.http_config.connect_timeout)
            .user_agent(USER_AGENT)
            .pool_idle_timeout(self.http_config.pool_idle_timeout)
            .pool_max_idle_per_host(self.http_config.pool_max_idle_per_host)
            .redirect(redirect::Policy::none());

        if !self.http_config.enable_compression {
            builder = builder.no_gzip();
        }

        let http = builder.build().map_err(|err| {
            Error::Config(format!("failed to build Fusion HTTP client: {err}"))
        })?;

        Ok(FusionClient {
            http,
            base_url,
            api_key: self.api_key,
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    // A trailing slash keeps Url::join from replacing the /v3 segment.
    let trimmed = raw.trim_end_matches('/');
    Url::parse(&format!("{trimmed}/"))
        .map_err(|err| Error::Config(format!("invalid Fusion base URL `{raw}`: {err}")))
}

/// Asynchronous client for the Yelp Fusion v3 API.
///
/// Holds one pooled HTTP transport; cloning is cheap and clones share the
/// pool. Every operation is a single authenticated GET round trip, and each
/// comes in three flavors: a plain call, a `_with_deadline` call that bounds
/// the round trip, and a `_response` call that returns the raw transport
/// response without decoding.
#[derive(Clone)]
pub struct FusionClient {
    http: Client,
    base_url: Url,
    api_key: SecretString,
}

impl FusionClient {
    /// Construct a client for the production endpoint.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        FusionClientBuilder::new(api_key).build()
    }

    /// Access the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Search for businesses matching the given parameters.
    pub async fn search_businesses(&self, params: &SearchParams) -> Result<SearchResults> {
        let response = self.search_businesses_response(params, None).await?;
        decode_ok(response).await
    }

    /// Search for businesses, bounding the round trip by `deadline`.
    pub async fn search_businesses_with_deadline(
        &self,
        params: &SearchParams,
        deadline: Duration,
    ) -> Result<SearchResults> {
        let response = self.search_businesses_response(params, Some(deadline)).await?;
        decode_ok(response).await
    }

    /// Search for businesses, returning the raw transport response.
    pub async fn search_businesses_response(
        &self,
        params: &SearchParams,
        deadline: Option<Duration>,
    ) -> Result<Response> {
        let query = params.query_string()?;
        let url = self.endpoint("businesses/search", Some(&query))?;
        self.get(url, deadline).await
    }

    /// Fetch details for a business by identifier, with an optional locale.
    pub async fn business_details(
        &self,
        business_id: &str,
        locale: Option<&str>,
    ) -> Result<BusinessDetails> {
        let response = self
            .business_details_response(business_id, locale, None)
            .await?;
        decode_ok(response).await
    }

    /// Fetch business details, bounding the round trip by `deadline`.
    pub async fn business_details_with_deadline(
        &self,
        business_id: &str,
        locale: Option<&str>,
        deadline: Duration,
    ) -> Result<BusinessDetails> {
        let response = self
            .business_details_response(business_id, locale, Some(deadline))
            .await?;
        decode_ok(response).await
    }

    /// Fetch business details, returning the raw transport response.
    pub async fn business_details_response(
        &self,
        business_id: &str,
        locale: Option<&str>,
        deadline: Option<Duration>,
    ) -> Result<Response> {
        let path = format!("businesses/{business_id}");
        let query = locale_query(locale);
        let url = self.endpoint(&path, query.as_deref())?;
        self.get(url, deadline).await
    }

    /// Search for businesses by phone number.
    ///
    /// The phone number must start with `+` and the country code.
    pub async fn search_by_phone(&self, phone: &str) -> Result<SearchResults> {
        let response = self.search_by_phone_response(phone, None).await?;
        decode_ok(response).await
    }

    /// Search by phone number, bounding the round trip by `deadline`.
    pub async fn search_by_phone_with_deadline(
        &self,
        phone: &str,
        deadline: Duration,
    ) -> Result<SearchResults> {
        let response = self.search_by_phone_response(phone, Some(deadline)).await?;
        decode_ok(response).await
    }

    /// Search by phone number, returning the raw transport response.
    ///
    /// Fails with [`Error::PhoneRequired`] before any network call when the
    /// phone number is blank.
    pub async fn search_by_phone_response(
        &self,
        phone: &str,
        deadline: Option<Duration>,
    ) -> Result<Response> {
        if phone.trim().is_empty() {
            return Err(Error::PhoneRequired);
        }
        let query = format!("phone={}", escape(phone));
        let url = self.endpoint("businesses/search/phone", Some(&query))?;
        self.get(url, deadline).await
    }

    /// Fetch review excerpts for a business, with an optional locale.
    ///
    /// The result's `error` field is populated only when the server answers
    /// HTTP 301; reissue the request with the carried `new_business_id`.
    pub async fn business_reviews(
        &self,
        business_id: &str,
        locale: Option<&str>,
    ) -> Result<ReviewResults> {
        let response = self
            .business_reviews_response(business_id, locale, None)
            .await?;
        decode_reviews(response).await
    }

    /// Fetch review excerpts, bounding the round trip by `deadline`.
    pub async fn business_reviews_with_deadline(
        &self,
        business_id: &str,
        locale: Option<&str>,
        deadline: Duration,
    ) -> Result<ReviewResults> {
        let response = self
            .business_reviews_response(business_id, locale, Some(deadline))
            .await?;
        decode_reviews(response).await
    }

    /// Fetch review excerpts, returning the raw transport response.
    pub async fn business_reviews_response(
        &self,
        business_id: &str,
        locale: Option<&str>,
        deadline: Option<Duration>,
    ) -> Result<Response> {
        let path = format!("businesses/{business_id}/reviews");
        let query = locale_query(locale);
        let url = self.endpoint(&path, query.as_deref())?;
        self.get(url, deadline).await
    }

    fn endpoint(&self, path: &str, query: Option<&str>) -> Result<Url> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|err| Error::InvalidEndpoint(format!("invalid Fusion path `{path}`: {err}")))?;
        url.set_query(query.filter(|q| !q.is_empty()));
        Ok(url)
    }

    async fn get(&self, url: Url, deadline: Option<Duration>) -> Result<Response> {
        debug!(url = %url, "Fusion request");

        let mut request = self
            .http
            .get(url)
            .bearer_auth(self.api_key.expose_secret())
            .header("Accept", "application/json");

        if let Some(deadline) = deadline {
            request = request.timeout(deadline);
        }

        request.send().await.map_err(Error::from)
    }
}

fn locale_query(locale: Option<&str>) -> Option<String> {
    locale
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
        .map(|trimmed| format!("locale={}", escape(trimmed)))
}

async fn decode_ok<T>(response: Response) -> Result<T>
where
    T: DeserializeOwned,
{
    let status = response.status();
    if status != StatusCode::OK {
        return Err(Error::UnexpectedStatus(status.to_string()));
    }
    read_json(response).await
}

// Reviews accept 301 as decodable: the body carries the migration error the
// caller needs to follow.
async fn decode_reviews(response: Response) -> Result<ReviewResults> {
    let status = response.status();
    if status != StatusCode::OK && status != StatusCode::MOVED_PERMANENTLY {
        return Err(Error::UnexpectedStatus(status.to_string()));
    }
    read_json(response).await
}

async fn read_json<T>(response: Response) -> Result<T>
where
    T: DeserializeOwned,
{
    let bytes = response
        .bytes()
        .await
        .map_err(|err| Error::Http(format!("failed to read response body: {err}")))?;

    serde_json::from_slice(&bytes)
        .map_err(|err| Error::Decode(format!("failed to decode Fusion response: {err}")))
}
