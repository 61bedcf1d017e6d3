//! Site API client
//!
//! Provides a typed HTTP client for the hosting API's `/api/*` endpoints.
//! Handles authentication headers, JSON deserialization, multipart uploads
//! and conversion of error statuses into [`SiteError`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use neodeploy_site::client::SiteClient;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = SiteClient::new("https://neocities.org")?.with_api_key("api-key-here");
//! for file in client.list_files(None).await? {
//!     println!("{}", file.path);
//! }
//! # Ok(())
//! # }
//! ```

use neodeploy_core::domain::{FileUpload, RemoteFile};
use neodeploy_core::ports::{MessageResult, SiteInfo};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use crate::SiteError;

/// Default API host
pub const DEFAULT_BASE_URL: &str = "https://neocities.org";

/// `User-Agent` sent with every request
pub fn user_agent() -> String {
    format!(
        "neodeploy/{} ({})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS
    )
}

// ============================================================================
// API response types
// ============================================================================

/// Response from `/api/list`
#[derive(Debug, Deserialize)]
struct ListResponse {
    result: String,
    #[serde(default)]
    files: Vec<RemoteFile>,
}

/// Response from `/api/info`
#[derive(Debug, Deserialize)]
struct InfoResponse {
    result: String,
    info: SiteInfo,
}

/// Response from `/api/key`
#[derive(Debug, Deserialize)]
struct KeyResponse {
    result: String,
    api_key: String,
}

/// Error body the API returns alongside non-2xx statuses
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    error_type: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

fn ensure_success(result: &str, context: &str) -> Result<(), SiteError> {
    if result == "success" {
        Ok(())
    } else {
        Err(SiteError::InvalidResponse(format!(
            "{context} returned result '{result}'"
        )))
    }
}

// ============================================================================
// SiteClient
// ============================================================================

/// HTTP client for the site hosting API
///
/// Wraps `reqwest::Client` with the base URL, default headers and the
/// optional API key used as a bearer token.
#[derive(Clone, Debug)]
pub struct SiteClient {
    /// The underlying HTTP client
    client: Client,
    /// Base URL, always ending in `/`
    base_url: Url,
    /// API key for bearer authentication
    api_key: Option<String>,
}

impl SiteClient {
    /// Creates a client for the API at `base_url`
    ///
    /// # Errors
    /// Fails if `base_url` does not parse or the HTTP client cannot be built
    pub fn new(base_url: &str) -> Result<Self, SiteError> {
        let mut normalized = base_url.trim().to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        let base_url = Url::parse(&normalized)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .user_agent(user_agent())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_key: None,
        })
    }

    /// Sets the API key used for authenticated calls
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Returns the base URL for API requests
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns true if an API key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self, path: &str) -> Result<Url, SiteError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Creates an authenticated request builder for the given method and path
    ///
    /// # Errors
    /// Returns `SiteError::MissingApiKey` if no key is configured
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, SiteError> {
        let api_key = self.api_key.as_ref().ok_or(SiteError::MissingApiKey)?;
        Ok(self
            .client
            .request(method, self.endpoint(path)?)
            .bearer_auth(api_key))
    }

    /// Exchanges site credentials for the site's API key
    ///
    /// Uses HTTP Basic auth and does not need an API key itself.
    #[instrument(skip(self, password))]
    pub async fn get_api_key(&self, site_name: &str, password: &str) -> Result<String, SiteError> {
        let response = self
            .client
            .get(self.endpoint("api/key")?)
            .basic_auth(site_name, Some(password))
            .send()
            .await?;

        let key: KeyResponse = parse_json(response, "GET /api/key").await?;
        ensure_success(&key.result, "GET /api/key")?;
        debug!("Retrieved API key");
        Ok(key.api_key)
    }

    /// Lists files on the site
    ///
    /// # Arguments
    /// * `path` - Restrict the listing to this directory; `None` lists everything
    #[instrument(skip(self))]
    pub async fn list_files(&self, path: Option<&str>) -> Result<Vec<RemoteFile>, SiteError> {
        let mut request = self.request(Method::GET, "api/list")?;
        if let Some(path) = path {
            request = request.query(&[("path", path)]);
        }

        let list: ListResponse = parse_json(request.send().await?, "GET /api/list").await?;
        ensure_success(&list.result, "GET /api/list")?;
        debug!(files = list.files.len(), "Listed site files");
        Ok(list.files)
    }

    /// Retrieves public information about a site
    ///
    /// # Arguments
    /// * `site_name` - Site to look up; `None` means the site owning the API key
    #[instrument(skip(self))]
    pub async fn site_info(&self, site_name: Option<&str>) -> Result<SiteInfo, SiteError> {
        // Looking up a named site is public; only the own-site lookup needs the key
        let request = match site_name {
            Some(name) => self
                .client
                .get(self.endpoint("api/info")?)
                .query(&[("sitename", name)]),
            None => self.request(Method::GET, "api/info")?,
        };

        let info: InfoResponse = parse_json(request.send().await?, "GET /api/info").await?;
        ensure_success(&info.result, "GET /api/info")?;
        Ok(info.info)
    }

    /// Uploads files in a single multipart request
    ///
    /// Each part is named after the destination path and streams the local
    /// file's bytes.
    #[instrument(skip(self, files), fields(files = files.len()))]
    pub async fn upload_files(&self, files: &[FileUpload]) -> Result<MessageResult, SiteError> {
        let mut form = Form::new();
        for file in files {
            let handle = tokio::fs::File::open(&file.path)
                .await
                .map_err(|source| SiteError::Io {
                    path: file.path.clone(),
                    source,
                })?;
            let length = handle
                .metadata()
                .await
                .map_err(|source| SiteError::Io {
                    path: file.path.clone(),
                    source,
                })?
                .len();
            let file_name = file
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.name.clone());
            let part = Part::stream_with_length(Body::from(handle), length).file_name(file_name);
            form = form.part(file.name.clone(), part);
        }

        let response = self
            .request(Method::POST, "api/upload")?
            .multipart(form)
            .send()
            .await?;

        let result: MessageResult = parse_json(response, "POST /api/upload").await?;
        debug!(message = %result.message, "Upload accepted");
        Ok(result)
    }

    /// Deletes files by site path in a single request
    #[instrument(skip(self, names), fields(files = names.len()))]
    pub async fn delete_files(&self, names: &[String]) -> Result<MessageResult, SiteError> {
        let fields: Vec<(&str, &str)> = names
            .iter()
            .map(|name| ("filenames[]", name.as_str()))
            .collect();

        let response = self
            .request(Method::POST, "api/delete")?
            .form(&fields)
            .send()
            .await?;

        let result: MessageResult = parse_json(response, "POST /api/delete").await?;
        debug!(message = %result.message, "Delete accepted");
        Ok(result)
    }
}

// ============================================================================
// Response handling
// ============================================================================

/// Turns a status above 299 into [`SiteError::Http`]
///
/// JSON bodies in the API's error shape are reduced to
/// `"<error_type>: <message>"`; anything else is kept verbatim.
async fn check_status(response: Response, context: &str) -> Result<Response, SiteError> {
    let status = response.status();
    if status.as_u16() <= 299 {
        return Ok(response);
    }

    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"));
    let body = error_body(response.text().await, is_json);

    Err(SiteError::Http {
        status: status.as_u16(),
        context: context.to_string(),
        body,
    })
}

/// Reduces an error response body for `SiteError::Http`. A body that cannot be
/// read is reported as such instead of being dropped.
fn error_body<E: std::fmt::Display>(text: Result<String, E>, is_json: bool) -> String {
    let text = match text {
        Ok(text) => text,
        Err(e) => return format!("<unreadable body: {e}>"),
    };

    is_json
        .then(|| serde_json::from_str::<ApiErrorBody>(&text).ok())
        .flatten()
        .and_then(|b| match (b.error_type, b.message) {
            (Some(kind), Some(message)) => Some(format!("{kind}: {message}")),
            (None, Some(message)) => Some(message),
            (Some(kind), None) => Some(kind),
            (None, None) => None,
        })
        .unwrap_or(text)
}

async fn parse_json<T: DeserializeOwned>(response: Response, context: &str) -> Result<T, SiteError> {
    let response = check_status(response, context).await?;
    let text = response.text().await?;
    serde_json::from_str(&text)
        .map_err(|e| SiteError::InvalidResponse(format!("{context}: {e}")))
}
