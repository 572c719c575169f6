//! Immich REST API client.
//!
//! `ImmichApi` covers the four endpoints the upload and check commands use.
//! `ImmichClient` implements it with blocking `reqwest`; every request
//! carries the `x-api-key` header and any non-2xx response is an error.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Method;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::ImmichError;
use crate::config::ImmichCredentials;
use crate::secret::Secret;

/// Result of a checksum search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SearchResult {
    pub count: usize,
    pub items: Vec<AssetRef>,
}

/// An asset as returned by search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AssetRef {
    pub id: Option<String>,
}

/// An album containing an asset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Album {
    pub id: String,
    pub album_name: String,
}

/// Response of `POST /api/assets`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UploadedAsset {
    pub id: Option<String>,
    /// `created` or `duplicate`
    pub status: Option<String>,
}

/// One file to upload with its multipart fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetUpload {
    pub path: PathBuf,
    pub device_asset_id: String,
    pub device_id: String,
    pub file_created_at: String,
    pub file_modified_at: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    assets: SearchResult,
}

/// The Immich endpoints used by housekeep.
pub trait ImmichApi {
    /// `POST /api/search/metadata {"checksum": ...}`
    fn search_checksum(&self, checksum: &str) -> Result<SearchResult, ImmichError>;

    /// `GET /api/albums?assetId=...`
    fn asset_albums(&self, asset_id: &str) -> Result<Vec<Album>, ImmichError>;

    /// `POST /api/assets` (multipart)
    fn upload_asset(&self, upload: &AssetUpload) -> Result<UploadedAsset, ImmichError>;

    /// `PUT /api/albums/{album_id}/assets {"ids": [asset_id]}`
    fn add_to_album(&self, album_id: &str, asset_id: &str) -> Result<(), ImmichError>;
}

/// Blocking HTTP client for one Immich server.
pub struct ImmichClient {
    http: Client,
    base_url: String,
    api_key: Secret,
}

impl ImmichClient {
    pub fn new(credentials: &ImmichCredentials) -> Result<Self, ImmichError> {
        // Large videos can take minutes; only bound the connect phase
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(15))
            .timeout(None::<Duration>)
            .build()?;
        Ok(Self {
            http,
            base_url: credentials.url.trim_end_matches('/').to_string(),
            api_key: credentials.api_key.clone(),
        })
    }

    fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        debug!("{} {}", method, endpoint);
        self.http
            .request(method, format!("{}{}", self.base_url, endpoint))
            .header("x-api-key", self.api_key.expose())
            .header(ACCEPT, "application/json")
    }

    fn send(builder: RequestBuilder) -> Result<Response, ImmichError> {
        let response = builder.send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ImmichError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

impl ImmichApi for ImmichClient {
    fn search_checksum(&self, checksum: &str) -> Result<SearchResult, ImmichError> {
        let builder = self
            .request(Method::POST, "/api/search/metadata")
            .json(&json!({ "checksum": checksum }));
        let response: SearchResponse = Self::send(builder)?.json()?;
        Ok(response.assets)
    }

    fn asset_albums(&self, asset_id: &str) -> Result<Vec<Album>, ImmichError> {
        let builder = self
            .request(Method::GET, "/api/albums")
            .query(&[("assetId", asset_id)]);
        Ok(Self::send(builder)?.json()?)
    }

    fn upload_asset(&self, upload: &AssetUpload) -> Result<UploadedAsset, ImmichError> {
        let part = Part::file(&upload.path)?.mime_str("application/octet-stream")?;
        let form = Form::new()
            .part("assetData", part)
            .text("deviceAssetId", upload.device_asset_id.clone())
            .text("deviceId", upload.device_id.clone())
            .text("fileCreatedAt", upload.file_created_at.clone())
            .text("fileModifiedAt", upload.file_modified_at.clone());
        let builder = self.request(Method::POST, "/api/assets").multipart(form);
        Ok(Self::send(builder)?.json()?)
    }

    fn add_to_album(&self, album_id: &str, asset_id: &str) -> Result<(), ImmichError> {
        let endpoint = format!("/api/albums/{}/assets", album_id);
        let builder = self
            .request(Method::PUT, &endpoint)
            .json(&json!({ "ids": [asset_id] }));
        Self::send(builder)?;
        Ok(())
    }
}
