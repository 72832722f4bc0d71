//! HTTP client for a Neynar-style Farcaster directory API.
//!
//! Covers the narrow slice of the API this application needs: signer
//! status, profile lookups, channel lookup, and cast publishing. The
//! signer/profile operations implement the
//! [`SignerDirectory`](ghostwriter_access::SignerDirectory) trait the auth
//! strategies consume.

use async_trait::async_trait;
use ghostwriter_access::{Profile, ServiceError, SignerDirectory, SignerState, SignerStatus};
use ghostwriter_core::Fid;
use rootcause::prelude::Report;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::FarcasterError;

/// Default API base URL.
const DEFAULT_BASE_URL: &str = "https://api.neynar.com";

/// Client for the Farcaster directory API.
#[derive(Clone)]
pub struct DirectoryClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// A channel as reported by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Channel identifier (e.g. "memes").
    pub id: String,
    /// Display name.
    pub name: String,
    /// Channel image, if set.
    #[serde(default)]
    pub image_url: Option<String>,
}

/// The result of publishing a cast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedCast {
    /// The network-assigned cast hash.
    pub hash: String,
}

#[derive(Debug, Deserialize)]
struct SignerResponse {
    status: String,
    #[serde(default)]
    fid: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ProfileDto {
    fid: u64,
    username: String,
    #[serde(default)]
    pfp_url: Option<String>,
}

impl ProfileDto {
    fn into_profile(self) -> Profile {
        Profile {
            fid: Fid::new(self.fid),
            username: self.username,
            avatar_url: self.pfp_url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct BulkUsersResponse {
    users: Vec<ProfileDto>,
}

#[derive(Debug, Deserialize)]
struct UserByUsernameResponse {
    user: ProfileDto,
}

#[derive(Debug, Deserialize)]
struct ChannelResponse {
    channel: Channel,
}

#[derive(Debug, Serialize)]
struct PublishCastRequest<'a> {
    signer_uuid: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    channel_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    embeds: Vec<EmbedDto<'a>>,
}

#[derive(Debug, Serialize)]
struct EmbedDto<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct PublishCastResponse {
    cast: PublishedCastDto,
}

#[derive(Debug, Deserialize)]
struct PublishedCastDto {
    hash: String,
}

impl DirectoryClient {
    /// Creates a client against the default API base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(api_key: impl Into<String>) -> Result<Self, FarcasterError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Creates a client against a specific base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, FarcasterError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| FarcasterError::Http {
                details: e.to_string(),
            })?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, Report<FarcasterError>> {
        let response = self
            .http
            .get(format!("{}{path}", self.base_url))
            .header("x-api-key", &self.api_key)
            .query(query)
            .send()
            .await
            .map_err(|e| FarcasterError::Http {
                details: e.to_string(),
            })?;

        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, Report<FarcasterError>> {
        let status = response.status();
        if !status.is_success() {
            let details = response.text().await.unwrap_or_default();
            return Err(FarcasterError::Api {
                status: status.as_u16(),
                details,
            }
            .into());
        }

        let body = response.json().await.map_err(|e| FarcasterError::Decode {
            details: e.to_string(),
        })?;
        Ok(body)
    }

    /// Looks up the status of a delegated signer.
    #[instrument(skip(self, signer_uuid))]
    pub async fn signer_status(
        &self,
        signer_uuid: &str,
    ) -> Result<SignerStatus, Report<FarcasterError>> {
        let response: SignerResponse = self
            .get_json(
                "/v2/farcaster/signer",
                &[("signer_uuid", signer_uuid.to_string())],
            )
            .await?;

        Ok(SignerStatus {
            state: SignerState::from_wire(&response.status),
            fid: response.fid.map(Fid::new),
        })
    }

    /// Fetches profiles in bulk by fid.
    #[instrument(skip(self))]
    pub async fn bulk_profiles(&self, fids: &[Fid]) -> Result<Vec<Profile>, Report<FarcasterError>> {
        let joined = fids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let response: BulkUsersResponse = self
            .get_json("/v2/farcaster/user/bulk", &[("fids", joined)])
            .await?;

        Ok(response
            .users
            .into_iter()
            .map(ProfileDto::into_profile)
            .collect())
    }

    /// Looks up a profile by username.
    ///
    /// Returns `None` when the username does not exist.
    #[instrument(skip(self))]
    pub async fn profile_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Profile>, Report<FarcasterError>> {
        let response = self
            .http
            .get(format!("{}/v2/farcaster/user/by_username", self.base_url))
            .header("x-api-key", &self.api_key)
            .query(&[("username", username)])
            .send()
            .await
            .map_err(|e| FarcasterError::Http {
                details: e.to_string(),
            })?;

        // An unknown username is an expected outcome, not an error.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body: UserByUsernameResponse = Self::decode(response).await?;
        Ok(Some(body.user.into_profile()))
    }

    /// Looks up a channel by its identifier.
    #[instrument(skip(self))]
    pub async fn channel(&self, id: &str) -> Result<Channel, Report<FarcasterError>> {
        let response: ChannelResponse = self
            .get_json("/v2/farcaster/channel", &[("id", id.to_string())])
            .await?;
        Ok(response.channel)
    }

    /// Publishes a cast on behalf of an account through its delegated
    /// signer.
    #[instrument(skip(self, signer_uuid, text))]
    pub async fn publish_cast(
        &self,
        signer_uuid: &str,
        text: &str,
        channel_id: Option<&str>,
        embed_urls: &[String],
    ) -> Result<PublishedCast, Report<FarcasterError>> {
        let request = PublishCastRequest {
            signer_uuid,
            text,
            channel_id,
            embeds: embed_urls.iter().map(|url| EmbedDto { url }).collect(),
        };

        let response = self
            .http
            .post(format!("{}/v2/farcaster/cast", self.base_url))
            .header("x-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| FarcasterError::Http {
                details: e.to_string(),
            })?;

        let body: PublishCastResponse = Self::decode(response).await?;
        tracing::debug!(hash = %body.cast.hash, "cast published");
        Ok(PublishedCast {
            hash: body.cast.hash,
        })
    }
}

#[async_trait]
impl SignerDirectory for DirectoryClient {
    async fn lookup_signer(&self, signer_uuid: &str) -> Result<SignerStatus, ServiceError> {
        self.signer_status(signer_uuid)
            .await
            .map_err(ServiceError::new)
    }

    async fn fetch_profiles(&self, fids: &[Fid]) -> Result<Vec<Profile>, ServiceError> {
        self.bulk_profiles(fids).await.map_err(ServiceError::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signer_response_decodes_wire_format() {
        let response: SignerResponse = serde_json::from_str(
            r#"{"signer_uuid":"abc","status":"approved","fid":123,"public_key":"0xkey"}"#,
        )
        .expect("should decode");
        assert_eq!(response.status, "approved");
        assert_eq!(response.fid, Some(123));
    }

    #[test]
    fn signer_response_tolerates_missing_fid() {
        let response: SignerResponse =
            serde_json::from_str(r#"{"status":"generated"}"#).expect("should decode");
        assert_eq!(response.fid, None);
    }

    #[test]
    fn bulk_users_response_maps_to_profiles() {
        let response: BulkUsersResponse = serde_json::from_str(
            r#"{"users":[{"fid":3,"username":"dwr","pfp_url":"https://example.com/pfp.png","follower_count":1000}]}"#,
        )
        .expect("should decode");

        let profiles: Vec<Profile> = response
            .users
            .into_iter()
            .map(ProfileDto::into_profile)
            .collect();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].fid, Fid::new(3));
        assert_eq!(profiles[0].username, "dwr");
        assert_eq!(
            profiles[0].avatar_url.as_deref(),
            Some("https://example.com/pfp.png")
        );
    }

    #[test]
    fn publish_cast_request_omits_empty_optionals() {
        let request = PublishCastRequest {
            signer_uuid: "abc",
            text: "gm",
            channel_id: None,
            embeds: Vec::new(),
        };
        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(json, serde_json::json!({"signer_uuid": "abc", "text": "gm"}));
    }

    #[test]
    fn publish_cast_request_includes_channel_and_embeds() {
        let embeds = vec!["https://example.com/a.png".to_string()];
        let request = PublishCastRequest {
            signer_uuid: "abc",
            text: "gm",
            channel_id: Some("memes"),
            embeds: embeds.iter().map(|url| EmbedDto { url }).collect(),
        };
        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(json["channel_id"], "memes");
        assert_eq!(json["embeds"][0]["url"], "https://example.com/a.png");
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client =
            DirectoryClient::with_base_url("key", "https://api.example.com/").expect("should build");
        assert_eq!(client.base_url, "https://api.example.com");
    }
}
