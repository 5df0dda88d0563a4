//! Azure Stack Hub environment discovery.
//!
//! An Azure Stack cluster names only its portal; every other endpoint is
//! derived from the portal's DNS suffix or read from the stamp's metadata
//! endpoint.

use crate::constants::customcloud;
use crate::datamodel::{AzureEnvironment, ContainerService};
use crate::error::{Error, Result};
use async_trait::async_trait;
use http_body_util::{BodyExt, Empty};
use hyper::body::Bytes;
use hyper::StatusCode;
use hyper_tls::HttpsConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataAuthentication {
    #[serde(default)]
    pub login_endpoint: String,
    #[serde(default)]
    pub audiences: Vec<String>,
}

/// Document served at `/metadata/endpoints` by an Azure Stack stamp.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureStackMetadataEndpoints {
    #[serde(default)]
    pub gallery_endpoint: String,
    #[serde(default)]
    pub graph_endpoint: String,
    #[serde(default)]
    pub portal_endpoint: String,
    #[serde(default)]
    pub authentication: MetadataAuthentication,
}

impl AzureStackMetadataEndpoints {
    fn validate(&self, url: &str) -> Result<()> {
        let missing = if self.graph_endpoint.is_empty() {
            Some("graphEndpoint")
        } else if self.authentication.login_endpoint.is_empty() {
            Some("authentication.loginEndpoint")
        } else if self
            .authentication
            .audiences
            .first()
            .map(|a| a.is_empty())
            .unwrap_or(true)
        {
            Some("authentication.audiences[0]")
        } else {
            None
        };
        match missing {
            Some(field) => Err(Error::CustomCloudMalformedResponse {
                url: url.to_string(),
                reason: format!("missing {}", field),
            }),
            None => Ok(()),
        }
    }
}

/// Retrieves Azure Stack metadata. Swapped out in tests.
#[async_trait]
pub trait EndpointsFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<AzureStackMetadataEndpoints>;
}

/// Fetches over HTTPS with a hard deadline.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpsEndpointsFetcher;

impl HttpsEndpointsFetcher {
    async fn get(url: &str) -> Result<Bytes> {
        let unreachable = |reason: String| Error::CustomCloudUnreachable {
            url: url.to_string(),
            reason,
        };
        let uri: hyper::Uri = url.parse().map_err(|e| unreachable(format!("{}", e)))?;
        let client = Client::builder(TokioExecutor::new()).build::<_, Empty<Bytes>>(HttpsConnector::new());

        let resp = client
            .get(uri)
            .await
            .map_err(|e| unreachable(format!("{}", e)))?;
        if resp.status() != StatusCode::OK {
            return Err(unreachable(format!("unexpected status {}", resp.status())));
        }
        let body = resp
            .into_body()
            .collect()
            .await
            .map_err(|e| unreachable(format!("reading body: {}", e)))?;
        Ok(body.to_bytes())
    }
}

#[async_trait]
impl EndpointsFetcher for HttpsEndpointsFetcher {
    async fn fetch(&self, url: &str) -> Result<AzureStackMetadataEndpoints> {
        debug!(url, "fetching azure stack metadata");
        let deadline = Duration::from_secs(customcloud::METADATA_TIMEOUT_SECS);
        let body = tokio::time::timeout(deadline, Self::get(url))
            .await
            .map_err(|_| Error::CustomCloudUnreachable {
                url: url.to_string(),
                reason: format!("no response within {}s", customcloud::METADATA_TIMEOUT_SECS),
            })??;
        serde_json::from_slice(&body).map_err(|e| Error::CustomCloudMalformedResponse {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

/// DNS suffix of the stamp, taken from a portal URL of the form
/// `https://portal.<location>.<suffix>/`.
fn fqdn_suffix(location: &str, portal_url: &str) -> Result<String> {
    let prefix = format!("https://portal.{}.", location);
    portal_url
        .strip_prefix(&prefix)
        .map(|rest| rest.trim_end_matches('/').to_string())
        .filter(|suffix| !suffix.is_empty())
        .ok_or_else(|| Error::InvalidConfig(format!("portalURL needs to start with {}", prefix)))
}

pub fn metadata_url(location: &str, fqdn_suffix: &str) -> String {
    format!(
        "https://management.{}.{}/metadata/endpoints?api-version=1.0",
        location, fqdn_suffix
    )
}

/// Fills the custom cloud profile. Runs before every other stage and is
/// the only one that can fail.
pub(super) async fn set_custom_cloud_profile_defaults(
    mut cs: ContainerService,
    fetcher: &dyn EndpointsFetcher,
) -> Result<ContainerService> {
    let location = cs.location.clone();
    let Some(profile) = cs.properties.custom_cloud_profile.as_mut() else {
        return Ok(cs);
    };

    if profile.authentication_method.is_empty() {
        profile.authentication_method = customcloud::CLIENT_SECRET_AUTH_METHOD.to_string();
    }
    if profile.identity_system.is_empty() {
        profile.identity_system = customcloud::AZURE_AD_IDENTITY_SYSTEM.to_string();
    }
    if profile.dependencies_location.is_empty() {
        profile.dependencies_location = customcloud::DEPENDENCIES_LOCATION_PUBLIC.to_string();
    }

    let adfs = profile.identity_system == customcloud::ADFS_IDENTITY_SYSTEM;
    let portal_url = profile.portal_url.clone();
    let env = profile.environment.get_or_insert_with(AzureEnvironment::default);
    if env.is_complete() {
        return Ok(cs);
    }

    env.name = customcloud::AZURE_STACK_CLOUD.to_string();
    let suffix = fqdn_suffix(&location, &portal_url)?;
    env.resource_manager_endpoint = format!("https://management.{}.{}/", location, suffix);

    let url = metadata_url(&location, &suffix);
    let endpoints = fetcher.fetch(&url).await?;
    endpoints.validate(&url)?;

    env.graph_endpoint = endpoints.graph_endpoint;
    env.service_management_endpoint = endpoints.authentication.audiences[0].clone();
    env.gallery_endpoint = endpoints.gallery_endpoint;
    env.active_directory_endpoint = endpoints.authentication.login_endpoint;
    if adfs {
        let endpoint = env.active_directory_endpoint.as_str();
        let endpoint = endpoint.strip_suffix('/').unwrap_or(endpoint);
        let endpoint = endpoint.strip_suffix("adfs").unwrap_or(endpoint);
        env.active_directory_endpoint = endpoint.to_string();
    }
    env.management_portal_url = endpoints.portal_endpoint;
    env.resource_manager_vm_dns_suffix = format!("cloudapp.{}", suffix);
    env.storage_endpoint_suffix = format!("{}.{}", location, suffix);
    env.key_vault_dns_suffix = format!("vault.{}.{}", location, suffix);

    info!(environment = %env.name, resource_manager = %env.resource_manager_endpoint, "resolved azure stack environment");
    Ok(cs)
}
