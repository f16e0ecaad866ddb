use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use tableflow_core::{CapabilityCatalog, Error, Result, redact_endpoint, validate_catalog};

use crate::adapter::CatalogSource;
use crate::options::HttpOptions;

const USER_AGENT: &str = concat!("tableflow/", env!("CARGO_PKG_VERSION"));

/// Organization returned by the admin API, with its workspaces.
#[derive(Debug, Clone, Deserialize)]
pub struct Organization {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub workspaces: Vec<Workspace>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Workspace {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Catalog source backed by the admin API.
#[derive(Debug, Clone)]
pub struct HttpCatalogSource {
    client: Client,
    options: HttpOptions,
}

impl HttpCatalogSource {
    /// Create a source with its own HTTP client.
    pub fn new(options: HttpOptions) -> Result<Self> {
        let client = Client::builder()
            .timeout(options.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| Error::Fetch(err.to_string()))?;
        Ok(Self { client, options })
    }

    /// Resolve the workspace of the caller's organization.
    ///
    /// The console works against the first workspace of the organization.
    pub async fn resolve_workspace_id(&self) -> Result<String> {
        let organization: Organization = self.get_json("organization-workspaces").await?;
        organization
            .workspaces
            .into_iter()
            .next()
            .map(|workspace| workspace.id)
            .ok_or_else(|| {
                Error::Fetch(format!(
                    "organization {} has no workspaces",
                    organization.id
                ))
            })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.options.base_url.trim_end_matches('/'), path)
    }

    fn request(&self, path: &str) -> RequestBuilder {
        let request = self.client.get(self.endpoint(path));
        match &self.options.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let endpoint = redact_endpoint(&self.endpoint(path));
        tracing::debug!(event = "catalog_request", endpoint = %endpoint.redacted);

        let response = self
            .request(path)
            .send()
            .await
            .map_err(|err| Error::Fetch(format!("{}: {err}", endpoint.redacted)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Fetch(format!(
                "{} returned {}: {}",
                endpoint.redacted,
                status.as_u16(),
                message
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|err| Error::InvalidCatalog(format!("{}: {err}", endpoint.redacted)))
    }
}

#[async_trait::async_trait]
impl CatalogSource for HttpCatalogSource {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch(&self, workspace_id: &str) -> Result<CapabilityCatalog> {
        if workspace_id.trim().is_empty() {
            return Err(Error::Fetch("no workspace id provided".to_string()));
        }
        let catalog: CapabilityCatalog = self
            .get_json(&format!("workspace/{workspace_id}/data-type-validation"))
            .await?;
        validate_catalog(&catalog)?;
        Ok(catalog)
    }
}
