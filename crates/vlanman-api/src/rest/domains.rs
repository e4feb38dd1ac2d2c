// Domain endpoints
//
// Top level of the Domain → ValueStream → Zone → VLAN hierarchy.

use tracing::debug;
use uuid::Uuid;

use crate::error::Error;
use crate::rest::client::ApiClient;
use crate::types::{DomainCreate, DomainResponse, DomainUpdate};

impl ApiClient {
    /// List domains.
    ///
    /// `GET /domains?active_only=...`
    pub async fn list_domains(&self, active_only: bool) -> Result<Vec<DomainResponse>, Error> {
        let url = self.url("domains")?;
        self.get_with_params(url, &[("active_only", active_only.to_string())])
            .await
    }

    /// Get a single domain, including its value streams.
    ///
    /// `GET /domains/{id}`
    pub async fn get_domain(&self, id: &Uuid) -> Result<DomainResponse, Error> {
        let url = self.url(&format!("domains/{id}"))?;
        self.get(url).await
    }

    /// `POST /domains`
    pub async fn create_domain(&self, body: &DomainCreate) -> Result<DomainResponse, Error> {
        let url = self.url("domains")?;
        debug!(code = %body.code, "creating domain");
        self.post(url, body).await
    }

    /// `PUT /domains/{id}`
    pub async fn update_domain(
        &self,
        id: &Uuid,
        body: &DomainUpdate,
    ) -> Result<DomainResponse, Error> {
        let url = self.url(&format!("domains/{id}"))?;
        debug!(%id, "updating domain");
        self.put(url, body).await
    }

    /// `DELETE /domains/{id}`
    pub async fn delete_domain(&self, id: &Uuid) -> Result<(), Error> {
        let url = self.url(&format!("domains/{id}"))?;
        debug!(%id, "deleting domain");
        self.delete(url).await
    }
}
