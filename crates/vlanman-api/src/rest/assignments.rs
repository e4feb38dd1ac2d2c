// IP assignment endpoints

use tracing::debug;
use uuid::Uuid;

use crate::error::Error;
use crate::rest::client::ApiClient;
use crate::types::{IpAssignmentCreate, IpAssignmentResponse, IpAssignmentUpdate};

impl ApiClient {
    /// `GET /ip-assignments`
    pub async fn list_ip_assignments(&self) -> Result<Vec<IpAssignmentResponse>, Error> {
        let url = self.url("ip-assignments")?;
        self.get(url).await
    }

    /// `GET /vlans/{vlan_id}/ip-assignments`
    pub async fn list_vlan_ip_assignments(
        &self,
        vlan_id: &Uuid,
    ) -> Result<Vec<IpAssignmentResponse>, Error> {
        let url = self.url(&format!("vlans/{vlan_id}/ip-assignments"))?;
        self.get(url).await
    }

    /// `GET /ip-assignments/{id}`
    pub async fn get_ip_assignment(&self, id: &Uuid) -> Result<IpAssignmentResponse, Error> {
        let url = self.url(&format!("ip-assignments/{id}"))?;
        self.get(url).await
    }

    /// `POST /ip-assignments`
    pub async fn create_ip_assignment(
        &self,
        body: &IpAssignmentCreate,
    ) -> Result<IpAssignmentResponse, Error> {
        let url = self.url("ip-assignments")?;
        debug!(ip = %body.ip_address, ci = %body.ci_name, "creating ip assignment");
        self.post(url, body).await
    }

    /// `PUT /ip-assignments/{id}`
    pub async fn update_ip_assignment(
        &self,
        id: &Uuid,
        body: &IpAssignmentUpdate,
    ) -> Result<IpAssignmentResponse, Error> {
        let url = self.url(&format!("ip-assignments/{id}"))?;
        debug!(%id, "updating ip assignment");
        self.put(url, body).await
    }

    /// `DELETE /ip-assignments/{id}`
    pub async fn delete_ip_assignment(&self, id: &Uuid) -> Result<(), Error> {
        let url = self.url(&format!("ip-assignments/{id}"))?;
        debug!(%id, "releasing ip assignment");
        self.delete(url).await
    }
}
