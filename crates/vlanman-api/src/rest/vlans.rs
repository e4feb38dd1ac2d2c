// VLAN endpoints
//
// CRUD plus the availability and next-free-IP helpers.

use tracing::debug;
use uuid::Uuid;

use crate::error::Error;
use crate::rest::client::ApiClient;
use crate::types::{AvailabilityResponse, NextIpResponse, VlanCreate, VlanResponse, VlanUpdate};

impl ApiClient {
    /// List every VLAN the backend knows about.
    ///
    /// `GET /vlans`
    pub async fn list_vlans(&self) -> Result<Vec<VlanResponse>, Error> {
        let url = self.url("vlans")?;
        self.get(url).await
    }

    /// List the VLANs of one zone.
    ///
    /// `GET /zones/{zone_id}/vlans`
    pub async fn list_zone_vlans(&self, zone_id: &Uuid) -> Result<Vec<VlanResponse>, Error> {
        let url = self.url(&format!("zones/{zone_id}/vlans"))?;
        self.get(url).await
    }

    /// `GET /vlans/{id}`
    pub async fn get_vlan(&self, id: &Uuid) -> Result<VlanResponse, Error> {
        let url = self.url(&format!("vlans/{id}"))?;
        self.get(url).await
    }

    /// `POST /vlans`
    pub async fn create_vlan(&self, body: &VlanCreate) -> Result<VlanResponse, Error> {
        let url = self.url("vlans")?;
        debug!(vlan_id = body.vlan_id, subnet = %body.subnet, "creating vlan");
        self.post(url, body).await
    }

    /// `PUT /vlans/{id}`
    pub async fn update_vlan(&self, id: &Uuid, body: &VlanUpdate) -> Result<VlanResponse, Error> {
        let url = self.url(&format!("vlans/{id}"))?;
        debug!(%id, "updating vlan");
        self.put(url, body).await
    }

    /// `DELETE /vlans/{id}`
    pub async fn delete_vlan(&self, id: &Uuid) -> Result<(), Error> {
        let url = self.url(&format!("vlans/{id}"))?;
        debug!(%id, "deleting vlan");
        self.delete(url).await
    }

    /// `GET /vlans/{id}/availability`
    pub async fn vlan_availability(&self, id: &Uuid) -> Result<AvailabilityResponse, Error> {
        let url = self.url(&format!("vlans/{id}/availability"))?;
        self.get(url).await
    }

    /// `GET /vlans/{id}/next-ip`
    pub async fn next_available_ip(&self, id: &Uuid) -> Result<NextIpResponse, Error> {
        let url = self.url(&format!("vlans/{id}/next-ip"))?;
        self.get(url).await
    }
}
