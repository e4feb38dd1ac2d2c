// Value-stream and zone endpoints
//
// The middle of the hierarchy. Zones carry the security classification
// and the firewall-check timestamp the compliance report is built from.

use tracing::debug;
use uuid::Uuid;

use crate::error::Error;
use crate::rest::client::ApiClient;
use crate::types::{ValueStreamCreate, ValueStreamResponse, ZoneCreate, ZoneResponse};

impl ApiClient {
    // ── Value streams ────────────────────────────────────────────────

    /// `POST /value-streams`
    pub async fn create_value_stream(
        &self,
        body: &ValueStreamCreate,
    ) -> Result<ValueStreamResponse, Error> {
        let url = self.url("value-streams")?;
        debug!(code = %body.code, domain_id = %body.domain_id, "creating value stream");
        self.post(url, body).await
    }

    // ── Zones ────────────────────────────────────────────────────────

    /// `GET /zones/{id}`
    pub async fn get_zone(&self, id: &Uuid) -> Result<ZoneResponse, Error> {
        let url = self.url(&format!("zones/{id}"))?;
        self.get(url).await
    }

    /// `POST /zones`
    pub async fn create_zone(&self, body: &ZoneCreate) -> Result<ZoneResponse, Error> {
        let url = self.url("zones")?;
        debug!(name = %body.name, "creating zone");
        self.post(url, body).await
    }

    /// Stamp the zone's firewall check with the server's current time.
    ///
    /// `PATCH /zones/{id}/firewall-check`
    pub async fn record_firewall_check(&self, id: &Uuid) -> Result<ZoneResponse, Error> {
        let url = self.url(&format!("zones/{id}/firewall-check"))?;
        debug!(%id, "recording firewall check");
        self.patch(url).await
    }
}
