// Report endpoints

use uuid::Uuid;

use crate::error::Error;
use crate::rest::client::ApiClient;
use crate::types::HierarchyResponse;

impl ApiClient {
    /// Domain → ValueStream → Zone → VLAN tree, optionally for one domain.
    ///
    /// `GET /reports/network-hierarchy[?domain_id=..]`
    pub async fn network_hierarchy(
        &self,
        domain_id: Option<&Uuid>,
    ) -> Result<HierarchyResponse, Error> {
        let url = self.url("reports/network-hierarchy")?;
        match domain_id {
            Some(id) => {
                self.get_with_params(url, &[("domain_id", id.to_string())])
                    .await
            }
            None => self.get(url).await,
        }
    }
}
