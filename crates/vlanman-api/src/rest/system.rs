// Service health
//
// The health route is mounted at the service root, outside the
// versioned API prefix.

use crate::error::Error;
use crate::rest::client::ApiClient;
use crate::types::HealthResponse;

impl ApiClient {
    /// `GET {scheme}://{host}[:port]/health`
    pub async fn health(&self) -> Result<HealthResponse, Error> {
        let url = self.root_url("/health");
        self.get(url).await
    }
}
