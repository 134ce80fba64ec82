//! Contact form endpoint.

use tracing::instrument;

use phutung_core::ContactMessage;

use crate::error::Result;

use super::ApiClient;

impl ApiClient {
    /// Submit a contact form message.
    ///
    /// The message is validated locally first so obviously bad input never
    /// reaches the network.
    #[instrument(skip(self, message), fields(subject = %message.subject))]
    pub async fn send_contact(&self, message: &ContactMessage) -> Result<()> {
        message.validate()?;

        let url = self.endpoint("contacts")?;
        let response = self.http().post(url).json(message).send().await?;
        Self::check_mutation(response, "contact").await
    }
}
