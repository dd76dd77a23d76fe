use crate::error::{Result, SourceError};
use crate::SecretStore;
use async_trait::async_trait;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use aws_sdk_secretsmanager::Client;

/// Default name of the secret holding the wiki credentials.
pub const DEFAULT_SECRET_NAME: &str = "ConfSecret";

/// AWS Secrets Manager backed [`SecretStore`]. Only string secrets are
/// supported.
pub struct SecretsManagerStore {
    client: Client,
}

impl SecretsManagerStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretStore for SecretsManagerStore {
    async fn secret_string(&self, name: &str) -> Result<String> {
        let output = self
            .client
            .get_secret_value()
            .secret_id(name)
            .send()
            .await
            .map_err(|e| SourceError::Secret(format!("{name}: {}", DisplayErrorContext(e))))?;

        match output.secret_string() {
            Some(value) => Ok(value.to_string()),
            None if output.secret_binary().is_some() => Err(SourceError::Secret(format!(
                "{name} is a binary secret, expected a JSON string"
            ))),
            None => Err(SourceError::Secret(format!("{name} has no value"))),
        }
    }
}
