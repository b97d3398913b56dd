use async_trait::async_trait;
use enslookup_sdk::{EnsClient, SdkError};
use enslookup_types::{Address, EnsName, TextKey};

/// The resolution service lookups are delegated to.
///
/// `Ok(None)` means "not found"; only transport or decoding problems are
/// errors.
#[async_trait]
pub trait EnsBackend: Send + Sync {
    async fn resolve_address(&self, name: &EnsName) -> Result<Option<Address>, SdkError>;
    async fn lookup_name(&self, address: &Address) -> Result<Option<EnsName>, SdkError>;
    async fn avatar(&self, name: &EnsName) -> Result<Option<String>, SdkError>;
    async fn text(&self, name: &EnsName, key: TextKey) -> Result<Option<String>, SdkError>;
}

#[async_trait]
impl EnsBackend for EnsClient {
    async fn resolve_address(&self, name: &EnsName) -> Result<Option<Address>, SdkError> {
        EnsClient::resolve_address(self, name).await
    }

    async fn lookup_name(&self, address: &Address) -> Result<Option<EnsName>, SdkError> {
        self.lookup_address(address).await
    }

    async fn avatar(&self, name: &EnsName) -> Result<Option<String>, SdkError> {
        EnsClient::avatar(self, name).await
    }

    async fn text(&self, name: &EnsName, key: TextKey) -> Result<Option<String>, SdkError> {
        EnsClient::text(self, name, key.key()).await
    }
}
