use crate::domain::model::{ApiRequest, ApiResponse};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait CredentialsProvider: Send + Sync {
    fn api_key(&self) -> &str;
    fn api_version(&self) -> &str;
    fn base_url(&self) -> &str;
}

/// Sends a single AfterShip API request.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    async fn request(&self, request: ApiRequest) -> Result<ApiResponse>;
}
