//! Certificate endpoints
//!
//! Certificates are render jobs: they move pending → processing →
//! completed/failure, and completed or failed ones can be re-printed.
//! Revocation flips a flag; revoked certificates stay listed.

use console_client::{ApiClient, ClassifiedError};
use transport::ApiRequest;

use crate::models::{Certificate, Page, ResponseData};
use crate::query::CertificateQuery;

pub async fn list(
    client: &ApiClient,
    query: &CertificateQuery,
) -> Result<Page<Certificate>, ClassifiedError> {
    let request = ApiRequest::get("/certificate").with_query_pairs(query.to_query());
    let response: ResponseData<Page<Certificate>> = client.send_as(request).await?;
    Ok(response.data)
}

pub async fn get(client: &ApiClient, id: &str) -> Result<Certificate, ClassifiedError> {
    let response: ResponseData<Certificate> = client
        .send_as(ApiRequest::get(format!("/certificate/{id}")))
        .await?;
    Ok(response.data)
}

/// Queue a new render of an existing certificate. Returns the backend's
/// job acknowledgement payload.
pub async fn print(client: &ApiClient, id: &str) -> Result<serde_json::Value, ClassifiedError> {
    client
        .send(ApiRequest::post(format!("/certificate/{id}/print")))
        .await
}

pub async fn revoke(client: &ApiClient, id: &str) -> Result<Certificate, ClassifiedError> {
    let response: ResponseData<Certificate> = client
        .send_as(ApiRequest::put(format!("/certificate/{id}/revoke")))
        .await?;
    Ok(response.data)
}
