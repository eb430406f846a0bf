//! Session endpoints
//!
//! `login` stores the returned bearer in the client's session store so
//! every subsequent exchange carries it; `logout` drops the local
//! session no matter what the backend answered.

use console_client::{ApiClient, ClassifiedError, ErrorKind};
use tracing::{info, warn};
use transport::ApiRequest;

use crate::models::{LoginData, LoginRequest, ResponseData, UpdateProfile, User};
use crate::to_body;

pub async fn login(
    client: &ApiClient,
    credentials: &LoginRequest,
) -> Result<User, ClassifiedError> {
    let request = ApiRequest::post("/auth/login").with_body(to_body(credentials)?);
    let response: ResponseData<LoginData> = client.send_as(request).await?;

    if let Some(token) = &response.data.access_token {
        client
            .session()
            .set(token.clone())
            .await
            .map_err(|e| ClassifiedError {
                kind: ErrorKind::Unknown,
                message: format!("storing session: {e}"),
            })?;
    }

    info!(email = %response.data.user.email, "logged in");
    Ok(response.data.user)
}

pub async fn logout(client: &ApiClient) -> Result<(), ClassifiedError> {
    let result = client.send(ApiRequest::post("/auth/logout")).await;

    // The local session goes away even when the backend call failed.
    if let Err(e) = client.session().clear().await {
        warn!(error = %e, "failed to clear local session");
    }

    result.map(|_| ())
}

pub async fn profile(client: &ApiClient) -> Result<User, ClassifiedError> {
    let response: ResponseData<User> = client.send_as(ApiRequest::get("/auth/profile")).await?;
    Ok(response.data)
}

pub async fn update_profile(
    client: &ApiClient,
    changes: &UpdateProfile,
) -> Result<User, ClassifiedError> {
    let request = ApiRequest::put("/auth/profile").with_body(to_body(changes)?);
    let response: ResponseData<User> = client.send_as(request).await?;
    Ok(response.data)
}
