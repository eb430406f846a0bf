//! User management endpoints

use console_client::{ApiClient, ClassifiedError};
use transport::ApiRequest;

use crate::models::{Page, ResponseData, User, UserCreate, UserUpdate};
use crate::query::UserQuery;
use crate::to_body;

pub async fn list(client: &ApiClient, query: &UserQuery) -> Result<Page<User>, ClassifiedError> {
    let request = ApiRequest::get("/user").with_query_pairs(query.to_query());
    let response: ResponseData<Page<User>> = client.send_as(request).await?;
    Ok(response.data)
}

pub async fn get(client: &ApiClient, id: &str) -> Result<User, ClassifiedError> {
    let response: ResponseData<User> = client.send_as(ApiRequest::get(format!("/user/{id}"))).await?;
    Ok(response.data)
}

pub async fn create(client: &ApiClient, user: &UserCreate) -> Result<User, ClassifiedError> {
    let request = ApiRequest::post("/user").with_body(to_body(user)?);
    let response: ResponseData<User> = client.send_as(request).await?;
    Ok(response.data)
}

pub async fn update(
    client: &ApiClient,
    id: &str,
    changes: &UserUpdate,
) -> Result<User, ClassifiedError> {
    let request = ApiRequest::put(format!("/user/{id}")).with_body(to_body(changes)?);
    let response: ResponseData<User> = client.send_as(request).await?;
    Ok(response.data)
}

pub async fn remove(client: &ApiClient, id: &str) -> Result<(), ClassifiedError> {
    client.send(ApiRequest::delete(format!("/user/{id}"))).await?;
    Ok(())
}
