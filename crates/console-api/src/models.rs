//! Backend wire types
//!
//! JSON shapes of the admin backend. The transport layer already
//! unwrapped the HTTP envelope; these model the backend's own body
//! envelope (`ResponseData`) and the records inside it. Field names are
//! camelCase on the wire, record ids arrive as `_id`, timestamps as
//! ISO-8601 strings.

use serde::{Deserialize, Serialize};

/// The backend's body envelope: a payload plus an optional human
/// message (the message is what error bodies carry too).
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseData<T> {
    pub data: T,
    #[serde(default)]
    pub message: Option<String>,
}

/// One page of a list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub records: Vec<T>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
}

/// Role of a console user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Manager,
    Expert,
}

impl UserRole {
    /// Wire value, also used for query filters.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Manager => "manager",
            UserRole::Expert => "expert",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub avatar: String,
    pub role: UserRole,
    /// Active flag; deactivated users keep their records.
    pub status: bool,
    #[serde(default)]
    pub province_code: Option<u32>,
    #[serde(default)]
    pub district_code: Option<u32>,
    #[serde(default)]
    pub province_name: Option<String>,
    #[serde(default)]
    pub district_name: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreate {
    pub full_name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province_code: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district_code: Option<u32>,
}

/// Admin-side user changes; only present fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province_code: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district_code: Option<u32>,
}

/// Own-profile changes, password rotation included.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_password: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Payload of a successful login.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    /// Bearer for subsequent exchanges; cookie-mode backends omit it.
    #[serde(default)]
    pub access_token: Option<String>,
    pub user: User,
}

/// Lifecycle of a certificate render job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CertificateStatus {
    Pending,
    Processing,
    Completed,
    Failure,
}

impl CertificateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CertificateStatus::Pending => "pending",
            CertificateStatus::Processing => "processing",
            CertificateStatus::Completed => "completed",
            CertificateStatus::Failure => "failure",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    #[serde(rename = "_id")]
    pub id: String,
    pub facility_name: String,
    pub status: CertificateStatus,
    pub is_revoked: bool,
    pub start_date: String,
    pub end_date: String,
    pub created_at: String,
    pub updated_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user_json() -> serde_json::Value {
        json!({
            "_id": "64ac01",
            "fullName": "An Nguyen",
            "email": "an@example.com",
            "avatar": "https://cdn.example.com/a.png",
            "role": "manager",
            "status": true,
            "provinceCode": 79,
            "provinceName": "Ho Chi Minh",
            "createdAt": "2023-07-10T08:00:00.000Z",
            "updatedAt": "2023-07-11T08:00:00.000Z"
        })
    }

    #[test]
    fn user_deserializes_from_wire_names() {
        let user: User = serde_json::from_value(user_json()).unwrap();
        assert_eq!(user.id, "64ac01");
        assert_eq!(user.full_name, "An Nguyen");
        assert_eq!(user.role, UserRole::Manager);
        assert!(user.status);
        assert_eq!(user.province_code, Some(79));
        assert_eq!(user.district_code, None);
    }

    #[test]
    fn role_round_trips_lowercase() {
        for (role, wire) in [
            (UserRole::Admin, "\"admin\""),
            (UserRole::Manager, "\"manager\""),
            (UserRole::Expert, "\"expert\""),
        ] {
            assert_eq!(serde_json::to_string(&role).unwrap(), wire);
            let parsed: UserRole = serde_json::from_str(wire).unwrap();
            assert_eq!(parsed, role);
        }
    }

    #[test]
    fn user_create_omits_absent_fields() {
        let create = UserCreate {
            full_name: "An Nguyen".into(),
            email: "an@example.com".into(),
            password: "hunter2!".into(),
            avatar: None,
            role: UserRole::Expert,
            province_code: None,
            district_code: None,
        };
        let body = serde_json::to_value(&create).unwrap();
        assert_eq!(body["fullName"], "An Nguyen");
        assert_eq!(body["role"], "expert");
        assert!(body.get("avatar").is_none());
        assert!(body.get("provinceCode").is_none());
    }

    #[test]
    fn update_profile_serializes_only_changes() {
        let changes = UpdateProfile {
            password: Some("old".into()),
            new_password: Some("new".into()),
            ..Default::default()
        };
        let body = serde_json::to_value(&changes).unwrap();
        assert_eq!(
            body.as_object().unwrap().len(),
            2,
            "only the two present fields go on the wire"
        );
        assert_eq!(body["newPassword"], "new");
    }

    #[test]
    fn login_data_token_is_optional() {
        let with_token = json!({"accessToken": "at_1", "user": user_json()});
        let parsed: LoginData = serde_json::from_value(with_token).unwrap();
        assert_eq!(parsed.access_token.as_deref(), Some("at_1"));

        let cookie_mode = json!({"user": user_json()});
        let parsed: LoginData = serde_json::from_value(cookie_mode).unwrap();
        assert!(parsed.access_token.is_none());
    }

    #[test]
    fn certificate_page_deserializes() {
        let body = json!({
            "records": [{
                "_id": "cert-9",
                "facilityName": "Green Farm",
                "status": "completed",
                "isRevoked": false,
                "startDate": "2023-01-01T00:00:00.000Z",
                "endDate": "2024-01-01T00:00:00.000Z",
                "createdAt": "2023-01-01T00:00:00.000Z",
                "updatedAt": "2023-01-02T00:00:00.000Z"
            }],
            "pagination": {"page": 1, "limit": 10, "total": 1}
        });
        let page: Page<Certificate> = serde_json::from_value(body).unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.records[0].status, CertificateStatus::Completed);
        assert!(!page.records[0].is_revoked);
        assert_eq!(page.pagination.total, 1);
    }

    #[test]
    fn response_data_message_is_optional() {
        let body = json!({"data": 42});
        let parsed: ResponseData<u32> = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.data, 42);
        assert!(parsed.message.is_none());
    }
}
