//! User profile payloads accepted by the users API.
//!
//! Only presence/shape validation lives here; persistence and authentication
//! belong to the managed backend.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// `POST /user`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(required(message = "email is required"), email(message = "email is invalid"))]
    pub email: Option<String>,
    #[validate(
        required(message = "password is required"),
        length(min = 6, message = "password must be at least 6 characters")
    )]
    pub password: Option<String>,
    #[validate(required(message = "roleCode is required"))]
    pub role_code: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// `PUT /users/:userId`: full replacement, every field must be present.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(required(message = "id is required"))]
    pub id: Option<String>,
    #[validate(required(message = "email is required"), email(message = "email is invalid"))]
    pub email: Option<String>,
    #[validate(required(message = "password is required"))]
    pub password: Option<String>,
    #[validate(required(message = "roleCode is required"))]
    pub role_code: Option<String>,
    #[validate(required(message = "updateBy is required"))]
    pub update_by: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// `PATCH /users/:userId`: partial update, only the author is mandatory.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PatchUserRequest {
    #[validate(required(message = "updateBy is required"))]
    pub update_by: Option<String>,
    #[serde(default)]
    #[validate(email(message = "email is invalid"))]
    pub email: Option<String>,
    #[serde(default)]
    pub role_code: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub is_deleted: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AppError;

    #[test]
    fn put_reports_every_missing_field() {
        let payload: UpdateUserRequest = serde_json::from_str(r#"{"email":"a@b.pe"}"#).unwrap();
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();

        for field in ["id", "password", "role_code", "update_by"] {
            assert!(fields.contains_key(field), "missing error for {}", field);
        }
        assert!(!fields.contains_key("email"));
    }

    #[test]
    fn put_accepts_complete_payload() {
        let payload: UpdateUserRequest = serde_json::from_str(
            r#"{"id":"u1","email":"ana@korekenke.pe","password":"secret1","roleCode":"admin","updateBy":"u0"}"#,
        )
        .unwrap();
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn patch_only_requires_update_by() {
        let ok: PatchUserRequest =
            serde_json::from_str(r#"{"updateBy":"u0","firstName":"Ana"}"#).unwrap();
        assert!(ok.validate().is_ok());

        let missing: PatchUserRequest = serde_json::from_str(r#"{"firstName":"Ana"}"#).unwrap();
        let err: AppError = missing.validate().unwrap_err().into();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn create_checks_email_shape() {
        let payload: CreateUserRequest = serde_json::from_str(
            r#"{"email":"not-an-email","password":"secret1","roleCode":"user"}"#,
        )
        .unwrap();
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }
}
