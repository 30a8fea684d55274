//! services/api/src/web/auth.rs
//!
//! Account endpoints: signup and login for both partitions, logout, and the
//! caller's own profile and password.

use axum::{extract::State, Extension, Json};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use pocket_tutor_core::domain::{
    Identity, NewUser, ProfileUpdate, RoleDetails, User, UserRole,
};
use pocket_tutor_core::localization::ARABIC;
use pocket_tutor_core::ports::{PortError, PortResult};
use pocket_tutor_core::validation::{check_length, check_non_negative, check_range};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::{Arc, OnceLock};
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::extract::ApiJson;
use crate::web::middleware::BearerToken;
use crate::web::rest::AckResponse;
use crate::web::state::AppState;

const MIN_PASSWORD_LENGTH: usize = 6;
const MAX_FIELD_LENGTH: usize = 200;
const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentSignupRequest {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub university_name: String,
    pub student_number: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeacherSignupRequest {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub university_name: String,
    pub years_experience: i32,
    pub gpa: f64,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Only these fields can be changed; anything else in the body is ignored.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub university_name: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub preferences: Option<Map<String, Value>>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Public view of an account. Never carries the password hash.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub user_type: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub university_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years_experience: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpa: Option<f64>,
    #[schema(value_type = Object)]
    pub preferences: Map<String, Value>,
    pub created_at: chrono::DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let user_type = user.role().to_string();
        let (student_number, years_experience, gpa) = match user.details {
            RoleDetails::Student { student_number } => (Some(student_number), None, None),
            RoleDetails::Teacher { years_experience, gpa } => {
                (None, Some(years_experience), Some(gpa))
            }
        };
        Self {
            id: user.id,
            user_type,
            name: user.name,
            phone: user.phone,
            email: user.email,
            university_name: user.university_name,
            student_number,
            years_experience,
            gpa,
            preferences: user.preferences,
            created_at: user.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: UserResponse,
}

//=========================================================================================
// Helpers
//=========================================================================================

fn is_valid_email(email: &str) -> bool {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(EMAIL_PATTERN).ok())
        .as_ref()
        .is_some_and(|re| re.is_match(email))
}

fn check_password(field: &str, password: &str) -> PortResult<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PortError::Validation(format!(
            "{} must be at least {} characters",
            field, MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

fn check_account_fields(
    name: &str,
    phone: &str,
    email: &str,
    university_name: &str,
    password: &str,
) -> PortResult<()> {
    check_length("name", name.trim(), 1, MAX_FIELD_LENGTH)?;
    check_length("phone", phone.trim(), 1, MAX_FIELD_LENGTH)?;
    check_length("universityName", university_name.trim(), 1, MAX_FIELD_LENGTH)?;
    if !is_valid_email(email) {
        return Err(PortError::Validation("email is not a valid email address".to_string()));
    }
    check_password("password", password)
}

fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            ApiError::Internal("Failed to hash password".to_string())
        })
}

fn verify_password(password: &str, hashed_password: &str) -> Result<bool, ApiError> {
    let parsed_hash = PasswordHash::new(hashed_password).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        ApiError::Internal("Authentication error".to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn default_preferences(role: UserRole) -> Map<String, Value> {
    let theme = match role {
        UserRole::Student => "light",
        UserRole::Teacher => "dark",
    };
    let mut preferences = Map::new();
    preferences.insert("language".to_string(), json!(ARABIC));
    preferences.insert("theme".to_string(), json!(theme));
    preferences
}

/// Persists the account and logs the new user straight in.
async fn register(
    state: &AppState,
    fields: (String, String, String, String),
    details: RoleDetails,
    password: &str,
) -> Result<TokenResponse, ApiError> {
    let (name, phone, email, university_name) = fields;
    let role = details.role();
    let user = state
        .db
        .create_user(NewUser {
            id: Uuid::new_v4(),
            name,
            phone,
            email,
            university_name,
            details,
            hashed_password: hash_password(password)?,
            preferences: default_preferences(role),
            created_at: Utc::now(),
        })
        .await?;
    info!(user_id = %user.id, role = %role, "Account created");
    issue_token(state, user).await
}

async fn issue_token(state: &AppState, user: User) -> Result<TokenResponse, ApiError> {
    let identity = Identity { user_id: user.id, role: user.role() };
    let session = state.identity.issue(identity, state.config.auth_token_ttl).await?;
    Ok(TokenResponse {
        access_token: session.token,
        token_type: "bearer".to_string(),
        user: user.into(),
    })
}

async fn login(state: &AppState, role: UserRole, req: LoginRequest) -> Result<TokenResponse, ApiError> {
    let credentials = match state.db.get_credentials_by_email(role, &req.email).await {
        Ok(credentials) => credentials,
        Err(PortError::NotFound(_)) => return Err(ApiError::InvalidCredentials),
        Err(e) => return Err(e.into()),
    };
    if !verify_password(&req.password, &credentials.hashed_password)? {
        return Err(ApiError::InvalidCredentials);
    }
    let user = state
        .db
        .find_user(role, credentials.user_id)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;
    info!(user_id = %user.id, role = %role, "Logged in");
    issue_token(state, user).await
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Create a student account.
#[utoipa::path(
    post,
    path = "/api/students/signup",
    request_body = StudentSignupRequest,
    responses(
        (status = 200, description = "Account created", body = TokenResponse),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Email or student number already registered")
    ),
    tag = "Accounts"
)]
pub async fn student_signup_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<StudentSignupRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    check_account_fields(&req.name, &req.phone, &req.email, &req.university_name, &req.password)?;
    check_length("studentNumber", req.student_number.trim(), 1, MAX_FIELD_LENGTH)?;

    let details = RoleDetails::Student { student_number: req.student_number };
    let fields = (req.name, req.phone, req.email, req.university_name);
    Ok(Json(register(&state, fields, details, &req.password).await?))
}

/// Create a teacher account.
#[utoipa::path(
    post,
    path = "/api/teachers/signup",
    request_body = TeacherSignupRequest,
    responses(
        (status = 200, description = "Account created", body = TokenResponse),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Email already registered")
    ),
    tag = "Accounts"
)]
pub async fn teacher_signup_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<TeacherSignupRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    check_account_fields(&req.name, &req.phone, &req.email, &req.university_name, &req.password)?;
    check_range("yearsExperience", i64::from(req.years_experience), 0, 80)?;
    check_non_negative("gpa", req.gpa)?;

    let details = RoleDetails::Teacher { years_experience: req.years_experience, gpa: req.gpa };
    let fields = (req.name, req.phone, req.email, req.university_name);
    Ok(Json(register(&state, fields, details, &req.password).await?))
}

/// Log in as a student.
#[utoipa::path(
    post,
    path = "/api/students/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Accounts"
)]
pub async fn student_login_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    Ok(Json(login(&state, UserRole::Student, req).await?))
}

/// Log in as a teacher.
#[utoipa::path(
    post,
    path = "/api/teachers/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Accounts"
)]
pub async fn teacher_login_handler(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    Ok(Json(login(&state, UserRole::Teacher, req).await?))
}

/// Revoke the bearer token used for this request.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logout successful", body = AckResponse),
        (status = 401, description = "No active session")
    ),
    security(("bearer" = [])),
    tag = "Accounts"
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Extension(BearerToken(token)): Extension<BearerToken>,
) -> Result<Json<AckResponse>, ApiError> {
    state.identity.revoke(&token).await?;
    info!(user_id = %identity.user_id, "Logged out");
    Ok(Json(AckResponse::new("Successfully logged out")))
}

/// The caller's own profile.
#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "Profile", body = UserResponse),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer" = [])),
    tag = "Accounts"
)]
pub async fn get_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .db
        .find_user(identity.role, identity.user_id)
        .await?
        .ok_or_else(|| PortError::NotFound("User not found".to_string()))?;
    Ok(Json(user.into()))
}

/// Update name, phone, university or preferences.
#[utoipa::path(
    put,
    path = "/api/profile",
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserResponse),
        (status = 400, description = "Invalid request")
    ),
    security(("bearer" = [])),
    tag = "Accounts"
)]
pub async fn update_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    ApiJson(req): ApiJson<ProfileUpdateRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    for (field, value) in [
        ("name", &req.name),
        ("phone", &req.phone),
        ("universityName", &req.university_name),
    ] {
        if let Some(value) = value {
            check_length(field, value.trim(), 1, MAX_FIELD_LENGTH)?;
        }
    }

    let update = ProfileUpdate {
        name: req.name,
        phone: req.phone,
        university_name: req.university_name,
        preferences: req.preferences,
    };
    let user = if update.is_empty() {
        state
            .db
            .find_user(identity.role, identity.user_id)
            .await?
            .ok_or_else(|| PortError::NotFound("User not found".to_string()))?
    } else {
        let user = state
            .db
            .update_user_profile(identity.role, identity.user_id, update)
            .await?;
        info!(user_id = %identity.user_id, "Profile updated");
        user
    };
    Ok(Json(user.into()))
}

/// Replace the password after checking the current one.
#[utoipa::path(
    post,
    path = "/api/profile/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = AckResponse),
        (status = 400, description = "Current password incorrect or new password too short")
    ),
    security(("bearer" = [])),
    tag = "Accounts"
)]
pub async fn change_password_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    ApiJson(req): ApiJson<ChangePasswordRequest>,
) -> Result<Json<AckResponse>, ApiError> {
    let credentials = state
        .db
        .get_credentials_by_id(identity.role, identity.user_id)
        .await?;
    if !verify_password(&req.current_password, &credentials.hashed_password)? {
        return Err(PortError::Validation("Incorrect current password".to_string()).into());
    }
    check_password("newPassword", &req.new_password)?;

    let hashed = hash_password(&req.new_password)?;
    state
        .db
        .update_password_hash(identity.role, identity.user_id, &hashed)
        .await?;
    info!(user_id = %identity.user_id, "Password changed");
    Ok(Json(AckResponse::new("Password changed successfully")))
}
