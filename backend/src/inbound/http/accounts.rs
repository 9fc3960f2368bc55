//! Account API handlers: registration, login and token verification.
//!
//! ```text
//! POST /api/register {"username":"ada","password":"secret"}
//! POST /api/login {"username":"ada","password":"secret"}
//! GET /api/auth/verify (Authorization: Bearer <token>)
//! POST /api/admin/register {"username":"staff","password":"secret"}
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Account, Error, LoginCredentials, Registration, Role};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedAccount;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::credential_error;

/// Registration body shared by customer and admin registration.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl TryFrom<&RegisterRequest> for Registration {
    type Error = Error;

    fn try_from(value: &RegisterRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(
            &value.username,
            &value.password,
            value.email.as_deref(),
            value.phone.as_deref(),
        )
        .map_err(credential_error)
    }
}

/// Login body for `POST /api/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Account as exposed to clients. Never carries the password hash.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: String,
    pub username: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Role,
    pub is_guest: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for UserDto {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.to_string(),
            username: account.username.clone(),
            email: account.email.clone(),
            phone: account.phone.clone(),
            role: account.role,
            is_guest: account.is_guest,
            is_verified: account.is_verified,
            created_at: account.created_at,
        }
    }
}

/// `{ "user": ... }` envelope.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserEnvelope {
    pub user: UserDto,
}

impl From<&Account> for UserEnvelope {
    fn from(account: &Account) -> Self {
        Self {
            user: UserDto::from(account),
        }
    }
}

/// Successful login payload.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Bearer token valid for seven days.
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserDto,
}

/// Register a customer account.
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserEnvelope),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Username or email already taken", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration = Registration::try_from(&payload.into_inner())?;
    let account = state.accounts.register(&registration).await?;
    Ok(HttpResponse::Created().json(UserEnvelope::from(&account)))
}

/// Exchange a username and password for a bearer token.
///
/// Rate limited per client address; see [`crate::middleware::LoginRateLimit`].
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = LoginResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 404, description = "Unknown user", body = Error),
        (status = 429, description = "Too many login attempts", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<LoginResponse>> {
    let LoginRequest { username, password } = payload.into_inner();
    let credentials =
        LoginCredentials::try_from_parts(&username, &password).map_err(credential_error)?;
    let outcome = state.accounts.login(&credentials).await?;
    Ok(web::Json(LoginResponse {
        token: outcome.token.token,
        expires_at: outcome.token.expires_at,
        user: UserDto::from(&outcome.account),
    }))
}

/// Return the account behind the bearer token.
#[utoipa::path(
    get,
    path = "/api/auth/verify",
    responses(
        (status = 200, description = "Token is valid", body = UserEnvelope),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "verifyToken",
    security(("bearer" = []))
)]
#[get("/auth/verify")]
pub async fn verify(auth: AuthenticatedAccount) -> web::Json<UserEnvelope> {
    web::Json(UserEnvelope::from(auth.account()))
}

/// Register a staff admin. Requires `super_admin`.
#[utoipa::path(
    post,
    path = "/api/admin/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Admin created", body = UserEnvelope),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 409, description = "Username or email already taken", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["accounts"],
    operation_id = "registerAdmin",
    security(("bearer" = []))
)]
#[post("/admin/register")]
pub async fn register_admin(
    auth: AuthenticatedAccount,
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    auth.require(Role::SuperAdmin)?;
    let registration = Registration::try_from(&payload.into_inner())?;
    let account = state.accounts.register_admin(&registration).await?;
    Ok(HttpResponse::Created().json(UserEnvelope::from(&account)))
}
