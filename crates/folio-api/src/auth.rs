use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::{info, warn};

use folio_types::api::{LoginRequest, LoginResponse};

use crate::error::{ApiError, FieldErrors};
use crate::extract::Payload;
use crate::state::{AppState, run_db};

/// Hash a password with Argon2id into a PHC string.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Password hashing failed: {}", e))?
        .to_string();
    Ok(hash)
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Payload<LoginRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    // Login reports every input problem as 400, not the usual 403
    let Payload(req) = payload.map_err(|e| match e {
        ApiError::Validation(_, errors) => ApiError::Validation(StatusCode::BAD_REQUEST, errors),
        other => other,
    })?;

    let mut errors = FieldErrors::default();
    errors.check_email("email", &req.email);
    errors.check_length("password", &req.password, 6, 20);
    if !errors.is_empty() {
        return Err(ApiError::Validation(StatusCode::BAD_REQUEST, errors));
    }

    let email = req.email.clone();
    let admin = run_db(&state, move |db| db.get_admin_by_email(&email))
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let parsed_hash = PasswordHash::new(&admin.password)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Stored password hash is invalid: {}", e)))?;

    if Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        warn!("Rejected login for {}", req.email);
        return Err(ApiError::Forbidden("Incorrect password.".into()));
    }

    let bearer = state.session.login();
    info!("Admin {} logged in", admin.username);

    Ok(Json(LoginResponse {
        bearer,
        user: admin.into(),
    }))
}

pub async fn logout(State(state): State<AppState>) -> StatusCode {
    state.session.logout();
    info!("Admin logged out");
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_verify() {
        let hash = hash_password("password").unwrap();
        assert!(hash.starts_with("$argon2id$"));

        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(Argon2::default().verify_password(b"password", &parsed).is_ok());
        assert!(Argon2::default().verify_password(b"hunter22", &parsed).is_err());
    }
}
