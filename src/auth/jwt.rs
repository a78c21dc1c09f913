use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;

use crate::config::jwt::JwtSettings;
use crate::models::user::{Claims, Role};

/// Sign a token for the given account. `sub` carries the numeric id.
pub fn generate_token(
    id_usuario: i32,
    username: &str,
    role: Role,
    settings: &JwtSettings,
) -> Result<String, jsonwebtoken::errors::Error> {
    let expires_at = Utc::now() + Duration::hours(settings.expiration_hours);

    let claims = Claims {
        sub: id_usuario.to_string(),
        username: username.to_string(),
        role,
        exp: expires_at.timestamp() as usize,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(settings.secret.expose_secret().as_bytes()),
    )
}

/// Check signature and expiry, returning the claims.
pub fn decode_token(token: &str, settings: &JwtSettings) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.secret.expose_secret().as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;

    Ok(token_data.claims)
}
