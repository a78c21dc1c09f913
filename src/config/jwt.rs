use secrecy::SecretString;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct JwtSettings {
    pub secret: SecretString,
    pub expiration_hours: i64,
}

impl JwtSettings {
    pub fn new(secret: SecretString, expiration_hours: i64) -> Self {
        Self {
            secret,
            expiration_hours,
        }
    }
}
