use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::error::SessionError;

/// The claim set for JWS and JWE sessions. Built at issuance with `serde`; read back at
/// validation field-by-field (not via `Deserialize`) because each missing/malformed field needs
/// its own error kind (`ClaimExpMissing`, `ClaimJtiMissing`, `ClaimJtiInvalid`).
#[derive(Serialize)]
pub struct SessionClaims {
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub sub: String,
    pub tenant_id: Uuid,
    pub realm_id: Uuid,
}

pub struct ParsedClaims {
    pub jti: Uuid,
    pub exp: i64,
    pub sub: String,
    pub tenant_id: Uuid,
    pub realm_id: Uuid,
}

/// Reads `exp`, `jti`, `sub`, `tenant_id`, `realm_id` out of a decoded claim set, one field at a
/// time, so a missing or malformed field is reported with its own specific error kind rather
/// than a single generic deserialize error.
pub fn parse_claims(claims: &Value) -> Result<ParsedClaims, SessionError> {
    let exp = claims
        .get("exp")
        .and_then(Value::as_i64)
        .ok_or(SessionError::ClaimExpMissing)?;

    let jti_str = claims
        .get("jti")
        .and_then(Value::as_str)
        .ok_or(SessionError::ClaimJtiMissing)?;
    let jti = Uuid::parse_str(jti_str).map_err(|_| SessionError::ClaimJtiInvalid)?;

    let sub = claims
        .get("sub")
        .and_then(Value::as_str)
        .ok_or(SessionError::TokenMalformed)?
        .to_owned();

    let tenant_id = claims
        .get("tenant_id")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or(SessionError::TokenMalformed)?;

    let realm_id = claims
        .get("realm_id")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or(SessionError::TokenMalformed)?;

    Ok(ParsedClaims {
        jti,
        exp,
        sub,
        tenant_id,
        realm_id,
    })
}
