use core::fmt;
use std::str::FromStr;

/// The concrete JWS signature algorithm backing a JWS session class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JwsAlgorithm {
    Rs256,
    Rs384,
    Rs512,
    Es256,
    Es384,
    Es512,
    EdDsa,
    Hs256,
    Hs384,
    Hs512,
}

impl JwsAlgorithm {
    pub fn is_symmetric(self) -> bool {
        matches!(self, Self::Hs256 | Self::Hs384 | Self::Hs512)
    }
}

impl FromStr for JwsAlgorithm {
    type Err = UnsupportedAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RS256" => Ok(Self::Rs256),
            "RS384" => Ok(Self::Rs384),
            "RS512" => Ok(Self::Rs512),
            "ES256" => Ok(Self::Es256),
            "ES384" => Ok(Self::Es384),
            "ES512" => Ok(Self::Es512),
            "EdDSA" => Ok(Self::EdDsa),
            "HS256" => Ok(Self::Hs256),
            "HS384" => Ok(Self::Hs384),
            "HS512" => Ok(Self::Hs512),
            other => Err(UnsupportedAlgorithm {
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for JwsAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Rs256 => "RS256",
            Self::Rs384 => "RS384",
            Self::Rs512 => "RS512",
            Self::Es256 => "ES256",
            Self::Es384 => "ES384",
            Self::Es512 => "ES512",
            Self::EdDsa => "EdDSA",
            Self::Hs256 => "HS256",
            Self::Hs384 => "HS384",
            Self::Hs512 => "HS512",
        };
        write!(f, "{s}")
    }
}

/// The concrete JWE content-encryption/key-management pair backing a JWE session class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JweAlgorithm {
    /// Direct encryption with a 256-bit content key (`dir+A256GCM`).
    DirA256Gcm,
    /// AES key-wrap over a 256-bit content key (`A256GCMKW+A256GCM`).
    A256GcmKwA256Gcm,
}

impl FromStr for JweAlgorithm {
    type Err = UnsupportedAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dir+A256GCM" => Ok(Self::DirA256Gcm),
            "A256GCMKW+A256GCM" => Ok(Self::A256GcmKwA256Gcm),
            other => Err(UnsupportedAlgorithm {
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for JweAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::DirA256Gcm => "dir+A256GCM",
            Self::A256GcmKwA256Gcm => "A256GCMKW+A256GCM",
        };
        write!(f, "{s}")
    }
}

/// Closed dispatch set over the three credential shapes a session class can use.
///
/// Carrying the concrete algorithm inside the `Jws`/`Jwe` variants (rather than alongside as a
/// separate string field) makes "JWS with no algorithm configured" unrepresentable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionAlgorithm {
    Opaque,
    Jws(JwsAlgorithm),
    Jwe(JweAlgorithm),
}

impl fmt::Display for SessionAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Opaque => write!(f, "OPAQUE"),
            Self::Jws(alg) => write!(f, "JWS({alg})"),
            Self::Jwe(alg) => write!(f, "JWE({alg})"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UnsupportedAlgorithm {
    pub value: String,
}

impl fmt::Display for UnsupportedAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported algorithm: {}", self.value)
    }
}

impl std::error::Error for UnsupportedAlgorithm {}
