use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Access/refresh token pair issued by the backend.
///
/// Both halves are required together; a pair with only one valid token is
/// never stored. Absence of the pair means "no session".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    #[serde(
        serialize_with = "serialize_secret",
        deserialize_with = "deserialize_secret"
    )]
    pub access: SecretString,
    #[serde(
        serialize_with = "serialize_secret",
        deserialize_with = "deserialize_secret"
    )]
    pub refresh: SecretString,
}

impl TokenPair {
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        TokenPair {
            access: SecretString::new(access.into()),
            refresh: SecretString::new(refresh.into()),
        }
    }
}

// Custom serialization for SecretString
pub fn serialize_secret<S>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::ser::Serializer,
{
    serializer.serialize_str(secret.expose_secret())
}

pub fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: serde::de::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(SecretString::new(s))
}

/// Account record as served by `/auth/profile/`.
///
/// The server holds the authoritative copy; the locally cached one is a
/// read-optimization that is overwritten wholesale on login/register/bootstrap
/// and patched in place by `SessionManager::update_user`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

/// Partial update for the mutable user fields. `None` leaves a field as-is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl User {
    /// Merges the patch into this record, field by field.
    pub fn apply(&mut self, patch: &UserPatch) {
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
        if let Some(full_name) = &patch.full_name {
            self.full_name = Some(full_name.clone());
        }
        if let Some(profile_picture) = &patch.profile_picture {
            self.profile_picture = Some(profile_picture.clone());
        }
        if let Some(phone_number) = &patch.phone_number {
            self.phone_number = Some(phone_number.clone());
        }
        if let Some(location) = &patch.location {
            self.location = Some(location.clone());
        }
        if let Some(bio) = &patch.bio {
            self.bio = Some(bio.clone());
        }
    }
}

// --- Auth endpoint wire types ---

/// Body of `/auth/login/` and `/auth/token/refresh/` responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access: String,
    pub refresh: String,
}

/// Body sent to `/auth/register/`. The `password == password2` check is the
/// caller's job; the server re-validates anyway.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password2: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// `/auth/register/` returns the created user and a token pair in one shot.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    pub user: User,
    pub tokens: TokenResponse,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error body shape used by the backend for non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Everything the client persists between runs, as one record so that
/// clearing tokens and the cached user is a single write.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredSession {
    #[serde(default)]
    pub tokens: Option<TokenPair>,
    #[serde(default)]
    pub user: Option<User>,
}
