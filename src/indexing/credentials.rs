//! Service-account credentials.
//!
//! A Google service-account key file is JSON holding, among other things,
//! the account's e-mail, an RSA private key and the token endpoint.  An
//! access token is obtained by signing a short-lived JWT with that key and
//! exchanging it at the token endpoint (RFC 7523 JWT-bearer grant).  One
//! token is fetched per run; it is never refreshed or cached.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::error::CredentialsError;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// The fields of a service-account key file this tool needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Claims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Bearer token returned by the token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self, CredentialsError> {
        let data = std::fs::read_to_string(path).map_err(|source| CredentialsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| CredentialsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Build the signed JWT presented to the token endpoint.
    pub fn assertion(&self, scope: &str, now: DateTime<Utc>) -> Result<String, CredentialsError> {
        let claims = Claims {
            iss: self.client_email.clone(),
            scope: scope.to_string(),
            aud: self.token_uri.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ASSERTION_LIFETIME_SECS)).timestamp(),
        };
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.private_key_id.clone();

        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())?;
        Ok(jsonwebtoken::encode(&header, &claims, &key)?)
    }

    /// Exchange a fresh assertion for an access token.
    pub fn fetch_token(&self, client: &Client, scope: &str) -> Result<AccessToken, CredentialsError> {
        let assertion = self.assertion(scope, Utc::now())?;
        let token: AccessToken = client
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()?
            .error_for_status()?
            .json()?;
        tracing::debug!(
            "Obtained access token for {} (expires in {:?}s)",
            self.client_email,
            token.expires_in
        );
        Ok(token)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::test_support::{self, MockServer, Reply};
    use jsonwebtoken::{DecodingKey, Validation};
    use tempfile::TempDir;

    pub const TEST_PRIVATE_KEY: &str =
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/test_private_key.pem"));
    const TEST_PUBLIC_KEY: &str =
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/test_public_key.pem"));

    /// Write a key file whose token endpoint is `token_uri`.
    pub fn write_key_file(dir: &TempDir, token_uri: &str) -> std::path::PathBuf {
        let path = dir.path().join("key.json");
        let key = serde_json::json!({
            "type": "service_account",
            "project_id": "test-project",
            "private_key_id": "kid-1",
            "private_key": TEST_PRIVATE_KEY,
            "client_email": "indexer@test-project.iam.gserviceaccount.com",
            "client_id": "1234567890",
            "token_uri": token_uri,
        });
        std::fs::write(&path, key.to_string()).unwrap();
        path
    }

    #[test]
    fn loads_key_file() {
        let dir = TempDir::new().unwrap();
        let path = write_key_file(&dir, "https://oauth2.example.com/token");

        let key = ServiceAccountKey::from_file(&path).unwrap();

        assert_eq!(key.client_email, "indexer@test-project.iam.gserviceaccount.com");
        assert_eq!(key.private_key_id.as_deref(), Some("kid-1"));
        assert_eq!(key.token_uri, "https://oauth2.example.com/token");
    }

    #[test]
    fn token_uri_defaults_to_google() {
        let key: ServiceAccountKey =
            serde_json::from_str(r#"{"client_email": "a@b", "private_key": "pk"}"#).unwrap();
        assert_eq!(key.token_uri, DEFAULT_TOKEN_URI);
    }

    #[test]
    fn missing_key_file_is_read_error() {
        let dir = TempDir::new().unwrap();
        let err = ServiceAccountKey::from_file(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, CredentialsError::Read { .. }));
    }

    #[test]
    fn non_key_json_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("key.json");
        std::fs::write(&path, r#"{"hello": "world"}"#).unwrap();

        let err = ServiceAccountKey::from_file(&path).unwrap_err();
        assert!(matches!(err, CredentialsError::Parse { .. }));
    }

    #[test]
    fn assertion_is_signed_with_expected_claims() {
        let dir = TempDir::new().unwrap();
        let key = ServiceAccountKey::from_file(&write_key_file(&dir, "https://oauth2.example.com/token")).unwrap();
        let now = Utc::now();

        let jwt = key.assertion(crate::indexing::INDEXING_SCOPE, now).unwrap();

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&["https://oauth2.example.com/token"]);
        let decoded = jsonwebtoken::decode::<Claims>(
            &jwt,
            &DecodingKey::from_rsa_pem(TEST_PUBLIC_KEY.as_bytes()).unwrap(),
            &validation,
        )
        .unwrap();

        assert_eq!(decoded.header.kid.as_deref(), Some("kid-1"));
        assert_eq!(decoded.claims.iss, "indexer@test-project.iam.gserviceaccount.com");
        assert_eq!(decoded.claims.scope, "https://www.googleapis.com/auth/indexing");
        assert_eq!(decoded.claims.iat, now.timestamp());
        assert_eq!(decoded.claims.exp - decoded.claims.iat, ASSERTION_LIFETIME_SECS);
    }

    #[test]
    fn invalid_private_key_is_signing_error() {
        let key = ServiceAccountKey {
            client_email: "a@b".into(),
            private_key: "not a pem".into(),
            private_key_id: None,
            token_uri: DEFAULT_TOKEN_URI.into(),
        };
        let err = key.assertion("scope", Utc::now()).unwrap_err();
        assert!(matches!(err, CredentialsError::Signing(_)));
    }

    #[test]
    fn fetch_token_posts_jwt_bearer_grant() {
        let server = MockServer::start(|_| {
            Reply::new(
                200,
                "application/json",
                r#"{"access_token": "ya29.test", "expires_in": 3599, "token_type": "Bearer"}"#,
            )
        });
        let dir = TempDir::new().unwrap();
        let key = ServiceAccountKey::from_file(&write_key_file(&dir, &server.url("/token"))).unwrap();

        let token = key
            .fetch_token(&test_support::client("test"), crate::indexing::INDEXING_SCOPE)
            .unwrap();

        assert_eq!(token.access_token, "ya29.test");
        assert_eq!(token.expires_in, Some(3599));
        let requests = server.requests();
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].path, "/token");
        assert!(requests[0]
            .body
            .contains("grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer"));
        assert!(requests[0].body.contains("assertion="));
    }

    #[test]
    fn rejected_token_exchange_is_token_error() {
        let server = MockServer::start(|_| {
            Reply::new(400, "application/json", r#"{"error": "invalid_grant"}"#)
        });
        let dir = TempDir::new().unwrap();
        let key = ServiceAccountKey::from_file(&write_key_file(&dir, &server.url("/token"))).unwrap();

        let err = key
            .fetch_token(&test_support::client("test"), crate::indexing::INDEXING_SCOPE)
            .unwrap_err();
        assert!(matches!(err, CredentialsError::Token(_)));
    }
}
