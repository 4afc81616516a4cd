use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tracing::debug;

/// Identity of the user behind an upload token
#[derive(Debug, Clone, PartialEq)]
pub struct TokenUserInfo {
    pub user_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub vendor_name: Option<String>,
}

impl TokenUserInfo {
    /// "first last", with a missing part rendered as empty
    pub fn display_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        )
    }
}

/// Turns an upload token into a user identity
#[cfg_attr(test, mockall::automock)]
pub trait IdentityResolver: Send + Sync {
    /// `None` when the token carries no usable identity
    fn resolve(&self, token: &str) -> Option<TokenUserInfo>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenClaims {
    #[serde(alias = "sub")]
    user_id: String,
    first_name: Option<String>,
    last_name: Option<String>,
    vendor_name: Option<String>,
}

/// HS256 token verification against a shared secret
pub struct JwtIdentityResolver {
    key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityResolver {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // exp is still checked when the token carries one
        validation.set_required_spec_claims::<&str>(&[]);

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

impl IdentityResolver for JwtIdentityResolver {
    fn resolve(&self, token: &str) -> Option<TokenUserInfo> {
        let token = token.trim().trim_start_matches("Bearer ").trim();

        match decode::<TokenClaims>(token, &self.key, &self.validation) {
            Ok(data) => {
                let claims = data.claims;
                if claims.user_id.trim().is_empty() {
                    debug!("Token decoded but carries an empty user id");
                    return None;
                }
                Some(TokenUserInfo {
                    user_id: claims.user_id,
                    first_name: claims.first_name,
                    last_name: claims.last_name,
                    vendor_name: claims.vendor_name,
                })
            }
            Err(e) => {
                debug!("Failed to decode upload token: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    const SECRET: &str = "test-secret";

    fn sign(claims: serde_json::Value, secret: &str) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn resolves_user_from_signed_token() {
        let token = sign(
            json!({
                "userId": "u-42",
                "firstName": "Ada",
                "lastName": "Lovelace",
                "vendorName": "Acme",
                "exp": chrono::Utc::now().timestamp() + 3600,
            }),
            SECRET,
        );

        let user = JwtIdentityResolver::new(SECRET).resolve(&token).unwrap();
        assert_eq!(user.user_id, "u-42");
        assert_eq!(user.display_name(), "Ada Lovelace");
        assert_eq!(user.vendor_name.as_deref(), Some("Acme"));
    }

    #[test]
    fn accepts_sub_claim_and_bearer_prefix() {
        let token = sign(json!({ "sub": "u-7" }), SECRET);

        let user = JwtIdentityResolver::new(SECRET)
            .resolve(&format!("Bearer {}", token))
            .unwrap();
        assert_eq!(user.user_id, "u-7");
        assert_eq!(user.display_name(), " ");
    }

    #[test]
    fn wrong_secret_resolves_nothing() {
        let token = sign(json!({ "userId": "u-42" }), "other-secret");
        assert!(JwtIdentityResolver::new(SECRET).resolve(&token).is_none());
    }

    #[test]
    fn expired_token_resolves_nothing() {
        let token = sign(
            json!({ "userId": "u-42", "exp": chrono::Utc::now().timestamp() - 3600 }),
            SECRET,
        );
        assert!(JwtIdentityResolver::new(SECRET).resolve(&token).is_none());
    }

    #[test]
    fn garbage_resolves_nothing() {
        assert!(JwtIdentityResolver::new(SECRET).resolve("not-a-token").is_none());
    }
}
