use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::auth::types::Claims;
use crate::entities::user;

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration_hours: i64,
}

impl JwtService {
    pub fn new(secret: &str, expiration_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
            expiration_hours,
        }
    }

    pub fn generate_token(&self, user: &user::Model) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let exp = now + Duration::hours(self.expiration_hours);

        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            role: user.role.as_ref().to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Validation::default())?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthenticatedUser;
    use crate::entities::user::UserRole;

    fn teacher() -> user::Model {
        user::Model {
            id: 7,
            username: "siti".to_string(),
            password_hash: String::new(),
            role: UserRole::Teacher,
        }
    }

    #[test]
    fn token_round_trips_identity() {
        let jwt = JwtService::new("secret", 1);
        let token = jwt.generate_token(&teacher()).unwrap();

        let claims = jwt.verify_token(&token).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.role, "teacher");

        let caller = AuthenticatedUser::try_from(claims).unwrap();
        assert_eq!(caller.username, "siti");
        assert!(caller.is_teacher());
        assert!(caller.require_admin().is_err());
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = JwtService::new("one", 1).generate_token(&teacher()).unwrap();
        assert!(JwtService::new("two", 1).verify_token(&token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let jwt = JwtService::new("secret", -2);
        let token = jwt.generate_token(&teacher()).unwrap();
        assert!(jwt.verify_token(&token).is_err());
    }
}
