use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::entities::user::{self, UserRole};
use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32, // user id
    pub username: String,
    pub role: String,
    pub exp: i64, // expiration timestamp
    pub iat: i64, // issued at timestamp
}

/// Identity of the caller, passed explicitly into every service operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: i32,
    pub username: String,
    pub role: UserRole,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn is_teacher(&self) -> bool {
        self.role == UserRole::Teacher
    }

    pub fn require_admin(&self) -> ServiceResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ServiceError::forbidden("Administrator access required"))
        }
    }

    pub fn require_teacher(&self) -> ServiceResult<()> {
        if self.is_teacher() {
            Ok(())
        } else {
            Err(ServiceError::forbidden("Only teachers can access grade entry"))
        }
    }
}

impl TryFrom<Claims> for AuthenticatedUser {
    type Error = ServiceError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let role = UserRole::from_str(&claims.role)
            .map_err(|_| ServiceError::Authentication(format!("Unknown role: {}", claims.role)))?;

        Ok(Self {
            id: claims.sub,
            username: claims.username,
            role,
        })
    }
}

impl From<&user::Model> for AuthenticatedUser {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
        }
    }
}
