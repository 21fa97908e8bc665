use async_graphql::{Context, ErrorExtensions, Result};

use crate::auth::AuthenticatedUser;
use crate::error::ServiceError;

/// Authorization guard for checking if user is authenticated
pub fn require_auth<'ctx>(ctx: &'ctx Context<'_>) -> Result<&'ctx AuthenticatedUser> {
    ctx.data_opt::<AuthenticatedUser>()
        .ok_or_else(|| ServiceError::Authentication("Authentication required".to_string()).extend())
}
