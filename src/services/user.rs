use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info, warn};

use crate::auth::{AuthenticatedUser, JwtService, hash_password, verify_password};
use crate::entities::{
    prelude::*,
    teaching_assignment,
    user::{self, UserRole},
};
use crate::error::{DbResultExt, ServiceError, ServiceResult, required};

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Accounts and sign-in.
#[derive(Clone)]
pub struct UserService {
    db: DatabaseConnection,
    jwt_service: JwtService,
    bcrypt_cost: u32,
}

pub(crate) async fn find_user<C: ConnectionTrait>(conn: &C, id: i32) -> ServiceResult<user::Model> {
    User::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("User {id} not found")))
}

impl UserService {
    pub fn new(db: DatabaseConnection, jwt_service: JwtService, bcrypt_cost: u32) -> Self {
        Self {
            db,
            jwt_service,
            bcrypt_cost,
        }
    }

    /// Returns the account and a signed access token. Unknown usernames and
    /// wrong passwords fail with the same message.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> ServiceResult<(user::Model, String)> {
        let account = User::find()
            .filter(user::Column::Username.eq(username.trim()))
            .one(&self.db)
            .await?;

        let account = match account {
            Some(account) if verify_password(password, &account.password_hash) => account,
            _ => {
                warn!("Failed sign-in attempt for username {}", username.trim());
                return Err(ServiceError::Authentication(INVALID_CREDENTIALS.to_string()));
            }
        };

        let token = self.jwt_service.generate_token(&account)?;

        info!(user_id = account.id, "User {} signed in", account.username);
        Ok((account, token))
    }

    pub async fn find_user_by_id(&self, id: i32) -> ServiceResult<Option<user::Model>> {
        let account = User::find_by_id(id).one(&self.db).await?;
        Ok(account)
    }

    pub async fn list_users(
        &self,
        caller: &AuthenticatedUser,
        role: Option<UserRole>,
    ) -> ServiceResult<Vec<user::Model>> {
        caller.require_admin()?;

        let mut query = User::find();
        if let Some(role) = role {
            query = query.filter(user::Column::Role.eq(role));
        }

        let users = query
            .order_by_asc(user::Column::Username)
            .all(&self.db)
            .await?;
        Ok(users)
    }

    pub async fn create_user(
        &self,
        caller: &AuthenticatedUser,
        username: &str,
        password: &str,
        role: UserRole,
    ) -> ServiceResult<user::Model> {
        caller.require_admin()?;
        let username = required("Username", username)?;
        if password.trim().is_empty() {
            return Err(ServiceError::validation("Password must not be empty"));
        }

        let password_hash = hash_password(password, self.bcrypt_cost)?;

        let created = user::ActiveModel {
            username: Set(username.clone()),
            password_hash: Set(password_hash),
            role: Set(role),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .or_duplicate(|| format!("Username '{username}' is already taken"))?;

        info!(user_id = created.id, role = created.role.as_ref(), "Created user {}", created.username);
        Ok(created)
    }

    /// A blank or missing password keeps the current one. Admins cannot
    /// change their own role; a teacher who stops being one loses their
    /// teaching assignments.
    pub async fn update_user(
        &self,
        caller: &AuthenticatedUser,
        id: i32,
        username: &str,
        password: Option<&str>,
        role: UserRole,
    ) -> ServiceResult<user::Model> {
        caller.require_admin()?;
        let username = required("Username", username)?;
        let password_hash = match password.filter(|p| !p.trim().is_empty()) {
            Some(password) => Some(hash_password(password, self.bcrypt_cost)?),
            None => None,
        };

        let tx = self.db.begin().await?;

        let existing = find_user(&tx, id).await?;
        if caller.id == id && existing.role != role {
            return Err(ServiceError::validation("You cannot change your own role"));
        }
        let leaves_teaching = existing.role == UserRole::Teacher && role != UserRole::Teacher;

        let mut user_active: user::ActiveModel = existing.into();
        user_active.username = Set(username.clone());
        user_active.role = Set(role);
        if let Some(password_hash) = password_hash {
            user_active.password_hash = Set(password_hash);
        }

        let updated = user_active
            .update(&tx)
            .await
            .or_duplicate(|| format!("Username '{username}' is already taken"))?;

        if leaves_teaching {
            let dropped = TeachingAssignment::delete_many()
                .filter(teaching_assignment::Column::UserId.eq(id))
                .exec(&tx)
                .await?;
            info!(
                user_id = id,
                assignments = dropped.rows_affected,
                "User {} is no longer a teacher",
                updated.username
            );
        }

        tx.commit().await?;
        Ok(updated)
    }

    /// Rebuilds a token's identity from the stored account, so role changes
    /// and deletions take effect before the token expires. `None` when the
    /// account is gone.
    pub async fn resolve_caller(
        &self,
        claimed: &AuthenticatedUser,
    ) -> ServiceResult<Option<AuthenticatedUser>> {
        let account = User::find_by_id(claimed.id).one(&self.db).await?;
        if account.is_none() {
            debug!(user_id = claimed.id, "Token refers to a deleted account");
        }
        Ok(account.as_ref().map(AuthenticatedUser::from))
    }

    /// Grades the user recorded stay in place.
    pub async fn delete_user(&self, caller: &AuthenticatedUser, id: i32) -> ServiceResult<()> {
        caller.require_admin()?;
        if caller.id == id {
            return Err(ServiceError::validation("You cannot delete your own account"));
        }

        let tx = self.db.begin().await?;

        let existing = find_user(&tx, id).await?;

        let assignments = TeachingAssignment::delete_many()
            .filter(teaching_assignment::Column::UserId.eq(id))
            .exec(&tx)
            .await?;

        User::delete_by_id(id).exec(&tx).await?;
        tx.commit().await?;

        info!(
            user_id = id,
            assignments = assignments.rows_affected,
            "Deleted user {}",
            existing.username
        );
        Ok(())
    }
}
