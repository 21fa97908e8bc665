//! `SeaORM` Entity, administrator or teacher account

use async_graphql::Enum;
use sea_orm::entity::prelude::*;
use strum::{AsRefStr, EnumString};

#[derive(
    Enum, Copy, Clone, Eq, PartialEq, Debug, DeriveActiveEnum, EnumIter, AsRefStr, EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[graphql(name = "UserRole")]
#[strum(serialize_all = "snake_case")]
pub enum UserRole {
    #[graphql(name = "ADMIN")]
    #[sea_orm(string_value = "admin")]
    Admin,
    #[graphql(name = "TEACHER")]
    #[sea_orm(string_value = "teacher")]
    Teacher,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    pub password_hash: String,
    pub role: UserRole,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
