//! Users table and the authenticated user handed to callers.
//!
//! Every other table references its owner by `user_id`, which is the
//! username.

use sea_orm::entity::prelude::*;

/// A user whose credentials were checked. Never carries the password.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub username: String,
}

impl From<Model> for User {
    fn from(model: Model) -> Self {
        Self {
            username: model.username,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,
    pub password: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
