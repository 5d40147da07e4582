use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, User, bills, budgets, categories, transactions, users,
    util::normalize_required_name, wallets,
};

use super::Engine;

/// Generates a `require_*` method that loads a row owned by the user or
/// fails with `KeyNotFound`.
macro_rules! impl_require_owned {
    ($require_fn:ident, $entity:path, $model:path, $user_col:expr, $err_msg:literal) => {
        pub(super) async fn $require_fn<C: ConnectionTrait>(
            &self,
            db: &C,
            user_id: &str,
            id: Uuid,
        ) -> ResultEngine<$model> {
            <$entity>::find_by_id(id)
                .filter($user_col.eq(user_id))
                .one(db)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound($err_msg.to_string()))
        }
    };
}

impl Engine {
    impl_require_owned!(
        require_wallet,
        wallets::Entity,
        wallets::Model,
        wallets::Column::UserId,
        "wallet not exists"
    );

    impl_require_owned!(
        require_category,
        categories::Entity,
        categories::Model,
        categories::Column::UserId,
        "category not exists"
    );

    impl_require_owned!(
        require_transaction,
        transactions::Entity,
        transactions::Model,
        transactions::Column::UserId,
        "transaction not exists"
    );

    impl_require_owned!(
        require_budget,
        budgets::Entity,
        budgets::Model,
        budgets::Column::UserId,
        "budget not exists"
    );

    impl_require_owned!(
        require_bill_reminder,
        bills::Entity,
        bills::Model,
        bills::Column::UserId,
        "bill reminder not exists"
    );

    /// Checks an optional category reference.
    pub(super) async fn require_optional_category<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: &str,
        category_id: Option<Uuid>,
    ) -> ResultEngine<()> {
        if let Some(category_id) = category_id {
            self.require_category(db, user_id, category_id).await?;
        }
        Ok(())
    }

    /// Checks Basic credentials. Unknown users and wrong passwords both give
    /// `None`.
    pub async fn authenticate(&self, username: &str, password: &str) -> ResultEngine<Option<User>> {
        if username.is_empty() || password.is_empty() {
            return Ok(None);
        }
        let user = users::Entity::find_by_id(username.to_string())
            .filter(users::Column::Password.eq(password))
            .one(&self.database)
            .await?;
        Ok(user.map(User::from))
    }

    /// Registers a user. Passwords are stored as given; the HTTP layer
    /// compares them verbatim.
    pub async fn create_user(&self, username: &str, password: &str) -> ResultEngine<()> {
        let username = normalize_required_name(username, "user")?;
        if password.is_empty() {
            return Err(EngineError::InvalidName(
                "password must not be empty".to_string(),
            ));
        }
        if users::Entity::find_by_id(username.clone())
            .one(&self.database)
            .await?
            .is_some()
        {
            return Err(EngineError::ExistingKey(username));
        }

        users::ActiveModel {
            username: ActiveValue::Set(username.clone()),
            password: ActiveValue::Set(password.to_string()),
        }
        .insert(&self.database)
        .await?;
        tracing::info!(%username, "user created");
        Ok(())
    }
}
