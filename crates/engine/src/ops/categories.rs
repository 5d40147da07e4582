use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    Category, CategoryInput, EngineError, ResultEngine, budgets, categories, transactions,
    util::{name_key, normalize_required_name},
};

use super::{Engine, with_tx};

impl Engine {
    /// Lists the user's categories ordered by name.
    pub async fn list_categories(&self, user_id: &str) -> ResultEngine<Vec<Category>> {
        categories::Entity::find()
            .filter(categories::Column::UserId.eq(user_id))
            .order_by_asc(categories::Column::NameNorm)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Category::try_from)
            .collect()
    }

    pub async fn category(&self, user_id: &str, category_id: Uuid) -> ResultEngine<Category> {
        let model = self
            .require_category(&self.database, user_id, category_id)
            .await?;
        Category::try_from(model)
    }

    /// Creates a category. Names are unique per user after normalization, so
    /// "Café" and "cafe" collide.
    pub async fn create_category(
        &self,
        user_id: &str,
        input: CategoryInput,
    ) -> ResultEngine<Category> {
        let name = normalize_required_name(&input.name, "category")?;
        let name_norm = name_key(&name)?;

        with_tx!(self, |db_tx| {
            self.ensure_category_name_free(&db_tx, user_id, &name_norm, None)
                .await?;

            let category = Category {
                id: Uuid::new_v4(),
                name,
                kind: input.kind,
            };
            let mut model: categories::ActiveModel = (&category).into();
            model.user_id = ActiveValue::Set(user_id.to_string());
            model.name_norm = ActiveValue::Set(name_norm);
            model.insert(&db_tx).await?;
            Ok(category)
        })
    }

    pub async fn update_category(
        &self,
        user_id: &str,
        category_id: Uuid,
        input: CategoryInput,
    ) -> ResultEngine<Category> {
        let name = normalize_required_name(&input.name, "category")?;
        let name_norm = name_key(&name)?;

        with_tx!(self, |db_tx| {
            self.require_category(&db_tx, user_id, category_id).await?;
            self.ensure_category_name_free(&db_tx, user_id, &name_norm, Some(category_id))
                .await?;

            let category = Category {
                id: category_id,
                name,
                kind: input.kind,
            };
            let mut model: categories::ActiveModel = (&category).into();
            model.name_norm = ActiveValue::Set(name_norm);
            model.update(&db_tx).await?;
            Ok(category)
        })
    }

    /// Deletes a category.
    ///
    /// Transactions keep existing and lose their category. A category still
    /// scoping a budget cannot be deleted.
    pub async fn delete_category(&self, user_id: &str, category_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_category(&db_tx, user_id, category_id).await?;

            if let Some(budget) = budgets::Entity::find()
                .filter(budgets::Column::UserId.eq(user_id))
                .filter(budgets::Column::CategoryId.eq(category_id))
                .one(&db_tx)
                .await?
            {
                return Err(EngineError::InUse(format!(
                    "category is used by budget '{}'",
                    budget.name
                )));
            }

            transactions::Entity::update_many()
                .col_expr(
                    transactions::Column::CategoryId,
                    Expr::value(Option::<Uuid>::None),
                )
                .filter(transactions::Column::CategoryId.eq(category_id))
                .exec(&db_tx)
                .await?;
            categories::Entity::delete_by_id(category_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    async fn ensure_category_name_free(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        name_norm: &str,
        except: Option<Uuid>,
    ) -> ResultEngine<()> {
        let mut query = categories::Entity::find()
            .filter(categories::Column::UserId.eq(user_id))
            .filter(categories::Column::NameNorm.eq(name_norm));
        if let Some(category_id) = except {
            query = query.filter(categories::Column::Id.ne(category_id));
        }
        if let Some(existing) = query.one(db_tx).await? {
            return Err(EngineError::ExistingKey(existing.name));
        }
        Ok(())
    }
}
