use anyhow::{Context, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::{ratings, stores, users};

pub struct RatingRepository {
    conn: DatabaseConnection,
}

impl RatingRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Create-or-overwrite the caller's rating for a store, keyed on the
    /// (user_id, store_id) unique index. Concurrent submissions for the
    /// same pair serialize on that index; last write wins.
    pub async fn upsert(&self, user_id: i32, store_id: i32, rating: i32) -> Result<ratings::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = ratings::ActiveModel {
            user_id: Set(user_id),
            store_id: Set(store_id),
            rating: Set(rating),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        ratings::Entity::insert(active)
            .on_conflict(
                OnConflict::columns([ratings::Column::UserId, ratings::Column::StoreId])
                    .update_columns([ratings::Column::Rating, ratings::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec(&self.conn)
            .await
            .context("Failed to upsert rating")?;

        let row = ratings::Entity::find()
            .filter(ratings::Column::UserId.eq(user_id))
            .filter(ratings::Column::StoreId.eq(store_id))
            .one(&self.conn)
            .await
            .context("Failed to read back upserted rating")?
            .ok_or_else(|| anyhow::anyhow!("Upserted rating vanished"))?;

        Ok(row)
    }

    /// All ratings authored by a user, newest first, with the rated store.
    pub async fn list_for_user(
        &self,
        user_id: i32,
    ) -> Result<Vec<(ratings::Model, Option<stores::Model>)>> {
        let rows = ratings::Entity::find()
            .filter(ratings::Column::UserId.eq(user_id))
            .find_also_related(stores::Entity)
            .order_by_desc(ratings::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to query ratings for user")?;

        Ok(rows)
    }

    /// All ratings received by a store, newest first, with the author.
    pub async fn list_for_store(
        &self,
        store_id: i32,
    ) -> Result<Vec<(ratings::Model, Option<users::Model>)>> {
        let rows = ratings::Entity::find()
            .filter(ratings::Column::StoreId.eq(store_id))
            .find_also_related(users::Entity)
            .order_by_desc(ratings::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to query ratings for store")?;

        Ok(rows)
    }

    pub async fn count(&self) -> Result<u64> {
        let count = ratings::Entity::find()
            .count(&self.conn)
            .await
            .context("Failed to count ratings")?;

        Ok(count)
    }
}
