use std::collections::HashMap;

use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::entities::users::{self, UserRole};
use crate::entities::{ratings, stores};

#[derive(Debug, Clone)]
pub struct NewStore {
    pub name: String,
    pub email: String,
    pub address: String,
    pub owner_id: i32,
}

/// Filters and ordering shared by the store listings.
#[derive(Debug, Clone, Default)]
pub struct StorePageQuery {
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: u64,
    pub limit: u64,
}

pub struct StoreRepository {
    conn: DatabaseConnection,
}

impl StoreRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert a store and promote its owner to STORE_OWNER in one
    /// transaction; the unique `owner_id` column rejects a second store
    /// for the same owner even if the caller's existence check raced.
    pub async fn create_with_owner(&self, store: NewStore) -> Result<stores::Model> {
        let created = self
            .conn
            .transaction::<_, stores::Model, DbErr>(|txn| {
                Box::pin(async move {
                    let owner = users::Entity::find_by_id(store.owner_id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            DbErr::RecordNotFound(format!("User {} not found", store.owner_id))
                        })?;

                    let mut owner: users::ActiveModel = owner.into();
                    owner.role = Set(UserRole::StoreOwner);
                    owner.update(txn).await?;

                    let active = stores::ActiveModel {
                        name: Set(store.name),
                        email: Set(store.email),
                        address: Set(store.address),
                        owner_id: Set(store.owner_id),
                        created_at: Set(chrono::Utc::now().to_rfc3339()),
                        ..Default::default()
                    };

                    active.insert(txn).await
                })
            })
            .await
            .map_err(|e| match e {
                sea_orm::TransactionError::Connection(e)
                | sea_orm::TransactionError::Transaction(e) => e,
            })?;

        Ok(created)
    }

    pub async fn get(&self, id: i32) -> Result<Option<stores::Model>> {
        let store = stores::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query store by ID")?;

        Ok(store)
    }

    pub async fn get_by_owner(&self, owner_id: i32) -> Result<Option<stores::Model>> {
        let store = stores::Entity::find()
            .filter(stores::Column::OwnerId.eq(owner_id))
            .one(&self.conn)
            .await
            .context("Failed to query store by owner")?;

        Ok(store)
    }

    /// All stores matching the filter, each with its rating rows.
    pub async fn list_with_ratings(
        &self,
        search: Option<&str>,
        sort_by: Option<&str>,
        sort_order: Option<&str>,
    ) -> Result<Vec<(stores::Model, Vec<ratings::Model>)>> {
        let mut select = stores::Entity::find();

        if let Some(search) = search.filter(|s| !s.is_empty()) {
            select = select.filter(
                sea_orm::Condition::any()
                    .add(stores::Column::Name.contains(search))
                    .add(stores::Column::Address.contains(search)),
            );
        }

        select = select.order_by(sort_column(sort_by), sort_direction(sort_order));

        let stores = select
            .all(&self.conn)
            .await
            .context("Failed to list stores")?;

        let ratings_by_store = self
            .ratings_for_stores(&stores.iter().map(|s| s.id).collect::<Vec<_>>())
            .await?;

        Ok(attach_ratings(stores, ratings_by_store))
    }

    /// One page of stores for the admin listing, with rating rows and the
    /// total matching count. Search spans name, email and address.
    pub async fn page_with_ratings(
        &self,
        query: &StorePageQuery,
    ) -> Result<(Vec<(stores::Model, Vec<ratings::Model>)>, u64)> {
        let mut select = stores::Entity::find();

        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            select = select.filter(
                sea_orm::Condition::any()
                    .add(stores::Column::Name.contains(search))
                    .add(stores::Column::Email.contains(search))
                    .add(stores::Column::Address.contains(search)),
            );
        }

        select = select.order_by(
            sort_column(query.sort_by.as_deref()),
            sort_direction(query.sort_order.as_deref()),
        );

        let paginator = select.paginate(&self.conn, query.limit);
        let total = paginator.num_items().await?;
        let stores = paginator.fetch_page(query.page.saturating_sub(1)).await?;

        let ratings_by_store = self
            .ratings_for_stores(&stores.iter().map(|s| s.id).collect::<Vec<_>>())
            .await?;

        Ok((attach_ratings(stores, ratings_by_store), total))
    }

    /// Stores owned by any of `owner_ids`, with their rating rows, keyed
    /// by owner. Used to derive per-owner averages in the user listing.
    pub async fn by_owners_with_ratings(
        &self,
        owner_ids: &[i32],
    ) -> Result<HashMap<i32, (stores::Model, Vec<ratings::Model>)>> {
        if owner_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let stores = stores::Entity::find()
            .filter(stores::Column::OwnerId.is_in(owner_ids.iter().copied()))
            .all(&self.conn)
            .await
            .context("Failed to query stores by owners")?;

        let mut ratings_by_store = self
            .ratings_for_stores(&stores.iter().map(|s| s.id).collect::<Vec<_>>())
            .await?;

        Ok(stores
            .into_iter()
            .map(|store| {
                let ratings = ratings_by_store.remove(&store.id).unwrap_or_default();
                (store.owner_id, (store, ratings))
            })
            .collect())
    }

    /// Owners for a set of stores, keyed by user id.
    pub async fn owners(&self, owner_ids: &[i32]) -> Result<HashMap<i32, users::Model>> {
        if owner_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let owners = users::Entity::find()
            .filter(users::Column::Id.is_in(owner_ids.iter().copied()))
            .all(&self.conn)
            .await
            .context("Failed to query store owners")?;

        Ok(owners.into_iter().map(|u| (u.id, u)).collect())
    }

    pub async fn count(&self) -> Result<u64> {
        let count = stores::Entity::find()
            .count(&self.conn)
            .await
            .context("Failed to count stores")?;

        Ok(count)
    }

    async fn ratings_for_stores(
        &self,
        store_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<ratings::Model>>> {
        if store_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = ratings::Entity::find()
            .filter(ratings::Column::StoreId.is_in(store_ids.iter().copied()))
            .all(&self.conn)
            .await
            .context("Failed to query ratings for stores")?;

        let mut grouped: HashMap<i32, Vec<ratings::Model>> = HashMap::new();
        for row in rows {
            grouped.entry(row.store_id).or_default().push(row);
        }

        Ok(grouped)
    }
}

fn sort_column(sort_by: Option<&str>) -> stores::Column {
    match sort_by {
        Some("email") => stores::Column::Email,
        Some("address") => stores::Column::Address,
        Some("createdAt" | "created_at") => stores::Column::CreatedAt,
        _ => stores::Column::Name,
    }
}

fn sort_direction(sort_order: Option<&str>) -> Order {
    match sort_order {
        Some("desc") => Order::Desc,
        _ => Order::Asc,
    }
}

fn attach_ratings(
    stores: Vec<stores::Model>,
    mut ratings_by_store: HashMap<i32, Vec<ratings::Model>>,
) -> Vec<(stores::Model, Vec<ratings::Model>)> {
    stores
        .into_iter()
        .map(|store| {
            let ratings = ratings_by_store.remove(&store.id).unwrap_or_default();
            (store, ratings)
        })
        .collect()
}
