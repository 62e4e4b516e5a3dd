use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use tracing::info;

use crate::config::SecurityConfig;
use crate::entities::users::{self, UserRole};
use crate::entities::{ratings, stores};

pub mod migrator;
pub mod repositories;

pub use repositories::store::{NewStore, StorePageQuery};
pub use repositories::user::{NewUser, UserPageQuery};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn store_repo(&self) -> repositories::store::StoreRepository {
        repositories::store::StoreRepository::new(self.conn.clone())
    }

    fn rating_repo(&self) -> repositories::rating::RatingRepository {
        repositories::rating::RatingRepository::new(self.conn.clone())
    }

    // ========== Users ==========

    pub async fn create_user(&self, user: NewUser, config: &SecurityConfig) -> Result<users::Model> {
        self.user_repo().create(user, config).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<users::Model>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_user_by_id(&self, id: i32) -> Result<Option<users::Model>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn verify_user_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<users::Model>> {
        self.user_repo().verify_password(email, password).await
    }

    pub async fn update_user_password(
        &self,
        id: i32,
        new_password: &str,
        config: &SecurityConfig,
    ) -> Result<()> {
        self.user_repo()
            .update_password(id, new_password, config)
            .await
    }

    pub async fn set_user_role(&self, id: i32, role: UserRole) -> Result<()> {
        self.user_repo().set_role(id, role).await
    }

    pub async fn page_users(&self, query: &UserPageQuery) -> Result<(Vec<users::Model>, u64)> {
        self.user_repo().page(query).await
    }

    pub async fn count_users(&self) -> Result<u64> {
        self.user_repo().count().await
    }

    // ========== Stores ==========

    pub async fn create_store(&self, store: NewStore) -> Result<stores::Model> {
        self.store_repo().create_with_owner(store).await
    }

    pub async fn get_store(&self, id: i32) -> Result<Option<stores::Model>> {
        self.store_repo().get(id).await
    }

    pub async fn get_store_by_owner(&self, owner_id: i32) -> Result<Option<stores::Model>> {
        self.store_repo().get_by_owner(owner_id).await
    }

    pub async fn list_stores_with_ratings(
        &self,
        search: Option<&str>,
        sort_by: Option<&str>,
        sort_order: Option<&str>,
    ) -> Result<Vec<(stores::Model, Vec<ratings::Model>)>> {
        self.store_repo()
            .list_with_ratings(search, sort_by, sort_order)
            .await
    }

    pub async fn page_stores_with_ratings(
        &self,
        query: &StorePageQuery,
    ) -> Result<(Vec<(stores::Model, Vec<ratings::Model>)>, u64)> {
        self.store_repo().page_with_ratings(query).await
    }

    pub async fn stores_by_owners_with_ratings(
        &self,
        owner_ids: &[i32],
    ) -> Result<HashMap<i32, (stores::Model, Vec<ratings::Model>)>> {
        self.store_repo().by_owners_with_ratings(owner_ids).await
    }

    pub async fn store_owners(&self, owner_ids: &[i32]) -> Result<HashMap<i32, users::Model>> {
        self.store_repo().owners(owner_ids).await
    }

    pub async fn count_stores(&self) -> Result<u64> {
        self.store_repo().count().await
    }

    // ========== Ratings ==========

    pub async fn upsert_rating(
        &self,
        user_id: i32,
        store_id: i32,
        rating: i32,
    ) -> Result<ratings::Model> {
        self.rating_repo().upsert(user_id, store_id, rating).await
    }

    pub async fn ratings_for_user(
        &self,
        user_id: i32,
    ) -> Result<Vec<(ratings::Model, Option<stores::Model>)>> {
        self.rating_repo().list_for_user(user_id).await
    }

    pub async fn ratings_for_store(
        &self,
        store_id: i32,
    ) -> Result<Vec<(ratings::Model, Option<users::Model>)>> {
        self.rating_repo().list_for_store(store_id).await
    }

    pub async fn count_ratings(&self) -> Result<u64> {
        self.rating_repo().count().await
    }
}
