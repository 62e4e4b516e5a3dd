use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use tokio::task;

use crate::config::SecurityConfig;
use crate::entities::users::{self, UserRole};

/// Input for inserting a user; the password arrives in the clear and is
/// hashed inside the repository.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: String,
    pub role: UserRole,
}

/// Filters and ordering for the admin user listing.
#[derive(Debug, Clone, Default)]
pub struct UserPageQuery {
    pub search: Option<String>,
    pub role: Option<UserRole>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: u64,
    pub limit: u64,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Insert a new user, hashing the password on a blocking thread.
    pub async fn create(&self, user: NewUser, config: &SecurityConfig) -> Result<users::Model> {
        let password = user.password;
        let config = config.clone();
        let password_hash = task::spawn_blocking(move || hash_password(&password, &config))
            .await
            .context("Password hashing task panicked")??;

        let active = users::ActiveModel {
            name: Set(user.name),
            email: Set(user.email),
            password_hash: Set(password_hash),
            address: Set(user.address),
            role: Set(user.role),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert user")?;

        Ok(model)
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<users::Model>> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user)
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<users::Model>> {
        let user = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user)
    }

    /// Verify a password for the user behind `email`, returning the user
    /// on success. `None` covers both unknown email and wrong password so
    /// callers cannot distinguish the two.
    ///
    /// Argon2 verification is CPU-intensive and runs under
    /// `spawn_blocking` to keep the async runtime responsive.
    pub async fn verify_password(&self, email: &str, password: &str) -> Result<Option<users::Model>> {
        let Some(user) = self.get_by_email(email).await? else {
            return Ok(None);
        };

        let password_hash = user.password_hash.clone();
        let password = password.to_string();

        let is_valid = task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash)
                .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

            let argon2 = Argon2::default();
            Ok::<bool, anyhow::Error>(
                argon2
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok(),
            )
        })
        .await
        .context("Password verification task panicked")??;

        Ok(is_valid.then_some(user))
    }

    /// Replace a user's password hash.
    pub async fn update_password(
        &self,
        id: i32,
        new_password: &str,
        config: &SecurityConfig,
    ) -> Result<()> {
        let user = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for password update")?
            .ok_or_else(|| anyhow::anyhow!("User not found: {id}"))?;

        let password = new_password.to_string();
        let config = config.clone();
        let new_hash = task::spawn_blocking(move || hash_password(&password, &config))
            .await
            .context("Password hashing task panicked")??;

        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(new_hash);
        active.update(&self.conn).await?;

        Ok(())
    }

    /// Admin listing: OR substring search over name/email/address, role
    /// filter, whitelisted sort, offset pagination. Returns the page and
    /// the total matching row count.
    pub async fn page(&self, query: &UserPageQuery) -> Result<(Vec<users::Model>, u64)> {
        let mut select = users::Entity::find();

        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            select = select.filter(
                sea_orm::Condition::any()
                    .add(users::Column::Name.contains(search))
                    .add(users::Column::Email.contains(search))
                    .add(users::Column::Address.contains(search)),
            );
        }

        if let Some(role) = query.role {
            select = select.filter(users::Column::Role.eq(role));
        }

        let column = match query.sort_by.as_deref() {
            Some("email") => users::Column::Email,
            Some("address") => users::Column::Address,
            Some("role") => users::Column::Role,
            Some("createdAt" | "created_at") => users::Column::CreatedAt,
            _ => users::Column::Name,
        };
        let order = match query.sort_order.as_deref() {
            Some("desc") => Order::Desc,
            _ => Order::Asc,
        };
        select = select.order_by(column, order);

        let paginator = select.paginate(&self.conn, query.limit);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(query.page.saturating_sub(1)).await?;

        Ok((items, total))
    }

    /// Force a user's role; used when store creation promotes the owner.
    pub async fn set_role(&self, id: i32, role: UserRole) -> Result<()> {
        let user = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for role update")?
            .ok_or_else(|| anyhow::anyhow!("User not found: {id}"))?;

        let mut active: users::ActiveModel = user.into();
        active.role = Set(role);
        active.update(&self.conn).await?;

        Ok(())
    }

    pub async fn count(&self) -> Result<u64> {
        let count = users::Entity::find()
            .count(&self.conn)
            .await
            .context("Failed to count users")?;

        Ok(count)
    }
}

/// Hash a password using Argon2id with the configured cost parameters.
pub fn hash_password(password: &str, config: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}
