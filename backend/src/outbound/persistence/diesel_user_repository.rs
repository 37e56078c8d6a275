//! PostgreSQL-backed [`UserRepository`] implementation.
//!
//! Registration inserts the user row and their ledger account in one
//! transaction: a user without an account (or the reverse) is never visible.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Coins, User, UserId};

use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{accounts, users};

/// Diesel-backed user repository.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a repository over the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    UserPersistenceError::connection(message)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    debug!(%error, "user repository operation failed");
    UserPersistenceError::query(error.to_string())
}

// Required by the diesel-async transaction wrapper used in `register`.
impl From<diesel::result::Error> for UserPersistenceError {
    fn from(error: diesel::result::Error) -> Self {
        map_diesel_error(error)
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = users::table
            .filter(users::username.eq(username))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(User::from))
    }

    async fn register(
        &self,
        username: &str,
        password_hash: &str,
        starting_balance: Coins,
    ) -> Result<UserId, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let user_id = conn
            .transaction(|conn| {
                async move {
                    let user_id: i64 = diesel::insert_into(users::table)
                        .values(NewUserRow {
                            username,
                            password_hash,
                        })
                        .returning(users::id)
                        .get_result(conn)
                        .await?;

                    diesel::insert_into(accounts::table)
                        .values((
                            accounts::user_id.eq(user_id),
                            accounts::balance.eq(starting_balance.value()),
                        ))
                        .execute(conn)
                        .await?;

                    Ok::<_, UserPersistenceError>(user_id)
                }
                .scope_boxed()
            })
            .await?;

        Ok(UserId::new(user_id))
    }
}
