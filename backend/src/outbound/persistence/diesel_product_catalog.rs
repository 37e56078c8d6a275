//! PostgreSQL-backed [`ProductCatalog`] implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::Product;
use crate::domain::ports::{ProductCatalog, ProductCatalogError};

use super::models::ProductRow;
use super::pool::{DbPool, PoolError};
use super::schema::products;

/// Diesel-backed catalog reader.
#[derive(Clone)]
pub struct DieselProductCatalog {
    pool: DbPool,
}

impl DieselProductCatalog {
    /// Create a catalog reader over the given pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ProductCatalogError {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    ProductCatalogError::connection(message)
}

fn map_diesel_error(error: diesel::result::Error) -> ProductCatalogError {
    debug!(%error, "catalog query failed");
    ProductCatalogError::query(error.to_string())
}

#[async_trait]
impl ProductCatalog for DieselProductCatalog {
    async fn product_by_name(&self, name: &str) -> Result<Option<Product>, ProductCatalogError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = products::table
            .filter(products::name.eq(name))
            .select(ProductRow::as_select())
            .first::<ProductRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(Product::from))
    }
}
