//! Driven port for catalog lookups.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::domain::Product;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by catalog adapters.
    pub enum ProductCatalogError {
        /// A connection could not be checked out of the pool.
        Connection { message: String } => "catalog connection failed: {message}",
        /// Query execution failed.
        Query { message: String } => "catalog query failed: {message}",
    }
}

/// Read-only access to the merchandise catalog.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Fetch a product by its unique name.
    async fn product_by_name(&self, name: &str) -> Result<Option<Product>, ProductCatalogError>;
}
