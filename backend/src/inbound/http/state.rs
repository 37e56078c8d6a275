//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data`, so they depend only
//! on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{AccountQuery, Authenticator, OperationCommand};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub auth: Arc<dyn Authenticator>,
    pub operations: Arc<dyn OperationCommand>,
    pub account: Arc<dyn AccountQuery>,
}

impl HttpState {
    /// Bundle the driving ports used by the handlers.
    pub fn new(
        auth: Arc<dyn Authenticator>,
        operations: Arc<dyn OperationCommand>,
        account: Arc<dyn AccountQuery>,
    ) -> Self {
        Self {
            auth,
            operations,
            account,
        }
    }
}
