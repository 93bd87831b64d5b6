//! Shared HTTP adapter state.
//!
//! Handlers receive this via `web::Data` and only see driving ports, so they
//! can be tested against mocks without I/O.

use std::sync::Arc;

use crate::domain::ports::{AccountService, MarketCommand, MarketQuery};

use super::templates::Templates;

/// Parameter object bundling the driving ports.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub accounts: Arc<dyn AccountService>,
    pub market_query: Arc<dyn MarketQuery>,
    pub market_command: Arc<dyn MarketCommand>,
}

#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountService>,
    pub market_query: Arc<dyn MarketQuery>,
    pub market_command: Arc<dyn MarketCommand>,
    pub templates: Templates,
}

impl HttpState {
    /// Build state from the driving ports and compiled templates.
    pub fn new(ports: HttpStatePorts, templates: Templates) -> Self {
        let HttpStatePorts {
            accounts,
            market_query,
            market_command,
        } = ports;
        Self {
            accounts,
            market_query,
            market_command,
            templates,
        }
    }
}
