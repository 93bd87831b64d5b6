//! Builders wiring driven adapters into the HTTP state.

use std::io;
use std::sync::Arc;

use actix_web::web;

use market::domain::ports::{ItemRepository, MarketLedger, UserRepository};
use market::domain::{AccountServiceImpl, MarketService};
use market::inbound::http::state::{HttpState, HttpStatePorts};
use market::inbound::http::templates::Templates;
use market::outbound::memory::InMemoryMarketStore;
use market::outbound::persistence::{
    DbPool, DieselItemRepository, DieselMarketLedger, DieselUserRepository,
};
use market::outbound::security::Argon2PasswordHasher;

use super::ServerConfig;

/// Shared state handed to every worker plus the item port used for seeding.
pub(super) struct Wiring {
    pub(super) http_state: web::Data<HttpState>,
    pub(super) items: Arc<dyn ItemRepository>,
}

fn assemble<U, I, L>(users: Arc<U>, items: Arc<I>, ledger: Arc<L>, templates: Templates) -> Wiring
where
    U: UserRepository + 'static,
    I: ItemRepository + 'static,
    L: MarketLedger + 'static,
{
    let accounts = Arc::new(AccountServiceImpl::new(
        Arc::clone(&users),
        Arc::new(Argon2PasswordHasher::new()),
    ));
    let market = Arc::new(MarketService::new(users, Arc::clone(&items), ledger));
    let http_state = HttpState::new(
        HttpStatePorts {
            accounts,
            market_query: market.clone(),
            market_command: market,
        },
        templates,
    );
    Wiring {
        http_state: web::Data::new(http_state),
        items,
    }
}

fn diesel_wiring(pool: &DbPool, templates: Templates) -> Wiring {
    assemble(
        Arc::new(DieselUserRepository::new(pool.clone())),
        Arc::new(DieselItemRepository::new(pool.clone())),
        Arc::new(DieselMarketLedger::new(pool.clone())),
        templates,
    )
}

fn in_memory_wiring(templates: Templates) -> Wiring {
    let store = Arc::new(InMemoryMarketStore::new());
    assemble(Arc::clone(&store), Arc::clone(&store), store, templates)
}

/// Use the Diesel adapters when a pool is configured, otherwise one shared
/// in-memory store backs all three driven ports.
pub(super) fn build_wiring(config: &ServerConfig) -> io::Result<Wiring> {
    let templates =
        Templates::new().map_err(|err| io::Error::other(format!("template setup failed: {err}")))?;
    Ok(match &config.db_pool {
        Some(pool) => diesel_wiring(pool, templates),
        None => in_memory_wiring(templates),
    })
}
