pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;

pub use db::DbPool;

use api::auth::TokenService;
use api::graphql::{build_schema, ApiContext, StaybookSchema};
use config::Config;

pub struct AppState {
    pub config: Config,
    pub db: DbPool,
    pub tokens: TokenService,
    pub schema: StaybookSchema,
}

impl AppState {
    pub fn new(config: Config, db: DbPool) -> Self {
        let api = ApiContext::new(db.clone(), config.clone());
        let tokens = api.tokens.clone();
        Self {
            config,
            db,
            tokens,
            schema: build_schema(api),
        }
    }
}
