//! GraphQL schema and HTTP glue.

mod inputs;
mod mutation;
mod query;
mod types;

pub use inputs::*;
pub use mutation::MutationRoot;
pub use query::QueryRoot;
pub use types::AuthPayload;

use async_graphql::{http::GraphiQLSource, Context, EmptySubscription, Schema};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use super::auth::TokenService;
use super::error::ApiError;
use crate::config::Config;
use crate::db::DbPool;
use crate::engine::{PricingPolicy, Viewer};
use crate::AppState;

pub type StaybookSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Shared dependencies available to every resolver
pub struct ApiContext {
    pub db: DbPool,
    pub config: Config,
    pub tokens: TokenService,
    pub pricing: PricingPolicy,
}

impl ApiContext {
    pub fn new(db: DbPool, config: Config) -> Self {
        Self {
            tokens: TokenService::new(&config.auth),
            pricing: PricingPolicy::from(&config.pricing),
            db,
            config,
        }
    }
}

pub fn build_schema(api: ApiContext) -> StaybookSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(api)
        .finish()
}

/// Schema definition language of the API
pub fn sdl() -> String {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .finish()
        .sdl()
}

static ANONYMOUS: Viewer = Viewer::Anonymous;

pub(crate) trait ContextExt {
    fn api(&self) -> async_graphql::Result<&ApiContext>;

    /// Caller of the current request
    fn viewer(&self) -> &Viewer;
}

impl ContextExt for Context<'_> {
    fn api(&self) -> async_graphql::Result<&ApiContext> {
        self.data::<ApiContext>()
    }

    fn viewer(&self) -> &Viewer {
        self.data_opt::<Viewer>().unwrap_or(&ANONYMOUS)
    }
}

/// Convert domain results into GraphQL results with error codes
pub(crate) trait ResultExt<T> {
    fn or_graphql(self, ctx: &Context<'_>) -> async_graphql::Result<T>;
}

impl<T> ResultExt<T> for crate::error::Result<T> {
    fn or_graphql(self, ctx: &Context<'_>) -> async_graphql::Result<T> {
        let environment = ctx
            .data_opt::<ApiContext>()
            .map(|api| api.config.server.environment)
            .unwrap_or_default();
        self.map_err(|e| ApiError::from_domain(e, environment).into_graphql())
    }
}

pub async fn graphql_handler(
    State(state): State<Arc<AppState>>,
    viewer: Viewer,
    Json(request): Json<async_graphql::Request>,
) -> Json<async_graphql::Response> {
    Json(state.schema.execute(request.data(viewer)).await)
}

/// GraphiQL explorer, served in development only
pub async fn graphiql(State(state): State<Arc<AppState>>) -> Response {
    if !state.config.server.environment.is_development() {
        return StatusCode::NOT_FOUND.into_response();
    }
    Html(GraphiQLSource::build().endpoint("/graphql").finish()).into_response()
}
