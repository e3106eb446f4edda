use crate::state::AppState;
use axum::Router;

mod dto;
pub mod eligibility;
pub mod handlers;
pub mod repo;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
