pub mod config;
pub mod entities;
pub mod error;
pub mod extract;
pub mod fare;
pub mod features;
pub mod handlers;
pub mod middleware;
pub mod model;
pub mod routes;
pub mod utils;

use std::sync::Arc;

pub use config::Config;
pub use error::{AppError, AppResult};

use crate::model::FareModel;

#[derive(Clone)]
pub struct AppState {
    pub model: Arc<dyn FareModel>,
    pub config: Config,
}
