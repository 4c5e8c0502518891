use std::sync::Arc;

use crate::config::Config;
use crate::handlers::Dispatcher;
use crate::observability::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub dispatcher: Dispatcher,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(config: Config, dispatcher: Dispatcher, metrics: Arc<Metrics>) -> Self {
        Self {
            config: Arc::new(config),
            dispatcher,
            metrics,
        }
    }
}
