use std::sync::Arc;

use crate::submission::Pipeline;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub pipeline: Pipeline,
}
