//! Application state shared by every handler

use std::sync::Arc;

use forum_service::ServiceContext;

#[derive(Clone, Debug)]
pub struct AppState {
    service_context: Arc<ServiceContext>,
}

impl AppState {
    pub fn new(service_context: ServiceContext) -> Self {
        Self {
            service_context: Arc::new(service_context),
        }
    }

    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }
}
