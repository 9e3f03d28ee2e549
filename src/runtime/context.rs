use std::sync::Arc;

use log::debug;

use crate::backend::{Backend, HealthReport, HttpBackend};
use crate::workflow::{AppShell, SystemClock, ThreadRunner};

use super::{ClientConfig, Flow, Result};

#[derive(Debug, Clone)]
pub struct AppContext {
    config: ClientConfig,
    backend: Arc<HttpBackend>,
}

impl AppContext {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        debug!("using service at {}", config.api_base_url);
        let backend = Arc::new(HttpBackend::new(
            config.api_base_url.trim(),
            config.request_timeout(),
        ));
        Ok(Self { config, backend })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn backend(&self) -> &HttpBackend {
        &self.backend
    }

    /// A shell wired to the real service, worker threads and wall clock.
    pub fn shell(&self, flow: Flow) -> AppShell {
        let backend: Arc<dyn Backend> = self.backend.clone();
        AppShell::new(
            backend,
            Box::new(ThreadRunner),
            Arc::new(SystemClock),
            self.config.shell_settings(flow),
        )
    }

    pub fn health(&self) -> Result<HealthReport> {
        Ok(self.backend.health()?)
    }
}
