mod config;
mod context;
mod error;
mod logging;


pub use config::{
    API_URL_ENV, ClientConfig, Flow, load_config, resolve_config, save_config,
};
pub use context::AppContext;
pub use error::{AppError, ConfigError, Result};
pub use logging::init_logging;
