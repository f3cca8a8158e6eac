use std::sync::Arc;

use log::{debug, info};

use crate::configuration::config::Config;
use crate::configuration::types::StorageBackend;
use crate::error_handling::types::*;
use crate::storage::{DatabaseStorage, MemoryStorage, Storage};
use crate::web_interface::{Services, WebServer};

/// Wires the configuration to a storage backend, the services and the HTTP server.
pub struct Controller {
    pub config: Config,
}

impl Controller {
    pub fn new(config: Config) -> Result<Self, ControllerError> {
        config.validate()?;
        debug!("Controller created with {:?}", config);
        Ok(Self { config })
    }

    pub async fn build_storage(&self) -> Result<Arc<dyn Storage>, ControllerError> {
        let storage: Arc<dyn Storage> = match self.config.storage.backend {
            StorageBackend::Memory => {
                info!("Using in-memory storage, data is lost on exit");
                Arc::new(MemoryStorage::new())
            }
            StorageBackend::Database => {
                info!("Opening database {}", self.config.storage.database_url);
                Arc::new(
                    DatabaseStorage::connect(
                        &self.config.storage.database_url,
                        self.config.storage.max_connections,
                    )
                    .await?,
                )
            }
        };
        Ok(storage)
    }

    pub async fn run(&mut self) -> Result<(), ControllerError> {
        let addr = self.config.socket_addr()?;
        let storage = self.build_storage().await?;
        let server = WebServer::new(Services::new(storage));
        server.start(addr).await?;
        info!("Controller stopped");
        Ok(())
    }
}
