use std::io;
use std::sync::Arc;

use crate::auth::TokenKeys;
use crate::config::{Config, MutationPolicy};
use crate::store::{MemoryStore, PgStore, Store};
use crate::uploads::{DiskImageStore, ImageStore, MemoryImageStore};

/// Everything a request handler needs, shared through `web::Data<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub images: Arc<dyn ImageStore>,
    pub tokens: TokenKeys,
    pub bcrypt_cost: u32,
    pub max_image_bytes: usize,
    pub mutation_policy: MutationPolicy,
}

impl AppState {
    /// Opens the configured store and image directory.
    pub async fn init(config: &Config) -> io::Result<Self> {
        let store: Arc<dyn Store> = match &config.database_url {
            Some(url) => {
                let store = PgStore::connect(url)
                    .await
                    .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
                Arc::new(store)
            }
            None => {
                log::warn!("DATABASE_URL is not set; using the in-memory store, data will not survive a restart");
                Arc::new(MemoryStore::new())
            }
        };
        let images = Arc::new(DiskImageStore::new(config.upload_dir.clone()));

        Ok(Self::from_parts(config, store, images))
    }

    pub fn from_parts(
        config: &Config,
        store: Arc<dyn Store>,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            store,
            images,
            tokens: TokenKeys::new(&config.jwt_secret, config.token_ttl_hours),
            bcrypt_cost: config.bcrypt_cost,
            max_image_bytes: config.max_image_bytes,
            mutation_policy: config.mutation_policy,
        }
    }

    /// Fully in-process state with default limits and the cheapest bcrypt cost.
    pub fn in_memory(jwt_secret: &str) -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            images: Arc::new(MemoryImageStore::new()),
            tokens: TokenKeys::new(jwt_secret, 24),
            bcrypt_cost: 4,
            max_image_bytes: 5 * 1024 * 1024,
            mutation_policy: MutationPolicy::AnyAuthenticated,
        }
    }
}
