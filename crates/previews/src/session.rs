use std::collections::HashMap;

use parking_lot::Mutex;
use reqwest::Client;

use crate::config::PreviewConfig;
use crate::error::PreviewError;

/// Create a reqwest Client with the provided configuration
pub fn create_client(config: &PreviewConfig) -> Result<Client, PreviewError> {
    let mut builder = Client::builder()
        .user_agent(&config.user_agent)
        .default_headers(config.headers.clone())
        .redirect(reqwest::redirect::Policy::limited(10));

    if !config.request_timeout.is_zero() {
        builder = builder.timeout(config.request_timeout);
    }

    builder.build().map_err(PreviewError::from)
}

/// Worker-keyed registry of HTTP clients.
///
/// Each worker gets its own client so one worker's connection pool is
/// never contended by another. The first call for a worker id builds
/// and retains a client; later calls for the same id return that same
/// instance, and distinct ids never share one.
pub struct SessionPool {
    config: PreviewConfig,
    clients: Mutex<HashMap<usize, Client>>,
}

impl SessionPool {
    pub fn new(config: &PreviewConfig) -> Self {
        Self {
            config: config.clone(),
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Client affinitized to `worker_id`, built lazily on first use.
    pub fn client_for(&self, worker_id: usize) -> Result<Client, PreviewError> {
        let mut clients = self.clients.lock();

        if let Some(client) = clients.get(&worker_id) {
            return Ok(client.clone());
        }

        let client = create_client(&self.config)?;
        clients.insert(worker_id, client.clone());
        Ok(client)
    }

    /// Number of clients built so far.
    pub fn session_count(&self) -> usize {
        self.clients.lock().len()
    }
}
