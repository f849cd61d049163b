// RKSOK — Verb Dispatcher
//
// Maps each verb to its storage capability and performs exactly one storage
// call. Backends are blocking, so the call runs on the blocking pool; a
// failing or panicking backend comes back as `StorageFailure`.

use std::sync::Arc;

use crate::store::{Capability, PhonebookStore, StoreError};

use super::protocol::{Message, Response, Verb};
use super::GatewayError;

/// The storage capability a verb needs.
pub fn capability_for(verb: Verb) -> Capability {
    match verb {
        Verb::Fetch => Capability::Fetch,
        Verb::Write => Capability::Write,
        Verb::Delete => Capability::Delete,
    }
}

/// Runs approved requests against the shared phonebook.
#[derive(Clone)]
pub struct Dispatcher {
    store: Arc<dyn PhonebookStore>,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn PhonebookStore>) -> Self {
        Self { store }
    }

    pub async fn dispatch(&self, message: Message) -> Result<Response, GatewayError> {
        let verb = message.verb();
        if !self.store.supports(capability_for(verb)) {
            return Err(GatewayError::UnsupportedOperation(verb));
        }

        let store = Arc::clone(&self.store);
        let result = tokio::task::spawn_blocking(move || invoke(store.as_ref(), &message))
            .await
            .map_err(|e| GatewayError::StorageFailure(format!("storage task failed: {}", e)))?;

        result.map_err(|e| {
            tracing::warn!(%verb, error = %e, "Storage call failed");
            GatewayError::from(e)
        })
    }
}

fn invoke(store: &dyn PhonebookStore, message: &Message) -> Result<Response, StoreError> {
    let name = message.name();
    let response = match message.verb() {
        Verb::Fetch => match store.fetch(name)? {
            Some(payload) => Response::Ok(Some(payload)),
            None => Response::NotFound,
        },
        Verb::Write => {
            store.write(name, message.payload())?;
            Response::Ok(None)
        }
        Verb::Delete => {
            if store.delete(name)? {
                Response::Ok(None)
            } else {
                Response::NotFound
            }
        }
    };
    Ok(response)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
