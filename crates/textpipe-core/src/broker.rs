//! Broker abstraction the pipeline stages publish to and consume from
//!
//! The real transport (exchanges, acknowledgements, redelivery) is outside
//! this crate; stages only see named queues carrying self-describing JSON
//! payloads. Delivery is assumed at-least-once, so every stage side effect
//! must be safe to repeat with the same input.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::route::Route;

/// At-least-once publish/consume transport over the fixed route topology.
pub trait Broker: Send + Sync {
    /// Enqueue one payload on a route.
    fn publish(&self, route: Route, payload: &[u8]) -> Result<()>;

    /// Claim the next payload from a route, if any.
    fn consume(&self, route: Route) -> Option<Vec<u8>>;

    /// Number of payloads currently queued on a route.
    fn depth(&self, route: Route) -> usize;
}

/// Publish a message as field-keyed JSON.
pub fn publish_json<T: Serialize>(broker: &dyn Broker, route: Route, message: &T) -> Result<()> {
    let payload = serde_json::to_vec(message)
        .with_context(|| format!("failed to serialize message for {route}"))?;
    broker.publish(route, &payload)
}

/// Consume and decode the next message from a route.
///
/// Returns `Ok(None)` when the queue is empty. A payload that does not
/// decode is an error; the caller decides whether to drop or report it.
pub fn consume_json<T: DeserializeOwned>(broker: &dyn Broker, route: Route) -> Result<Option<T>> {
    match broker.consume(route) {
        Some(payload) => {
            let message = serde_json::from_slice(&payload)
                .with_context(|| format!("failed to decode message from {route}"))?;
            Ok(Some(message))
        }
        None => Ok(None),
    }
}

/// In-process broker backed by one FIFO queue per route.
///
/// Used by tests and single-process runs; a networked transport implements
/// the same trait.
pub struct MemoryBroker {
    queues: HashMap<Route, Mutex<VecDeque<Vec<u8>>>>,
}

impl MemoryBroker {
    pub fn new() -> Self {
        let queues = Route::ALL
            .iter()
            .map(|&r| (r, Mutex::new(VecDeque::new())))
            .collect();
        Self { queues }
    }

    fn queue(&self, route: Route) -> &Mutex<VecDeque<Vec<u8>>> {
        // Every route is seeded in new(); the topology is closed.
        &self.queues[&route]
    }
}

impl Default for MemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl Broker for MemoryBroker {
    fn publish(&self, route: Route, payload: &[u8]) -> Result<()> {
        self.queue(route)
            .lock()
            .expect("broker queue poisoned")
            .push_back(payload.to_vec());
        Ok(())
    }

    fn consume(&self, route: Route) -> Option<Vec<u8>> {
        self.queue(route)
            .lock()
            .expect("broker queue poisoned")
            .pop_front()
    }

    fn depth(&self, route: Route) -> usize {
        self.queue(route).lock().expect("broker queue poisoned").len()
    }
}
