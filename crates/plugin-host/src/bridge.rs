//! Request/response correlation across the UI boundary
//!
//! A request is registered under a fresh id and sent; the reply arrives
//! later through `resolve`. When no reply arrives within the timeout the
//! caller gets a default value instead. The in-flight request is not
//! cancelled; a late reply is dropped.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use uuid::Uuid;

/// Pending requests keyed by correlation id
pub struct RequestBridge<R> {
    pending: Mutex<HashMap<Uuid, oneshot::Sender<R>>>,
    timeout: Duration,
}

impl<R> RequestBridge<R> {
    pub fn new(timeout: Duration) -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Number of requests still waiting for a reply
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Register a request, hand its id to `send`, and wait for the reply
    /// or the timeout, whichever comes first.
    pub async fn request<F>(&self, send: F, fallback: R) -> R
    where
        F: FnOnce(Uuid),
    {
        let id = Uuid::new_v4();
        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, tx);

        send(id);

        tokio::select! {
            reply = rx => match reply {
                Ok(value) => value,
                Err(_) => {
                    log::warn!("Request {} dropped without a reply", id);
                    fallback
                }
            },
            _ = tokio::time::sleep(self.timeout) => {
                self.pending.lock().remove(&id);
                log::warn!(
                    "Request {} not answered within {:?}, using fallback",
                    id,
                    self.timeout
                );
                fallback
            }
        }
    }

    /// Deliver the reply for `id`. Returns false when nobody is waiting.
    pub fn resolve(&self, id: Uuid, value: R) -> bool {
        let Some(tx) = self.pending.lock().remove(&id) else {
            log::debug!("Dropping reply for unknown or expired request {}", id);
            return false;
        };
        tx.send(value).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_reply_before_timeout() {
        let bridge = Arc::new(RequestBridge::new(Duration::from_secs(5)));
        let responder = Arc::clone(&bridge);

        let value = bridge
            .request(
                move |id| {
                    tokio::spawn(async move {
                        responder.resolve(id, 42);
                    });
                },
                0,
            )
            .await;

        assert_eq!(value, 42);
        assert_eq!(bridge.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_timeout_resolves_with_fallback() {
        let bridge: RequestBridge<&str> = RequestBridge::new(Duration::from_millis(20));
        let mut sent = None;

        let value = bridge.request(|id| sent = Some(id), "default").await;

        assert_eq!(value, "default");
        assert_eq!(bridge.pending_count(), 0);
        assert!(!bridge.resolve(sent.unwrap(), "late"));
    }

    #[test]
    fn test_resolve_unknown_id() {
        let bridge: RequestBridge<u8> = RequestBridge::new(Duration::from_millis(10));
        assert!(!bridge.resolve(Uuid::new_v4(), 1));
    }
}
