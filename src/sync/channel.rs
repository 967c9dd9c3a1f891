//! Best-effort broadcast transport.
//!
//! A `Transport` publishes opaque payloads to every other subscriber of one
//! named channel and hands back whatever arrived. No ordering, delivery or
//! deduplication guarantees are assumed by callers.
//!
//! `LocalBus` is an in-process implementation used by tests and by hosts
//! that run both seats in one process.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use tracing::debug;

/// Channel name shared by every participant of the race game.
pub const CHANNEL: &str = "ludo-race";

/// A publish/subscribe endpoint on one channel.
pub trait Transport {
    /// Deliver a payload to every other subscriber.
    fn publish(&mut self, payload: Vec<u8>);

    /// Next inbound payload, if any.
    fn poll(&mut self) -> Option<Vec<u8>>;

    /// Name of the channel this endpoint is subscribed to.
    fn channel(&self) -> &str {
        CHANNEL
    }
}

#[derive(Debug, Default)]
struct BusInner {
    inboxes: FxHashMap<u32, VecDeque<Vec<u8>>>,
    next_id: u32,
}

/// In-process broadcast bus.
#[derive(Clone, Debug, Default)]
pub struct LocalBus {
    inner: Rc<RefCell<BusInner>>,
}

impl LocalBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the channel. Only payloads published after joining are seen.
    #[must_use]
    pub fn subscribe(&self) -> BusEndpoint {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.inboxes.insert(id, VecDeque::new());
        BusEndpoint {
            id,
            bus: Rc::clone(&self.inner),
        }
    }

    /// Number of current subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().inboxes.len()
    }
}

/// One subscriber's handle on a `LocalBus`. Leaves the channel on drop.
#[derive(Debug)]
pub struct BusEndpoint {
    id: u32,
    bus: Rc<RefCell<BusInner>>,
}

impl BusEndpoint {
    /// Payloads waiting in this endpoint's inbox.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.bus
            .borrow()
            .inboxes
            .get(&self.id)
            .map_or(0, VecDeque::len)
    }
}

impl Transport for BusEndpoint {
    fn publish(&mut self, payload: Vec<u8>) {
        let mut inner = self.bus.borrow_mut();
        let mut delivered = 0;
        for (&id, inbox) in inner.inboxes.iter_mut() {
            if id != self.id {
                inbox.push_back(payload.clone());
                delivered += 1;
            }
        }
        debug!(endpoint = self.id, bytes = payload.len(), delivered, "publish");
    }

    fn poll(&mut self) -> Option<Vec<u8>> {
        self.bus
            .borrow_mut()
            .inboxes
            .get_mut(&self.id)
            .and_then(VecDeque::pop_front)
    }
}

impl Drop for BusEndpoint {
    fn drop(&mut self) {
        self.bus.borrow_mut().inboxes.remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_reaches_others_only() {
        let bus = LocalBus::new();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();
        let mut c = bus.subscribe();

        a.publish(vec![1, 2]);

        assert_eq!(a.channel(), CHANNEL);
        assert_eq!(a.poll(), None);
        assert_eq!(b.poll(), Some(vec![1, 2]));
        assert_eq!(c.poll(), Some(vec![1, 2]));
        assert_eq!(b.poll(), None);
    }

    #[test]
    fn test_late_subscriber_misses_earlier_payloads() {
        let bus = LocalBus::new();
        let mut a = bus.subscribe();
        a.publish(vec![9]);

        let mut late = bus.subscribe();
        assert_eq!(late.pending(), 0);
        assert_eq!(late.poll(), None);
    }

    #[test]
    fn test_drop_leaves_channel() {
        let bus = LocalBus::new();
        let a = bus.subscribe();
        {
            let _b = bus.subscribe();
            assert_eq!(bus.subscriber_count(), 2);
        }
        assert_eq!(bus.subscriber_count(), 1);
        drop(a);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
