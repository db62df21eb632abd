use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Mutex};

use log::debug;

use super::types::Event;

/// Publish/subscribe fan-out for [`Event`]s.
///
/// Publishing clones the event to every live subscriber; subscribers whose
/// receiver has been dropped are pruned on the next publish. Clones of a
/// `Bus` share the same subscriber list.
#[derive(Clone, Default)]
pub struct Bus {
    subscribers: Arc<Mutex<Vec<Sender<Event>>>>,
}

impl Bus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Receiver<Event> {
        let (tx, rx) = channel();
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }
        rx
    }

    pub fn publish(&self, event: Event) {
        debug!("publish {}", event.name());
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.retain(|sub| sub.send(event.clone()).is_ok());
        }
    }
}
