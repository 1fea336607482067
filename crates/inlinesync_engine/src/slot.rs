//! Observer notification slots.

use crate::event::KeyboardEvent;
use crossbeam_channel::{unbounded, Receiver, Sender};
use inlinesync_core::InlineRange;
use tracing::warn;

type Listener<T> = Box<dyn FnMut(&T) -> anyhow::Result<()>>;

/// Ordered listener list; one failing listener never blocks the rest.
pub struct Slot<T> {
    name: &'static str,
    listeners: Vec<Listener<T>>,
    channels: Vec<Sender<T>>,
}

impl<T> std::fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Slot")
            .field("name", &self.name)
            .field("listeners", &self.listeners.len())
            .field("channels", &self.channels.len())
            .finish()
    }
}

impl<T: Clone> Slot<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            listeners: Vec::new(),
            channels: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&T) -> anyhow::Result<()> + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Returns a receiver fed with a clone of every emitted value.
    pub fn channel(&mut self) -> Receiver<T> {
        let (tx, rx) = unbounded();
        self.channels.push(tx);
        rx
    }

    pub(crate) fn emit(&mut self, value: &T) {
        for (index, listener) in self.listeners.iter_mut().enumerate() {
            if let Err(err) = listener(value) {
                warn!(slot = self.name, listener = index, error = %err, "slot listener failed");
            }
        }
        self.channels
            .retain(|channel| channel.send(value.clone()).is_ok());
    }
}

/// Notifications exposed to the surrounding UI.
#[derive(Debug)]
pub struct Slots {
    /// Fired after every accepted mutation and during composition updates.
    pub inputting: Slot<()>,
    /// Fired for every keydown, intercepted or not.
    pub keydown: Slot<KeyboardEvent>,
    pub inline_range_update: Slot<Option<InlineRange>>,
    /// Fired with the new read-only flag when it changes.
    pub read_only_change: Slot<bool>,
}

impl Default for Slots {
    fn default() -> Self {
        Self {
            inputting: Slot::new("inputting"),
            keydown: Slot::new("keydown"),
            inline_range_update: Slot::new("inline_range_update"),
            read_only_change: Slot::new("read_only_change"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn failing_listener_does_not_block_others() {
        let mut slot: Slot<u32> = Slot::new("test");
        let seen = Rc::new(Cell::new(0));
        slot.subscribe(|_| anyhow::bail!("observer broke"));
        let counter = Rc::clone(&seen);
        slot.subscribe(move |value| {
            counter.set(counter.get() + *value);
            Ok(())
        });
        slot.emit(&2);
        slot.emit(&3);
        assert_eq!(seen.get(), 5);
    }

    #[test]
    fn dropped_channels_are_pruned() {
        let mut slot: Slot<()> = Slot::new("test");
        let rx = slot.channel();
        let dropped = slot.channel();
        drop(dropped);
        slot.emit(&());
        assert_eq!(rx.try_recv(), Ok(()));
        assert_eq!(slot.channels.len(), 1);
    }
}
