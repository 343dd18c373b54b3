//! Owned event channels.
//!
//! Hosts route pane events through an [`EventHub`] instead of letting every
//! component hook the panes directly. A component that must be the only
//! consumer of a channel claims it; later subscriptions from anyone else
//! are refused and earlier ones are evicted. One-shot subscriptions remove
//! themselves the first time their channel fires.
//!
//! Listeners are plain values (`L`), not callbacks: [`EventHub::emit`]
//! returns the listeners to run and the host dispatches them, which keeps
//! all pane borrows in the host's hands.

use std::collections::HashMap;

use tracing::debug;

use super::SyncError;

/// Event sources a host forwards to the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// The source pane scrolled.
    SourceScroll,
    /// Wheel input over the source pane, before native scrolling.
    SourceWheel,
    /// The source text was edited.
    SourceInput,
    /// The render pane scrolled, including resets caused by re-rendering.
    RenderScroll,
    /// Rendered output changed or the layout was resized.
    ContentChanged,
}

/// Who registered a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Owner {
    /// The scroll synchronizer.
    Sync,
    /// Some other host component.
    Host(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

#[derive(Debug, Clone)]
struct Registration<L> {
    id: ListenerId,
    channel: Channel,
    owner: Owner,
    listener: L,
    once: bool,
}

#[derive(Debug, Clone)]
pub struct EventHub<L> {
    registrations: Vec<Registration<L>>,
    claims: HashMap<Channel, Owner>,
    next_id: u64,
}

impl<L> Default for EventHub<L> {
    fn default() -> Self {
        Self {
            registrations: Vec::new(),
            claims: HashMap::new(),
            next_id: 0,
        }
    }
}

impl<L: Clone> EventHub<L> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take exclusive ownership of `channel`.
    ///
    /// Listeners other owners already registered there are dropped. Claiming
    /// a channel one already owns is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ChannelClaimed`] if another owner holds it.
    pub fn claim(&mut self, channel: Channel, owner: Owner) -> Result<(), SyncError> {
        match self.claims.get(&channel) {
            Some(&holder) if holder != owner => {
                return Err(SyncError::ChannelClaimed {
                    channel,
                    owner: holder,
                });
            }
            Some(_) => return Ok(()),
            None => {}
        }
        let before = self.registrations.len();
        self.registrations
            .retain(|r| r.channel != channel || r.owner == owner);
        let evicted = before - self.registrations.len();
        if evicted > 0 {
            debug!(?channel, ?owner, evicted, "claimed channel, evicted listeners");
        }
        self.claims.insert(channel, owner);
        Ok(())
    }

    /// Current exclusive owner of `channel`.
    pub fn owner_of(&self, channel: Channel) -> Option<Owner> {
        self.claims.get(&channel).copied()
    }

    /// Register a listener that runs on every emission of `channel`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ChannelClaimed`] if another owner claimed the
    /// channel.
    pub fn subscribe(
        &mut self,
        channel: Channel,
        owner: Owner,
        listener: L,
    ) -> Result<ListenerId, SyncError> {
        self.register(channel, owner, listener, false)
    }

    /// Register a listener that runs on the next emission only.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ChannelClaimed`] if another owner claimed the
    /// channel.
    pub fn once(
        &mut self,
        channel: Channel,
        owner: Owner,
        listener: L,
    ) -> Result<ListenerId, SyncError> {
        self.register(channel, owner, listener, true)
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.registrations.len();
        self.registrations.retain(|r| r.id != id);
        before != self.registrations.len()
    }

    /// Listeners to run for one emission of `channel`, in registration
    /// order. One-shot listeners are removed before they are returned.
    pub fn emit(&mut self, channel: Channel) -> Vec<L> {
        let fired: Vec<L> = self
            .registrations
            .iter()
            .filter(|r| r.channel == channel)
            .map(|r| r.listener.clone())
            .collect();
        self.registrations
            .retain(|r| !(r.once && r.channel == channel));
        fired
    }

    /// Number of listeners registered on `channel`.
    pub fn listener_count(&self, channel: Channel) -> usize {
        self.registrations
            .iter()
            .filter(|r| r.channel == channel)
            .count()
    }

    fn register(
        &mut self,
        channel: Channel,
        owner: Owner,
        listener: L,
        once: bool,
    ) -> Result<ListenerId, SyncError> {
        if let Some(&holder) = self.claims.get(&channel) {
            if holder != owner {
                return Err(SyncError::ChannelClaimed {
                    channel,
                    owner: holder,
                });
            }
        }
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.registrations.push(Registration {
            id,
            channel,
            owner,
            listener,
            once,
        });
        Ok(id)
    }
}
