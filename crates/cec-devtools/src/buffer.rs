//! Event buffer
//!
//! Bounded FIFO of captured events owned by the background.

use std::collections::VecDeque;

use crate::payload::CustomEventPayload;

/// Events kept before the oldest are dropped
pub const MAX_BUFFER: usize = 500;

/// Bounded event queue, oldest first
#[derive(Debug)]
pub struct EventBuffer {
    events: VecDeque<CustomEventPayload>,
    capacity: usize,
}

impl EventBuffer {
    pub fn new() -> Self {
        Self::with_capacity(MAX_BUFFER)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity.min(MAX_BUFFER)),
            capacity,
        }
    }

    /// Append an event, dropping the oldest beyond capacity.
    /// Returns how many were dropped.
    pub fn push(&mut self, event: CustomEventPayload) -> usize {
        self.events.push_back(event);
        let mut dropped = 0;
        while self.events.len() > self.capacity {
            self.events.pop_front();
            dropped += 1;
        }
        dropped
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Events from one tab
    pub fn count_for_tab(&self, tab_id: u32) -> usize {
        self.events.iter().filter(|e| e.tab_id == Some(tab_id)).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CustomEventPayload> {
        self.events.iter()
    }

    /// Copy of the buffer, oldest first
    pub fn snapshot(&self) -> Vec<CustomEventPayload> {
        self.events.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Drop the events of one tab
    pub fn clear_tab(&mut self, tab_id: u32) {
        self.events.retain(|e| e.tab_id != Some(tab_id));
    }
}

impl Default for EventBuffer {
    fn default() -> Self {
        Self::new()
    }
}
