//! Timestamped control events carried by control pins.

use crate::handle::Handle;

/// Shared handle to a [`ControlData`] event list.
pub type ControlHandle = Handle<ControlData>;

/// One control event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlEvent {
    /// Sample offset within the current block.
    pub offset: u32,
    /// Application-defined event id (note number, controller, trigger).
    pub id: u32,
    /// Event payload.
    pub value: f32,
}

impl ControlEvent {
    /// Create an event.
    pub const fn new(offset: u32, id: u32, value: f32) -> Self {
        Self { offset, id, value }
    }
}

/// Ordered list of control events produced during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlData {
    events: Vec<ControlEvent>,
}

impl ControlData {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    pub fn push(&mut self, event: ControlEvent) {
        self.events.push(event);
    }

    /// Remove all events.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Events in push order.
    pub fn events(&self) -> &[ControlEvent] {
        &self.events
    }

    /// Iterate events in push order.
    pub fn iter(&self) -> std::slice::Iter<'_, ControlEvent> {
        self.events.iter()
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if there are no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Sort events by offset, keeping push order for equal offsets.
    pub fn sort_by_offset(&mut self) {
        self.events.sort_by_key(|e| e.offset);
    }
}

impl<'a> IntoIterator for &'a ControlData {
    type Item = &'a ControlEvent;
    type IntoIter = std::slice::Iter<'a, ControlEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Extend<ControlEvent> for ControlData {
    fn extend<I: IntoIterator<Item = ControlEvent>>(&mut self, iter: I) {
        self.events.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_iterate_clear() {
        let mut data = ControlData::new();
        data.push(ControlEvent::new(12, 1, 0.5));
        data.push(ControlEvent::new(3, 2, 1.0));
        assert_eq!(data.len(), 2);

        data.sort_by_offset();
        let offsets: Vec<u32> = data.iter().map(|e| e.offset).collect();
        assert_eq!(offsets, vec![3, 12]);

        data.clear();
        assert!(data.is_empty());
    }

    #[test]
    fn handle_shares_events() {
        let handle = ControlHandle::default();
        let reader = handle.clone();
        handle.write().push(ControlEvent::new(0, 9, 1.0));
        assert_eq!(reader.read().events(), &[ControlEvent::new(0, 9, 1.0)]);
        assert!(reader.ptr_eq(&handle));
    }
}
