use crate::core::point::Point;
use crate::core::world::Entity;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};

#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    MapReplaced { width: u16, height: u16 },
    CellChanged(Point),
    GlyphMoved { entity: Entity, from: Point, to: Point },
}

/// Owner side of the map event channel. Producers hold cloned senders.
pub struct EventChannel {
    sender: Sender<MapEvent>,
    receiver: Receiver<MapEvent>,
}

impl Default for EventChannel {
    fn default() -> Self {
        let (sender, receiver) = channel();
        EventChannel { sender, receiver }
    }
}

impl EventChannel {
    pub fn sender(&self) -> Sender<MapEvent> {
        self.sender.clone()
    }

    pub fn send(&self, event: MapEvent) {
        // The receiver lives as long as `self`, so this cannot fail.
        let _ = self.sender.send(event);
    }

    pub fn drain(&self) -> Vec<MapEvent> {
        let mut events = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_returns_events_in_send_order() {
        let events = EventChannel::default();
        let tx = events.sender();
        tx.send(MapEvent::CellChanged(Point::new(1, 1))).unwrap();
        events.send(MapEvent::MapReplaced { width: 4, height: 4 });

        assert_eq!(
            events.drain(),
            vec![
                MapEvent::CellChanged(Point::new(1, 1)),
                MapEvent::MapReplaced { width: 4, height: 4 },
            ]
        );
        assert!(events.drain().is_empty());
    }
}
