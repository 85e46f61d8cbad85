use crate::core::glyphs::Glyph;
use crate::core::point::Point;
use crate::core::thread_safety::{thread_safe, ThreadSafe};
use crate::gameplay::team::TeamId;
use crate::map::known_map::KnownMap;
use crate::map::region::PackedRegion;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Positioned(pub Point);

impl From<Point> for Positioned {
    fn from(p: Point) -> Self {
        Positioned(p)
    }
}

impl Positioned {
    pub fn at(x: i16, y: i16) -> Self {
        Positioned(Point::new(x, y))
    }

    pub fn update(&mut self, p: impl Into<Point>) {
        self.0 = p.into();
    }

    pub fn get(&self) -> Point {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visible(pub Glyph);

impl Visible {
    pub fn get(&self) -> Glyph {
        self.0
    }
}

/// Team link. Out of contact agents neither upload nor download.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Radio {
    pub enabled: bool,
    pub in_contact: bool,
}

impl Default for Radio {
    fn default() -> Self {
        Radio {
            enabled: true,
            in_contact: true,
        }
    }
}

impl Radio {
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Turning the radio off also drops contact, so turning it back on
    /// counts as re-contact on the next download.
    pub fn disable(&mut self) {
        self.enabled = false;
        self.in_contact = false;
    }
}

/// Hands memory to teammates standing within `radius`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSharing {
    pub radius: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember(pub TeamId);

/// Personal map knowledge plus the cells seen since the last upload.
#[derive(Clone, Debug)]
pub struct Memory {
    pub map: ThreadSafe<KnownMap>,
    pub unreported: ThreadSafe<PackedRegion>,
}

impl Memory {
    pub fn new(width: u16, height: u16) -> Self {
        Memory {
            map: thread_safe(KnownMap::new(width, height)),
            unreported: thread_safe(PackedRegion::empty(width, height)),
        }
    }

    pub fn from_map(map: KnownMap) -> Self {
        let (width, height) = (map.known_region().width(), map.known_region().height());
        Memory {
            map: thread_safe(map),
            unreported: thread_safe(PackedRegion::empty(width, height)),
        }
    }

    /// Clears everything for a map of the new size.
    pub fn resize(&self, width: u16, height: u16) {
        self.map.write().resize(width, height);
        *self.unreported.write() = PackedRegion::empty(width, height);
    }
}

/// Steps still to take, nearest first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementList(pub VecDeque<Point>);

impl MovementList {
    pub fn replace(&mut self, steps: impl IntoIterator<Item = Point>) {
        self.0 = steps.into_iter().collect();
    }

    pub fn next_step(&mut self) -> Option<Point> {
        self.0.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination(pub Point);
