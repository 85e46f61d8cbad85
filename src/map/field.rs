use crate::core::point::Point;
use crate::map::region::PackedRegion;
use crate::map::stencil::Stencil;
use crate::map::types::*;
use serde::{Deserialize, Serialize};

/// Dense `width` x `height` grid stored column by column (`x * height + y`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Field<T> {
    width: u16,
    height: u16,
    values: Vec<T>,
}

impl<T: Clone> Field<T> {
    pub fn new(width: u16, height: u16, fill: T) -> Self {
        Field {
            width,
            height,
            values: vec![fill; width as usize * height as usize],
        }
    }

    pub fn fill(&mut self, value: T) {
        for v in &mut self.values {
            *v = value.clone();
        }
    }
}

impl<T> Field<T> {
    pub fn from_fn<F: FnMut(Point) -> T>(width: u16, height: u16, mut f: F) -> Self {
        let mut values = Vec::with_capacity(width as usize * height as usize);
        for x in 0..width {
            for y in 0..height {
                values.push(f(Point::from((x, y))));
            }
        }

        Field {
            width,
            height,
            values,
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn dimensions(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.within(self.width, self.height)
    }

    fn index(&self, p: Point) -> Option<usize> {
        if self.contains(p) {
            Some(p.x as usize * self.height as usize + p.y as usize)
        } else {
            None
        }
    }

    pub fn get(&self, p: Point) -> Option<&T> {
        self.index(p).map(|i| &self.values[i])
    }

    pub fn get_mut(&mut self, p: Point) -> Option<&mut T> {
        match self.index(p) {
            Some(i) => Some(&mut self.values[i]),
            None => None,
        }
    }

    /// Writes `value` at `p`; returns false when `p` is out of bounds.
    pub fn set(&mut self, p: Point, value: T) -> bool {
        match self.index(p) {
            Some(i) => {
                self.values[i] = value;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Point, &T)> + '_ {
        let height = self.height.max(1) as usize;
        self.values.iter().enumerate().map(move |(i, v)| {
            (Point::from(((i / height) as i32, (i % height) as i32)), v)
        })
    }

    pub fn map<U, F: Fn(&T) -> U>(&self, f: F) -> Field<U> {
        Field {
            width: self.width,
            height: self.height,
            values: self.values.iter().map(f).collect(),
        }
    }
}

impl<T: Copy> Field<T> {
    pub fn value_or(&self, p: Point, default: T) -> T {
        self.get(p).copied().unwrap_or(default)
    }
}

impl<T: Clone> BrushSetter<Point, T> for Field<T> {
    fn set_brush(&mut self, tile: &Point, value: T) {
        self.set(*tile, value);
    }
}

impl<T: Clone> BrushSetter<PackedRegion, T> for Field<T> {
    fn set_brush(&mut self, brush: &PackedRegion, value: T) {
        for tile in brush.iter() {
            self.set(tile, value.clone());
        }
    }
}

impl<T: Clone> BrushSetter<Stencil, T> for Field<T> {
    fn set_brush(&mut self, brush: &Stencil, value: T) {
        let region = brush.to_region(self.width, self.height);
        self.set_brush(&region, value);
    }
}

impl<T: Copy> BrushMaybeGetter<Point, T> for Field<T> {
    fn maybe_get(&self, p: &Point) -> Option<T> {
        self.get(*p).copied()
    }
}
