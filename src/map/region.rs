//! Packed boolean sets over a rectangular grid.
//!
//! A [`PackedRegion`] stores one bit per cell, column by column: every column
//! of `height` cells occupies `ceil(height / 64)` words, and bits past
//! `height` in a column's last word are always zero. All set operations
//! build a new region and leave their inputs untouched, so a region can be
//! handed to other threads once it is built.
//!
//! Combining regions of different dimensions is a caller bug; it is checked
//! with `debug_assert!` only.

use crate::core::point::Point;
use crate::map::field::Field;
use std::fmt;
use std::ops::{BitAnd, BitOr, Not, Sub};

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PackedRegion {
    width: u16,
    height: u16,
    words_per_column: usize,
    data: Vec<u64>,
}

impl PackedRegion {
    /// The empty set ("all wall").
    pub fn empty(width: u16, height: u16) -> Self {
        let words_per_column = (height as usize + 63) / 64;
        PackedRegion {
            width,
            height,
            words_per_column,
            data: vec![0; width as usize * words_per_column],
        }
    }

    /// The full set ("all on").
    pub fn full(width: u16, height: u16) -> Self {
        Self::empty(width, height).negate()
    }

    /// Builds a region from a coordinate collection. Points outside the grid are dropped.
    pub fn pack<I: IntoIterator<Item = Point>>(width: u16, height: u16, points: I) -> Self {
        let mut region = Self::empty(width, height);
        for p in points {
            region.put(p, true);
        }
        region
    }

    pub fn from_predicate<F: FnMut(Point) -> bool>(width: u16, height: u16, mut f: F) -> Self {
        let mut region = Self::empty(width, height);
        for x in 0..width {
            for y in 0..height {
                let p = Point::from((x, y));
                if f(p) {
                    region.put(p, true);
                }
            }
        }
        region
    }

    pub fn from_field(field: &Field<bool>) -> Self {
        let mut region = Self::empty(field.width(), field.height());
        for (p, on) in field.iter() {
            if *on {
                region.put(p, true);
            }
        }
        region
    }

    pub fn to_field(&self) -> Field<bool> {
        Field::from_fn(self.width, self.height, |p| self.contains(p))
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

    pub fn same_size(&self, other: &PackedRegion) -> bool {
        self.width == other.width && self.height == other.height
    }

    fn locate(&self, p: Point) -> Option<(usize, u64)> {
        if !p.within(self.width, self.height) {
            return None;
        }

        let y = p.y as usize;
        let word = p.x as usize * self.words_per_column + y / 64;
        Some((word, 1u64 << (y % 64)))
    }

    fn put(&mut self, p: Point, on: bool) {
        if let Some((word, bit)) = self.locate(p) {
            if on {
                self.data[word] |= bit;
            } else {
                self.data[word] &= !bit;
            }
        }
    }

    /// Mask of the valid bits of the `index`-th word inside a column.
    fn column_mask(&self, index: usize) -> u64 {
        let tail = self.height as usize % 64;
        if index + 1 == self.words_per_column && tail != 0 {
            (1u64 << tail) - 1
        } else {
            !0
        }
    }

    /// Membership query; points outside the grid are never members.
    pub fn contains(&self, p: Point) -> bool {
        match self.locate(p) {
            Some((word, bit)) => self.data[word] & bit != 0,
            None => false,
        }
    }

    pub fn count(&self) -> usize {
        self.data.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|w| *w == 0)
    }

    pub fn first(&self) -> Option<Point> {
        self.iter().next()
    }

    pub fn iter(&self) -> Cells<'_> {
        Cells {
            region: self,
            word: 0,
            bits: self.data.first().copied().unwrap_or(0),
        }
    }

    /// Explicit coordinate list, column by column.
    pub fn unpack(&self) -> Vec<Point> {
        self.iter().collect()
    }

    pub fn insert(&self, p: Point) -> Self {
        let mut next = self.clone();
        next.put(p, true);
        next
    }

    pub fn remove(&self, p: Point) -> Self {
        let mut next = self.clone();
        next.put(p, false);
        next
    }

    fn zip_with<F: Fn(u64, u64) -> u64>(&self, other: &PackedRegion, f: F) -> Self {
        debug_assert!(
            self.same_size(other),
            "region {:?} combined with {:?}",
            self.dimensions(),
            other.dimensions()
        );

        let mut next = self.clone();
        for (a, b) in next.data.iter_mut().zip(other.data.iter()) {
            *a = f(*a, *b);
        }
        next
    }

    pub fn union(&self, other: &PackedRegion) -> Self {
        self.zip_with(other, |a, b| a | b)
    }

    pub fn intersect(&self, other: &PackedRegion) -> Self {
        self.zip_with(other, |a, b| a & b)
    }

    /// `self` minus `other`, i.e. `intersect(self, negate(other))`.
    pub fn subtract(&self, other: &PackedRegion) -> Self {
        self.zip_with(other, |a, b| a & !b)
    }

    pub fn negate(&self) -> Self {
        let mut next = self.clone();
        if self.words_per_column == 0 {
            return next;
        }

        for (i, w) in next.data.iter_mut().enumerate() {
            *w = !*w & self.column_mask(i % self.words_per_column);
        }
        next
    }

    /// Grows the region by `radius` cells in all eight directions (a Chebyshev dilation).
    pub fn expand8way(&self, radius: u16) -> Self {
        let radius = radius.min(self.width.max(self.height));
        let mut current = self.clone();
        for _ in 0..radius {
            current = current.expand_once();
            if current.count() == current.width as usize * current.height as usize {
                break;
            }
        }
        current
    }

    fn expand_once(&self) -> Self {
        let wpc = self.words_per_column;
        if wpc == 0 {
            return self.clone();
        }

        let mut vertical = vec![0u64; self.data.len()];
        for x in 0..self.width as usize {
            let column = &self.data[x * wpc..(x + 1) * wpc];
            for i in 0..wpc {
                let w = column[i];
                let mut grown = w | (w << 1) | (w >> 1);
                if i > 0 {
                    grown |= column[i - 1] >> 63;
                }
                if i + 1 < wpc {
                    grown |= column[i + 1] << 63;
                }
                vertical[x * wpc + i] = grown & self.column_mask(i);
            }
        }

        let mut next = self.clone();
        for x in 0..self.width as usize {
            for i in 0..wpc {
                let mut w = vertical[x * wpc + i];
                if x > 0 {
                    w |= vertical[(x - 1) * wpc + i];
                }
                if x + 1 < self.width as usize {
                    w |= vertical[(x + 1) * wpc + i];
                }
                next.data[x * wpc + i] = w;
            }
        }
        next
    }

    /// Buckets a continuous field: region `i` holds the cells whose largest
    /// threshold not above their value is `thresholds[i]`. Cells below every
    /// threshold land in no region.
    pub fn pack_multi(levels: &Field<f32>, thresholds: &[f32]) -> Vec<PackedRegion> {
        let (width, height) = levels.dimensions();
        let mut regions = vec![PackedRegion::empty(width, height); thresholds.len()];

        for (p, value) in levels.iter() {
            let mut best: Option<usize> = None;
            for (i, t) in thresholds.iter().enumerate() {
                if *t <= *value && best.map_or(true, |b| thresholds[b] < *t) {
                    best = Some(i);
                }
            }

            if let Some(i) = best {
                regions[i].put(p, true);
            }
        }

        regions
    }

    /// Inverse of [`PackedRegion::pack_multi`]: every cell gets its bucket's
    /// threshold, or 0 when no bucket covers it.
    pub fn unpack_multi(
        width: u16,
        height: u16,
        regions: &[PackedRegion],
        thresholds: &[f32],
    ) -> Field<f32> {
        let mut field = Field::new(width, height, 0.0f32);
        for (region, t) in regions.iter().zip(thresholds.iter()) {
            for p in region.iter() {
                field.set(p, *t);
            }
        }
        field
    }

    /// Raw words, column by column. Used by the persistence codec and tests.
    pub(crate) fn words(&self) -> &[u64] {
        &self.data
    }
}

impl fmt::Debug for PackedRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackedRegion")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("cells", &self.unpack())
            .finish()
    }
}

pub struct Cells<'a> {
    region: &'a PackedRegion,
    word: usize,
    bits: u64,
}

impl<'a> Iterator for Cells<'a> {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        let data = &self.region.data;
        while self.bits == 0 {
            self.word += 1;
            if self.word >= data.len() {
                return None;
            }
            self.bits = data[self.word];
        }

        let bit = self.bits.trailing_zeros() as usize;
        self.bits &= self.bits - 1;

        let wpc = self.region.words_per_column;
        let x = self.word / wpc;
        let y = (self.word % wpc) * 64 + bit;
        Some(Point::from((x as i32, y as i32)))
    }
}

impl<'a> IntoIterator for &'a PackedRegion {
    type Item = Point;
    type IntoIter = Cells<'a>;

    fn into_iter(self) -> Cells<'a> {
        self.iter()
    }
}

impl BitOr for &PackedRegion {
    type Output = PackedRegion;

    fn bitor(self, rhs: &PackedRegion) -> PackedRegion {
        self.union(rhs)
    }
}

impl BitAnd for &PackedRegion {
    type Output = PackedRegion;

    fn bitand(self, rhs: &PackedRegion) -> PackedRegion {
        self.intersect(rhs)
    }
}

impl Sub for &PackedRegion {
    type Output = PackedRegion;

    fn sub(self, rhs: &PackedRegion) -> PackedRegion {
        self.subtract(rhs)
    }
}

impl Not for &PackedRegion {
    type Output = PackedRegion;

    fn not(self) -> PackedRegion {
        self.negate()
    }
}
