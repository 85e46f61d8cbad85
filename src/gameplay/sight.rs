use crate::core::point::Point;
use crate::map::field::Field;
use crate::map::fov::light_levels;
use crate::map::region::PackedRegion;

/// Light levels bucketed to `count` thresholds `1/count, 2/count, .. 1`,
/// one packed region per threshold.
#[derive(Clone, Debug, PartialEq)]
pub struct CompressedLight {
    thresholds: Vec<f32>,
    regions: Vec<PackedRegion>,
}

impl CompressedLight {
    pub fn thresholds(count: usize) -> Vec<f32> {
        (1..=count).map(|i| i as f32 / count as f32).collect()
    }

    pub fn compress(levels: &Field<f32>, count: usize) -> Self {
        let thresholds = Self::thresholds(count);
        let regions = PackedRegion::pack_multi(levels, &thresholds);
        CompressedLight {
            thresholds,
            regions,
        }
    }

    pub fn decompress(&self, width: u16, height: u16) -> Field<f32> {
        PackedRegion::unpack_multi(width, height, &self.regions, &self.thresholds)
    }

    pub fn level_at(&self, p: Point) -> f32 {
        self.regions
            .iter()
            .zip(self.thresholds.iter())
            .find(|(r, _)| r.contains(p))
            .map_or(0.0, |(_, t)| *t)
    }

    pub fn level_count(&self) -> usize {
        self.thresholds.len()
    }
}

#[derive(Clone, Debug, PartialEq)]
enum LightLevels {
    Dense(Field<f32>),
    Compressed(CompressedLight),
}

/// Per-agent sight: how far it sees and what it saw on the last pass.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldOfView {
    pub distance: u16,
    levels: LightLevels,
    seen: PackedRegion,
}

impl FieldOfView {
    pub fn new(distance: u16) -> Self {
        FieldOfView {
            distance,
            levels: LightLevels::Dense(Field::new(0, 0, 0.0)),
            seen: PackedRegion::empty(0, 0),
        }
    }

    /// Recomputes light around `origin`. With `compress` set to a level
    /// count, only the bucketed levels are kept; the seen region is always
    /// taken from the exact levels.
    pub fn recompute(&mut self, resistance: &Field<f32>, origin: Point, compress: Option<usize>) {
        let light = light_levels(resistance, origin, self.distance);
        self.seen = PackedRegion::from_predicate(light.width(), light.height(), |p| {
            light.value_or(p, 0.0) > 0.0
        });

        self.levels = match compress {
            Some(count) if count > 0 => LightLevels::Compressed(CompressedLight::compress(&light, count)),
            _ => LightLevels::Dense(light),
        };
    }

    /// Cells with light above zero on the last pass.
    pub fn seen(&self) -> &PackedRegion {
        &self.seen
    }

    pub fn sees(&self, p: Point) -> bool {
        self.seen.contains(p)
    }

    pub fn light_at(&self, p: Point) -> f32 {
        match &self.levels {
            LightLevels::Dense(field) => field.value_or(p, 0.0),
            LightLevels::Compressed(c) => c.level_at(p),
        }
    }

    pub fn light_levels(&self) -> Field<f32> {
        match &self.levels {
            LightLevels::Dense(field) => field.clone(),
            LightLevels::Compressed(c) => c.decompress(self.seen.width(), self.seen.height()),
        }
    }

    pub fn is_compressed(&self) -> bool {
        matches!(self.levels, LightLevels::Compressed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn compressed_levels_round_down() {
        let mut levels = Field::new(3, 1, 0.0f32);
        levels.set(Point::new(0, 0), 0.1);
        levels.set(Point::new(1, 0), 0.6);
        levels.set(Point::new(2, 0), 1.0);

        let compressed = CompressedLight::compress(&levels, 4);
        assert_eq!(compressed.level_at(Point::new(0, 0)), 0.0);
        assert_relative_eq!(compressed.level_at(Point::new(1, 0)), 0.5);
        assert_relative_eq!(compressed.level_at(Point::new(2, 0)), 1.0);

        let again = CompressedLight::compress(&compressed.decompress(3, 1), 4);
        assert_eq!(again, compressed);
    }

    #[test]
    fn seen_region_survives_compression() {
        let open = Field::new(9, 9, 0.0f32);
        let mut fov = FieldOfView::new(3);
        fov.recompute(&open, Point::new(4, 4), Some(4));

        // 1 - 3/4 sits exactly on the lowest threshold.
        assert!(fov.sees(Point::new(7, 4)));
        assert!(fov.is_compressed());
        assert_relative_eq!(fov.light_at(Point::new(4, 4)), 1.0);
        assert_relative_eq!(fov.light_at(Point::new(5, 4)), 0.75);
        assert_eq!(fov.light_levels().dimensions(), (9, 9));
    }

    #[test]
    fn one_cell_of_sight_around_a_wall() {
        let mut resistance = Field::new(10, 10, 0.0f32);
        resistance.set(Point::new(3, 3), 1.0);
        let mut fov = FieldOfView::new(1);
        fov.recompute(&resistance, Point::new(3, 3), None);

        assert_eq!(fov.seen().count(), 5);
        assert!(fov.sees(Point::new(3, 3)));
        assert!(!fov.sees(Point::new(4, 4)));
    }
}
