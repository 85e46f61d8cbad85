use crate::core::point::{distance, Point};
use crate::map::field::Field;
use crate::map::shadow_casting::{Shadowcaster, SymmetricShadowcast};

/// Resistance at or above this blocks sight completely.
pub const OPAQUE: f32 = 1.0;

/// Light levels around `origin`: `1 - d / (radius + 1)` for every visible
/// cell within euclidean distance `radius`, 0 elsewhere. Cells outside the
/// grid block sight.
pub fn general_fov<S: Shadowcaster>(resistance: &Field<f32>, origin: Point, radius: u16) -> Field<f32> {
    let (width, height) = resistance.dimensions();
    let mut light = Field::new(width, height, 0.0f32);
    if !resistance.contains(origin) {
        return light;
    }

    let reach = radius as f32;
    let falloff = reach + 1.0;

    S::compute(
        origin,
        radius,
        &|p| resistance.get(p).map_or(true, |r| *r >= OPAQUE),
        &mut |p| {
            let d = distance(origin, p);
            if d <= reach {
                if let Some(cell) = light.get_mut(p) {
                    *cell = 1.0 - d / falloff;
                }
            }
        },
    );

    light
}

pub fn light_levels(resistance: &Field<f32>, origin: Point, radius: u16) -> Field<f32> {
    general_fov::<SymmetricShadowcast>(resistance, origin, radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn light_fades_with_distance() {
        let open = Field::new(9, 9, 0.0f32);
        let light = light_levels(&open, Point::new(4, 4), 3);

        assert_relative_eq!(*light.get(Point::new(4, 4)).unwrap(), 1.0);
        assert_relative_eq!(*light.get(Point::new(5, 4)).unwrap(), 0.75);
        assert_relative_eq!(*light.get(Point::new(7, 4)).unwrap(), 0.25);
        assert_eq!(*light.get(Point::new(8, 4)).unwrap(), 0.0);
        // Corner of the scanned square lies beyond the radius.
        assert_eq!(*light.get(Point::new(7, 7)).unwrap(), 0.0);
    }

    #[test]
    fn walls_cast_shadows() {
        let mut resistance = Field::new(9, 9, 0.0f32);
        resistance.set(Point::new(5, 4), 1.0);
        let light = light_levels(&resistance, Point::new(4, 4), 3);

        assert!(*light.get(Point::new(5, 4)).unwrap() > 0.0);
        assert_eq!(*light.get(Point::new(6, 4)).unwrap(), 0.0);
    }

    #[test]
    fn origin_off_the_grid_sees_nothing() {
        let open = Field::new(4, 4, 0.0f32);
        let light = light_levels(&open, Point::new(-1, 2), 3);
        assert!(light.iter().all(|(_, l)| *l == 0.0));
    }
}
