use crate::core::colors::Color;
use crate::core::point::Point;
use crate::core::world::Entity;

/// Read access shared by the authoritative map and every partial copy of it.
pub trait MapView {
    fn width(&self) -> u16;
    fn height(&self) -> u16;

    fn get_map_at(&self, p: Point) -> Option<char>;

    /// `(foreground, background)` recorded at `p`.
    fn get_color_at(&self, p: Point) -> Option<(Color, Color)>;

    fn get_entities_at(&self, p: Point) -> Vec<Entity>;

    fn get_entities_near(&self, p: Point, radius: u16) -> Vec<Entity>;

    fn dimensions(&self) -> (u16, u16) {
        (self.width(), self.height())
    }
}
