use crate::core::glyphs::Glyph;
use crate::core::point::Point;
use crate::core::world::{Column, Entity};
use crate::gameplay::components::Visible;
use crate::map::field::Field;
use crate::map::known_map::KnownMap;
use crate::map::region::PackedRegion;
use crate::map::view::MapView;
use crate::map::world_map::WorldMap;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CellView {
    /// What the viewer remembers here, if anything.
    pub remembered: Option<Glyph>,
    pub visible: bool,
    /// Glyph of an occupant the viewer can see right now.
    pub occupant: Option<Glyph>,
}

impl CellView {
    pub fn symbol(&self) -> char {
        self.occupant
            .or(self.remembered)
            .map_or(' ', |g| g.symbol)
    }
}

/// What one agent's screen would show at the end of a tick.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewSnapshot {
    pub viewer: Entity,
    pub taken_at: f64,
    cells: Field<CellView>,
}

impl ViewSnapshot {
    pub fn capture(
        viewer: Entity,
        memory: &KnownMap,
        seen: &PackedRegion,
        world: &WorldMap,
        glyphs: &Column<Visible>,
        taken_at: f64,
    ) -> Self {
        let (width, height) = memory.dimensions();
        let mut cells = Field::from_fn(width, height, |p| {
            let remembered = memory.get_map_at(p).map(|symbol| match memory.get_color_at(p) {
                Some((fg, bg)) => Glyph::new(symbol, fg, bg),
                None => Glyph::plain(symbol),
            });

            CellView {
                remembered,
                visible: seen.contains(p),
                occupant: None,
            }
        });

        for p in world.occupants().points_within(seen) {
            let glyph = world
                .occupants()
                .at(p)
                .iter()
                .find_map(|e| glyphs.get(*e).map(Visible::get));
            if let Some(cell) = cells.get_mut(p) {
                cell.occupant = glyph;
            }
        }

        ViewSnapshot {
            viewer,
            taken_at,
            cells,
        }
    }

    pub fn cell(&self, p: Point) -> Option<&CellView> {
        self.cells.get(p)
    }

    pub fn dimensions(&self) -> (u16, u16) {
        self.cells.dimensions()
    }

    /// One string per row, top to bottom.
    pub fn rows(&self) -> Vec<String> {
        let (width, height) = self.dimensions();
        (0..height as i16)
            .map(|y| {
                (0..width as i16)
                    .map(|x| self.cells.get(Point::new(x, y)).map_or(' ', CellView::symbol))
                    .collect()
            })
            .collect()
    }
}
