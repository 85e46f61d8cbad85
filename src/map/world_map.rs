use crate::core::colors::Color;
use crate::core::glyphs::Glyph;
use crate::core::point::Point;
use crate::core::world::Entity;
use crate::map::field::Field;
use crate::map::occupants::Occupants;
use crate::map::region::PackedRegion;
use crate::map::stencil::{shrink, walls, Stencil};
use crate::map::view::MapView;
use std::sync::OnceLock;

/// Ground truth for one level: terrain, colors and who stands where.
#[derive(Clone, Debug)]
pub struct WorldMap {
    width: u16,
    height: u16,
    wall_symbol: char,
    terrain: Field<char>,
    foreground: Field<Color>,
    background: Field<Color>,
    open: PackedRegion,
    resistance: OnceLock<Field<f32>>,
    occupants: Occupants,
}

impl WorldMap {
    /// A solid level: every cell is a wall until carved.
    pub fn new(width: u16, height: u16, wall_symbol: char) -> Self {
        Self::filled(width, height, Glyph::plain(wall_symbol), wall_symbol)
    }

    pub fn filled(width: u16, height: u16, glyph: Glyph, wall_symbol: char) -> Self {
        let open = if glyph.symbol == wall_symbol {
            PackedRegion::empty(width, height)
        } else {
            PackedRegion::full(width, height)
        };

        WorldMap {
            width,
            height,
            wall_symbol,
            terrain: Field::new(width, height, glyph.symbol),
            foreground: Field::new(width, height, glyph.foreground),
            background: Field::new(width, height, glyph.background),
            open,
            resistance: OnceLock::new(),
            occupants: Occupants::default(),
        }
    }

    pub fn wall_symbol(&self) -> char {
        self.wall_symbol
    }

    /// Single-cell terrain write. Returns false, and keeps the cached
    /// resistance grid, when `p` is out of bounds or already holds this glyph.
    pub fn set_cell(&mut self, p: Point, symbol: char, fg: Color, bg: Color) -> bool {
        match self.glyph_at(p) {
            Some(current) if current != Glyph::new(symbol, fg, bg) => {}
            _ => return false,
        }

        self.terrain.set(p, symbol);
        self.foreground.set(p, fg);
        self.background.set(p, bg);
        self.open = if symbol == self.wall_symbol {
            self.open.remove(p)
        } else {
            self.open.insert(p)
        };
        self.resistance = OnceLock::new();
        true
    }

    pub fn set_glyph(&mut self, p: Point, glyph: Glyph) -> bool {
        self.set_cell(p, glyph.symbol, glyph.foreground, glyph.background)
    }

    pub fn paint(&mut self, region: &PackedRegion, glyph: Glyph) {
        for p in region.iter() {
            self.set_glyph(p, glyph);
        }
    }

    pub fn paint_stencil(&mut self, stencil: &Stencil, glyph: Glyph) {
        let region = stencil.to_region(self.width, self.height);
        self.paint(&region, glyph);
    }

    /// Walls on the outline of `room`, floor inside it.
    pub fn carve_room(&mut self, room: &Stencil, floor: Glyph, wall: Glyph) {
        self.paint_stencil(&walls(room), wall);
        self.paint_stencil(&shrink(room, 1), floor);
    }

    pub fn glyph_at(&self, p: Point) -> Option<Glyph> {
        Some(Glyph::new(
            *self.terrain.get(p)?,
            *self.foreground.get(p)?,
            *self.background.get(p)?,
        ))
    }

    pub fn terrain(&self) -> &Field<char> {
        &self.terrain
    }

    pub fn is_open(&self, p: Point) -> bool {
        self.open.contains(p)
    }

    /// Cells whose terrain does not block movement or sight.
    pub fn open_region(&self) -> &PackedRegion {
        &self.open
    }

    pub fn walkability(&self) -> Field<bool> {
        self.open.to_field()
    }

    /// 1.0 on walls, 0.0 elsewhere. Computed on first use after a terrain write.
    pub fn visibility_resistance(&self) -> &Field<f32> {
        self.resistance.get_or_init(|| {
            let wall = self.wall_symbol;
            self.terrain.map(|c| if *c == wall { 1.0 } else { 0.0 })
        })
    }

    pub fn set_occupant(&mut self, entity: Entity, p: Point) {
        self.occupants.place(entity, p);
    }

    pub fn remove_occupant(&mut self, entity: Entity) -> Option<Point> {
        self.occupants.remove(entity)
    }

    pub fn location_of(&self, entity: Entity) -> Option<Point> {
        self.occupants.location(entity)
    }

    pub fn occupants(&self) -> &Occupants {
        &self.occupants
    }

    pub fn occupied_region(&self) -> PackedRegion {
        self.occupants.region(self.width, self.height)
    }

    pub fn occupants_near(&self, p: Point, radius: u16) -> Vec<Entity> {
        self.occupants.near(p, radius, self.width, self.height)
    }
}

impl MapView for WorldMap {
    fn width(&self) -> u16 {
        self.width
    }

    fn height(&self) -> u16 {
        self.height
    }

    fn get_map_at(&self, p: Point) -> Option<char> {
        self.terrain.get(p).copied()
    }

    fn get_color_at(&self, p: Point) -> Option<(Color, Color)> {
        Some((*self.foreground.get(p)?, *self.background.get(p)?))
    }

    fn get_entities_at(&self, p: Point) -> Vec<Entity> {
        self.occupants.at(p).to_vec()
    }

    fn get_entities_near(&self, p: Point, radius: u16) -> Vec<Entity> {
        self.occupants_near(p, radius)
    }
}
