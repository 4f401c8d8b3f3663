//! The arena: tile grid, starting slots, bombs, and explosion resolution.
//!
//! Maps are rectangular character grids: `#` is a wall, `.` is floor, and
//! the digits `0..9` are floor tiles doubling as starting slots, ordered by
//! digit. The number of slots bounds how many players the arena admits.
//! Bombs carry a fixed fuse counted in ticks; when one detonates, the blast
//! covers its own tile plus up to [`BLAST_RADIUS`] tiles in each cardinal
//! direction, stopped by walls. A blast that reaches another bomb detonates
//! it in the same resolution.

use crate::error::GameError;
use log::warn;
use shared::{ArenaState, Point};
use std::fs;
use std::path::Path;

/// Ticks between placing a bomb and its detonation (2 s at the 4 Hz default).
pub const BOMB_FUSE_TICKS: u32 = 8;
/// How far a blast reaches in each cardinal direction.
pub const BLAST_RADIUS: i32 = 2;

const DEFAULT_MAP: &str = "\
###########
#0.......1#
#.#.#.#.#.#
#.........#
#.#.#.#.#.#
#.........#
#.#.#.#.#.#
#2.......3#
###########";

const CROSSFIRE_MAP: &str = "\
#############
#0.........1#
#.##.###.##.#
#2....#....3#
#.##.###.##.#
#4.........5#
#############";

const BUILTIN_MAPS: &[(&str, &str)] = &[("default", DEFAULT_MAP), ("crossfire", CROSSFIRE_MAP)];

/// Directory scanned for user-supplied maps.
const MAP_DIR: &str = "maps";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tile {
    Floor,
    Wall,
}

/// A placed bomb. Stacking several bombs on one tile is allowed.
#[derive(Debug, Clone)]
pub struct Bomb {
    pub position: Point,
    /// Id of the player that placed it, kept for presentation purposes.
    pub owner: u32,
    fuse: u32,
}

/// One loaded map instance with its live bomb state.
#[derive(Debug, Clone)]
pub struct Arena {
    name: String,
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
    starting_positions: Vec<Point>,
    bombs: Vec<Bomb>,
}

impl Arena {
    /// Loads an arena by identifier: a builtin name or a filesystem path.
    pub fn load(identifier: &str) -> Result<Self, GameError> {
        if let Some((_, text)) = BUILTIN_MAPS.iter().find(|(name, _)| *name == identifier) {
            return Self::parse(identifier, text);
        }
        let text = fs::read_to_string(identifier)
            .map_err(|e| GameError::MapInvalid(identifier.to_string(), e.to_string()))?;
        Self::parse(identifier, &text)
    }

    /// Parses and validates map text.
    pub fn parse(name: &str, text: &str) -> Result<Self, GameError> {
        let invalid = |reason: &str| GameError::MapInvalid(name.to_string(), reason.to_string());

        let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        if lines.is_empty() {
            return Err(invalid("map is empty"));
        }

        let width = lines[0].chars().count();
        let mut tiles = Vec::with_capacity(width * lines.len());
        let mut slots: Vec<(u32, Point)> = Vec::new();

        for (y, line) in lines.iter().enumerate() {
            if line.chars().count() != width {
                return Err(invalid("map is not rectangular"));
            }
            for (x, c) in line.chars().enumerate() {
                let tile = match c {
                    '#' => Tile::Wall,
                    '.' => Tile::Floor,
                    d if d.is_ascii_digit() => {
                        let slot = d.to_digit(10).unwrap();
                        if slots.iter().any(|(s, _)| *s == slot) {
                            return Err(invalid("duplicate starting slot"));
                        }
                        slots.push((slot, Point::new(x as i32, y as i32)));
                        Tile::Floor
                    }
                    other => {
                        return Err(invalid(&format!("unexpected tile {:?}", other)));
                    }
                };
                tiles.push(tile);
            }
        }

        if slots.is_empty() {
            return Err(invalid("map has no starting positions"));
        }
        slots.sort_by_key(|(slot, _)| *slot);

        Ok(Self {
            name: name.to_string(),
            width: width as i32,
            height: lines.len() as i32,
            tiles,
            starting_positions: slots.into_iter().map(|(_, p)| p).collect(),
            bombs: Vec::new(),
        })
    }

    /// Map identifier this arena was loaded from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ordered starting slots; their count bounds the player capacity.
    pub fn starting_positions(&self) -> &[Point] {
        &self.starting_positions
    }

    /// True if the tile is in bounds and walkable.
    pub fn is_valid_position(&self, p: Point) -> bool {
        if p.x < 0 || p.y < 0 || p.x >= self.width || p.y >= self.height {
            return false;
        }
        self.tiles[(p.y * self.width + p.x) as usize] == Tile::Floor
    }

    /// Places a bomb at the given tile, owned by the given player.
    pub fn add_bomb(&mut self, position: Point, owner: u32) {
        self.bombs.push(Bomb {
            position,
            owner,
            fuse: BOMB_FUSE_TICKS,
        });
    }

    pub fn bombs(&self) -> &[Bomb] {
        &self.bombs
    }

    pub fn has_bomb_at(&self, p: Point) -> bool {
        self.bombs.iter().any(|b| b.position == p)
    }

    pub fn clear_bombs(&mut self) {
        self.bombs.clear();
    }

    /// Advances every fuse by one tick and resolves detonations, including
    /// chains set off by another bomb's blast. Returns all tiles covered by
    /// an explosion this tick.
    pub fn advance_bombs(&mut self) -> Vec<Point> {
        for bomb in &mut self.bombs {
            bomb.fuse = bomb.fuse.saturating_sub(1);
        }

        let mut blast: Vec<Point> = Vec::new();
        loop {
            let next = self
                .bombs
                .iter()
                .position(|b| b.fuse == 0 || blast.contains(&b.position));
            let Some(i) = next else { break };
            let bomb = self.bombs.swap_remove(i);
            for p in self.blast_tiles(bomb.position) {
                if !blast.contains(&p) {
                    blast.push(p);
                }
            }
        }
        blast
    }

    /// Tiles covered by a detonation at `center`: the tile itself plus up to
    /// [`BLAST_RADIUS`] tiles outward in each direction, stopped by walls.
    fn blast_tiles(&self, center: Point) -> Vec<Point> {
        let mut tiles = vec![center];
        for (dx, dy) in [(0, -1), (0, 1), (-1, 0), (1, 0)] {
            for step in 1..=BLAST_RADIUS {
                let p = Point::new(center.x + dx * step, center.y + dy * step);
                if !self.is_valid_position(p) {
                    break;
                }
                tiles.push(p);
            }
        }
        tiles
    }

    /// The client-visible snapshot of this arena.
    pub fn state(&self) -> ArenaState {
        let rows = (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| match self.tiles[(y * self.width + x) as usize] {
                        Tile::Wall => '#',
                        Tile::Floor => '.',
                    })
                    .collect()
            })
            .collect();
        ArenaState {
            name: self.name.clone(),
            width: self.width,
            height: self.height,
            rows,
            bombs: self.bombs.iter().map(|b| b.position).collect(),
        }
    }
}

/// Lists every loadable map identifier: builtins first, then files found in
/// the `maps/` directory.
pub fn list_maps() -> Vec<String> {
    let mut maps: Vec<String> = BUILTIN_MAPS.iter().map(|(name, _)| name.to_string()).collect();

    if Path::new(MAP_DIR).is_dir() {
        match fs::read_dir(MAP_DIR) {
            Ok(entries) => {
                for entry in entries.flatten() {
                    if entry.path().is_file() {
                        maps.push(entry.path().to_string_lossy().to_string());
                    }
                }
            }
            Err(e) => warn!("Unable to read map directory {}: {}", MAP_DIR, e),
        }
    }

    maps
}
