//! Board data model: ship positions and shot history on an N×M grid.

use serde::{Deserialize, Serialize};

/// A cell coordinate, 0-indexed from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: u8,
    pub y: u8,
}

impl Position {
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }
}

/// A placed ship: opaque id, declared size and the cells it occupies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ship {
    pub id: String,
    pub size: u8,
    pub positions: Vec<Position>,
}

/// One participant's board: fleet plus append-only shot history.
///
/// Hits and misses never share a position, a position is recorded at most
/// once, and a ship id appears in `sunken_ships` exactly when every one of
/// its cells is present in `hits`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardState {
    pub width: u8,
    pub height: u8,
    pub ships: Vec<Ship>,
    pub hits: Vec<Position>,
    pub misses: Vec<Position>,
    pub sunken_ships: Vec<String>,
}

impl BoardState {
    /// Create an empty board with no ships and no shot history.
    pub fn new(width: u8, height: u8) -> Self {
        Self {
            width,
            height,
            ships: Vec::new(),
            hits: Vec::new(),
            misses: Vec::new(),
            sunken_ships: Vec::new(),
        }
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// The ship occupying `pos`, if any.
    pub fn ship_at(&self, pos: Position) -> Option<&Ship> {
        self.ships.iter().find(|ship| ship.positions.contains(&pos))
    }

    pub fn is_hit(&self, pos: Position) -> bool {
        self.hits.contains(&pos)
    }

    pub fn is_miss(&self, pos: Position) -> bool {
        self.misses.contains(&pos)
    }

    /// `true` when every cell of `ship` is present in the hit set.
    pub fn is_ship_sunken(&self, ship: &Ship) -> bool {
        ship.positions.iter().all(|pos| self.is_hit(*pos))
    }

    /// Record a hit. No-op if the position was already hit; otherwise the
    /// sunk-ship membership is re-evaluated for the ship at that cell.
    pub fn add_hit(&mut self, pos: Position) {
        if self.is_hit(pos) {
            return;
        }
        self.hits.push(pos);

        let sunk_id = self.ship_at(pos).and_then(|ship| {
            if ship.positions.iter().all(|p| self.hits.contains(p)) {
                Some(ship.id.clone())
            } else {
                None
            }
        });
        if let Some(id) = sunk_id {
            if !self.sunken_ships.contains(&id) {
                self.sunken_ships.push(id);
            }
        }
    }

    /// Record a miss. No-op if the position was already a miss.
    pub fn add_miss(&mut self, pos: Position) {
        if self.is_miss(pos) {
            return;
        }
        self.misses.push(pos);
    }

    /// `true` when the board carries at least one ship and all are sunk.
    pub fn is_cleared(&self) -> bool {
        !self.ships.is_empty() && self.sunken_ships.len() == self.ships.len()
    }

    /// All in-bounds neighbor cells (including diagonals) of every sunk
    /// ship's positions, excluding cells already hit or missed. Clients and
    /// the bot use this to skip cells that cannot hold an undiscovered ship.
    pub fn sunk_perimeter(&self) -> Vec<Position> {
        let mut mask: Vec<Position> = Vec::new();

        for ship_id in &self.sunken_ships {
            let Some(ship) = self.ships.iter().find(|s| &s.id == ship_id) else {
                continue;
            };
            for pos in &ship.positions {
                for dx in -1i16..=1 {
                    for dy in -1i16..=1 {
                        let x = pos.x as i16 + dx;
                        let y = pos.y as i16 + dy;
                        if x < 0 || y < 0 || x >= self.width as i16 || y >= self.height as i16 {
                            continue;
                        }
                        let cell = Position::new(x as u8, y as u8);
                        if !self.is_hit(cell) && !self.is_miss(cell) && !mask.contains(&cell) {
                            mask.push(cell);
                        }
                    }
                }
            }
        }

        mask
    }

    /// Serialize to the flat JSON encoding used by the persistence layer.
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Restore a board from its JSON encoding. Every field, including empty
    /// collections, survives the round trip unchanged.
    pub fn from_json(data: &str) -> anyhow::Result<Self> {
        serde_json::from_str(data).map_err(|e| anyhow::anyhow!("invalid board data: {}", e))
    }
}
