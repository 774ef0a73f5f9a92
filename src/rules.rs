//! Placement rules: fleet composition and ship geometry validation.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::board::Ship;
use crate::config::{DEFAULT_BOARD_HEIGHT, DEFAULT_BOARD_WIDTH};

/// Required number of ships of one size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipConfig {
    pub size: u8,
    pub count: u8,
}

/// Externally supplied configuration governing fleet composition and
/// placement legality for one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    pub name: String,
    pub width: u8,
    pub height: u8,
    pub ships: Vec<ShipConfig>,
    pub allow_diagonal: bool,
    pub touch_prohibited: bool,
}

impl RuleSet {
    /// The canonical 10×10 rule set: one 4-cell ship, two 3-cell, three
    /// 2-cell, four 1-cell; straight placements only, touching prohibited.
    pub fn classic() -> Self {
        Self {
            name: "classic".to_string(),
            width: DEFAULT_BOARD_WIDTH,
            height: DEFAULT_BOARD_HEIGHT,
            ships: vec![
                ShipConfig { size: 4, count: 1 },
                ShipConfig { size: 3, count: 2 },
                ShipConfig { size: 2, count: 3 },
                ShipConfig { size: 1, count: 4 },
            ],
            allow_diagonal: false,
            touch_prohibited: true,
        }
    }
}

/// Validate a single ship against board bounds, its own geometry and the
/// already-placed ships.
pub fn validate_placement(ship: &Ship, others: &[Ship], rules: &RuleSet) -> bool {
    if ship.positions.len() != ship.size as usize {
        return false;
    }

    for pos in &ship.positions {
        if pos.x >= rules.width || pos.y >= rules.height {
            return false;
        }
    }

    let unique: HashSet<_> = ship.positions.iter().collect();
    if unique.len() != ship.positions.len() {
        return false;
    }

    if !rules.allow_diagonal && ship.positions.len() > 1 {
        let same_x = ship.positions.iter().all(|p| p.x == ship.positions[0].x);
        let same_y = ship.positions.iter().all(|p| p.y == ship.positions[0].y);
        if !same_x && !same_y {
            return false;
        }
        // Each consecutive pair must be orthogonally adjacent.
        for pair in ship.positions.windows(2) {
            let dx = pair[0].x.abs_diff(pair[1].x);
            let dy = pair[0].y.abs_diff(pair[1].y);
            if dx + dy != 1 {
                return false;
            }
        }
    }

    if rules.touch_prohibited {
        for other in others {
            if ships_touch(ship, other) {
                return false;
            }
        }
    }

    true
}

/// Two ships touch when any of their cells are within Chebyshev distance 1
/// of each other, diagonal adjacency and overlap included.
pub fn ships_touch(a: &Ship, b: &Ship) -> bool {
    for pa in &a.positions {
        for pb in &b.positions {
            if pa.x.abs_diff(pb.x) <= 1 && pa.y.abs_diff(pb.y) <= 1 {
                return true;
            }
        }
    }
    false
}

/// Validate a whole fleet: exact per-size ship counts, then each ship's
/// placement against all others. The count check runs first so a malformed
/// fleet fails before the pairwise geometry pass.
pub fn validate_fleet(ships: &[Ship], rules: &RuleSet) -> bool {
    let mut counts: HashMap<u8, u8> = HashMap::new();
    for ship in ships {
        *counts.entry(ship.size).or_insert(0) += 1;
    }
    for config in &rules.ships {
        if counts.get(&config.size).copied().unwrap_or(0) != config.count {
            return false;
        }
    }
    // No ships of a size the rule set does not list.
    for size in counts.keys() {
        if !rules.ships.iter().any(|c| c.size == *size) {
            return false;
        }
    }

    for (i, ship) in ships.iter().enumerate() {
        let others: Vec<Ship> = ships
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, s)| s.clone())
            .collect();
        if !validate_placement(ship, &others, rules) {
            return false;
        }
    }

    true
}
