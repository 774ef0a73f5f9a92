//! Computer opponent: hunt/target shot selection and random fleet generation.

use std::collections::{HashSet, VecDeque};
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::board::{Position, Ship};
use crate::config::{BOT_SEARCH_ATTEMPTS, FLEET_PLACEMENT_ATTEMPTS};
use crate::error::GameError;
use crate::rules::{validate_placement, RuleSet};
use crate::shot::ShotResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotDifficulty {
    Easy,
    Medium,
    Hard,
}

impl FromStr for BotDifficulty {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(BotDifficulty::Easy),
            "medium" => Ok(BotDifficulty::Medium),
            "hard" => Ok(BotDifficulty::Hard),
            other => Err(GameError::internal(format!(
                "unknown bot difficulty: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HuntingMode {
    Search,
    Target,
}

/// Stateful targeting machine, owned per bot-controlled session.
///
/// In search mode shots are random over unexplored cells; a hit switches to
/// target mode, which drains a queue of candidate neighbor cells until the
/// ship sinks. Difficulty tiers gate how much of the machine is used.
#[derive(Debug)]
pub struct BotStrategy {
    difficulty: BotDifficulty,
    width: u8,
    height: u8,
    fired: HashSet<Position>,
    hits: Vec<Position>,
    pending_targets: VecDeque<Position>,
    last_hit: Option<Position>,
    mode: HuntingMode,
}

impl BotStrategy {
    pub fn new(difficulty: BotDifficulty, width: u8, height: u8) -> Self {
        Self {
            difficulty,
            width,
            height,
            fired: HashSet::new(),
            hits: Vec::new(),
            pending_targets: VecDeque::new(),
            last_hit: None,
            mode: HuntingMode::Search,
        }
    }

    pub fn difficulty(&self) -> BotDifficulty {
        self.difficulty
    }

    /// Pick the next coordinate to fire at. Never returns a cell the
    /// strategy has already fired upon while any cell remains unexplored.
    pub fn next_shot<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Position {
        match self.difficulty {
            BotDifficulty::Easy => self.random_shot(rng),
            BotDifficulty::Medium => self.targeted_shot(rng),
            BotDifficulty::Hard => self.advanced_shot(rng),
        }
    }

    /// Record a shot outcome: remembers the coordinate, updates the hit
    /// chain and hunting mode, and on a plain hit enqueues the orthogonal
    /// neighbors as candidates. A sink clears the targeting state.
    pub fn process_result(&mut self, pos: Position, result: &ShotResult) {
        self.fired.insert(pos);

        match result {
            ShotResult::Miss => {}
            ShotResult::Hit => {
                self.hits.push(pos);
                self.last_hit = Some(pos);
                self.mode = HuntingMode::Target;
                for cell in self.adjacent_cells(pos) {
                    if !self.fired.contains(&cell) && !self.pending_targets.contains(&cell) {
                        self.pending_targets.push_back(cell);
                    }
                }
            }
            ShotResult::Sink { .. } => {
                self.hits.push(pos);
                self.pending_targets.clear();
                self.last_hit = None;
                self.mode = HuntingMode::Search;
            }
        }
    }

    /// Mark a coordinate as explored without an outcome. Used when another
    /// shooter already fired there and the cell is off limits either way.
    pub fn mark_fired(&mut self, pos: Position) {
        self.fired.insert(pos);
    }

    pub fn is_targeting(&self) -> bool {
        self.mode == HuntingMode::Target
    }

    pub fn shots_fired(&self) -> usize {
        self.fired.len()
    }

    fn random_shot<R: Rng + ?Sized>(&self, rng: &mut R) -> Position {
        let mut candidate = Position::new(0, 0);
        for _ in 0..BOT_SEARCH_ATTEMPTS {
            candidate = Position::new(
                rng.random_range(0..self.width),
                rng.random_range(0..self.height),
            );
            if !self.fired.contains(&candidate) {
                return candidate;
            }
        }
        // Budget exhausted: scan for any unexplored cell so the shot is
        // still fresh. Only a fully-fired board yields a duplicate.
        for y in 0..self.height {
            for x in 0..self.width {
                let cell = Position::new(x, y);
                if !self.fired.contains(&cell) {
                    return cell;
                }
            }
        }
        candidate
    }

    fn targeted_shot<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Position {
        if let Some(target) = self.pop_pending() {
            return target;
        }
        if let Some(target) = self.around_last_hit() {
            return target;
        }
        self.random_shot(rng)
    }

    fn advanced_shot<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Position {
        if let Some(target) = self.pop_pending() {
            return target;
        }
        if self.hits.len() >= 2 {
            if let Some(target) = self.line_extensions().into_iter().next() {
                return target;
            }
        }
        if let Some(target) = self.around_last_hit() {
            return target;
        }
        self.random_shot(rng)
    }

    /// Next unfired candidate from the pending queue.
    fn pop_pending(&mut self) -> Option<Position> {
        while let Some(target) = self.pending_targets.pop_front() {
            if !self.fired.contains(&target) {
                return Some(target);
            }
        }
        None
    }

    fn around_last_hit(&self) -> Option<Position> {
        let anchor = self.last_hit?;
        self.adjacent_cells(anchor)
            .into_iter()
            .find(|cell| !self.fired.contains(cell))
    }

    /// In-bounds orthogonal neighbors of a cell.
    fn adjacent_cells(&self, pos: Position) -> Vec<Position> {
        let mut cells = Vec::with_capacity(4);
        if pos.x > 0 {
            cells.push(Position::new(pos.x - 1, pos.y));
        }
        if pos.x + 1 < self.width {
            cells.push(Position::new(pos.x + 1, pos.y));
        }
        if pos.y > 0 {
            cells.push(Position::new(pos.x, pos.y - 1));
        }
        if pos.y + 1 < self.height {
            cells.push(Position::new(pos.x, pos.y + 1));
        }
        cells
    }

    /// Extension cells of aligned hit runs. Once two or more confirmed hits
    /// share a row or column, the cells immediately beyond each end of the
    /// run are the most likely remainder of a multi-cell ship.
    fn line_extensions(&self) -> Vec<Position> {
        let mut targets = Vec::new();

        for hit in &self.hits {
            let horizontal_run = self
                .hits
                .iter()
                .any(|h| h.y == hit.y && h.x.abs_diff(hit.x) == 1);
            if horizontal_run {
                if hit.x > 0 {
                    targets.push(Position::new(hit.x - 1, hit.y));
                }
                if hit.x + 1 < self.width {
                    targets.push(Position::new(hit.x + 1, hit.y));
                }
            }

            let vertical_run = self
                .hits
                .iter()
                .any(|h| h.x == hit.x && h.y.abs_diff(hit.y) == 1);
            if vertical_run {
                if hit.y > 0 {
                    targets.push(Position::new(hit.x, hit.y - 1));
                }
                if hit.y + 1 < self.height {
                    targets.push(Position::new(hit.x, hit.y + 1));
                }
            }
        }

        targets.retain(|cell| !self.fired.contains(cell));
        targets
    }
}

/// Generate a random legal fleet for the given rule set. Each ship is placed
/// with a bounded number of attempts and validated against the ships placed
/// so far.
pub fn generate_fleet<R: Rng + ?Sized>(
    rules: &RuleSet,
    rng: &mut R,
) -> Result<Vec<Ship>, GameError> {
    let mut fleet: Vec<Ship> = Vec::new();
    let mut ship_index = 0usize;

    for config in &rules.ships {
        for _ in 0..config.count {
            let ship = place_one(rules, &fleet, config.size, ship_index, rng)
                .ok_or_else(|| GameError::internal("unable to place generated fleet"))?;
            fleet.push(ship);
            ship_index += 1;
        }
    }

    Ok(fleet)
}

fn place_one<R: Rng + ?Sized>(
    rules: &RuleSet,
    placed: &[Ship],
    size: u8,
    index: usize,
    rng: &mut R,
) -> Option<Ship> {
    if size == 0 || size > rules.width.max(rules.height) {
        return None;
    }

    for _ in 0..FLEET_PLACEMENT_ATTEMPTS {
        let horizontal = rng.random_bool(0.5);
        let (span_x, span_y) = if horizontal { (size, 1) } else { (1, size) };
        if span_x > rules.width || span_y > rules.height {
            continue;
        }
        let x = rng.random_range(0..=rules.width - span_x);
        let y = rng.random_range(0..=rules.height - span_y);

        let positions: Vec<Position> = (0..size)
            .map(|i| {
                if horizontal {
                    Position::new(x + i, y)
                } else {
                    Position::new(x, y + i)
                }
            })
            .collect();

        let ship = Ship {
            id: format!("ship-{}", index),
            size,
            positions,
        };
        if validate_placement(&ship, placed, rules) {
            return Some(ship);
        }
    }

    None
}
