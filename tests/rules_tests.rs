use flotilla::{validate_fleet, validate_placement, Position, RuleSet, Ship};

fn ship(id: &str, positions: &[(u8, u8)]) -> Ship {
    Ship {
        id: id.to_string(),
        size: positions.len() as u8,
        positions: positions.iter().map(|&(x, y)| Position::new(x, y)).collect(),
    }
}

/// A known-legal classic fleet: straight ships, nothing touching.
fn classic_fleet() -> Vec<Ship> {
    vec![
        ship("s4", &[(0, 0), (1, 0), (2, 0), (3, 0)]),
        ship("s3a", &[(5, 0), (6, 0), (7, 0)]),
        ship("s3b", &[(0, 2), (1, 2), (2, 2)]),
        ship("s2a", &[(4, 2), (5, 2)]),
        ship("s2b", &[(7, 2), (8, 2)]),
        ship("s2c", &[(0, 4), (0, 5)]),
        ship("s1a", &[(2, 4)]),
        ship("s1b", &[(4, 4)]),
        ship("s1c", &[(6, 4)]),
        ship("s1d", &[(8, 4)]),
    ]
}

#[test]
fn test_diagonal_ship_rejected() {
    let rules = RuleSet::classic();
    assert!(!validate_placement(&ship("d", &[(0, 0), (1, 1)]), &[], &rules));
}

#[test]
fn test_diagonal_ship_accepted_when_allowed() {
    let mut rules = RuleSet::classic();
    rules.allow_diagonal = true;
    assert!(validate_placement(&ship("d", &[(0, 0), (1, 1)]), &[], &rules));
}

#[test]
fn test_gapped_ship_rejected() {
    let rules = RuleSet::classic();
    assert!(!validate_placement(&ship("g", &[(0, 0), (2, 0)]), &[], &rules));
}

#[test]
fn test_out_of_bounds_rejected() {
    let rules = RuleSet::classic();
    assert!(!validate_placement(&ship("o", &[(9, 9), (9, 10)]), &[], &rules));
}

#[test]
fn test_duplicate_positions_rejected() {
    let rules = RuleSet::classic();
    assert!(!validate_placement(&ship("dup", &[(0, 0), (0, 0)]), &[], &rules));
}

#[test]
fn test_size_mismatch_rejected() {
    let rules = RuleSet::classic();
    let mut s = ship("m", &[(0, 0), (1, 0)]);
    s.size = 3;
    assert!(!validate_placement(&s, &[], &rules));
}

#[test]
fn test_touching_ships_rejected() {
    let rules = RuleSet::classic();
    let placed = [ship("a", &[(0, 0)])];
    // Diagonal contact counts as touching.
    assert!(!validate_placement(&ship("b", &[(1, 1)]), &placed, &rules));
    // One cell of clearance is enough.
    assert!(validate_placement(&ship("c", &[(2, 0)]), &placed, &rules));
}

#[test]
fn test_touching_allowed_when_rule_disabled() {
    let mut rules = RuleSet::classic();
    rules.touch_prohibited = false;
    let placed = [ship("a", &[(0, 0)])];
    assert!(validate_placement(&ship("b", &[(1, 1)]), &placed, &rules));
}

#[test]
fn test_classic_fleet_accepted() {
    assert!(validate_fleet(&classic_fleet(), &RuleSet::classic()));
}

#[test]
fn test_fleet_with_wrong_count_at_one_size_rejected() {
    let rules = RuleSet::classic();
    let mut fleet = classic_fleet();
    // Swap a 1-cell ship for an extra 2-cell: total count still 10.
    fleet.retain(|s| s.id != "s1d");
    fleet.push(ship("x2", &[(8, 6), (9, 6)]));
    assert!(!validate_fleet(&fleet, &rules));
}

#[test]
fn test_fleet_with_unlisted_ship_size_rejected() {
    let rules = RuleSet::classic();
    let mut fleet = classic_fleet();
    fleet.push(ship("x5", &[(2, 8), (3, 8), (4, 8), (5, 8), (6, 8)]));
    assert!(!validate_fleet(&fleet, &rules));
}

#[test]
fn test_fleet_with_touching_ships_rejected() {
    let rules = RuleSet::classic();
    let mut fleet = classic_fleet();
    // Move a 1-cell ship adjacent to the 4-cell ship.
    for s in &mut fleet {
        if s.id == "s1d" {
            s.positions = vec![Position::new(4, 1)];
        }
    }
    assert!(!validate_fleet(&fleet, &rules));
}
