use flotilla::{apply_shot, generate_fleet, BoardState, Position, RuleSet};
use proptest::prelude::*;
use rand::{rngs::SmallRng, Rng, SeedableRng};

fn random_board(seed: u64) -> BoardState {
    let mut rng = SmallRng::seed_from_u64(seed);
    let rules = RuleSet::classic();
    let mut board = BoardState::new(rules.width, rules.height);
    board.ships = generate_fleet(&rules, &mut rng).unwrap();

    let shots = rng.random_range(0..100usize);
    for _ in 0..shots {
        let pos = Position::new(rng.random_range(0..10), rng.random_range(0..10));
        board = apply_shot(&board, pos);
    }
    board
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn json_round_trip(seed in any::<u64>()) {
        let board = random_board(seed);
        let encoded = board.to_json().unwrap();
        let decoded = BoardState::from_json(&encoded).unwrap();
        prop_assert_eq!(board, decoded);
    }

    #[test]
    fn apply_is_idempotent(seed in any::<u64>(), x in 0u8..10, y in 0u8..10) {
        let board = random_board(seed);
        let once = apply_shot(&board, Position::new(x, y));
        let twice = apply_shot(&once, Position::new(x, y));
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn hits_and_misses_are_disjoint(seed in any::<u64>()) {
        let board = random_board(seed);
        for hit in &board.hits {
            prop_assert!(!board.misses.contains(hit));
        }
    }

    #[test]
    fn sunk_iff_all_cells_hit(seed in any::<u64>()) {
        let board = random_board(seed);
        for ship in &board.ships {
            let all_hit = ship.positions.iter().all(|p| board.is_hit(*p));
            prop_assert_eq!(board.sunken_ships.contains(&ship.id), all_hit);
        }
    }
}
