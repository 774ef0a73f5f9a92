use std::collections::HashSet;

use flotilla::{
    generate_fleet, validate_fleet, BotDifficulty, BotStrategy, Position, RuleSet, ShotResult,
};
use rand::rngs::SmallRng;
use rand::SeedableRng;

#[test]
fn test_easy_never_refires() {
    let mut rng = SmallRng::seed_from_u64(42);
    let mut bot = BotStrategy::new(BotDifficulty::Easy, 10, 10);
    assert_eq!(bot.difficulty(), BotDifficulty::Easy);
    let mut seen = HashSet::new();

    for _ in 0..100 {
        let shot = bot.next_shot(&mut rng);
        assert!(seen.insert(shot), "refired at {:?}", shot);
        bot.process_result(shot, &ShotResult::Miss);
    }
    assert_eq!(bot.shots_fired(), 100);
}

#[test]
fn test_hit_switches_to_target_mode() {
    let mut rng = SmallRng::seed_from_u64(1);
    let mut bot = BotStrategy::new(BotDifficulty::Medium, 10, 10);

    bot.process_result(Position::new(4, 4), &ShotResult::Hit);
    assert!(bot.is_targeting());

    let next = bot.next_shot(&mut rng);
    let neighbors = [
        Position::new(3, 4),
        Position::new(5, 4),
        Position::new(4, 3),
        Position::new(4, 5),
    ];
    assert!(neighbors.contains(&next), "expected a neighbor, got {:?}", next);
}

#[test]
fn test_sink_resets_targeting() {
    let mut bot = BotStrategy::new(BotDifficulty::Medium, 10, 10);

    bot.process_result(Position::new(4, 4), &ShotResult::Hit);
    bot.process_result(
        Position::new(4, 5),
        &ShotResult::Sink {
            ship_id: "s".to_string(),
            game_over: false,
        },
    );
    assert!(!bot.is_targeting());
}

#[test]
fn test_hard_extends_aligned_run() {
    let mut rng = SmallRng::seed_from_u64(3);
    let mut bot = BotStrategy::new(BotDifficulty::Hard, 10, 10);

    bot.process_result(Position::new(4, 4), &ShotResult::Hit);
    bot.process_result(Position::new(5, 4), &ShotResult::Hit);

    // The run along y=4 makes its extension cells the best candidates.
    let next = bot.next_shot(&mut rng);
    assert!(
        next == Position::new(3, 4) || next == Position::new(6, 4),
        "expected an in-line extension, got {:?}",
        next
    );
}

#[test]
fn test_target_mode_skips_fired_candidates() {
    let mut rng = SmallRng::seed_from_u64(5);
    let mut bot = BotStrategy::new(BotDifficulty::Medium, 10, 10);

    bot.process_result(Position::new(3, 4), &ShotResult::Miss);
    bot.process_result(Position::new(4, 3), &ShotResult::Miss);
    bot.process_result(Position::new(4, 4), &ShotResult::Hit);

    let next = bot.next_shot(&mut rng);
    assert!(next == Position::new(5, 4) || next == Position::new(4, 5));
}

#[test]
fn test_mark_fired_excludes_cell() {
    let mut rng = SmallRng::seed_from_u64(9);
    let mut bot = BotStrategy::new(BotDifficulty::Easy, 10, 10);

    // Block everything except one cell.
    for y in 0..10 {
        for x in 0..10 {
            if (x, y) != (7, 7) {
                bot.mark_fired(Position::new(x, y));
            }
        }
    }
    assert_eq!(bot.next_shot(&mut rng), Position::new(7, 7));
}

#[test]
fn test_generated_fleet_is_legal() {
    let rules = RuleSet::classic();
    for seed in 0..20 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let fleet = generate_fleet(&rules, &mut rng).unwrap();
        assert_eq!(fleet.len(), 10);
        assert!(validate_fleet(&fleet, &rules), "illegal fleet at seed {}", seed);
    }
}

#[test]
fn test_generate_fleet_fails_on_impossible_rules() {
    let mut rules = RuleSet::classic();
    rules.width = 2;
    rules.height = 2;
    let mut rng = SmallRng::seed_from_u64(0);
    assert!(generate_fleet(&rules, &mut rng).is_err());
}
