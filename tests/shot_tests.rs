use flotilla::{apply_shot, is_game_over, resolve_shot, BoardState, Position, Ship, ShotResult};

fn board_with(ships: Vec<Ship>) -> BoardState {
    let mut board = BoardState::new(10, 10);
    board.ships = ships;
    board
}

fn ship(id: &str, positions: &[(u8, u8)]) -> Ship {
    Ship {
        id: id.to_string(),
        size: positions.len() as u8,
        positions: positions.iter().map(|&(x, y)| Position::new(x, y)).collect(),
    }
}

#[test]
fn test_miss_on_empty_board() {
    let board = BoardState::new(10, 10);
    assert_eq!(resolve_shot(&board, Position::new(5, 5)), ShotResult::Miss);
}

#[test]
fn test_hit_does_not_mutate_board() {
    let board = board_with(vec![ship("s1", &[(5, 5), (5, 6)])]);
    let result = resolve_shot(&board, Position::new(5, 5));
    assert_eq!(result, ShotResult::Hit);
    assert!(board.hits.is_empty());
}

#[test]
fn test_final_cell_sinks_with_game_over() {
    let mut board = board_with(vec![ship("s1", &[(5, 5), (5, 6)])]);
    board = apply_shot(&board, Position::new(5, 6));

    let result = resolve_shot(&board, Position::new(5, 5));
    assert_eq!(
        result,
        ShotResult::Sink {
            ship_id: "s1".to_string(),
            game_over: true,
        }
    );
}

#[test]
fn test_sink_not_game_over_while_fleet_remains() {
    let board = board_with(vec![ship("s1", &[(0, 0)]), ship("s2", &[(9, 9)])]);
    let result = resolve_shot(&board, Position::new(0, 0));
    assert_eq!(
        result,
        ShotResult::Sink {
            ship_id: "s1".to_string(),
            game_over: false,
        }
    );
    assert!(!result.is_game_over());
}

#[test]
fn test_apply_records_hit_or_miss() {
    let board = board_with(vec![ship("s1", &[(0, 0)])]);

    let after_hit = apply_shot(&board, Position::new(0, 0));
    assert!(after_hit.is_hit(Position::new(0, 0)));
    assert!(is_game_over(&after_hit));

    let after_miss = apply_shot(&board, Position::new(5, 5));
    assert!(after_miss.is_miss(Position::new(5, 5)));
    assert!(!is_game_over(&after_miss));
}
