use flotilla::{BoardState, Position, Ship};

fn two_cell_ship(id: &str, a: Position, b: Position) -> Ship {
    Ship {
        id: id.to_string(),
        size: 2,
        positions: vec![a, b],
    }
}

#[test]
fn test_hit_and_sink_detection() {
    let mut board = BoardState::new(10, 10);
    board.ships.push(two_cell_ship(
        "s1",
        Position::new(5, 5),
        Position::new(5, 6),
    ));

    board.add_hit(Position::new(5, 5));
    assert!(board.is_hit(Position::new(5, 5)));
    assert!(board.sunken_ships.is_empty());

    board.add_hit(Position::new(5, 6));
    assert_eq!(board.sunken_ships, vec!["s1".to_string()]);
    assert!(board.is_cleared());
}

#[test]
fn test_add_hit_is_idempotent() {
    let mut board = BoardState::new(10, 10);
    board.ships.push(two_cell_ship(
        "s1",
        Position::new(0, 0),
        Position::new(1, 0),
    ));

    board.add_hit(Position::new(0, 0));
    board.add_hit(Position::new(0, 0));
    assert_eq!(board.hits.len(), 1);

    board.add_miss(Position::new(9, 9));
    board.add_miss(Position::new(9, 9));
    assert_eq!(board.misses.len(), 1);
}

#[test]
fn test_empty_board_is_not_cleared() {
    let board = BoardState::new(10, 10);
    assert!(!board.is_cleared());
}

#[test]
fn test_ship_at_lookup() {
    let mut board = BoardState::new(10, 10);
    board.ships.push(two_cell_ship(
        "s1",
        Position::new(3, 3),
        Position::new(3, 4),
    ));

    assert_eq!(board.ship_at(Position::new(3, 4)).map(|s| s.id.as_str()), Some("s1"));
    assert!(board.ship_at(Position::new(4, 4)).is_none());
}

#[test]
fn test_sunk_perimeter_surrounds_sunk_ship() {
    let mut board = BoardState::new(10, 10);
    board.ships.push(Ship {
        id: "s1".to_string(),
        size: 1,
        positions: vec![Position::new(5, 5)],
    });
    board.add_hit(Position::new(5, 5));

    let mask = board.sunk_perimeter();
    // All eight neighbors; the sunk cell itself is a hit and excluded.
    assert_eq!(mask.len(), 8);
    assert!(mask.contains(&Position::new(4, 4)));
    assert!(mask.contains(&Position::new(6, 6)));
    assert!(!mask.contains(&Position::new(5, 5)));
}

#[test]
fn test_sunk_perimeter_clipped_at_edges() {
    let mut board = BoardState::new(10, 10);
    board.ships.push(Ship {
        id: "s1".to_string(),
        size: 1,
        positions: vec![Position::new(0, 0)],
    });
    board.add_hit(Position::new(0, 0));

    let mask = board.sunk_perimeter();
    assert_eq!(mask.len(), 3);
}

#[test]
fn test_json_round_trip_preserves_everything() {
    let mut board = BoardState::new(10, 10);
    board.ships.push(two_cell_ship(
        "s1",
        Position::new(5, 5),
        Position::new(5, 6),
    ));
    board.add_hit(Position::new(5, 5));
    board.add_miss(Position::new(0, 0));

    let encoded = board.to_json().unwrap();
    let decoded = BoardState::from_json(&encoded).unwrap();
    assert_eq!(board, decoded);
}

#[test]
fn test_from_json_rejects_garbage() {
    assert!(BoardState::from_json("not json").is_err());
    assert!(BoardState::from_json("{}").is_err());
}
