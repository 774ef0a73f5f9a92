use flotilla::{
    BoardRecord, GameRecord, GameStatus, GameStore, MemoryStore, RuleSet, ShotRecord, ShotResult,
};

fn game(id: &str) -> GameRecord {
    GameRecord {
        id: id.to_string(),
        status: GameStatus::Lobby,
        p1_id: "alice".to_string(),
        p2_id: Some("bob".to_string()),
        turn_user_id: Some("alice".to_string()),
        winner_id: None,
        width: 10,
        height: 10,
        rule_set: "classic".to_string(),
        is_vs_bot: false,
        bot_difficulty: None,
    }
}

#[tokio::test]
async fn test_classic_rule_set_is_seeded() {
    let store = MemoryStore::new();
    let rules = store.find_rule_set("classic").await.unwrap().unwrap();
    assert_eq!(rules.width, 10);
    assert!(store.find_rule_set("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_additional_rule_sets_can_be_registered() {
    let store = MemoryStore::new();
    let mut small = RuleSet::classic();
    small.name = "small".to_string();
    small.width = 6;
    small.height = 6;
    store.add_rule_set(small);

    let found = store.find_rule_set("small").await.unwrap().unwrap();
    assert_eq!(found.width, 6);
}

#[tokio::test]
async fn test_game_create_find_update() {
    let store = MemoryStore::new();
    store.create_game(game("g1")).await.unwrap();
    assert!(store.create_game(game("g1")).await.is_err());

    let mut found = store.find_game("g1").await.unwrap().unwrap();
    found.status = GameStatus::Finished;
    found.winner_id = Some("alice".to_string());
    store.update_game(&found).await.unwrap();

    let reread = store.find_game("g1").await.unwrap().unwrap();
    assert_eq!(reread.status, GameStatus::Finished);
    assert_eq!(reread.winner_id.as_deref(), Some("alice"));

    assert!(store.update_game(&game("missing")).await.is_err());
}

#[tokio::test]
async fn test_board_upsert_replaces() {
    let store = MemoryStore::new();
    let record = BoardRecord {
        game_id: "g1".to_string(),
        owner_id: "alice".to_string(),
        data_json: "{}".to_string(),
        ready: false,
    };
    store.upsert_board(record.clone()).await.unwrap();
    store
        .upsert_board(BoardRecord {
            ready: true,
            ..record
        })
        .await
        .unwrap();

    let found = store.find_board("g1", "alice").await.unwrap().unwrap();
    assert!(found.ready);
    assert_eq!(store.boards_for_game("g1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_shot_log_rejects_duplicate_coordinates() {
    let store = MemoryStore::new();
    let shot = ShotRecord {
        game_id: "g1".to_string(),
        shooter_id: "alice".to_string(),
        x: 3,
        y: 4,
        result: ShotResult::Miss,
    };
    store.insert_shot(shot.clone()).await.unwrap();

    // Same coordinate, different shooter: still a duplicate for the session.
    let dup = ShotRecord {
        shooter_id: "bob".to_string(),
        ..shot.clone()
    };
    assert!(store.insert_shot(dup).await.is_err());

    // The same coordinate in another game is independent.
    let other_game = ShotRecord {
        game_id: "g2".to_string(),
        ..shot
    };
    store.insert_shot(other_game).await.unwrap();

    assert!(store.find_shot("g1", 3, 4).await.unwrap().is_some());
    assert!(store.find_shot("g1", 4, 3).await.unwrap().is_none());
    assert_eq!(store.shots_for_game("g1").await.unwrap().len(), 1);
}
