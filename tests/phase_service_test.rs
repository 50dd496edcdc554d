use server::models::{
    center_card::{CenterCard, CenterPosition},
    game::{Game, GamePhase, GameStatus, Winner},
    player::{ActionTarget, Player},
    role::Role,
};
use server::services::{action_service, phase_service};
use server::state::AppState;
use server::utils::test_setup::setup_test_env;

/// 役職を固定したプレイヤーを作る
fn make_player(id: &str, role: Role) -> Player {
    let mut player = Player::new(id.to_string(), format!("Player {}", id), false);
    player.role = Some(role);
    player.initial_role = Some(role);
    player
}

/// 夜フェーズまで進んだ状態のゲームを state に登録する
async fn setup_night_game(
    state: &AppState,
    players: Vec<Player>,
    center: Vec<Role>,
) -> String {
    let game_id = "test_game".to_string();
    let mut game = Game::new(game_id.clone(), "TEST23".to_string());
    game.players = players;
    game.center_cards = center
        .into_iter()
        .enumerate()
        .map(|(i, role)| CenterCard {
            position: CenterPosition(i),
            role,
        })
        .collect();
    game.status = GameStatus::Playing;
    game.phase = GamePhase::Night;
    state.insert_game(game).await;
    game_id
}

fn player_target(id: &str) -> Option<ActionTarget> {
    Some(ActionTarget::Player(id.to_string()))
}

#[tokio::test]
async fn test_advance_from_wrong_phase_is_silent_noop() {
    setup_test_env();
    let state = AppState::new();
    let game_id = setup_night_game(&state, vec![make_player("v1", Role::Villager)], vec![]).await;

    // 夜から夜へは遷移表にない
    let outcome = phase_service::advance_game_phase(state.clone(), &game_id, GamePhase::Night)
        .await
        .unwrap();
    assert!(!outcome.changed);
    assert_eq!(outcome.phase, GamePhase::Night);

    // ロビーへ戻す遷移も要求としては受け付けない
    let outcome = phase_service::advance_game_phase(state, &game_id, GamePhase::Lobby)
        .await
        .unwrap();
    assert!(!outcome.changed);
}

#[tokio::test]
async fn test_unknown_game_is_an_error() {
    setup_test_env();
    let state = AppState::new();
    let result = phase_service::advance_game_phase(state, "missing", GamePhase::Day).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_concurrent_night_to_day_advances_resolve_once() {
    setup_test_env();
    let state = AppState::new();
    let game_id = setup_night_game(
        &state,
        vec![
            make_player("drunk", Role::Drunk),
            make_player("v1", Role::Villager),
        ],
        vec![Role::Werewolf],
    )
    .await;

    action_service::submit_action(
        state.clone(),
        &game_id,
        "drunk",
        Some(ActionTarget::Center(CenterPosition(0))),
        None,
    )
    .await
    .unwrap();

    // クライアントのカウントダウンと進行役の手動操作が同時に同じ遷移を
    // 要求するケース。解決はちょうど1回だけ適用されなければならない。
    let (a, b) = tokio::join!(
        phase_service::advance_game_phase(state.clone(), &game_id, GamePhase::Day),
        phase_service::advance_game_phase(state.clone(), &game_id, GamePhase::Day),
    );
    let a = a.unwrap();
    let b = b.unwrap();

    // どちらか一方だけが遷移を実行している
    assert_eq!(a.changed as u32 + b.changed as u32, 1);

    let shared = state.get_game(&game_id).await.unwrap();
    let game = shared.lock().await;
    assert_eq!(game.phase, GamePhase::Day);
    // 入れ替えが二重適用されていれば役職が元に戻ってしまう
    assert_eq!(game.player("drunk").unwrap().role, Some(Role::Werewolf));
    assert_eq!(game.center_cards[0].role, Role::Drunk);
}

#[tokio::test]
async fn test_night_to_morning_then_day() {
    setup_test_env();
    let state = AppState::new();
    let game_id = setup_night_game(
        &state,
        vec![make_player("w1", Role::Werewolf), make_player("v1", Role::Villager)],
        vec![],
    )
    .await;

    action_service::submit_action(state.clone(), &game_id, "w1", player_target("v1"), None)
        .await
        .unwrap();

    let outcome = phase_service::advance_game_phase(state.clone(), &game_id, GamePhase::Morning)
        .await
        .unwrap();
    assert!(outcome.changed);
    assert_eq!(outcome.phase, GamePhase::Morning);
    // 夜の解決は朝への遷移時に実行済み
    assert_eq!(outcome.eliminated_player_id, Some("v1".to_string()));

    // 朝から昼へは結果発表だけで解決処理はない
    let outcome = phase_service::advance_game_phase(state.clone(), &game_id, GamePhase::Day)
        .await
        .unwrap();
    assert!(outcome.changed);
    assert_eq!(outcome.eliminated_player_id, None);

    let shared = state.get_game(&game_id).await.unwrap();
    let game = shared.lock().await;
    assert!(!game.player("v1").unwrap().is_alive);
}

#[tokio::test]
async fn test_day_vote_without_winner_continues_to_night() {
    setup_test_env();
    let state = AppState::new();
    let game_id = setup_night_game(
        &state,
        vec![
            make_player("w1", Role::Werewolf),
            make_player("v1", Role::Villager),
            make_player("v2", Role::Villager),
            make_player("v3", Role::Villager),
            make_player("v4", Role::Villager),
        ],
        vec![],
    )
    .await;
    {
        let shared = state.get_game(&game_id).await.unwrap();
        shared.lock().await.phase = GamePhase::Day;
    }

    // v4 に3票、w1 に2票
    for (voter, target) in [
        ("w1", "v4"),
        ("v1", "v4"),
        ("v2", "v4"),
        ("v3", "w1"),
        ("v4", "w1"),
    ] {
        action_service::submit_action(state.clone(), &game_id, voter, player_target(target), None)
            .await
            .unwrap();
    }

    let outcome = phase_service::advance_game_phase(state.clone(), &game_id, GamePhase::Night)
        .await
        .unwrap();
    assert!(outcome.changed);
    assert_eq!(outcome.eliminated_player_id, Some("v4".to_string()));
    // 人狼1 vs 村人3 なので続行
    assert_eq!(outcome.winner, None);
    assert_eq!(outcome.phase, GamePhase::Night);

    let shared = state.get_game(&game_id).await.unwrap();
    let game = shared.lock().await;
    assert_eq!(game.status, GameStatus::Playing);
    assert!(!game.player("v4").unwrap().is_alive);
    // 次の夜に向けて対象はクリアされる
    for player in &game.players {
        assert!(player.action_target.is_none());
    }
}

#[tokio::test]
async fn test_tanner_elimination_wins_over_parity() {
    setup_test_env();
    let state = AppState::new();
    let game_id = setup_night_game(
        &state,
        vec![
            make_player("w1", Role::Werewolf),
            make_player("w2", Role::Werewolf),
            make_player("tanner", Role::Tanner),
            make_player("v1", Role::Villager),
        ],
        vec![],
    )
    .await;
    {
        let shared = state.get_game(&game_id).await.unwrap();
        shared.lock().await.phase = GamePhase::Day;
    }

    for voter in ["w1", "w2", "tanner", "v1"] {
        action_service::submit_action(state.clone(), &game_id, voter, player_target("tanner"), None)
            .await
            .unwrap();
    }

    let outcome = phase_service::advance_game_phase(state.clone(), &game_id, GamePhase::Night)
        .await
        .unwrap();
    // 処刑後は人狼2 vs 村人1 だが、吊り人の勝利が優先される
    assert_eq!(outcome.winner, Some(Winner::Tanner));

    let shared = state.get_game(&game_id).await.unwrap();
    let game = shared.lock().await;
    assert_eq!(game.status, GameStatus::Finished);
    assert_eq!(game.winner, Some(Winner::Tanner));
}

#[tokio::test]
async fn test_parity_gives_werewolves_the_win() {
    setup_test_env();
    let state = AppState::new();
    let game_id = setup_night_game(
        &state,
        vec![
            make_player("w1", Role::Werewolf),
            make_player("w2", Role::Werewolf),
            make_player("v1", Role::Villager),
            make_player("v2", Role::Villager),
            make_player("v3", Role::Villager),
        ],
        vec![],
    )
    .await;
    {
        let shared = state.get_game(&game_id).await.unwrap();
        shared.lock().await.phase = GamePhase::Day;
    }

    for voter in ["w1", "w2", "v1", "v2", "v3"] {
        action_service::submit_action(state.clone(), &game_id, voter, player_target("v3"), None)
            .await
            .unwrap();
    }

    let outcome = phase_service::advance_game_phase(state.clone(), &game_id, GamePhase::Night)
        .await
        .unwrap();
    // 処刑後は人狼2 vs 村人2。同数でも人狼の勝利。
    assert_eq!(outcome.winner, Some(Winner::Werewolf));
}

#[tokio::test]
async fn test_village_wins_when_no_wolves_remain() {
    setup_test_env();
    let state = AppState::new();
    let game_id = setup_night_game(
        &state,
        vec![
            make_player("w1", Role::Werewolf),
            make_player("v1", Role::Villager),
            make_player("v2", Role::Villager),
            make_player("v3", Role::Villager),
        ],
        vec![],
    )
    .await;
    {
        let shared = state.get_game(&game_id).await.unwrap();
        shared.lock().await.phase = GamePhase::Day;
    }

    for voter in ["w1", "v1", "v2", "v3"] {
        action_service::submit_action(state.clone(), &game_id, voter, player_target("w1"), None)
            .await
            .unwrap();
    }

    let outcome = phase_service::advance_game_phase(state.clone(), &game_id, GamePhase::Night)
        .await
        .unwrap();
    assert_eq!(outcome.winner, Some(Winner::Villager));
}

#[tokio::test]
async fn test_finished_game_ignores_further_advances() {
    setup_test_env();
    let state = AppState::new();
    let game_id = setup_night_game(
        &state,
        vec![make_player("w1", Role::Werewolf), make_player("v1", Role::Villager)],
        vec![],
    )
    .await;
    {
        let shared = state.get_game(&game_id).await.unwrap();
        let mut game = shared.lock().await;
        game.status = GameStatus::Finished;
        game.phase = GamePhase::Finished;
        game.winner = Some(Winner::Villager);
    }

    for requested in [GamePhase::Night, GamePhase::Day, GamePhase::Morning] {
        let outcome = phase_service::advance_game_phase(state.clone(), &game_id, requested)
            .await
            .unwrap();
        assert!(!outcome.changed);
        assert_eq!(outcome.phase, GamePhase::Finished);
    }
}

/// 一連の通しシナリオ:
/// 5人に {人狼, 占い師, 狂人, 酔っ払い, 吊り人}、中央に村人3枚。
/// 酔っ払いが center_0 と入れ替わり、昼に全員が吊り人へ投票して
/// 吊り人の単独勝利でゲームが終了する。
#[tokio::test]
async fn test_full_scenario_drunk_swap_and_tanner_win() {
    setup_test_env();
    let state = AppState::new();
    let game_id = setup_night_game(
        &state,
        vec![
            make_player("wolf", Role::Werewolf),
            make_player("seer", Role::Seer),
            make_player("minion", Role::Minion),
            make_player("drunk", Role::Drunk),
            make_player("tanner", Role::Tanner),
        ],
        vec![Role::Villager, Role::Villager, Role::Villager],
    )
    .await;

    action_service::submit_action(
        state.clone(),
        &game_id,
        "drunk",
        Some(ActionTarget::Center(CenterPosition(0))),
        None,
    )
    .await
    .unwrap();

    let outcome = phase_service::advance_game_phase(state.clone(), &game_id, GamePhase::Day)
        .await
        .unwrap();
    assert!(outcome.changed);
    assert_eq!(outcome.eliminated_player_id, None);

    {
        let shared = state.get_game(&game_id).await.unwrap();
        let game = shared.lock().await;
        assert_eq!(game.player("drunk").unwrap().role, Some(Role::Villager));
        assert_eq!(game.center_cards[0].role, Role::Drunk);
    }

    for voter in ["wolf", "seer", "minion", "drunk", "tanner"] {
        action_service::submit_action(state.clone(), &game_id, voter, player_target("tanner"), None)
            .await
            .unwrap();
    }

    let outcome = phase_service::advance_game_phase(state.clone(), &game_id, GamePhase::Night)
        .await
        .unwrap();
    assert_eq!(outcome.eliminated_player_id, Some("tanner".to_string()));
    assert_eq!(outcome.winner, Some(Winner::Tanner));

    let shared = state.get_game(&game_id).await.unwrap();
    let game = shared.lock().await;
    assert_eq!(game.status, GameStatus::Finished);
    assert_eq!(game.winner, Some(Winner::Tanner));
}
