use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::center_card::{CenterCard, CenterPosition};
use super::player::{ActionTarget, Player};
use super::role::{ActionKind, Alignment, Role};
use super::roster::{self, RoleConfig};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Waiting, // ロビーで参加受付中
    Playing, // ゲーム進行中
    Finished, // ゲーム終了（勝者確定）
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    Lobby,
    Night,
    Morning,
    Day,
    #[serde(rename = "ended")]
    Finished,
}

impl GamePhase {
    /// フェーズ遷移表。ここに無い遷移の要求はすべて no-op として扱う。
    pub fn can_advance_to(self, next: GamePhase) -> bool {
        matches!(
            (self, next),
            (GamePhase::Night, GamePhase::Morning)
                | (GamePhase::Night, GamePhase::Day)
                | (GamePhase::Morning, GamePhase::Day)
                | (GamePhase::Day, GamePhase::Night)
        )
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Villager, // 村人陣営勝利
    Werewolf, // 人狼陣営勝利
    Tanner,   // 吊り人の単独勝利
}

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("プレイヤーがいません")]
    NoPlayers,
    #[error("役職構成が指定されていません")]
    ConfigRequired,
    #[error("プレイヤーが見つかりません: {0}")]
    PlayerNotFound(String),
    #[error("死亡したプレイヤーは行動できません: {0}")]
    PlayerDead(String),
    #[error("アクションの対象が指定されていません")]
    MissingTarget,
    #[error("アクションの対象が見つかりません: {0}")]
    TargetNotFound(String),
    #[error("役職が未設定のプレイヤーがいます: {0}")]
    CorruptedRoster(String),
}

/// アクション送信時に本人へ返す情報。
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RevealedInfo {
    /// 対象プレイヤーの現在の役職（占い師・怪盗）
    Role(Role),
    /// 中央カードの役職（占い師が中央を見た場合、位置ごとのマップ）
    CenterCards(HashMap<CenterPosition, Role>),
}

/// 昼の解決の結果。
#[derive(Clone, Debug)]
pub struct DayOutcome {
    pub eliminated_player_id: Option<String>,
    pub eliminated_role: Option<Role>,
    pub winner: Option<Winner>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Game {
    pub id: String,
    /// 参加用の短い共有コード
    pub short_id: String,
    pub status: GameStatus,
    pub phase: GamePhase,
    pub winner: Option<Winner>,
    /// 現フェーズの開始時刻。クライアント側のカウントダウンの基準になる。
    pub phase_started_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub players: Vec<Player>,
    pub center_cards: Vec<CenterCard>,
}

impl Game {
    pub fn new(id: String, short_id: String) -> Self {
        let now = Utc::now();
        Game {
            id,
            short_id,
            status: GameStatus::Waiting,
            phase: GamePhase::Lobby,
            winner: None,
            phase_started_at: now,
            created_at: now,
            players: Vec::new(),
            center_cards: Vec::new(),
        }
    }

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    fn player_mut(&mut self, player_id: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == player_id)
    }

    fn center_role(&self, position: CenterPosition) -> Option<Role> {
        self.center_cards
            .iter()
            .find(|c| c.position == position)
            .map(|c| c.role)
    }

    /// 役職を配って夜フェーズを開始する。戻り値は中央カードの枚数。
    ///
    /// プールはプレイヤー数に満たなければ村人で埋められ、シャッフル後の
    /// 先頭からプレイヤーに、残りが中央カードに割り当てられる。
    pub fn deal<R: Rng>(&mut self, config: &RoleConfig, rng: &mut R) -> Result<usize, GameError> {
        if self.players.is_empty() {
            return Err(GameError::NoPlayers);
        }

        let mut pool =
            roster::build_role_pool(config, self.players.len(), roster::DEFAULT_SURPLUS_CARDS);
        roster::shuffle(&mut pool, rng);

        for (player, role) in self.players.iter_mut().zip(pool.iter()) {
            player.role = Some(*role);
            player.initial_role = Some(*role);
            player.is_alive = true;
            player.action_target = None;
            player.action_target_secondary = None;
            player.has_acted = false;
            player.night_reveal = None;
        }

        // 残りをシャッフル順のまま中央カードに置く
        self.center_cards = pool[self.players.len()..]
            .iter()
            .enumerate()
            .map(|(i, role)| CenterCard {
                position: CenterPosition(i),
                role: *role,
            })
            .collect();

        self.status = GameStatus::Playing;
        self.phase = GamePhase::Night;
        self.winner = None;
        self.phase_started_at = Utc::now();

        Ok(self.center_cards.len())
    }

    /// アクション（夜の対象指定・昼の投票）を記録する。
    ///
    /// 対象は常に上書き保存され（最後の送信が有効）、入れ替え系の効果は
    /// 夜の解決まで適用されない。ここで計算するのは送信者本人に返す
    /// 開示情報だけで、ゲーム状態は対象の記録以外変更しない。
    pub fn record_action(
        &mut self,
        player_id: &str,
        target: Option<ActionTarget>,
        target_secondary: Option<ActionTarget>,
    ) -> Result<Option<RevealedInfo>, GameError> {
        let actor = self
            .player(player_id)
            .ok_or_else(|| GameError::PlayerNotFound(player_id.to_string()))?;
        if !actor.is_alive {
            return Err(GameError::PlayerDead(player_id.to_string()));
        }
        let role = actor
            .role
            .ok_or_else(|| GameError::CorruptedRoster(player_id.to_string()))?;

        // 必須対象のチェック。不眠症だけは対象なしで「起きた」ことを送る。
        match role.action_kind() {
            ActionKind::SelfOnly => {}
            ActionKind::TargetTwoPlayers => {
                if target.is_none() || target_secondary.is_none() {
                    return Err(GameError::MissingTarget);
                }
            }
            _ => {
                if target.is_none() {
                    return Err(GameError::MissingTarget);
                }
            }
        }

        // 対象の存在チェック。失敗した場合は何も書き込まない。
        for t in [&target, &target_secondary].into_iter().flatten() {
            self.validate_target(t)?;
        }

        let revealed = self.compute_reveal(role, target.as_ref(), target_secondary.as_ref());

        let actor = self
            .player_mut(player_id)
            .ok_or_else(|| GameError::PlayerNotFound(player_id.to_string()))?;
        actor.action_target = target;
        actor.action_target_secondary = target_secondary;
        actor.has_acted = true;

        Ok(revealed)
    }

    fn validate_target(&self, target: &ActionTarget) -> Result<(), GameError> {
        match target {
            ActionTarget::Player(id) => self
                .player(id)
                .map(|_| ())
                .ok_or_else(|| GameError::TargetNotFound(id.clone())),
            ActionTarget::Center(pos) => self
                .center_role(*pos)
                .map(|_| ())
                .ok_or_else(|| GameError::TargetNotFound(pos.to_string())),
        }
    }

    /// 送信者本人に返す開示情報を計算する。状態は一切変更しない。
    fn compute_reveal(
        &self,
        role: Role,
        target: Option<&ActionTarget>,
        target_secondary: Option<&ActionTarget>,
    ) -> Option<RevealedInfo> {
        match role {
            // 占い師: プレイヤー1人の現在の役職、または中央カード1〜2枚
            Role::Seer => match target {
                Some(ActionTarget::Center(pos)) => {
                    let mut cards = HashMap::new();
                    if let Some(card_role) = self.center_role(*pos) {
                        cards.insert(*pos, card_role);
                    }
                    if let Some(ActionTarget::Center(pos2)) = target_secondary {
                        if let Some(card_role) = self.center_role(*pos2) {
                            cards.insert(*pos2, card_role);
                        }
                    }
                    if cards.is_empty() {
                        None
                    } else {
                        Some(RevealedInfo::CenterCards(cards))
                    }
                }
                Some(ActionTarget::Player(id)) => self
                    .player(id)
                    .and_then(|p| p.role)
                    .map(RevealedInfo::Role),
                None => None,
            },
            // 怪盗: 入れ替えは夜の解決で行うが、奪う役職はここで見せる
            Role::Robber => match target {
                Some(ActionTarget::Player(id)) => self
                    .player(id)
                    .and_then(|p| p.role)
                    .map(RevealedInfo::Role),
                _ => None,
            },
            // 酔っ払いは自分の新しい役職を知らされない。
            // 不眠症の開示は夜の解決後に night_reveal で行う。
            _ => None,
        }
    }

    /// 夜の解決。入れ替え → 不眠症の確定役職 → 人狼の襲撃の順で適用する。
    /// 戻り値は襲撃の犠牲者のプレイヤーID。
    ///
    /// 入れ替えは 怪盗 → 酔っ払い → トラブルメーカー の固定順。入れ替えは
    /// 合成されるため、同じ盤面でも順序を変えると結果が変わる。
    pub fn resolve_night(&mut self) -> Result<Option<String>, GameError> {
        self.ensure_roster_intact()?;

        // 行動者は解決開始時点の役職で決める。怪盗に役職を奪われても
        // その夜のアクションは実行される。
        let entry = self.players.clone();
        self.resolve_robber_swap(&entry);
        self.resolve_drunk_swap(&entry);
        self.resolve_troublemaker_swap(&entry);

        // 不眠症: 入れ替え確定後の自分の役職を記録しておき、
        // 後続の読み出しで本人にだけ見せる
        for player in self.players.iter_mut() {
            player.night_reveal = if player.initial_role == Some(Role::Insomniac)
                && player.is_alive
                && player.has_acted
            {
                player.role
            } else {
                None
            };
        }

        // 人狼の襲撃: 生存する人狼の対象票を集計する（中央カードは対象外）
        let votes: Vec<String> = self
            .players
            .iter()
            .filter(|p| p.is_alive && p.role == Some(Role::Werewolf))
            .filter_map(|p| match &p.action_target {
                Some(ActionTarget::Player(id)) => Some(id.clone()),
                _ => None,
            })
            .collect();
        let victim_id = first_max_tally(votes.into_iter());

        if let Some(id) = &victim_id {
            if let Some(victim) = self.player_mut(id) {
                victim.is_alive = false;
            }
        }

        self.clear_actions();
        Ok(victim_id)
    }

    fn resolve_robber_swap(&mut self, entry: &[Player]) {
        let robber = entry
            .iter()
            .find(|p| p.role == Some(Role::Robber) && p.is_alive && p.action_target.is_some());
        if let Some(robber) = robber {
            if let Some(ActionTarget::Player(target_id)) = &robber.action_target {
                if *target_id != robber.id {
                    self.swap_player_roles(&robber.id, target_id);
                }
            }
        }
    }

    fn resolve_drunk_swap(&mut self, entry: &[Player]) {
        let drunk = entry.iter().find(|p| {
            p.role == Some(Role::Drunk)
                && p.is_alive
                && matches!(p.action_target, Some(ActionTarget::Center(_)))
        });
        if let Some(drunk) = drunk {
            if let Some(ActionTarget::Center(pos)) = drunk.action_target {
                // 酔っ払いが現在持っている役職と中央カードを交換する
                let player_role = self.player(&drunk.id).and_then(|p| p.role);
                let card_role = self.center_role(pos);
                if let (Some(player_role), Some(card_role)) = (player_role, card_role) {
                    if let Some(p) = self.player_mut(&drunk.id) {
                        p.role = Some(card_role);
                    }
                    if let Some(c) = self.center_cards.iter_mut().find(|c| c.position == pos) {
                        c.role = player_role;
                    }
                }
            }
        }
    }

    fn resolve_troublemaker_swap(&mut self, entry: &[Player]) {
        let troublemaker = entry.iter().find(|p| {
            p.role == Some(Role::Troublemaker)
                && p.is_alive
                && p.action_target.is_some()
                && p.action_target_secondary.is_some()
        });
        if let Some(troublemaker) = troublemaker {
            if let (Some(ActionTarget::Player(a)), Some(ActionTarget::Player(b))) = (
                &troublemaker.action_target,
                &troublemaker.action_target_secondary,
            ) {
                // この時点の役職を入れ替える（怪盗・酔っ払いの結果を引き継ぐ）
                self.swap_player_roles(a, b);
            }
        }
    }

    fn swap_player_roles(&mut self, a: &str, b: &str) {
        let role_a = self.player(a).and_then(|p| p.role);
        let role_b = self.player(b).and_then(|p| p.role);
        if let (Some(role_a), Some(role_b)) = (role_a, role_b) {
            if let Some(p) = self.player_mut(a) {
                p.role = Some(role_b);
            }
            if let Some(p) = self.player_mut(b) {
                p.role = Some(role_a);
            }
        }
    }

    /// 昼の解決。投票の集計 → 処刑 → 勝敗判定。
    /// フェーズの更新と対象のクリアは遷移ガード側で行う。
    pub fn resolve_day(&mut self) -> Result<DayOutcome, GameError> {
        self.ensure_roster_intact()?;

        // 生存者全員の投票を集計する（人狼も投票できる）
        let votes: Vec<String> = self
            .players
            .iter()
            .filter(|p| p.is_alive)
            .filter_map(|p| match &p.action_target {
                Some(ActionTarget::Player(id)) => Some(id.clone()),
                _ => None,
            })
            .collect();
        let victim_id = first_max_tally(votes.into_iter());

        let mut eliminated_role = None;
        if let Some(id) = &victim_id {
            if let Some(victim) = self.player_mut(id) {
                eliminated_role = victim.role;
                victim.is_alive = false;
            }
        }

        // 勝敗判定は優先順で1つだけ適用する
        let winner = if eliminated_role.map(|r| r.alignment()) == Some(Alignment::Independent) {
            // (a) 第三陣営（吊り人）が処刑されたらその単独勝利
            Some(Winner::Tanner)
        } else {
            let living = self.players.iter().filter(|p| p.is_alive).count();
            let living_wolves = self
                .players
                .iter()
                .filter(|p| p.is_alive && p.role == Some(Role::Werewolf))
                .count();
            if living_wolves == 0 {
                // (b) 人狼全滅で村人陣営勝利
                Some(Winner::Villager)
            } else if living_wolves >= living - living_wolves {
                // (c) 人狼が過半数以上（同数を含む）で人狼陣営勝利
                Some(Winner::Werewolf)
            } else {
                // (d) 勝者なし、続行
                None
            }
        };

        Ok(DayOutcome {
            eliminated_player_id: victim_id,
            eliminated_role,
            winner,
        })
    }

    /// 配役済みのゲームで役職が欠けているのはデータ破損。
    /// 解決処理は部分適用せずに中断する。
    fn ensure_roster_intact(&self) -> Result<(), GameError> {
        match self.players.iter().find(|p| p.role.is_none()) {
            Some(p) => Err(GameError::CorruptedRoster(p.id.clone())),
            None => Ok(()),
        }
    }

    /// 全プレイヤーの対象と行動済みフラグをリセットする。
    pub fn clear_actions(&mut self) {
        for player in self.players.iter_mut() {
            player.action_target = None;
            player.action_target_secondary = None;
            player.has_acted = false;
        }
    }

    /// ロビーに戻す。プレイヤーは残し、役職・対象・生死を初期化する。
    pub fn reset_to_lobby(&mut self) {
        for player in self.players.iter_mut() {
            player.role = None;
            player.initial_role = None;
            player.is_alive = true;
            player.action_target = None;
            player.action_target_secondary = None;
            player.has_acted = false;
            player.night_reveal = None;
        }
        self.center_cards.clear();
        self.status = GameStatus::Waiting;
        self.phase = GamePhase::Lobby;
        self.winner = None;
        self.phase_started_at = Utc::now();
    }
}

/// 得票を集計して最多得票の対象を返す。
///
/// 同数の場合は集計順で先に現れた対象が選ばれる。集計は挿入順を保持する
/// ので、結果はマップの列挙順に依存せず決定的になる。
fn first_max_tally(votes: impl Iterator<Item = String>) -> Option<String> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for target in votes {
        match counts.iter_mut().find(|(t, _)| *t == target) {
            Some(entry) => entry.1 += 1,
            None => counts.push((target, 1)),
        }
    }

    let mut best: Option<(String, usize)> = None;
    for (target, count) in counts {
        let beaten = match &best {
            Some((_, best_count)) => count > *best_count,
            None => true,
        };
        if beaten {
            best = Some((target, count));
        }
    }
    best.map(|(target, _)| target)
}
