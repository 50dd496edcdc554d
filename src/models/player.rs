use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::center_card::CenterPosition;
use super::role::Role;

/// アクションの対象。プレイヤーID または 中央カードの位置。
/// ワイヤ上はプレイヤーIDの文字列か "center_N" 形式の文字列。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ActionTarget {
    Player(String),
    Center(CenterPosition),
}

impl fmt::Display for ActionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionTarget::Player(id) => write!(f, "{}", id),
            ActionTarget::Center(pos) => write!(f, "{}", pos),
        }
    }
}

impl TryFrom<String> for ActionTarget {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if s.starts_with("center_") {
            s.parse::<CenterPosition>().map(ActionTarget::Center)
        } else {
            Ok(ActionTarget::Player(s))
        }
    }
}

impl From<ActionTarget> for String {
    fn from(target: ActionTarget) -> Self {
        target.to_string()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    /// 現在の役職。夜の入れ替えで変わる。
    pub role: Option<Role>,
    /// 配役時の役職。UIでの開示と勝敗表示に使い、以後変更されない。
    pub initial_role: Option<Role>,
    pub is_host: bool,
    pub is_alive: bool,
    pub action_target: Option<ActionTarget>,
    pub action_target_secondary: Option<ActionTarget>,
    /// このフェーズで行動済みか。不眠症の「起床」検出に使う。
    pub has_acted: bool,
    /// 夜の解決後に確定した自分の役職（不眠症向けの開示）。
    pub night_reveal: Option<Role>,
    pub joined_at: DateTime<Utc>,
}

impl Player {
    pub fn new(id: String, name: String, is_host: bool) -> Self {
        Self {
            id,
            name,
            role: None,
            initial_role: None,
            is_host,
            is_alive: true,
            action_target: None,
            action_target_secondary: None,
            has_acted: false,
            night_reveal: None,
            joined_at: Utc::now(),
        }
    }
}
