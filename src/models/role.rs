use serde::{Deserialize, Serialize};
use std::fmt;

/// 役職の夜アクション種別。アクション送信時のバリデーションと
/// 解決処理の適用判定に使う。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// 夜のアクションなし（昼の投票のみ）
    None,
    /// プレイヤー1人を対象にする
    TargetPlayer,
    /// 中央カード1枚を対象にする
    TargetCenter,
    /// プレイヤー2人を対象にする
    TargetTwoPlayers,
    /// 対象なし（起きたという通知のみ）
    SelfOnly,
}

/// 勝利陣営の区分。勝敗判定と役職公開のUI表示に使う。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Village,
    Werewolf,
    Independent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Villager,     // 村人
    Werewolf,     // 人狼
    Seer,         // 占い師
    Robber,       // 怪盗
    Troublemaker, // トラブルメーカー
    Minion,       // 狂人
    Tanner,       // 吊り人
    Drunk,        // 酔っ払い
    Insomniac,    // 不眠症
}

impl Role {
    /// 役職カタログの全役職。プール構築を決定的にするための正準順。
    pub const ALL: [Role; 9] = [
        Role::Villager,
        Role::Werewolf,
        Role::Seer,
        Role::Robber,
        Role::Troublemaker,
        Role::Minion,
        Role::Tanner,
        Role::Drunk,
        Role::Insomniac,
    ];

    pub fn action_kind(&self) -> ActionKind {
        match self {
            Role::Villager | Role::Minion | Role::Tanner => ActionKind::None,
            // 占い師は中央カード2枚までも対象にできるが、それは
            // アクション記録側の特例として扱う
            Role::Werewolf | Role::Seer | Role::Robber => ActionKind::TargetPlayer,
            Role::Drunk => ActionKind::TargetCenter,
            Role::Troublemaker => ActionKind::TargetTwoPlayers,
            Role::Insomniac => ActionKind::SelfOnly,
        }
    }

    pub fn alignment(&self) -> Alignment {
        match self {
            Role::Werewolf | Role::Minion => Alignment::Werewolf,
            Role::Tanner => Alignment::Independent,
            _ => Alignment::Village,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Villager => write!(f, "村人"),
            Role::Werewolf => write!(f, "人狼"),
            Role::Seer => write!(f, "占い師"),
            Role::Robber => write!(f, "怪盗"),
            Role::Troublemaker => write!(f, "トラブルメーカー"),
            Role::Minion => write!(f, "狂人"),
            Role::Tanner => write!(f, "吊り人"),
            Role::Drunk => write!(f, "酔っ払い"),
            Role::Insomniac => write!(f, "不眠症"),
        }
    }
}
