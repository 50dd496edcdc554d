use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::role::Role;

/// 中央カードの位置。ワイヤ上は "center_0" 形式の文字列。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CenterPosition(pub usize);

impl fmt::Display for CenterPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "center_{}", self.0)
    }
}

impl FromStr for CenterPosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let index = s
            .strip_prefix("center_")
            .ok_or_else(|| format!("中央カードの位置ではありません: {}", s))?;
        index
            .parse::<usize>()
            .map(CenterPosition)
            .map_err(|_| format!("不正な中央カードの位置です: {}", s))
    }
}

impl TryFrom<String> for CenterPosition {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<CenterPosition> for String {
    fn from(pos: CenterPosition) -> Self {
        pos.to_string()
    }
}

/// 中央カード。配役時に作られ、酔っ払いの入れ替えでのみ役職が変わる。
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CenterCard {
    pub position: CenterPosition,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_round_trip() {
        let pos = CenterPosition(2);
        assert_eq!(pos.to_string(), "center_2");
        assert_eq!("center_2".parse::<CenterPosition>().unwrap(), pos);
    }

    #[test]
    fn test_position_rejects_garbage() {
        assert!("center_x".parse::<CenterPosition>().is_err());
        assert!("middle_0".parse::<CenterPosition>().is_err());
    }
}
