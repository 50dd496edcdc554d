use rand::Rng;
use std::collections::HashMap;

use super::role::Role;

/// ワンナイト人狼の標準余剰カード枚数（プレイヤー数 + 3 枚を配る）。
pub const DEFAULT_SURPLUS_CARDS: usize = 3;

/// 役職ごとの枚数指定。ホストが配役画面で組み立てる。
pub type RoleConfig = HashMap<Role, usize>;

/// 役職構成からカードプールを作る。構成の合計がプレイヤー数に満たない場合は
/// プレイヤー数 + surplus 枚になるまで村人で埋める。合計がプレイヤー数以上
/// であればそのまま使う（余剰が surplus 未満の変則構成も許す）。
// TODO: 余剰カード枚数をホストが開始リクエストで指定できるようにする
pub fn build_role_pool(config: &RoleConfig, player_count: usize, surplus: usize) -> Vec<Role> {
    let mut pool: Vec<Role> = Vec::new();
    // HashMapの列挙順に依存しないよう、カタログの正準順で展開する
    for role in Role::ALL {
        if let Some(count) = config.get(&role) {
            for _ in 0..*count {
                pool.push(role);
            }
        }
    }
    if pool.len() < player_count {
        let needed = player_count + surplus - pool.len();
        pool.extend(std::iter::repeat(Role::Villager).take(needed));
    }
    pool
}

/// Fisher–Yates。後方から順に無作為な位置のカードと入れ替える。
pub fn shuffle<R: Rng>(pool: &mut [Role], rng: &mut R) {
    for i in (1..pool.len()).rev() {
        let j = rng.gen_range(0..=i);
        pool.swap(i, j);
    }
}
