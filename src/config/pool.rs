// src/config/pool.rs
//! オブジェクトプールまわりの設定だよ！
//! 引退したエンティティやアビリティを何個まで取っておくか、とか。

use serde::Deserialize;

use crate::ecs::error::EcsResult;

/// 新しいエンティティのスロットテーブルを最初に何個分確保しておくか。
pub const DEFAULT_INITIAL_SLOT_CAPACITY: usize = 8;
/// 引退エンティティのキャッシュ上限 (None = 無制限)。
pub const DEFAULT_ENTITY_CACHE_LIMIT: Option<usize> = None;
/// 種類ごとのアビリティ再利用キューの上限 (None = 無制限)。
pub const DEFAULT_ABILITY_CACHE_LIMIT: Option<usize> = None;

/// `Entities` と `Abilities` のプール設定。
///
/// JSON で書いたときに足りないフィールドはデフォルト値で埋まるよ。
/// ```json
/// { "entity_cache_limit": 256, "initial_slot_capacity": 4 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// 再利用のために取っておく引退エンティティの最大数。
    pub entity_cache_limit: Option<usize>,
    /// アビリティの種類ごとに取っておく再利用インスタンスの最大数。
    pub ability_cache_limit: Option<usize>,
    pub initial_slot_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            entity_cache_limit: DEFAULT_ENTITY_CACHE_LIMIT,
            ability_cache_limit: DEFAULT_ABILITY_CACHE_LIMIT,
            initial_slot_capacity: DEFAULT_INITIAL_SLOT_CAPACITY,
        }
    }
}

impl PoolConfig {
    /// JSON 文字列から設定を読み込むよ。
    pub fn from_json(json: &str) -> EcsResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        log::debug!("PoolConfig: Loaded {:?}", config);
        Ok(config)
    }

    /// キャッシュに空きがあるか (上限なしなら常に true)。
    pub(crate) fn has_room(limit: Option<usize>, current: usize) -> bool {
        limit.map_or(true, |max| current < max)
    }
}
