// src/ecs/error.rs

use thiserror::Error;

use crate::ecs::entity::Entity;

/// ECS の操作で返ってくるエラーだよ。
///
/// スロット番号の範囲外や型違いの `get` はエラーじゃなくて「無い (`None`)」扱い。
/// ここに来るのは、引退済み (retire 済み) のエンティティを触っちゃったときと、
/// 設定ファイルが読めなかったときだけ！
#[derive(Debug, Error)]
pub enum EcsError {
    /// 生きていないエンティティ (未作成 or `remove` 済み) への操作。
    #[error("entity {0:?} is not alive (never created or already retired)")]
    DeadEntity(Entity),

    #[error("failed to parse pool config: {0}")]
    Config(#[from] serde_json::Error),
}

pub type EcsResult<T> = Result<T, EcsError>;
