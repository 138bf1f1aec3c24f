// src/ecs/runner.rs

// HashSet: 必要なアビリティ番号の集合と、今のメンバーの集合。
use std::collections::HashSet;

use log::trace;

use crate::ecs::ability::{AbilityId, AsAny};
use crate::ecs::entities::Entities;
use crate::ecs::entity::{Entity, EntityRecord};

/// ランナーを `Entities` に登録したときにもらえる番号。
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub struct RunnerId(pub usize);

/// ランナーが「このアビリティを全部持ってるエンティティだけ処理したい！」と宣言する集合だよ。
///
/// 空っぽのシグネチャは、どんなエンティティにもマッチする (何も要求してないからね)。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    ids: HashSet<AbilityId>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    /// 必要なアビリティ番号を1つ追加する。同じ番号を2回入れても1つ分。
    pub fn add_id(&mut self, id: AbilityId) -> &mut Self {
        self.ids.insert(id);
        self
    }

    pub fn contains(&self, id: AbilityId) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = AbilityId> + '_ {
        self.ids.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// エンティティが必要なアビリティを全部持っていれば true。
    pub(crate) fn matches(&self, record: &EntityRecord) -> bool {
        self.ids.iter().all(|&id| record.has(id))
    }
}

impl FromIterator<AbilityId> for Signature {
    fn from_iter<I: IntoIterator<Item = AbilityId>>(iter: I) -> Self {
        Signature {
            ids: iter.into_iter().collect(),
        }
    }
}

/// 1つのランナーの「今のメンバー」を管理するよ。
///
/// エンティティごとに NotMember / Member の2状態。
/// 通知が来るたびに `manage_entity` で状態を見直す。
#[derive(Debug, Default)]
pub struct Membership {
    signature: Signature,
    members: HashSet<Entity>,
}

impl Membership {
    pub fn new(signature: Signature) -> Self {
        Membership {
            signature,
            members: HashSet::new(),
        }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.members.contains(&entity)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// メンバーを順不同で。
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.members.iter().copied()
    }

    /// 書き換え直後のエンティティを見て、メンバーに入れる/外す。
    /// 状態が変わったら true を返すよ。
    pub(crate) fn manage_entity(&mut self, entity: Entity, record: &EntityRecord) -> bool {
        let is_contained = self.members.contains(&entity);
        let matches = self.signature.matches(record);

        if !is_contained && matches {
            self.members.insert(entity);
            trace!("Membership: {:?} joined", entity);
            true
        } else if is_contained && !matches {
            self.members.remove(&entity);
            trace!("Membership: {:?} left", entity);
            true
        } else {
            false
        }
    }

    /// 引退したエンティティを無条件で外す。
    pub(crate) fn evict(&mut self, entity: Entity) -> bool {
        self.members.remove(&entity)
    }

    /// `run` 中に集合を書き換えても大丈夫なように、今のメンバーをコピーしておく。
    pub(crate) fn snapshot(&self) -> Vec<Entity> {
        self.members.iter().copied().collect()
    }
}

/// Runner（ランナー）トレイトだよ！いわゆる System のこと。🏃
///
/// 1. `setup` で「どのアビリティを持ってるエンティティを処理したいか」を宣言する。
/// 2. `Entities::run` が呼ばれるたびに、条件を満たすエンティティ1つずつについて `handle` が呼ばれる。
///
/// メンバーの管理は `Entities` が全部やってくれるから、ランナーは `handle` の中身だけ書けばOK！
/// `handle` の中で `entities` を書き換えても大丈夫。他のエンティティでも、処理中のエンティティでも。
/// この tick の途中でメンバーから外れたエンティティは、もう `handle` されないよ。
pub trait Runner: AsAny {
    /// 必要なアビリティ番号を `signature.add_id(...)` で宣言する。登録時に一度だけ呼ばれるよ。
    fn setup(&mut self, signature: &mut Signature);

    /// メンバーのエンティティ1つ分の処理。
    fn handle(&mut self, entity: Entity, entities: &mut Entities);

    /// ログに出す名前。
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
