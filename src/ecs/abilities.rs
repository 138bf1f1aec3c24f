// src/ecs/abilities.rs

// TypeId: アビリティの具体的な型ごとの鍵。リフレクションじゃなくてコンパイル時に決まる型タグだよ。
use std::any::TypeId;
// HashMap: 型 → 番号、型 → 再利用キュー の対応表。
// VecDeque: 再利用キュー。先に返されたものから順に再利用する (FIFO)。
use std::collections::{HashMap, VecDeque};
use std::ops::{Deref, DerefMut};

use log::{debug, error, trace};

use crate::config::PoolConfig;
use crate::ecs::ability::{Ability, AbilityId, AsAny};

/// プールから出てきたアビリティ。自分の種類の番号 (`AbilityId`) がタグ付けされてるよ！🏷️
///
/// `Deref` で中身の `T` にそのままアクセスできる。
/// エンティティに付けるときは `Entities::attach` に渡せば、番号を自分で持ち回らなくて済む！
#[derive(Debug)]
pub struct Pooled<T: Ability> {
    id: AbilityId,
    ability: Box<T>,
}

impl<T: Ability> Pooled<T> {
    pub fn id(&self) -> AbilityId {
        self.id
    }

    pub fn into_inner(self) -> Box<T> {
        self.ability
    }

    pub fn into_parts(self) -> (AbilityId, Box<T>) {
        (self.id, self.ability)
    }
}

impl<T: Ability> Deref for Pooled<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.ability
    }
}

impl<T: Ability> DerefMut for Pooled<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.ability
    }
}

/// Abilities（アビリティプール）だよ！
///
/// 2つの仕事をするんだ:
/// 1. アビリティの種類ごとに番号を振る (初めて見た種類に次の番号をあげる)。
/// 2. 使い終わったインスタンスを種類ごとのキューに取っておいて、次の `create` で使い回す ♻️
///
/// 再利用したインスタンスのフィールドはリセットしないよ！
/// 前の値が残ってても困らないように、付ける前に全フィールドを上書きするのは使う側のお仕事。
#[derive(Debug)]
pub struct Abilities {
    /// 次に割り当てる番号。
    next_id: usize,
    ids: HashMap<TypeId, AbilityId>,
    /// 番号 → 型名 (ログとデバッグ用)。
    names: Vec<&'static str>,
    cache: HashMap<TypeId, VecDeque<Box<dyn Ability>>>,
    cache_limit: Option<usize>,
}

impl Default for Abilities {
    fn default() -> Self {
        Self::new()
    }
}

impl Abilities {
    pub fn new() -> Self {
        Self::with_config(&PoolConfig::default())
    }

    pub fn with_config(config: &PoolConfig) -> Self {
        Abilities {
            next_id: 0,
            ids: HashMap::new(),
            names: Vec::new(),
            cache: HashMap::new(),
            cache_limit: config.ability_cache_limit,
        }
    }

    /// 種類 `T` の番号を返すよ。初めての種類なら、ここで次の番号を割り当てる！
    /// 何回呼んでも同じ種類には同じ番号が返る。
    pub fn register<T: Ability>(&mut self) -> AbilityId {
        let type_id = TypeId::of::<T>();
        if let Some(&id) = self.ids.get(&type_id) {
            return id;
        }

        let id = AbilityId(self.next_id);
        self.next_id += 1;
        self.ids.insert(type_id, id);
        self.names.push(std::any::type_name::<T>());
        debug!("Abilities: Registered kind {} as {}", std::any::type_name::<T>(), id);
        id
    }

    /// まだ一度も登録 (create) されていない種類なら `None`。
    pub fn id_of<T: Ability>(&self) -> Option<AbilityId> {
        self.ids.get(&TypeId::of::<T>()).copied()
    }

    pub fn kind_name(&self, id: AbilityId) -> Option<&'static str> {
        self.names.get(id.index()).copied()
    }

    /// これまでに番号を割り当てた種類の数。
    pub fn kind_count(&self) -> usize {
        self.next_id
    }

    /// 種類 `T` のアビリティを1つちょうだい！
    ///
    /// 再利用キューに何か残っていればそれを、空なら `T::default()` で新しく作るよ。
    pub fn create<T: Ability + Default>(&mut self) -> Pooled<T> {
        let id = self.register::<T>();
        let recycled = self
            .cache
            .get_mut(&TypeId::of::<T>())
            .and_then(|queue| queue.pop_front());

        let ability = match recycled {
            Some(boxed) => match boxed.downcast::<T>() {
                Ok(ability) => {
                    trace!("Abilities: Reused a pooled {}", std::any::type_name::<T>());
                    ability
                }
                Err(other) => {
                    // キューは TypeId ごとに分かれてるので、ここに来たらバグ
                    error!(
                        "Abilities: Queue for {} held a {}; allocating a fresh one",
                        std::any::type_name::<T>(),
                        (*other).kind_name()
                    );
                    Box::new(T::default())
                }
            },
            None => Box::new(T::default()),
        };

        Pooled { id, ability }
    }

    /// 使い終わったアビリティを種類 `T` の再利用キューに返すよ。中身はそのまま！
    pub fn recycle<T: Ability>(&mut self, ability: Box<T>) {
        self.recycle_dyn(ability);
    }

    /// 型消去されたアビリティを、中身の具体的な型のキューに返す。
    /// エンティティから外したアビリティはこっちで返すと楽ちん。
    pub fn recycle_dyn(&mut self, ability: Box<dyn Ability>) {
        let kind = ability.kind();
        // 初めての種類でもここでキューを作る
        let queue = self.cache.entry(kind).or_default();
        if PoolConfig::has_room(self.cache_limit, queue.len()) {
            queue.push_back(ability);
        } else {
            trace!("Abilities: Cache for {} is full; dropping instance", (*ability).kind_name());
        }
    }

    pub fn recycle_all<I>(&mut self, abilities: I)
    where
        I: IntoIterator<Item = Box<dyn Ability>>,
    {
        for ability in abilities {
            self.recycle_dyn(ability);
        }
    }

    /// 種類 `T` の再利用キューに今いくつ残っているか。
    pub fn cached<T: Ability>(&self) -> usize {
        self.cache.get(&TypeId::of::<T>()).map_or(0, VecDeque::len)
    }
}
