//! 履歴ストア
//!
//! 新しいものが先頭の順序付き履歴。読み込みは部分失敗を許容し、
//! 壊れたエントリは飛ばして残りを読む（壊れたblob自体には触れない）。

use super::backend::HistoryBackend;
use food_ai_common::{codec, DecodeError, HistoryEntry};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io;
use thiserror::Error;
use tracing::{debug, info, warn};

/// 書き込みエラー
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("IOエラー: {0}")]
    Io(#[from] io::Error),
}

/// 履歴ストアのエラー
#[derive(Error, Debug)]
pub enum StoreError {
    /// 同じIDのエントリが既にある（追加しない）
    #[error("IDが重複しています: {0}")]
    DuplicateId(String),

    /// メモリ上には追加済み。再起動後は残らない可能性がある
    #[error("履歴を保存できませんでした（このセッション中のみ保持）: {0}")]
    Persist(#[from] PersistError),
}

/// エントリの保存状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Durability {
    Persisted,
    SessionOnly,
}

/// 読み込み時に除外したblob
#[derive(Debug)]
pub struct DroppedBlob {
    pub key: String,
    pub reason: DropReason,
}

#[derive(Debug)]
pub enum DropReason {
    Read(io::Error),
    Decode(DecodeError),
    DuplicateId(String),
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::Read(e) => write!(f, "読み込みエラー: {}", e),
            DropReason::Decode(e) => write!(f, "デコードエラー: {}", e),
            DropReason::DuplicateId(id) => write!(f, "IDが重複: {}", id),
        }
    }
}

/// `load_all` の結果
#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: usize,
    pub dropped: Vec<DroppedBlob>,
}

impl LoadReport {
    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }
}

#[derive(Debug, Clone)]
struct Slot {
    entry: HistoryEntry,
    durability: Durability,
}

/// 履歴ストア
///
/// 変更系の操作は `&mut self` を取るので、複数の呼び出し元から使う場合は
/// `Mutex` などで1つの書き手に直列化すること。
#[derive(Debug)]
pub struct HistoryStore<B: HistoryBackend> {
    backend: B,
    slots: Vec<Slot>,
}

impl<B: HistoryBackend> HistoryStore<B> {
    /// 空のストアを作成（読み込みはしない）
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            slots: Vec::new(),
        }
    }

    /// ストアを作成して保存済みの履歴を読み込む
    pub fn open(backend: B) -> Result<(Self, LoadReport), PersistError> {
        let mut store = Self::new(backend);
        let report = store.load_all()?;
        Ok((store, report))
    }

    /// 先頭に追加して保存
    ///
    /// 保存に失敗してもエントリはこのセッション中は残り、
    /// `StoreError::Persist` で呼び出し元に知らせる。
    pub fn insert(&mut self, entry: HistoryEntry) -> Result<(), StoreError> {
        if self.get(entry.id()).is_some() {
            return Err(StoreError::DuplicateId(entry.id().to_string()));
        }

        let blob = codec::encode(&entry);
        let id = entry.id().to_string();

        match self.backend.append(&id, &blob) {
            Ok(key) => {
                info!("履歴を保存: {} ({} bytes)", key, blob.len());
                self.slots.insert(
                    0,
                    Slot {
                        entry,
                        durability: Durability::Persisted,
                    },
                );
                Ok(())
            }
            Err(e) => {
                warn!("履歴の保存に失敗、セッション中のみ保持: {} ({})", id, e);
                self.slots.insert(
                    0,
                    Slot {
                        entry,
                        durability: Durability::SessionOnly,
                    },
                );
                Err(StoreError::Persist(PersistError::Io(e)))
            }
        }
    }

    /// 保存済みの全エントリを読み直す
    ///
    /// 1件ずつ独立にデコードし、失敗したものは除外して続行する。
    /// 保存できなかったセッション中のエントリは元の並び位置に残す。
    pub fn load_all(&mut self) -> Result<LoadReport, PersistError> {
        let keys = self.backend.keys()?;
        let mut report = LoadReport::default();
        let mut seen = HashSet::new();
        let mut loaded = Vec::with_capacity(keys.len());

        // 保存順は古い順なので逆順に読む
        for key in keys.into_iter().rev() {
            let entry = match self.backend.read(&key) {
                Ok(bytes) => match codec::decode(&bytes) {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!("履歴エントリをデコードできないためスキップ: {} ({})", key, e);
                        report.dropped.push(DroppedBlob {
                            key,
                            reason: DropReason::Decode(e),
                        });
                        continue;
                    }
                },
                Err(e) => {
                    warn!("履歴エントリを読み込めないためスキップ: {} ({})", key, e);
                    report.dropped.push(DroppedBlob {
                        key,
                        reason: DropReason::Read(e),
                    });
                    continue;
                }
            };

            if !seen.insert(entry.id().to_string()) {
                warn!("IDが重複した履歴エントリをスキップ: {} ({})", key, entry.id());
                report.dropped.push(DroppedBlob {
                    key,
                    reason: DropReason::DuplicateId(entry.id().to_string()),
                });
                continue;
            }

            loaded.push(Slot {
                entry,
                durability: Durability::Persisted,
            });
        }

        report.loaded = loaded.len();

        // セッション中のみのエントリは、直前（古い側）にあった読み込み済みエントリの
        // 手前に戻す。古い側に何もなければ末尾
        let mut anchored: HashMap<String, Vec<Slot>> = HashMap::new();
        let mut oldest = Vec::new();
        let mut anchor: Option<String> = None;
        for slot in self.slots.drain(..).rev() {
            let id = slot.entry.id().to_string();
            let durability = slot.durability;
            match durability {
                Durability::Persisted if seen.contains(&id) => anchor = Some(id),
                Durability::Persisted => {}
                Durability::SessionOnly if seen.contains(&id) => {}
                Durability::SessionOnly => match &anchor {
                    Some(older) => anchored.entry(older.clone()).or_default().push(slot),
                    None => oldest.push(slot),
                },
            }
        }

        let mut slots = Vec::with_capacity(loaded.len() + oldest.len());
        for slot in loaded {
            if let Some(newer) = anchored.remove(slot.entry.id()) {
                slots.extend(newer.into_iter().rev());
            }
            slots.push(slot);
        }
        slots.extend(oldest.into_iter().rev());
        self.slots = slots;

        debug!(
            "履歴を読み込み: {}件 (除外 {}件)",
            report.loaded,
            report.dropped_count()
        );
        Ok(report)
    }

    /// 全履歴を削除
    ///
    /// 保存先の削除に失敗した場合はメモリ上の履歴も残す。
    pub fn clear_all(&mut self) -> Result<(), PersistError> {
        self.backend.clear()?;
        self.slots.clear();
        info!("履歴を全削除");
        Ok(())
    }

    /// 新しい順のエントリ
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.slots.iter().map(|slot| &slot.entry)
    }

    pub fn get(&self, id: &str) -> Option<&HistoryEntry> {
        self.entries().find(|entry| entry.id() == id)
    }

    pub fn durability(&self, id: &str) -> Option<Durability> {
        self.slots
            .iter()
            .find(|slot| slot.entry.id() == id)
            .map(|slot| slot.durability)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}
