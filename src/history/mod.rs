//! 食事履歴
//!
//! 解析結果と元画像を1エントリにまとめて端末ローカルに保存する。

mod backend;
mod store;

pub use backend::{FsBackend, HistoryBackend, MemoryBackend};
pub use store::{
    DropReason, DroppedBlob, Durability, HistoryStore, LoadReport, PersistError, StoreError,
};

use food_ai_common::{AnalysisRecord, HistoryEntry};
use std::path::Path;

/// 解析結果から新しいエントリを作る（新しいID・現在時刻）
pub fn new_entry(record: AnalysisRecord, source_image: Option<Vec<u8>>) -> HistoryEntry {
    HistoryEntry::new(
        uuid::Uuid::new_v4().to_string(),
        chrono::Utc::now().timestamp_millis(),
        source_image,
        record,
    )
}

/// 保存先を開いてエントリを1件追加する
///
/// 保存先を読めない場合も書き込み失敗と同じく `StoreError::Persist` になる。
pub fn persist_entry(dir: &Path, entry: HistoryEntry) -> Result<(), StoreError> {
    let (mut store, _) = HistoryStore::open(FsBackend::new(dir))?;
    store.insert(entry)
}

/// 一覧表示用の作成日時（ローカル時刻）
pub fn format_created_at(created_at: i64) -> String {
    chrono::DateTime::from_timestamp_millis(created_at)
        .map(|dt| {
            dt.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M")
                .to_string()
        })
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use food_ai_common::Locale;

    #[test]
    fn test_new_entry_unique_ids() {
        let a = new_entry(Locale::Zh.placeholder_record(), None);
        let b = new_entry(Locale::Zh.placeholder_record(), None);
        assert_ne!(a.id(), b.id());
        assert!(a.created_at() > 0);
    }

    #[test]
    fn test_format_created_at() {
        let text = format_created_at(1_700_000_000_000);
        assert_eq!(text.len(), "2023-11-14 22:13".len());
        assert!(text.starts_with("2023-11-1"));
        assert_eq!(format_created_at(i64::MAX), "-");
    }
}
