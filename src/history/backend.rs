//! 履歴の保存先
//!
//! エントリ1件 = blob 1個。blob はそれぞれ独立に読めること
//! （1件の破損で他のエントリが読めなくなってはいけない）。

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

const ENTRY_EXTENSION: &str = "entry";

/// 履歴blobの保存先
pub trait HistoryBackend {
    /// 保存済みblobのキーを保存順（古い順）に列挙
    fn keys(&self) -> io::Result<Vec<String>>;

    /// blobを読み込み
    fn read(&self, key: &str) -> io::Result<Vec<u8>>;

    /// blobを末尾に追加し、そのキーを返す
    fn append(&mut self, id: &str, blob: &[u8]) -> io::Result<String>;

    /// 全blobを削除
    ///
    /// 戻った後の `keys` は必ず空を返すこと。
    fn clear(&mut self) -> io::Result<()>;
}

/// ディレクトリ上の保存先
///
/// `<連番10桁>-<id>.entry` を1エントリ1ファイルで置く。
#[derive(Debug, Clone)]
pub struct FsBackend {
    dir: PathBuf,
}

impl FsBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_of(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    fn next_seq(&self) -> io::Result<u64> {
        let last = self
            .keys()?
            .iter()
            .filter_map(|key| key.split('-').next()?.parse::<u64>().ok())
            .max();
        Ok(last.map_or(1, |seq| seq + 1))
    }
}

impl HistoryBackend for FsBackend {
    fn keys(&self) -> io::Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        for dir_entry in fs::read_dir(&self.dir)? {
            let path = dir_entry?.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some(ENTRY_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                keys.push(name.to_string());
            }
        }

        // 連番がゼロ埋めなので名前順 = 保存順
        keys.sort();
        Ok(keys)
    }

    fn read(&self, key: &str) -> io::Result<Vec<u8>> {
        fs::read(self.path_of(key))
    }

    fn append(&mut self, id: &str, blob: &[u8]) -> io::Result<String> {
        fs::create_dir_all(&self.dir)?;

        let safe_id: String = id
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
            .collect();
        let key = format!("{:010}-{}.{}", self.next_seq()?, safe_id, ENTRY_EXTENSION);

        // 書きかけのファイルを読まれないよう一時ファイル経由でリネーム
        let tmp_path = self.dir.join(format!(".{}.tmp", key));
        fs::write(&tmp_path, blob)?;
        if let Err(e) = fs::rename(&tmp_path, self.path_of(&key)) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
        Ok(key)
    }

    fn clear(&mut self) -> io::Result<()> {
        if !self.dir.exists() {
            return Ok(());
        }

        // 先にディレクトリごと退避するので、削除の途中で読まれても空に見える
        let dir_name = self
            .dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "history".to_string());
        let trash = self
            .dir
            .with_file_name(format!(".{}.cleared-{}", dir_name, uuid::Uuid::new_v4()));

        // 退避できなければその場では消さない（途中まで消えた状態を残さない）
        fs::rename(&self.dir, &trash)?;

        // ここで失敗しても履歴としては空。退避先が残るだけ
        if let Err(e) = fs::remove_dir_all(&trash) {
            warn!("退避した履歴を削除できませんでした: {} ({})", trash.display(), e);
        }
        Ok(())
    }
}

/// メモリ上の保存先（テスト・一時利用）
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    blobs: Vec<(String, Vec<u8>)>,
    next_seq: u64,
    fail_writes: bool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以降の書き込みを失敗させる
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// 保存済みblobを直接書き換える
    pub fn replace(&mut self, key: &str, bytes: Vec<u8>) -> bool {
        match self.blobs.iter_mut().find(|(k, _)| k == key) {
            Some((_, blob)) => {
                *blob = bytes;
                true
            }
            None => false,
        }
    }

    pub fn raw(&self, key: &str) -> Option<&[u8]> {
        self.blobs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, blob)| blob.as_slice())
    }
}

impl HistoryBackend for MemoryBackend {
    fn keys(&self) -> io::Result<Vec<String>> {
        Ok(self.blobs.iter().map(|(key, _)| key.clone()).collect())
    }

    fn read(&self, key: &str) -> io::Result<Vec<u8>> {
        self.raw(key)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, key.to_string()))
    }

    fn append(&mut self, id: &str, blob: &[u8]) -> io::Result<String> {
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::Other, "write disabled"));
        }
        self.next_seq += 1;
        let key = format!("{:010}-{}", self.next_seq, id);
        self.blobs.push((key.clone(), blob.to_vec()));
        Ok(key)
    }

    fn clear(&mut self) -> io::Result<()> {
        self.blobs.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_fs_backend_missing_dir_is_empty() {
        let dir = tempdir().expect("Failed to create temp dir");
        let backend = FsBackend::new(dir.path().join("history"));
        assert!(backend.keys().unwrap().is_empty());
    }

    #[test]
    fn test_fs_backend_append_order() {
        let dir = tempdir().expect("Failed to create temp dir");
        let mut backend = FsBackend::new(dir.path().join("history"));

        let first = backend.append("aaa", b"one").unwrap();
        let second = backend.append("bbb", b"two").unwrap();
        let third = backend.append("../evil", b"three").unwrap();

        assert_eq!(backend.keys().unwrap(), vec![first.clone(), second, third.clone()]);
        assert_eq!(backend.read(&first).unwrap(), b"one");
        assert!(third.starts_with("0000000003-evil"));
    }

    #[test]
    fn test_fs_backend_ignores_foreign_files() {
        let dir = tempdir().expect("Failed to create temp dir");
        let history = dir.path().join("history");
        let mut backend = FsBackend::new(&history);
        backend.append("aaa", b"one").unwrap();

        std::fs::write(history.join("notes.txt"), "hello").unwrap();
        std::fs::write(history.join(".0000000009-x.entry.tmp"), "partial").unwrap();

        assert_eq!(backend.keys().unwrap().len(), 1);
    }

    #[test]
    fn test_fs_backend_clear() {
        let dir = tempdir().expect("Failed to create temp dir");
        let history = dir.path().join("history");
        let mut backend = FsBackend::new(&history);
        backend.append("aaa", b"one").unwrap();
        backend.append("bbb", b"two").unwrap();

        backend.clear().unwrap();
        assert!(backend.keys().unwrap().is_empty());
        assert!(!history.exists());

        // 退避ディレクトリも残らない
        let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert!(leftovers.is_empty());

        // クリア後も追記できる
        backend.append("ccc", b"three").unwrap();
        assert_eq!(backend.keys().unwrap().len(), 1);
    }

    #[test]
    fn test_fs_backend_clear_ok_when_trash_removal_fails() {
        let dir = tempdir().expect("Failed to create temp dir");
        // ディレクトリの代わりにファイルを置くと、退避はできても削除は失敗する
        let history = dir.path().join("history");
        std::fs::write(&history, "not a directory").unwrap();
        let mut backend = FsBackend::new(&history);

        backend.clear().unwrap();
        assert!(!history.exists());
        assert!(backend.keys().unwrap().is_empty());
    }

    #[test]
    fn test_memory_backend_fail_writes() {
        let mut backend = MemoryBackend::new();
        backend.set_fail_writes(true);
        assert!(backend.append("a", b"x").is_err());
        backend.set_fail_writes(false);
        let key = backend.append("a", b"x").unwrap();
        assert!(backend.replace(&key, b"y".to_vec()));
        assert_eq!(backend.read(&key).unwrap(), b"y");
        assert!(!backend.replace("missing", Vec::new()));
    }
}
