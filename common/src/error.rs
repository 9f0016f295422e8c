//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Pattern error: {0}")]
    Pattern(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

/// 履歴エントリのデコードエラー
///
/// 永続化データの破損はエントリ単位の失敗として扱い、既定値で補わない。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("データが途中で切れています: {0}")]
    Truncated(&'static str),

    #[error("エンベロープの識別子が不正です")]
    BadMagic,

    #[error("未対応のフォーマットバージョン: {0}")]
    UnsupportedVersion(u16),

    #[error("ヘッダを解析できません: {0}")]
    InvalidHeader(String),

    #[error("必須フィールドがありません: {0}")]
    MissingField(&'static str),

    #[error("画像のチェックサムが一致しません")]
    ImageChecksumMismatch,

    #[error("末尾に余分なデータがあります: {0} bytes")]
    TrailingBytes(usize),
}
