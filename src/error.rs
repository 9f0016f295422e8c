use thiserror::Error;

#[derive(Error, Debug)]
pub enum FoodAiError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("画像として読み込めません: {0}")]
    InvalidImage(String),

    #[error("画像サイズが上限を超えています: {size} bytes (上限 {limit} bytes)")]
    ImageTooLarge { size: u64, limit: u64 },

    /// モデル呼び出しの失敗。解析結果も履歴も作らない
    #[error("AI呼び出しエラー: {0}")]
    Upstream(String),

    #[error("履歴エラー: {0}")]
    Store(#[from] crate::history::StoreError),

    #[error("履歴が見つかりません: {0}")]
    NotFound(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] food_ai_common::Error),
}

pub type Result<T> = std::result::Result<T, FoodAiError>;
