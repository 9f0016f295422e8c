//! Food AI Common Library
//!
//! CLIと他のフロントエンドで共有される型とロジック:
//! - モデル応答の正規化（どんな応答でも6項目を埋める）
//! - 履歴エントリのエンコード/デコード

pub mod types;
pub mod locale;
pub mod error;
pub mod extractor;
pub mod normalizer;
pub mod codec;
pub mod prompts;
pub mod summary;

pub use types::{AnalysisRecord, FieldKey, HistoryEntry};
pub use locale::Locale;
pub use error::{DecodeError, Error, Result};
pub use extractor::{extract, PatternTable};
pub use normalizer::{normalize, Normalized, Normalizer, Tier};
pub use prompts::build_analysis_prompt;
pub use summary::{spoken_summary, SuitabilityAdvice};
