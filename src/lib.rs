//! food-ai
//!
//! 食品写真をAI CLIに解析させ、応答を6項目の記録に正規化して
//! 端末ローカルの食事履歴に保存する。

pub mod ai_provider;
pub mod analyzer;
pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod intake;

use tracing_subscriber::EnvFilter;

/// ログ出力を初期化
///
/// `RUST_LOG` が設定されていればそれに従い、なければ `verbose` で debug / warn を切り替える。
/// 2回目以降の呼び出しは何もしない。
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "food_ai_rust=debug,food_ai=debug"
        } else {
            "warn"
        })
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
