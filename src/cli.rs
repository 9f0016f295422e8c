use clap::{Parser, Subcommand};
use crate::ai_provider::AiProvider;
use food_ai_common::Locale;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "food-ai")]
#[command(about = "食品写真AI解析・食事履歴ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// AIプロバイダ (claude/codex/gemini)。省略時は設定ファイルの値
    #[arg(long, global = true)]
    pub ai_provider: Option<AiProvider>,

    /// 表示言語 (zh/en/ja)。省略時は設定ファイルの値
    #[arg(long, global = true)]
    pub locale: Option<Locale>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 食品写真を解析して履歴に保存
    Analyze {
        /// 画像ファイルのパス
        #[arg(required = true)]
        image: PathBuf,

        /// 履歴に保存しない
        #[arg(long)]
        no_save: bool,

        /// 読み上げ用の要約も出力
        #[arg(long)]
        speak: bool,
    },

    /// 保存済みのモデル応答を正規化して表示（`-` で標準入力）
    Normalize {
        /// 応答テキストのファイル
        #[arg(required = true)]
        input: PathBuf,
    },

    /// 食事履歴
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// 設定を表示・変更
    Config {
        /// プロバイダを設定
        #[arg(long)]
        set_provider: Option<AiProvider>,

        /// 表示言語を設定
        #[arg(long)]
        set_locale: Option<Locale>,

        /// 履歴の保存先を設定
        #[arg(long)]
        set_history_dir: Option<PathBuf>,

        /// 現在の設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[derive(Subcommand)]
pub enum HistoryAction {
    /// 新しい順に一覧表示
    List,

    /// 1件を詳しく表示
    Show {
        /// エントリID（先頭の一部でも可）
        #[arg(required = true)]
        id: String,

        /// 元画像を書き出す
        #[arg(long)]
        export_image: Option<PathBuf>,
    },

    /// 全履歴を削除
    Clear {
        /// 確認せずに削除
        #[arg(short, long)]
        yes: bool,
    },
}
