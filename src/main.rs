use anyhow::{bail, Context};
use clap::Parser;
use dialoguer::Confirm;
use food_ai_common::{spoken_summary, AnalysisRecord, FieldKey, HistoryEntry, Locale};
use food_ai_rust::analyzer::{self, CliAnalyzer};
use food_ai_rust::cli::{Cli, Commands, HistoryAction};
use food_ai_rust::config::Config;
use food_ai_rust::history::{self, FsBackend, HistoryStore, LoadReport};
use food_ai_rust::{init_logging, intake};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Read;
use std::path::Path;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load().context("設定ファイルを読み込めません")?;
    if let Some(provider) = cli.ai_provider {
        config.provider = provider;
    }
    if let Some(locale) = cli.locale {
        config.locale = locale;
    }

    match cli.command {
        Commands::Analyze { image, no_save, speak } => {
            println!("🍽  food-ai - 食品解析\n");

            // 1. 画像読み込み
            println!("[1/3] 画像を読み込み中...");
            let upload = intake::load_image(&image, config.max_image_bytes)
                .with_context(|| format!("画像を読み込めません: {}", image.display()))?;
            println!("✔ {} ({}, {} bytes)\n", upload.file_name, upload.mime_type, upload.bytes.len());

            // 2. AI解析
            println!("[2/3] AI解析中... ({})", config.provider.command_name());
            let analyzer = CliAnalyzer::new(config.provider, config.locale, config.timeout())
                .with_model(config.model.clone());
            let normalizer = config.normalizer()?;

            let spinner = ProgressBar::new_spinner();
            spinner.set_style(ProgressStyle::with_template("{spinner} {msg} ({elapsed})")?);
            spinner.set_message("応答待ち");
            spinner.enable_steady_tick(Duration::from_millis(120));
            let result = analyzer::analyze_food(&analyzer, &upload, &normalizer).await;
            spinner.finish_and_clear();

            let normalized = result.context("AI解析に失敗しました")?;
            println!("✔ 解析完了\n");

            print_record(&normalized.record, config.locale);
            if speak {
                println!("\n🔊 {}", spoken_summary(&normalized.record, config.locale));
            }

            // 3. 履歴保存
            if no_save {
                println!("\n✅ 完了（履歴には保存していません）");
                return Ok(());
            }

            println!("\n[3/3] 履歴に保存中...");
            let entry = history::new_entry(normalized.record, Some(upload.bytes));
            let id = entry.id().to_string();
            let saved = config
                .history_dir()
                .map_err(anyhow::Error::from)
                .and_then(|dir| history::persist_entry(&dir, entry).map_err(anyhow::Error::from));
            match saved {
                Ok(()) => println!("✔ 保存しました: {}", id),
                Err(e) => println!("⚠ 履歴を保存できませんでした: {:#}", e),
            }

            println!("\n✅ 完了");
        }

        Commands::Normalize { input } => {
            let raw = read_input(&input)?;
            let normalizer = config.normalizer()?;
            let normalized = normalizer.normalize_bytes(&raw);

            println!("段: {}\n", normalized.tier);
            print_record(&normalized.record, config.locale);
        }

        Commands::History { action } => {
            let (mut store, report) = open_store(&config)?;
            print_load_report(&report);

            match action {
                HistoryAction::List => {
                    if store.is_empty() {
                        println!("履歴はありません");
                    }
                    for entry in store.entries() {
                        println!(
                            "{}  {}  {}",
                            history::format_created_at(entry.created_at()),
                            short_id(entry.id()),
                            entry.record().food_name
                        );
                    }
                }

                HistoryAction::Show { id, export_image } => {
                    let entry = find_entry(&store, &id)?;
                    println!("ID: {}", entry.id());
                    println!("日時: {}\n", history::format_created_at(entry.created_at()));
                    print_record(entry.record(), config.locale);

                    match (export_image, entry.source_image()) {
                        (Some(path), Some(bytes)) => {
                            std::fs::write(&path, bytes)
                                .with_context(|| format!("画像を書き出せません: {}", path.display()))?;
                            println!("\n✔ 画像を書き出しました: {}", path.display());
                        }
                        (Some(_), None) => println!("\nこのエントリには画像がありません"),
                        (None, _) => {}
                    }
                }

                HistoryAction::Clear { yes } => {
                    if store.is_empty() {
                        println!("履歴はありません");
                        return Ok(());
                    }

                    let confirmed = yes
                        || Confirm::new()
                            .with_prompt(format!("{}件の履歴をすべて削除しますか?", store.len()))
                            .default(false)
                            .interact()?;
                    if !confirmed {
                        println!("キャンセルしました");
                        return Ok(());
                    }

                    store.clear_all().context("履歴を削除できませんでした")?;
                    println!("✔ 履歴を削除しました");
                }
            }
        }

        Commands::Config { set_provider, set_locale, set_history_dir, show } => {
            // コマンドライン指定で上書きされていない値を保存する
            let mut saved = Config::load()?;

            if let Some(provider) = set_provider {
                saved.set_provider(provider)?;
                println!("✔ プロバイダを設定しました: {}", provider.command_name());
            }
            if let Some(locale) = set_locale {
                saved.set_locale(locale)?;
                println!("✔ 表示言語を設定しました: {}", locale);
            }
            if let Some(dir) = set_history_dir {
                println!("✔ 履歴の保存先を設定しました: {}", dir.display());
                saved.set_history_dir(dir)?;
            }

            if show {
                println!("設定 ({}):", Config::config_path()?.display());
                println!("  プロバイダ: {}", saved.provider.command_name());
                println!("  モデル: {}", saved.model.as_deref().unwrap_or("(CLIの既定)"));
                println!("  タイムアウト: {}秒", saved.timeout_seconds);
                println!("  最大画像サイズ: {} bytes", saved.max_image_bytes);
                println!("  表示言語: {}", saved.locale);
                println!("  履歴: {}", saved.history_dir()?.display());
                println!("  追加ラベル: {}項目", saved.extra_labels.len());
            }
        }
    }

    Ok(())
}

fn open_store(config: &Config) -> anyhow::Result<(HistoryStore<FsBackend>, LoadReport)> {
    let dir = config.history_dir()?;
    HistoryStore::open(FsBackend::new(&dir))
        .with_context(|| format!("履歴を読み込めません: {}", dir.display()))
}

fn print_load_report(report: &LoadReport) {
    if report.dropped_count() > 0 {
        println!("⚠ 読み込めない履歴が{}件ありました（スキップ）", report.dropped_count());
        for dropped in &report.dropped {
            println!("  - {}: {}", dropped.key, dropped.reason);
        }
        println!();
    }
}

fn print_record(record: &AnalysisRecord, locale: Locale) {
    for key in FieldKey::ALL {
        println!("  {}: {}", locale.field_label(key), record.get(key));
    }
}

fn read_input(input: &Path) -> anyhow::Result<Vec<u8>> {
    if input.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf)?;
        return Ok(buf);
    }
    std::fs::read(input).with_context(|| format!("ファイルを読み込めません: {}", input.display()))
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn find_entry<'a>(store: &'a HistoryStore<FsBackend>, id: &str) -> anyhow::Result<&'a HistoryEntry> {
    if let Some(entry) = store.get(id) {
        return Ok(entry);
    }

    let matches: Vec<&HistoryEntry> = store.entries().filter(|e| e.id().starts_with(id)).collect();
    match matches.as_slice() {
        [entry] => Ok(*entry),
        [] => Err(food_ai_rust::error::FoodAiError::NotFound(id.to_string()).into()),
        _ => bail!("IDが曖昧です（{}件一致）: {}", matches.len(), id),
    }
}
