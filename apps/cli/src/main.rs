//! crp-cli: Cursor のテレメトリ識別子リセット、バックアップの一覧・削除・復元、
//! 環境の状態確認を行う CLI。

mod output;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use crp_composition::app::EnvironmentStatus;
use crp_composition::domain::model::{CancellationToken, Platform, PlatformProfile, ToolConfig};
use crp_composition::domain::port::driving::{BackupAdminUseCase, ResetOptions, ResetUseCase};
use crp_composition::error::{exit_code_for, exit_codes, Result};
use crp_composition::{init_logging, is_elevated, CliRuntime, ConsoleStatusSink, HOME_ENV};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "crp-cli", version, about = "CursorResetPlus: reset Cursor telemetry identifiers")]
struct Cli {
    /// 製品ルート（既定: ~/CursorResetPlus）
    #[arg(long, global = true, env = HOME_ENV)]
    home: Option<PathBuf>,
    /// デバッグログを stderr にも出す
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 識別子をリセット（プロセス確認 → ネイティブ識別子 → storage.json）
    Reset {
        /// 対象プラットフォーム（windows|macos|linux、既定は実行中の OS）
        #[arg(long, value_parser = parse_platform)]
        platform: Option<Platform>,
        /// Linux の AppImage パス（未指定なら設定値）
        #[arg(long)]
        appimage: Option<PathBuf>,
        /// 対象アプリが起動中なら終了を待つ
        #[arg(long, default_value_t = false)]
        wait: bool,
        /// 待機の上限秒数（--wait と併用）
        #[arg(long, requires = "wait", value_parser = clap::value_parser!(u64).range(1..))]
        timeout: Option<u64>,
        /// 確認なしで実行
        #[arg(short, long, default_value_t = false)]
        yes: bool,
        /// JSON形式で出力
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// バックアップ1件を元の場所へ書き戻す
    Restore {
        /// バックアップファイルのパス
        backup: PathBuf,
        #[arg(long, value_parser = parse_platform)]
        platform: Option<Platform>,
        /// AppImage の書き戻し先
        #[arg(long)]
        appimage: Option<PathBuf>,
        #[arg(short, long, default_value_t = false)]
        yes: bool,
    },
    /// バックアップの管理
    Backups {
        #[command(subcommand)]
        command: BackupsCommand,
    },
    /// 現在の環境（プロセス・storage.json・バックアップ数）を表示
    Status {
        #[arg(long, value_parser = parse_platform)]
        platform: Option<Platform>,
        #[arg(long)]
        appimage: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// 新しい識別子セットを生成して表示（書き込みなし）
    Ids {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// ディレクトリ構成と実行環境を表示
    Info,
    /// 設定ファイルの管理
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum BackupsCommand {
    /// 一覧（新しい順）
    List {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// 1件削除
    Delete {
        backup: PathBuf,
        #[arg(short, long, default_value_t = false)]
        yes: bool,
    },
    /// すべて削除
    Clear {
        #[arg(short, long, default_value_t = false)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// 有効な設定値を表示
    Show,
    /// 既定値で設定ファイルを作成
    Init {
        /// 既存ファイルを上書き
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

fn parse_platform(value: &str) -> std::result::Result<Platform, String> {
    Platform::from_tag(value)
        .ok_or_else(|| format!("unknown platform '{value}' (expected windows, macos or linux)"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS),
        Err(err) => {
            eprintln!("crp-cli failed: {err:#}");
            ExitCode::from(exit_code_for(&err))
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    // 全依存関係はComposition Rootで組み立て
    let runtime = CliRuntime::new(cli.home)?;
    // ログが開けなくてもコマンドは実行する
    let _log_guard = match init_logging(&runtime.dirs().logs(), cli.verbose) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("warning: logging disabled: {e}");
            None
        }
    };
    info!(command = ?cli.command, "crp-cli started");

    match cli.command {
        Command::Reset {
            platform,
            appimage,
            wait,
            timeout,
            yes,
            json,
        } => {
            let profile = runtime.reset_profile(platform, appimage.as_deref())?;
            if let Some(msg) = runtime.elevation_warning(profile.platform()) {
                eprintln!("warning: {msg}");
            }
            if !json {
                output::print_reset_plan(&profile);
            }
            if !yes && !confirm("Proceed with the reset?")? {
                eprintln!("Aborted.");
                return Ok(());
            }

            let options = runtime.reset_options(wait, timeout, CancellationToken::new());
            reset_and_report(
                &runtime,
                &profile,
                &options,
                json,
                &mut io::stdout(),
                &mut io::stderr(),
            )?;
        }

        Command::Restore {
            backup,
            platform,
            appimage,
            yes,
        } => {
            let app = runtime.app();
            let record = app.find_backup(&backup)?;
            let profile = runtime.inspect_profile(platform, appimage.as_deref())?;
            println!(
                "Restore {} ({}) captured {}",
                record.file_name(),
                record.kind.label(),
                output::format_time(record.captured_at)
            );
            if record.kind.is_restorable() && !yes && !confirm("Overwrite the current value?")? {
                println!("Aborted.");
                return Ok(());
            }
            let sink = ConsoleStatusSink::stdout();
            let outcome = app.restore(&record, &profile, &sink)?;
            output::print_restore_outcome(&outcome);
        }

        Command::Backups { command } => match command {
            BackupsCommand::List { json } => {
                let list = runtime.app().list_backups()?;
                if json {
                    let body: Vec<output::JsonBackup> = list.iter().map(output::JsonBackup::from).collect();
                    println!("{}", serde_json::to_string_pretty(&body)?);
                } else {
                    output::print_backups(runtime.dirs().backups().as_path(), &list);
                }
            }
            BackupsCommand::Delete { backup, yes } => {
                let app = runtime.app();
                let record = app.find_backup(&backup)?;
                if !yes && !confirm(&format!("Delete {}?", record.file_name()))? {
                    println!("Aborted.");
                    return Ok(());
                }
                let deleted = app.delete_backup(&record.path)?;
                println!("Deleted {}", deleted.path.display());
            }
            BackupsCommand::Clear { yes } => {
                let app = runtime.app();
                let count = app.list_backups()?.len();
                if count == 0 {
                    println!("No backups.");
                    return Ok(());
                }
                if !yes && !confirm(&format!("Delete all {count} backups?"))? {
                    println!("Aborted.");
                    return Ok(());
                }
                app.clear_backups()?;
                println!("Removed {count} backups.");
            }
        },

        Command::Status {
            platform,
            appimage,
            json,
        } => {
            let profile = runtime.inspect_profile(platform, appimage.as_deref())?;
            let status: EnvironmentStatus = runtime.app().status(&profile);
            if json {
                println!("{}", serde_json::to_string_pretty(&output::JsonStatus::from(&status))?);
            } else {
                output::print_status(&status);
            }
        }

        Command::Ids { json } => {
            let set = runtime.app().preview_identifiers();
            if json {
                let body: serde_json::Map<String, serde_json::Value> = set
                    .entries()
                    .iter()
                    .map(|(k, v)| (k.to_string(), serde_json::Value::from(*v)))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                for (key, value) in set.entries() {
                    println!("{key:<24} {value}");
                }
            }
        }

        Command::Info => {
            let dirs = runtime.dirs();
            println!("Platform:       {}", Platform::detect());
            println!("Product root:   {}", dirs.root().display());
            println!("Backups:        {}", dirs.backups().display());
            println!("Logs:           {}", dirs.logs().display());
            println!("Temp:           {}", dirs.temp().display());
            println!(
                "Config:         {}{}",
                runtime.config_path().display(),
                if runtime.config_exists() { "" } else { " (not created)" }
            );
            if cfg!(windows) {
                println!("Administrator:  {}", if is_elevated() { "yes" } else { "no" });
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Show => {
                println!("{}", serde_json::to_string_pretty(&output::JsonConfig::from(runtime.config()))?);
            }
            ConfigCommand::Init { force } => {
                if runtime.config_exists() && !force {
                    bail!(
                        "{} already exists (use --force to overwrite)",
                        runtime.config_path().display()
                    );
                }
                runtime.save_config(&ToolConfig::default())?;
                println!("Wrote {}", runtime.config_path().display());
            }
        },
    }
    Ok(())
}

/// リセットを実行して結果を書き出す。
/// `--json` のとき `out` には JSON 文書だけを書き、状態行は `diag` へ回す。
fn reset_and_report(
    runtime: &CliRuntime,
    profile: &PlatformProfile,
    options: &ResetOptions,
    json: bool,
    out: &mut dyn Write,
    diag: &mut dyn Write,
) -> Result<()> {
    let app = runtime.app();
    let result = {
        let status_out: &mut dyn Write = if json { &mut *diag } else { &mut *out };
        let sink = ConsoleStatusSink::new(status_out);
        app.reset(profile, options, &sink)
    };

    if json {
        let body = match &result {
            Ok(report) => output::json_report(report),
            Err(failure) => output::json_failure_report(failure),
        };
        writeln!(out, "{}", serde_json::to_string_pretty(&body)?)?;
    } else {
        let report = match &result {
            Ok(report) => report,
            Err(failure) => &failure.report,
        };
        output::write_reset_report(out, report)?;
    }
    out.flush()?;
    result.map(drop).map_err(Into::into)
}

/// 確認プロンプトは stdout の出力を汚さないよう stderr に出す
fn confirm(question: &str) -> Result<bool> {
    eprint!("{question} [y/N] ");
    io::stderr().flush()?;
    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .context("read confirmation")?;
    Ok(matches!(
        input.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use crp_composition::domain::model::ResetFailure;
    use crp_composition::ProductDirs;
    use std::fs;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn timeout_requires_wait() {
        assert!(Cli::try_parse_from(["crp-cli", "reset", "--timeout", "5"]).is_err());
        let cli = Cli::try_parse_from(["crp-cli", "reset", "--wait", "--timeout", "5", "-y"]).unwrap();
        match cli.command {
            Command::Reset { wait, timeout, yes, .. } => {
                assert!(wait);
                assert_eq!(timeout, Some(5));
                assert!(yes);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn platform_aliases_are_accepted() {
        let cli = Cli::try_parse_from(["crp-cli", "status", "--platform", "darwin"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Status { platform: Some(Platform::MacOs), .. }
        ));
        assert!(Cli::try_parse_from(["crp-cli", "status", "--platform", "beos"]).is_err());
    }

    #[test]
    fn json_reset_writes_only_the_document_to_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let runtime =
            CliRuntime::with_dirs(ProductDirs::new(dir.path().join("CursorResetPlus"))).unwrap();
        let store = dir.path().join("storage.json");
        fs::write(&store, "{}").unwrap();
        let profile = PlatformProfile::new(Platform::Linux, store.clone(), Vec::new());
        let options = runtime.reset_options(false, None, CancellationToken::new());

        let (mut out, mut diag) = (Vec::new(), Vec::new());
        reset_and_report(&runtime, &profile, &options, true, &mut out, &mut diag).unwrap();
        let body: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(body["complete"], true);
        assert!(body.get("error").is_none());
        assert!(String::from_utf8(diag).unwrap().contains("==> [1/3]"));

        // 失敗時も stdout は JSON として読める
        fs::remove_file(&store).unwrap();
        let (mut out, mut diag) = (Vec::new(), Vec::new());
        let err = reset_and_report(&runtime, &profile, &options, true, &mut out, &mut diag)
            .unwrap_err();
        assert!(err.downcast_ref::<ResetFailure>().is_some());
        let body: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(body["complete"], false);
        assert!(body["failed_stage"].is_string());
        assert!(body["error"].as_str().unwrap().contains("storage.json"));
        assert!(String::from_utf8(diag).unwrap().contains("[x]"));
    }

    #[test]
    fn text_reset_keeps_status_and_report_together() {
        let dir = tempfile::tempdir().unwrap();
        let runtime =
            CliRuntime::with_dirs(ProductDirs::new(dir.path().join("CursorResetPlus"))).unwrap();
        let store = dir.path().join("storage.json");
        fs::write(&store, "{}").unwrap();
        let profile = PlatformProfile::new(Platform::Linux, store, Vec::new());
        let options = runtime.reset_options(false, None, CancellationToken::new());

        let (mut out, mut diag) = (Vec::new(), Vec::new());
        reset_and_report(&runtime, &profile, &options, false, &mut out, &mut diag).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("==> [1/3]"));
        assert!(text.contains("Stages:"));
        assert!(diag.is_empty());
    }
}
