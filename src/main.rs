//! フレームバッファビューアエントリポイント
//!
//! PPM画像をフレームバッファへ表示するメインエントリポイント

use fbview_rs::app::App;
use fbview_rs::config::{ConfigError, ViewerSettings};
use std::path::PathBuf;
use std::process;

fn main() {
    // ロガーを初期化
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    // パニックハンドラを設定（未処理のパニックをログに記録）
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("ビューアでパニックが発生しました: {:?}", panic_info);
        log::error!("ビューアでパニックが発生しました: {:?}", panic_info);
    }));

    // コマンドライン引数を解析
    let args: Vec<String> = std::env::args().collect();

    // ヘルプ表示
    if args.len() > 1 && (args[1] == "-h" || args[1] == "--help") {
        println!("フレームバッファビューア v{}", env!("CARGO_PKG_VERSION"));
        println!("使用方法: fbview [オプション]");
        println!("オプション:");
        println!("  --image=FILE   表示するPPM画像（既定: post.ppm）");
        println!("  --device=DEV   フレームバッファデバイス（既定: /dev/fb0）");
        println!("  --config=FILE  指定した設定ファイルを使用");
        println!("  --help, -h     このヘルプを表示");
        println!("  --version, -v  バージョンを表示");
        return;
    }

    // バージョン表示
    if args.len() > 1 && (args[1] == "-v" || args[1] == "--version") {
        println!("フレームバッファビューア v{}", env!("CARGO_PKG_VERSION"));
        return;
    }

    // 設定を組み立てる（設定ファイル → コマンドライン引数の順に上書き）
    let settings = match build_settings(&args[1..]) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("設定の読み込みに失敗しました: {}", e);
            log::error!("設定の読み込みに失敗しました: {}", e);
            process::exit(1);
        }
    };

    // アプリケーションを実行
    let app = App::new(settings);
    if let Err(e) = app.run() {
        eprintln!("エラー: {}", e);
        log::error!("実行中にエラーが発生しました: {}", e);
        process::exit(e.exit_code());
    }
}

/// コマンドライン引数から設定を組み立てる
fn build_settings(args: &[String]) -> Result<ViewerSettings, ConfigError> {
    // 設定ファイルを先に読み込む
    let mut settings = ViewerSettings::default();
    for arg in args {
        if let Some(path) = arg.strip_prefix("--config=") {
            let path = PathBuf::from(path);
            if path.exists() {
                settings = ViewerSettings::load(&path)?;
            } else {
                // 存在しない場合は既定値のテンプレートを書き出す
                settings.save(&path)?;
                log::info!("既定の設定ファイルを作成しました: {}", path.display());
            }
        }
    }

    // 個別オプションで上書きする
    for arg in args {
        if let Some(path) = arg.strip_prefix("--image=") {
            settings.image.path = PathBuf::from(path);
        } else if let Some(device) = arg.strip_prefix("--device=") {
            settings.display.device = PathBuf::from(device);
        } else if !arg.starts_with("--config=") {
            log::warn!("不明なオプションを無視します: {}", arg);
        }
    }

    Ok(settings)
}
