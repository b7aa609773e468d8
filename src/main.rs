use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use textedit::{error, logging, App, EditorConfig};

/// 分割ペインとタブを備えたプレーンテキストエディタ
#[derive(Parser, Debug)]
#[command(name = "textedit", author, version, about, long_about = None)]
struct Args {
    /// 設定ファイル（JSON）のパス
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// ログ出力先のパス
    #[arg(long = "log-file", value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// 起動時に開くファイルまたはディレクトリ
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    error::setup_panic_handler();

    let mut config = EditorConfig::load(args.config.as_deref())
        .context("failed to load configuration")?;
    if let Some(path) = args.log_file {
        config.log_file = Some(path);
    }

    if let (Some(path), Some(level)) = (config.resolve_log_path(), config.log_filter()) {
        if let Err(err) = logging::init(path.clone(), level) {
            eprintln!("warning: logging disabled ({}): {}", path.display(), err);
        }
    }
    log::info!("textedit {} starting", env!("CARGO_PKG_VERSION"));

    let mut app = App::new(config);
    app.open_paths(&args.files);
    app.run().context("terminal session failed")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn args_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_options_and_files() {
        let args = Args::try_parse_from([
            "textedit",
            "--config",
            "cfg.json",
            "--log-file",
            "out.log",
            "a.txt",
            "notes",
        ])
        .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("cfg.json")));
        assert_eq!(args.log_file, Some(PathBuf::from("out.log")));
        assert_eq!(args.files, vec![PathBuf::from("a.txt"), PathBuf::from("notes")]);
    }

    #[test]
    fn rejects_unknown_option() {
        assert!(Args::try_parse_from(["textedit", "--bogus"]).is_err());
    }
}
