mod cli;
mod compressor;
mod config;
mod engine;
mod error;
mod lifecycle;
mod opener;
mod preset;
mod runner;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
use compressor::Compressor;
use config::Config;
use engine::ghostscript::Ghostscript;
use error::ShrinkError;
use lifecycle::CompressionRequest;
use opener::SystemOpener;
use preset::QualityPreset;

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .init();

    let cfg = Config::load();

    let outcome = match cli.command {
        Some(Commands::Info) => {
            print_info(&cfg);
            Ok(())
        }
        Some(Commands::Init { global }) => create_config(global),
        None => run(&cli, &cfg),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", diagnostic(&e));
            ExitCode::from(exit_code(&e))
        }
    }
}

/// One-line message for stderr, including the cause chain.
fn diagnostic(err: &anyhow::Error) -> String {
    format!("[pdfshrink] error: {err:#}")
}

/// Typed failures carry their own code; anything else is 1.
fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<ShrinkError>()
        .map(ShrinkError::exit_code)
        .unwrap_or(1)
}

fn run(cli: &Cli, cfg: &Config) -> anyhow::Result<()> {
    let input = cli.input.clone().context("no input file given")?;
    let preset = QualityPreset::from_level(cli.compression.unwrap_or(cfg.compression))?;
    let timeout = match cli.timeout {
        Some(secs) => config::timeout_from_secs(secs),
        None => cfg.timeout(),
    };

    let request = CompressionRequest {
        input,
        output: cli.out.clone(),
        preset,
        backup: cli.backup || cfg.backup,
        open: cli.open || cfg.open,
        backup_suffix: cfg.backup_suffix.clone(),
    };

    let compressor = Compressor::new(Ghostscript::new(cfg.engines.clone()), timeout);
    let outcome = lifecycle::process(&compressor, &request, &SystemOpener)?;

    println!("{}", outcome.result.report());
    log::info!("compressed file at {}", outcome.final_path.display());
    if let Some(backup) = &outcome.backup_path {
        println!("Backup saved to {}", backup.display());
    }
    if cfg.show_footer {
        println!("{}", outcome.result.footer());
    }
    Ok(())
}

fn print_info(cfg: &Config) {
    let compressor = Compressor::new(Ghostscript::new(cfg.engines.clone()), cfg.timeout());
    println!("[pdfshrink info]");
    println!("  version: {}", env!("CARGO_PKG_VERSION"));
    match compressor.resolve() {
        Ok(path) => println!("  engine: {}", path.display()),
        Err(e) => println!("  engine: ({e})"),
    }
    match QualityPreset::from_level(cfg.compression) {
        Ok(preset) => println!("  compression: {preset}"),
        Err(e) => println!("  compression: ({e})"),
    }
    println!("  backup: {}", cfg.backup);
    println!("  open: {}", cfg.open);
    println!("  timeout_secs: {}", cfg.timeout_secs);
    println!("  engines: {:?}", cfg.engines);
    println!("  backup_suffix: {}", cfg.backup_suffix);
    println!("  show_footer: {}", cfg.show_footer);
}

fn create_config(global: bool) -> anyhow::Result<()> {
    let path = if global {
        let file = config::global_config_path().context("could not determine config directory")?;
        if let Some(dir) = file.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("could not create {}", dir.display()))?;
        }
        file
    } else {
        PathBuf::from(config::PROJECT_FILE)
    };

    if path.exists() {
        println!("[pdfshrink] config already exists: {}", path.display());
        return Ok(());
    }

    std::fs::write(&path, Config::default_toml())
        .with_context(|| format!("could not write {}", path.display()))?;
    println!("[pdfshrink] created {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_exit_code_input_errors() {
        let err = anyhow::Error::from(ShrinkError::InputNotFound("/no/such.pdf".into()));
        assert_eq!(exit_code(&err), 2);
        let err = anyhow::Error::from(ShrinkError::ZeroByteInput("empty.pdf".into()));
        assert_eq!(exit_code(&err), 2);
    }

    #[test]
    fn test_exit_code_engine_missing() {
        let err = anyhow::Error::from(ShrinkError::ExecutableNotFound {
            tried: vec!["gs".into()],
        });
        assert_eq!(exit_code(&err), 3);
    }

    #[test]
    fn test_exit_code_engine_failures() {
        let failed = anyhow::Error::from(ShrinkError::EngineInvocation {
            status: "exit 1".into(),
            stderr: String::new(),
        });
        let timed_out = anyhow::Error::from(ShrinkError::EngineTimeout {
            limit: Duration::from_secs(1),
        });
        assert_eq!(exit_code(&failed), 4);
        assert_eq!(exit_code(&timed_out), 4);
    }

    #[test]
    fn test_exit_code_survives_context() {
        let err = anyhow::Error::from(ShrinkError::ZeroByteInput("empty.pdf".into()))
            .context("while shrinking");
        assert_eq!(exit_code(&err), 2);
    }

    #[test]
    fn test_exit_code_fallback() {
        assert_eq!(exit_code(&anyhow::anyhow!("could not write .pdfshrink.toml")), 1);
        let io = ShrinkError::io("failed to replace in.pdf", std::io::Error::other("disk full"));
        assert_eq!(exit_code(&anyhow::Error::from(io)), 1);
    }

    #[test]
    fn test_diagnostic_format() {
        let err = anyhow::Error::from(ShrinkError::InputNotFound("/no/such.pdf".into()));
        assert_eq!(diagnostic(&err), "[pdfshrink] error: input file not found: /no/such.pdf");

        let io = ShrinkError::io("failed to replace in.pdf", std::io::Error::other("disk full"));
        assert_eq!(
            diagnostic(&anyhow::Error::from(io)),
            "[pdfshrink] error: failed to replace in.pdf: disk full"
        );
    }
}
