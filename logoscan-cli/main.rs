use std::error::Error;
use std::process::ExitCode;

use clap::Parser;
use logoscan_cli::cli::{CliArgs, Command};
use logoscan_cli::{MatchReport, PipelineResult, match_images, run_pipeline, upscale};
use logoscan_core::init_thread_pool;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse();
    match execute(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            let mut source = err.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn execute(args: &CliArgs) -> PipelineResult<()> {
    let cfg = args.effective_config()?;

    if let Err(err) = init_thread_pool(cfg.detector.n_threads) {
        log::warn!("thread pool already initialized: {err}");
    }

    match &args.command {
        Command::Upscale { source, .. } => {
            match upscale(source, cfg.upscale.scale_percent, cfg.upscale.output.as_deref())? {
                Some(path) => println!("Upscaled image saved to: {}", path.display()),
                None => println!("Upscaled image not saved. Pass --output to save it."),
            }
        }
        Command::Match { logo, screenshot, .. } => {
            print_report(&match_images(logo, screenshot, &cfg)?, args.json);
        }
        Command::Run { logo, screenshot, .. } => {
            print_report(&run_pipeline(logo, screenshot, &cfg)?, args.json);
        }
    }
    Ok(())
}

fn print_report(report: &MatchReport, json: bool) {
    if json {
        match serde_json::to_string_pretty(report) {
            Ok(text) => println!("{text}"),
            Err(err) => log::error!("cannot serialize report: {err}"),
        }
    } else {
        println!("{report}");
    }
}
