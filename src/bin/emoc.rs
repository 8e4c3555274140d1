use std::{
    error::Error,
    io::{self, Read},
    process::ExitCode,
};

use emotion_ensemble::{
    EmotionPredictor, EnsembleConfig, EnsembleService,
    cli::{EmocArgs, render_load_report, render_ranked},
};
use ortho_config::OrthoConfig;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode, Box<dyn Error>> {
    let args = EmocArgs::load()?;
    init_logging(args.verbose);

    let config_path = args
        .config_path
        .as_deref()
        .ok_or("no configuration file given; pass --config-path or set EMOC_CONFIG_PATH")?;
    let config = EnsembleConfig::load_from_file(config_path)?;
    let service = EnsembleService::load(&config)?;

    if args.dry_run {
        print!("{}", render_load_report(&service));
        return Ok(if service.active_model_count() == 0 {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        });
    }

    let text = match args.text {
        Some(text) => text,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer.trim_end_matches(['\r', '\n']).to_owned()
        }
    };

    let prediction = service.trace(&text)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&prediction)?);
    } else {
        print!("{}", render_ranked(&prediction.scores));
    }
    Ok(ExitCode::SUCCESS)
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
