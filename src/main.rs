use argh::FromArgs;
use console_menu::config::DEFAULT_VARIABLES_FILE;
use console_menu::{MenuSession, SessionConfig, default_menu};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Interactive terminal menu runner.
#[derive(FromArgs)]
struct Args {
    /// JSON menu definition; the built-in demo menu is used when omitted
    #[argh(option)]
    menu: Option<PathBuf>,

    /// file holding recently used variable values
    #[argh(option, default = "PathBuf::from(DEFAULT_VARIABLES_FILE)")]
    config: PathBuf,

    /// path of a .env file to seed variable values from (repeatable)
    #[argh(option)]
    load: Vec<PathBuf>,

    /// add a variable with an initial value, as NAME=VALUE (repeatable)
    #[argh(option, from_str_fn(parse_assignment))]
    add: Vec<(String, String)>,

    /// do not show menu validation warnings
    #[argh(switch)]
    no_warnings: bool,

    /// skip structural menu validation
    #[argh(switch)]
    no_validate: bool,
}

fn parse_assignment(value: &str) -> Result<(String, String), String> {
    match value.split_once('=') {
        Some((name, val)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), val.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{value}'")),
    }
}

fn config_from(args: Args) -> SessionConfig {
    let config = match args.menu {
        Some(path) => SessionConfig::from_file(path),
        None => SessionConfig::inline(default_menu()),
    };
    let mut config = config
        .with_variables_file(args.config)
        .with_validation(!args.no_validate)
        .with_warnings(!args.no_warnings);
    for path in args.load {
        config = config.with_env_file(path);
    }
    for (name, value) in args.add {
        config = config.with_variable(name, vec![value]);
    }
    config
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args: Args = argh::from_env();
    let result = MenuSession::new(config_from(args)).and_then(|mut session| session.run());
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
