use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing::{debug, warn};

use beeper_core::config::ServiceConfig;

mod install;
mod logging;

const USAGE: &str = "USAGE: <command> [INSTALL|UNINSTALL]";

#[derive(Parser, Debug)]
#[command(name = "beeper")]
#[command(about = "Windows service that beeps every few seconds while running")]
#[command(version)]
struct Cli {
    /// Register or remove the service; without it the process runs as the service
    #[arg(value_enum, ignore_case = true)]
    command: Option<Command>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    /// Register this executable as an auto-start service
    Install,
    /// Remove the registration if the service is stopped
    Uninstall,
}

// Exit code is 0 on every path; failures are only logged.
fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(_) => {
            println!("\n{}", USAGE);
            return;
        }
    };

    let config_path = ServiceConfig::resolve_path();
    let loaded = ServiceConfig::load_if_present(&config_path);
    let config = match &loaded {
        Ok(Some(config)) => config.clone(),
        _ => ServiceConfig::default(),
    };

    let _guard = logging::init(&config);

    debug!(
        "beeper v{} starting (os={}, arch={})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH,
    );
    match &loaded {
        Ok(Some(_)) => debug!("loaded config from {}", config_path.display()),
        Ok(None) => debug!("no config at {}, using defaults", config_path.display()),
        Err(e) => warn!("ignoring config at {}: {:#}", config_path.display(), e),
    }

    if let Err(e) = dispatch(cli.command, config) {
        debug!("{:#}", e);
    }
}

fn dispatch(command: Option<Command>, config: ServiceConfig) -> Result<()> {
    match command {
        Some(Command::Install) => install::run_install(&config),
        Some(Command::Uninstall) => install::run_uninstall(&config),
        None => install::run_service(config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_argument_runs_service() {
        let cli = Cli::try_parse_from(["beeper"]).unwrap();
        assert_eq!(cli.command, None);
    }

    #[test]
    fn test_commands_are_case_insensitive() {
        for (arg, expected) in [
            ("install", Command::Install),
            ("INSTALL", Command::Install),
            ("Uninstall", Command::Uninstall),
            ("uNiNsTaLl", Command::Uninstall),
        ] {
            let cli = Cli::try_parse_from(["beeper", arg]).unwrap();
            assert_eq!(cli.command, Some(expected), "{}", arg);
        }
    }

    #[test]
    fn test_unknown_or_extra_arguments_are_rejected() {
        assert!(Cli::try_parse_from(["beeper", "start"]).is_err());
        assert!(Cli::try_parse_from(["beeper", "install", "now"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
