use std::io::{self, IsTerminal};
use std::process::ExitCode;

use miette::{Context, IntoDiagnostic, Result};
use semaphore_config::{
    cli::{CLIArgs, StartupMode},
    configuration::{ConfigDocument, ConfigResolver},
    logging::{console_output_level_filter, initialize_tracing},
    password::hash_password,
    setup::{run_interactive_setup, SetupWizard},
};
use tracing::{info, warn};


fn main() -> ExitCode {
    let cli_args = CLIArgs::parse_with_legacy_flags();

    match run(cli_args) {
        Ok(exit_code) => exit_code,
        Err(report) => {
            eprintln!("{report:?}");
            ExitCode::FAILURE
        }
    }
}


fn run(cli_args: CLIArgs) -> Result<ExitCode> {
    let startup_mode = cli_args.startup_mode();

    // Utility modes: print and exit, never loading a configuration.
    match &startup_mode {
        StartupMode::PrintConfig => {
            let example = ConfigDocument::example()
                .to_pretty_json()
                .into_diagnostic()
                .wrap_err("Failed to render example configuration.")?;
            println!("{example}");

            return Ok(ExitCode::SUCCESS);
        }
        StartupMode::HashPassword(password) => {
            let hash = hash_password(password)
                .into_diagnostic()
                .wrap_err("Failed to hash password.")?;
            println!("Generated password: {hash}");

            return Ok(ExitCode::SUCCESS);
        }
        _ => {}
    }


    initialize_tracing(console_output_level_filter()).wrap_err("Failed to initialize tracing.")?;

    if startup_mode == StartupMode::Setup {
        let current_directory = std::env::current_dir()
            .into_diagnostic()
            .wrap_err("Could not get the current directory.")?;

        let stdin = io::stdin();
        let configuration_file_path = if stdin.is_terminal() {
            run_interactive_setup(&mut SetupWizard::on_terminal(), &current_directory)
        } else {
            run_interactive_setup(
                &mut SetupWizard::new(stdin.lock(), io::stdout()),
                &current_directory,
            )
        }
        .wrap_err("Interactive setup failed.")?;

        info!(path = %configuration_file_path.display(), "Setup finished.");
        return Ok(ExitCode::SUCCESS);
    }


    let resolver = ConfigResolver::from_process();
    let configuration = match resolver.resolve(cli_args.configuration_file_path.as_deref()) {
        Ok(configuration) => configuration,
        Err(error) => {
            let exit_code = error.exit_code();
            eprintln!("{:?}", miette::Report::new(error));

            return Ok(ExitCode::from(exit_code));
        }
    };

    info!(
        source = %configuration.source,
        port = configuration.port(),
        tmp_path = %configuration.tmp_path().display(),
        max_parallel_tasks = configuration.max_parallel_tasks(),
        web_host = ?configuration.web_host_url.as_ref().map(|url| url.as_str()),
        "Configuration resolved."
    );

    if configuration.cookie.has_empty_hash_key() {
        warn!("cookie_hash is empty; regenerate it with -printConfig before exposing the server.");
    }

    let startup_flags = cli_args.startup_flags();
    info!(
        migration = startup_flags.migration,
        upgrade = startup_flags.upgrade,
        "Handing configuration to the startup sequencer."
    );

    Ok(ExitCode::SUCCESS)
}
