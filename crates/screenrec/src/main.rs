use clap::CommandFactory;
use clap::Parser;
use clap_complete::generate;

use screenrec::Colors;
use screenrec::color_init;
use screenrec::commands::Cli;
use screenrec::commands::Commands;
use screenrec::handlers;
use screenrec::telemetry::init_tracing;
use screenrec_core::ConfigError;
use screenrec_session::ErrorCategory;
use screenrec_session::Recorder;
use screenrec_session::SessionError;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        if let Some(session_error) = e.downcast_ref::<SessionError>() {
            eprintln!("{} {}", Colors::error("Error:"), session_error);
            if let Some(stderr) = session_error.stderr().filter(|s| !s.trim().is_empty()) {
                eprintln!("{}", Colors::dim("Encoder output:"));
                eprint!("{}", stderr);
            }
            eprintln!(
                "{} {}",
                Colors::dim("Suggestion:"),
                session_error.suggestion()
            );
            std::process::exit(exit_code_for_session_error(session_error));
        } else if let Some(config_error) = e.downcast_ref::<ConfigError>() {
            eprintln!("{} {}", Colors::error("Error:"), config_error);
            std::process::exit(78); // EX_CONFIG
        } else {
            eprintln!("{} {}", Colors::error("Error:"), e);
            std::process::exit(1);
        }
    }
}

fn exit_code_for_session_error(error: &SessionError) -> i32 {
    match error.category() {
        ErrorCategory::Unavailable => 69, // EX_UNAVAILABLE
        ErrorCategory::Encoder => 70,     // EX_SOFTWARE
        ErrorCategory::Io => 74,          // EX_IOERR
        ErrorCategory::Internal => 70,    // EX_SOFTWARE
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    color_init(cli.no_color);
    let _telemetry = init_tracing(&cli.log_level);

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "screenrec", &mut std::io::stdout());
        }
        Commands::Args { output, capture } => {
            handlers::handle_args(&output, &capture, &mut std::io::stdout().lock())?
        }
        Commands::Record {
            output,
            duration,
            capture,
        } => {
            handlers::handle_record(
                &Recorder::default(),
                output,
                &capture,
                handlers::stop_after(duration),
            )
            .await?
        }
    }

    Ok(())
}
