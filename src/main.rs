use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing::Instrument;

use enrollment_desk::cli::{commands, Backend, Cli};
use enrollment_desk::{
    config, create_operation_span, generate_correlation_id, init_telemetry, EnrollmentDesk,
    EnrollmentError,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err
                .downcast_ref::<EnrollmentError>()
                .map(|e| e.kind().exit_code())
                .unwrap_or(1);
            eprintln!("❌ {err:#}");
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = config()?;
    init_telemetry(&config.observability)?;

    let span = create_operation_span(cli.command.name(), &generate_correlation_id());

    tokio::runtime::Runtime::new()?.block_on(
        async move {
            let backend = Backend::open(config).await?;
            let desk = EnrollmentDesk::new(backend.stores());
            let mutates = cli.command.mutates();

            let result = commands::execute(cli.command, &desk).await;
            if result.is_ok() && mutates {
                backend.persist().await?;
            }
            backend.shutdown().await;
            result
        }
        .instrument(span),
    )
}
