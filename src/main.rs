use anyhow::Result;
use par_mux::app::App;
use par_mux::cli;
use std::sync::Arc;
use tokio::runtime::Runtime;

fn main() -> Result<()> {
    // Process CLI arguments first; subcommands exit here
    let runtime_options = match cli::process_cli() {
        cli::CliResult::Exit(code) => {
            if code == 0 {
                return Ok(());
            }
            // No app state exists yet, so no destructors are skipped.
            std::process::exit(code);
        }
        cli::CliResult::Continue(options) => options,
    };

    // Tokio runtime for the bridge sockets
    let runtime = Arc::new(Runtime::new()?);

    let result = App::new(Arc::clone(&runtime), runtime_options).and_then(|app| {
        log::info!("Starting par-mux {}", par_mux::VERSION);
        app.run()
    });

    // Drop the runtime explicitly so Tokio can shut down its worker threads
    // before main returns, without blocking forever on a hung socket task.
    log::info!("Event loop exited, shutting down runtime");
    if let Some(rt) = Arc::try_unwrap(runtime).ok() {
        rt.shutdown_timeout(std::time::Duration::from_secs(2));
    }

    if let Err(ref e) = result {
        eprintln!("par-mux: error: {e:#}");
    }
    result
}
