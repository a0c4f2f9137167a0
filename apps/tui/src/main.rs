use clap::Parser;
use color_eyre::Result;

use oiv_dashboard::app::App;
use oiv_dashboard::cli::CliArgs;
use oiv_dashboard::config::init_app_config;
use oiv_dashboard::db::KeyValueStore;
use oiv_dashboard::event;
use oiv_dashboard::loader::load_dataset;
use oiv_dashboard::logging::{init_tracing, LogTarget};
use oiv_dashboard::terminal;

#[tokio::main]
async fn main() -> Result<()> {
    // Setup error handling
    color_eyre::install()?;

    let args = CliArgs::parse();
    args.apply_env_overrides();
    let config = init_app_config()?;

    // Without a terminal on stdout there is nothing to draw on
    let headless = args.headless || !is_terminal();
    let log_target = if headless {
        LogTarget::Stderr
    } else {
        LogTarget::File(&config.log_file)
    };
    init_tracing(config.debug, log_target)?;
    tracing::info!(data_dir = %config.data_dir.display(), headless, "starting");

    let storage = KeyValueStore::open(&config).await;

    if headless {
        return event::run_headless(&args, &config, &storage).await;
    }

    let mut app = App::new(config, storage);
    app.initial_selection = if args.from_storage {
        app.storage.load_selection().await
    } else {
        args.selection()
    };
    let data_dir = app.config.data_dir.clone();
    app.pending_load = Some(tokio::spawn(async move { load_dataset(&data_dir).await }));

    let mut terminal = terminal::setup_terminal()?;
    let result = event::run(&mut terminal, &mut app).await;
    terminal::cleanup_terminal_state(true, true);

    if let Err(e) = &result {
        tracing::error!(error = %e, "event loop failed");
    }
    result
}

fn is_terminal() -> bool {
    atty::is(atty::Stream::Stdout)
}
