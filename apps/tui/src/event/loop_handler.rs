use color_eyre::eyre::eyre;
use color_eyre::Result;
use crossterm::event::{self, Event, KeyEventKind};
use std::time::Duration;

use crate::app::{handle_input, App};
use crate::event::export::{ExportEvent, ExportMachine, ExportState};
use crate::loader::LoadedDataset;
use crate::terminal::Tui;
use crate::ui;

/// Event poll timeout (ms); also paces the loading throbber
const EVENT_POLL_TIMEOUT: u64 = 50;

/// Run the main application event loop
pub async fn run(terminal: &mut Tui, app: &mut App) -> Result<()> {
    let mut export_machine = ExportMachine::new();

    loop {
        app.update();
        poll_loader(app).await;

        terminal
            .draw(|f| ui::ui(app, f))
            .map_err(|e| eyre!("Terminal draw error: {e}"))?;

        if matches!(
            event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT)),
            Ok(true)
        ) {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    handle_input(app, key.code).await;
                    if !app.running {
                        break;
                    }
                }
                Ok(Event::Resize(_, _)) => {
                    if let Err(e) = terminal.draw(|f| ui::ui(app, f)) {
                        tracing::debug!(error = %e, "redraw after resize failed");
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "failed to read terminal event"),
            }
        }

        if app.export_requested && export_machine.state() == ExportState::Idle {
            run_export(&mut export_machine, app).await;
            if let Err(e) = terminal.draw(|f| ui::ui(app, f)) {
                tracing::debug!(error = %e, "redraw after export failed");
            }
        }
    }

    Ok(())
}

/// Hands the dataset to the app once the loader task has finished
async fn poll_loader(app: &mut App) {
    if !app
        .pending_load
        .as_ref()
        .is_some_and(tokio::task::JoinHandle::is_finished)
    {
        return;
    }
    let Some(handle) = app.pending_load.take() else {
        return;
    };

    let loaded = handle.await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "dataset loader task failed");
        LoadedDataset {
            error: Some(format!("loader task failed: {e}")),
            ..LoadedDataset::default()
        }
    });
    app.finish_loading(loaded).await;
}

async fn run_export(machine: &mut ExportMachine, app: &mut App) {
    if let Err(e) = machine.process_event(&ExportEvent::Start, app) {
        tracing::warn!(error = %e, "export not started");
        app.export_requested = false;
        return;
    }

    let outcome = match app.export_workbook().await {
        Ok(path) => ExportEvent::Written(path),
        Err(e) => ExportEvent::Failed(e.to_string()),
    };
    if let Err(e) = machine.process_event(&outcome, app) {
        tracing::warn!(error = %e, "export state out of sync");
    }
    if let Err(e) = machine.process_event(&ExportEvent::Reset, app) {
        tracing::warn!(error = %e, "export state out of sync");
    }
}
