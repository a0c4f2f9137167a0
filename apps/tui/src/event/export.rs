use std::convert::TryFrom;
use std::fmt;
use std::path::PathBuf;

use crate::app::App;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ExportState {
    Idle,
    Exporting,
    Written,
    Failed,
}

impl fmt::Display for ExportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Exporting => write!(f, "Exporting"),
            Self::Written => write!(f, "Written"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

#[derive(Clone, Debug)]
pub enum ExportEvent {
    Start,
    Written(PathBuf),
    Failed(String),
    Reset,
}

impl fmt::Display for ExportEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "Start"),
            Self::Written(path) => write!(f, "Written({})", path.display()),
            Self::Failed(msg) => write!(f, "Failed({msg})"),
            Self::Reset => write!(f, "Reset"),
        }
    }
}

#[derive(Debug)]
pub struct StateTransitionError {
    from: ExportState,
    event: ExportEvent,
}

impl fmt::Display for StateTransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid transition from {} with event {}",
            self.from, self.event
        )
    }
}

impl std::error::Error for StateTransitionError {}

/// Tracks one workbook export from request to status line
pub struct ExportMachine {
    state: ExportState,
}

impl ExportMachine {
    pub const fn new() -> Self {
        Self {
            state: ExportState::Idle,
        }
    }

    pub const fn state(&self) -> ExportState {
        self.state
    }

    pub fn process_event(
        &mut self,
        event: &ExportEvent,
        app: &mut App,
    ) -> Result<(), StateTransitionError> {
        let next_state = NextState::try_from((self.state, event, app))?;
        self.state = next_state.0;
        Ok(())
    }
}

impl Default for ExportMachine {
    fn default() -> Self {
        Self::new()
    }
}

struct NextState(ExportState);

impl TryFrom<(ExportState, &ExportEvent, &mut App)> for NextState {
    type Error = StateTransitionError;

    fn try_from(value: (ExportState, &ExportEvent, &mut App)) -> Result<Self, Self::Error> {
        let (current_state, event, app) = value;

        match (current_state, event) {
            (ExportState::Idle, ExportEvent::Start) => {
                app.status_message = "Exporting workbook...".to_string();
                Ok(Self(ExportState::Exporting))
            }
            (ExportState::Exporting, ExportEvent::Written(path)) => {
                let filename = path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .unwrap_or("unknown");
                app.status_message = format!("Workbook exported: {filename}");
                app.export_requested = false;
                Ok(Self(ExportState::Written))
            }
            (ExportState::Exporting, ExportEvent::Failed(error)) => {
                tracing::warn!(error = %error, "export failed");
                app.status_message = format!("Error: {error}");
                app.export_requested = false;
                Ok(Self(ExportState::Failed))
            }
            (ExportState::Written | ExportState::Failed, ExportEvent::Reset) => {
                Ok(Self(ExportState::Idle))
            }
            _ => Err(StateTransitionError {
                from: current_state,
                event: event.clone(),
            }),
        }
    }
}
