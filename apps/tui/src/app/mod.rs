// Application state, the views registered on the selection store and the
// key handling that drives them

pub mod actions;
pub mod filters;
pub mod input;
pub mod panels;
pub mod state;
pub mod views;

pub use input::handle_input;
pub use state::{App, AppScreen, TableInput};
pub use views::Views;
