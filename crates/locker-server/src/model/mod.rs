pub mod app_state;
pub mod command;
pub mod config;
pub mod constants;
pub mod response;

pub use app_state::AppState;
pub use command::{CommandConfig, CommandForm, CommandKind, Rejection};
pub use config::{Cli, Configuration, StoreMode};
pub use response::{CommandResponse, ResponseType};
