pub mod config;
pub mod forecast;
pub mod submit;

pub use config::{ConfigCommands, handle_config_command};
pub use forecast::{ForecastCommands, handle_forecast_command};
pub use submit::{SubmitCommands, handle_submit_command};
