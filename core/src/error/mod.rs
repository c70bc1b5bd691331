mod cli_error;
mod config_error;
mod remote_error;
mod session_error;
mod tool_error;

pub use cli_error::CliError;
pub use config_error::ConfigError;
pub use remote_error::RemoteError;
pub use session_error::SessionError;
pub use tool_error::ToolError;
