pub mod factory;
pub mod process;
pub mod remote;
pub mod services;
pub mod session;
pub mod sync;
