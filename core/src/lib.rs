pub mod api;
pub mod audit;
pub mod config;
pub mod context;
pub mod decision;
pub mod engine;
pub mod error;
pub mod hook;
pub mod remote;
pub mod repo;
pub mod session;
pub mod sync;
pub mod validate;
pub mod yaml;
