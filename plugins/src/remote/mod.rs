pub mod http;

pub use http::HttpRemoteProbe;
