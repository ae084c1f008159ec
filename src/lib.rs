pub mod analyzers;
pub mod cache;
pub mod dimensions;
pub mod filter;
pub mod loader;
pub mod model;
pub mod output;
pub mod session;
