pub mod classifier;
pub mod config;
pub mod consts;
pub mod recommend;
pub mod server;
