pub mod util;

pub mod app;
pub mod functions;
pub mod keys;
pub mod request;
pub mod secrets;
pub mod simulator;
