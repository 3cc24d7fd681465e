pub mod cli;
pub mod poller;
pub mod settings;
