pub mod cliopt;
pub mod error;
pub mod input;
pub mod logging;
pub mod model;
pub mod output;
pub mod parse;
pub mod runner;
pub mod timeline;
pub mod utils;
