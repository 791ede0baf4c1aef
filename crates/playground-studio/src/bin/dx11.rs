//! Clear-color playground: a background color edited through the debug UI.

use std::process::ExitCode;

use playground_engine::core::PlaygroundConfig;
use playground_engine::logging::{init_logging, LoggingConfig};
use playground_engine::window::Runtime;

fn main() -> ExitCode {
    init_logging(LoggingConfig::default());

    match Runtime::run(PlaygroundConfig::dx11()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
