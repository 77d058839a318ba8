use std::process::ExitCode;

use fare_watch::utils::startup_utils;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let config = startup_utils::get_app_config();
    startup_utils::init_logging();

    let controller = match config.and_then(startup_utils::get_price_watch_controller) {
        Ok(controller) => controller,
        Err(e) => {
            tracing::error!("Startup failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match controller.run().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Price watch aborted: {}", e);
            ExitCode::FAILURE
        }
    }
}
