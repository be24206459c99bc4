use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    cardiorisk_lib::init_tracing();

    match cardiorisk_lib::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
