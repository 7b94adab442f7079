use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    match booked_backend::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("booked-backend failed to start: {}", e);
            ExitCode::FAILURE
        }
    }
}
