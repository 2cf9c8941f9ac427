use std::error::Error;
use std::sync::Arc;

use warp::Filter;

use log::{info, initialize_logger};
use uploader::config::get_variable;
use uploader::environment::Environment;
use uploader::routes;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    #[cfg(feature = "env_logging")]
    let _guard = log::initialize_env_logger();

    let logger = Arc::new(initialize_logger());

    let port: u16 = get_variable("UPLOADER_PORT")
        .parse()
        .expect("parse UPLOADER_PORT as u16");

    info!(logger, "Starting..."; "port" => port);

    info!(logger, "Connecting to storage and database...");
    let environment = Environment::from_env(logger.clone()).await?;

    let logger2 = logger.clone();
    let routes = routes::make_upload_route(environment)
        .or(routes::admin::make_healthz_route())
        .recover(move |r| routes::format_rejection(logger2.clone(), r));

    let (_, server) =
        warp::serve(routes).bind_with_graceful_shutdown(([0, 0, 0, 0], port), async {
            tokio::signal::ctrl_c().await.ok();
        });

    server.await;

    info!(logger, "Exiting gracefully...");

    Ok(())
}
