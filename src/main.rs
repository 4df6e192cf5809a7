use std::sync::Arc;

use clap::Parser;

use mission::config::CliArgs;
use mission::database as db;
use mission::judge::create_evaluator;
use mission::web_server::build_server;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let db_path = db::get_db_path();
    let cli = CliArgs::parse();

    let config = cli.to_config().expect("Failed to load configuration");

    if cli.flush_data {
        db::remove_db(&db_path);
    }

    let db_pool = db::init_db(&db_path)
        .await
        .expect("Failed to initialize database");

    let evaluator = create_evaluator(&config.judge).expect("Failed to create evaluator");
    let challenges = Arc::new(config.challenges);
    log::info!("Loaded {} challenges from configuration", challenges.len());

    // ======= PREPARATION END, EXECUTION START =======

    let server = build_server(config.server, challenges, Arc::new(db_pool), evaluator)
        .expect("Failed to build server");

    let server_handle = server.handle();
    let server_task = actix_web::rt::spawn(server);

    // ===== EXECUTION END, WAITING FOR SHUTDOWN ======

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            log::info!("Ctrl-c received, shutting down...");
        }
        res_server = server_task => {
            log::error!("Server terminated unexpectedly: {:?}", res_server);
        }
    }

    server_handle.stop(true).await;

    log::info!("Shutdown complete");
    Ok(())
}
