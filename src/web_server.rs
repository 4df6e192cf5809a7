use std::sync::Arc;

use actix_web::{App, HttpServer, dev::Server, middleware, web};
use sqlx::sqlite::SqlitePool;

use crate::config::{ChallengeConfig, ServerConfig};
use crate::judge::Evaluator;
use crate::routes::{
    get_challenge_by_id_handler, get_challenges_handler, json_error_handler,
    mark_completed_handler, query_error_handler, submit_challenge_handler,
};

pub fn build_server(
    server_config: ServerConfig,
    challenges: Arc<Vec<ChallengeConfig>>,
    db_pool: Arc<SqlitePool>,
    evaluator: Arc<dyn Evaluator>,
) -> std::io::Result<Server> {
    let challenges = web::Data::from(challenges);
    let db_pool = web::Data::from(db_pool);
    let evaluator = web::Data::from(evaluator);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(challenges.clone())
            .app_data(db_pool.clone())
            .app_data(evaluator.clone())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .wrap(middleware::Logger::default())
            .service(get_challenges_handler)
            .service(get_challenge_by_id_handler)
            .service(submit_challenge_handler)
            .service(mark_completed_handler)
    })
    .bind((
        server_config
            .bind_address
            .unwrap_or("127.0.0.1".to_string()),
        server_config.bind_port.unwrap_or(12345),
    ))?
    .run();

    Ok(server)
}
