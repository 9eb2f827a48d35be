use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use club_payment_engine::{DepositFlowApi, SqliteDatabase};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    gateway_routes::{GatewayWebhookRoute, VerifyPaymentRoute},
    routes::health,
    sweep_worker::start_sweep_worker,
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let _sweep = start_sweep_worker(db.clone(), config.sweep_interval_secs);
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let (host, port) = (config.host.clone(), config.port);
    let srv = HttpServer::new(move || {
        let flow_api = DepositFlowApi::new(db.clone());
        let gateway_config = config.gateway.clone();
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("cps::access_log"))
            .app_data(web::Data::new(flow_api))
            .app_data(web::Data::new(gateway_config))
            .service(health)
            .service(VerifyPaymentRoute::<SqliteDatabase>::new())
            .service(web::scope("/gateway").service(GatewayWebhookRoute::<SqliteDatabase>::new()))
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
