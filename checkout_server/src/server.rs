use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use checkout_engine::{CheckoutApi, CheckoutPolicy, SqliteOrderStore};
use snap_client::SnapApi;

use crate::{
    config::ServerConfig,
    errors::ServerError,
    routes::{
        health,
        CreateTransactionRoute,
        OrderAuditRoute,
        OrderByIdRoute,
        OrdersRoute,
        PaymentNotificationRoute,
        PaymentStatusRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteOrderStore::new(&config.database_url).await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let gateway = SnapApi::new(config.snap.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db, gateway)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteOrderStore,
    gateway: SnapApi,
) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let policy =
            CheckoutPolicy { status_cache: config.status_cache, verify_notifications: config.verify_notifications };
        let api = CheckoutApi::new(db.clone(), gateway.clone(), policy);
        let payments_scope = web::scope("/payments")
            .service(CreateTransactionRoute::<SqliteOrderStore, SnapApi>::new())
            .service(PaymentNotificationRoute::<SqliteOrderStore, SnapApi>::new())
            .service(PaymentStatusRoute::<SqliteOrderStore, SnapApi>::new());
        let orders_scope = web::scope("/orders")
            .service(OrderAuditRoute::<SqliteOrderStore, SnapApi>::new())
            .service(OrderByIdRoute::<SqliteOrderStore, SnapApi>::new())
            .service(OrdersRoute::<SqliteOrderStore, SnapApi>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("cps::access_log"))
            .app_data(web::Data::new(api))
            .service(health)
            .service(payments_scope)
            .service(orders_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
