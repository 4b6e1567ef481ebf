mod config;
mod controllers;
mod models;
mod service;
mod utils;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use color_eyre::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::config::Config;
use crate::config::crypto::CryptoService;
use crate::config::routes::routes;
use crate::service::account_service::AccountService;
use crate::service::email_service::EmailService;
use crate::service::store::PgAccountStore;
use crate::service::token_service::TokenService;

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let pool = config.db_pool().await?;
    sqlx::migrate!().run(&pool).await?;

    let tokens = TokenService::new(&config.jwt_secret);
    let email_service = EmailService::new(
        &config.smtp_host,
        &config.smtp_user,
        &config.smtp_pass,
        &config.platform_name,
    )?;
    let account_service = AccountService::new(
        Arc::new(PgAccountStore::new(pool.clone())),
        Arc::new(email_service),
        CryptoService,
        tokens.clone(),
    );

    let account_service = web::Data::new(account_service);
    let tokens = web::Data::new(tokens);

    let bind_addr = format!("{}:{}", config.host, config.port);
    info!(%bind_addr, "starting auth server");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(account_service.clone())
            .app_data(tokens.clone())
            .configure(routes)
    })
    .bind(bind_addr)?
    .run()
    .await?;

    Ok(())
}
