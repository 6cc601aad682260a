use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::sync::Arc;

use taskmanager::auth::{CredentialService, TokenService};
use taskmanager::config::Config;
use taskmanager::routes;
use taskmanager::store::{
    self, MemoryTaskStore, MemoryUserStore, PgTaskStore, PgUserStore, TaskStore, UserStore,
};
use taskmanager::usecase::{AuthUsecase, TaskUsecase};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("invalid configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e));
        }
    };
    log::debug!("{:?}", config);

    let (users, tasks): (Arc<dyn UserStore>, Arc<dyn TaskStore>) = match &config.database_url {
        Some(url) => {
            let pool = store::postgres::connect(url, config.db_max_connections)
                .await
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            log::info!("using postgres stores");
            let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool.clone()));
            let tasks: Arc<dyn TaskStore> = Arc::new(PgTaskStore::new(pool));
            (users, tasks)
        }
        None => {
            log::warn!("DATABASE_URL not set, data is kept in memory only");
            let users: Arc<dyn UserStore> = Arc::new(MemoryUserStore::new());
            let tasks: Arc<dyn TaskStore> = Arc::new(MemoryTaskStore::new());
            (users, tasks)
        }
    };

    let tokens = TokenService::new(&config.jwt_secret);
    let auth_usecase = web::Data::new(AuthUsecase::new(
        users,
        CredentialService::new(config.bcrypt_cost),
        tokens.clone(),
        config.request_timeout,
    ));
    let task_usecase = web::Data::new(TaskUsecase::new(tasks, config.request_timeout));
    let tokens = web::Data::new(tokens);

    log::info!("Starting server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(auth_usecase.clone())
            .app_data(task_usecase.clone())
            .app_data(tokens.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
