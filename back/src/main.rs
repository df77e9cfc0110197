use std::sync::Arc;

use axum_server::{tls_rustls::RustlsConfig, Handle};
use clap::Parser;
use todos_back::{
    app,
    config::Config,
    store::FileStore,
    users::{UserDirectory, UserFile},
    AppState,
};
use tokio::{signal, time};
use tracing::{error, info};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt::init();

    let config = Config::parse();

    let store = Arc::new(FileStore::open(&config.data_file)?);
    let users = UserFile::load(&config.users_file)?;
    info!(
        data_file = %config.data_file.display(),
        users = users.len(),
        "loaded data"
    );

    let users: Arc<dyn UserDirectory> = Arc::new(users);
    let state = Arc::new(AppState::new(store.clone(), users));

    tokio::spawn({
        let store = store.clone();
        let interval = config.flush_interval();
        async move {
            loop {
                time::sleep(interval).await;
                if let Err(err) = store.flush().await {
                    error!("Failed to store data: {:?}", err);
                }
            }
        }
    });

    let handle = Handle::new();
    tokio::spawn({
        let handle = handle.clone();
        async move {
            if signal::ctrl_c().await.is_ok() {
                info!("shutting down");
                handle.graceful_shutdown(Some(time::Duration::from_secs(10)));
            }
        }
    });

    let app = app(state, &config.assets_dir);
    let addr = config.addr();
    info!(%addr, "listening");

    match config.tls() {
        Some((cert, key)) => {
            let tls = RustlsConfig::from_pem_file(cert, key).await?;
            axum_server::bind_rustls(addr, tls)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
    }

    store.store().await?;
    info!("stored data");

    Ok(())
}
