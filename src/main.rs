mod config;
mod domain;
mod infrastructure;
mod presentation;
mod usecase;

use std::{net::SocketAddr, path::Path};

use axum::{Router, routing::get};
use clap::{Parser, Subcommand};
use sea_orm::{ConnectOptions, Database};
use tokio::net::TcpListener;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    config::Settings,
    domain::services::media_store::MediaStore,
    infrastructure::{
        http_image_uploader::HttpImageUploader,
        local_media_store::LocalMediaStore,
        registration_repository::{SqlRegistrationRepository, create_schema},
    },
    presentation::{
        handlers::upload_handler::{UploadSettings, create_upload_router},
        terminal::{TerminalConsole, run_registration_prompt},
    },
    usecase::registration_form::RegistrationForm,
};

#[derive(Parser)]
#[command(name = "registration-form")]
#[command(about = "Registration form with photo upload gateway")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the image upload gateway and serve stored images
    Serve,

    /// Fill in registrations interactively
    Register,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // logs go to stderr so they do not mix with the prompts
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "registration_form=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    match cli.command {
        Commands::Serve => serve(&settings).await?,
        Commands::Register => register(&settings).await?,
    }

    Ok(())
}

fn build_gateway_app<S: MediaStore + Send + Sync + 'static>(
    store: S,
    upload_settings: UploadSettings,
    media_root: &Path,
) -> Router {
    Router::new()
        .route("/", get(|| async { "Registration upload gateway" }))
        .nest("/api", create_upload_router(store, upload_settings))
        .nest_service("/media", ServeDir::new(media_root))
        .layer(TraceLayer::new_for_http())
}

async fn serve(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let store = LocalMediaStore::new(
        settings.media_root.clone(),
        settings.public_url_base.clone(),
    );
    let app = build_gateway_app(
        store,
        UploadSettings {
            folder: settings.upload_folder.clone(),
            max_bytes: settings.max_image_bytes,
        },
        &settings.media_root,
    );

    let addr: SocketAddr = format!("{}:{}", settings.server_host, settings.server_port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!("upload gateway listening on http://{}", addr);
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

async fn register(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let mut opt = ConnectOptions::new(settings.database_url()?);
    opt.max_connections(10)
        .min_connections(1)
        .sqlx_logging(true);

    let db = Database::connect(opt).await?;
    create_schema(&db).await?;

    let console = TerminalConsole::stdin();
    let form = RegistrationForm::new(
        SqlRegistrationRepository::new(db),
        HttpImageUploader::new(settings.upload_endpoint.clone()),
        console.clone(),
        console.clone(),
        settings.max_image_bytes,
    );

    run_registration_prompt(&form, &console).await?;
    Ok(())
}
