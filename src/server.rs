//! MCP server initialization for stdio and SSE transports.
//!
//! Provides [`serve_stdio`] and [`serve_sse`] entry points that wire the database,
//! engine and narrator into the MCP tool handler.

use crate::tools::{DbHandles, VitalityTools};
use anyhow::Result;
use rmcp::ServiceExt;
use std::sync::{Arc, Mutex};
use vitality::config::VitalityConfig;
use vitality::db;
use vitality::engine::Engine;
use vitality::narrator::{self, Narrator};

type SharedState = (
    DbHandles,
    Engine,
    Arc<dyn Narrator>,
    Arc<VitalityConfig>,
);

/// Shared setup: open the DB, build the engine and narrator.
fn setup_shared_state(config: VitalityConfig) -> Result<SharedState> {
    let db_path = config.resolved_db_path();
    let conn = db::open_database(&db_path)?;
    let reader = db::open_read_connection(&db_path)?;
    tracing::info!(db = %db_path.display(), "database ready");

    let db = DbHandles {
        writer: Arc::new(Mutex::new(conn)),
        reader: Arc::new(Mutex::new(reader)),
    };
    let engine = Engine::with_system_clock(config.scoring.clone());

    let narrator: Arc<dyn Narrator> = Arc::from(narrator::create_narrator(&config.narrator)?);
    tracing::info!(narrator = narrator.name(), "narrator ready");

    Ok((db, engine, narrator, Arc::new(config)))
}

/// Start the MCP server over stdio transport.
pub async fn serve_stdio(config: VitalityConfig) -> Result<()> {
    tracing::info!("starting vitality MCP server on stdio");

    let (db, engine, narrator, config) = setup_shared_state(config)?;

    let tools = VitalityTools::new(db, engine, narrator, config);
    let transport = rmcp::transport::stdio();

    let server = tools.serve(transport).await?;
    tracing::info!("MCP server running, waiting for client");

    server.waiting().await?;
    tracing::info!("MCP server shut down");

    Ok(())
}

/// Start the MCP server over Streamable HTTP (SSE) transport.
pub async fn serve_sse(config: VitalityConfig) -> Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!(addr = %bind_addr, "starting vitality MCP server on SSE/HTTP");

    let (db, engine, narrator, config) = setup_shared_state(config)?;

    let service = rmcp::transport::streamable_http_server::StreamableHttpService::new(
        move || {
            Ok(VitalityTools::new(
                db.clone(),
                engine.clone(),
                narrator.clone(),
                config.clone(),
            ))
        },
        rmcp::transport::streamable_http_server::session::local::LocalSessionManager::default()
            .into(),
        Default::default(),
    );

    let router = axum::Router::new().nest_service("/mcp", service);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "MCP server listening at http://{bind_addr}/mcp");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
            }
            tracing::info!("shutting down SSE server");
        })
        .await?;

    Ok(())
}
