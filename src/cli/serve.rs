use std::{net::SocketAddr, sync::Arc};

use clap::Parser;
use tokio::net::TcpListener;

use crate::{cli::sources::SourceArgs, prelude::*, web};

#[derive(Parser)]
pub struct ServeArgs {
    #[clap(long = "bind", env = "BIND", default_value = "0.0.0.0:3000")]
    pub bind: SocketAddr,

    #[clap(flatten)]
    pub sources: SourceArgs,
}

#[instrument(skip_all, fields(bind = %args.bind))]
pub async fn serve(args: &ServeArgs) -> Result {
    let service = Arc::new(args.sources.service()?);
    let listener = TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("failed to bind to {}", args.bind))?;
    info!(address = %listener.local_addr()?, "listening…");
    axum::serve(listener, web::router(service)).await?;
    Ok(())
}
