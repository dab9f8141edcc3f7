//! noderef-operator - binds Machine resources to the Nodes backing them

use std::sync::Arc;

use clap::Parser;
use futures::StreamExt;
use kube::runtime::watcher::Config as WatcherConfig;
use kube::runtime::Controller;
use kube::{Api, Client, CustomResourceExt};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use noderef_operator::controller::{error_policy, reconcile, Context};
use noderef_operator::crd::{Cluster, Machine};
use noderef_operator::DEFAULT_PAGE_SIZE;

/// Kubernetes operator that binds Machines to the Nodes backing them in
/// remote workload clusters
#[derive(Parser, Debug)]
#[command(name = "noderef-operator", version, about, long_about = None)]
struct Cli {
    /// Generate CRD manifests and exit
    #[arg(long)]
    crd: bool,

    /// Number of Nodes fetched per remote inventory page
    #[arg(long, env = "NODEREF_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install crypto provider - required by the kube client TLS stack.
    // Failure here indicates a serious system configuration issue.
    if let Err(e) = rustls::crypto::aws_lc_rs::default_provider().install_default() {
        eprintln!(
            "CRITICAL: Failed to install crypto provider: {:?}. \
             The operator cannot talk TLS to any cluster without one.",
            e
        );
        std::process::exit(1);
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.crd {
        let machine_crd = serde_yaml::to_string(&Machine::crd())
            .map_err(|e| anyhow::anyhow!("Failed to serialize Machine CRD: {}", e))?;
        let cluster_crd = serde_yaml::to_string(&Cluster::crd())
            .map_err(|e| anyhow::anyhow!("Failed to serialize Cluster CRD: {}", e))?;
        println!("{machine_crd}---\n{cluster_crd}");
        return Ok(());
    }

    run_controller(cli.page_size).await
}

/// Run the Machine controller until shutdown
async fn run_controller(page_size: u32) -> anyhow::Result<()> {
    let client = Client::try_default().await?;
    let ctx = Arc::new(Context::new(client.clone(), page_size));

    let machines: Api<Machine> = Api::all(client);

    tracing::info!(page_size, "Starting Machine noderef controller");

    Controller::new(machines, WatcherConfig::default())
        .shutdown_on_signal()
        .run(reconcile, error_policy, ctx)
        .for_each(|result| async move {
            match result {
                Ok(action) => {
                    tracing::debug!(?action, "Machine reconciliation completed");
                }
                Err(e) => {
                    tracing::error!(error = ?e, "Machine reconciliation error");
                }
            }
        })
        .await;

    tracing::info!("Machine noderef controller shutting down");
    Ok(())
}
