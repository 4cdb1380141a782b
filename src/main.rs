use clap::Parser;
use miette::{IntoDiagnostic, Result};
use payer_flow::application::address::address_edit;
use payer_flow::application::controller::FlowController;
use payer_flow::application::dispatch::{DeviceClass, PaymentMethod, Surface, SurfaceDispatcher};
use payer_flow::application::profile_store::PayerProfileStore;
use payer_flow::application::session::FlowSession;
use payer_flow::config::FlowConfig;
use payer_flow::domain::flow::{FlowView, Intent};
use payer_flow::domain::payment::PaymentRequest;
use payer_flow::domain::ports::{Clock, ProfileMediumBox, SharedClock};
use payer_flow::infrastructure::clock::SystemClock;
use payer_flow::infrastructure::in_memory::InMemoryProfileMedium;
use payer_flow::infrastructure::simulator::{
    SimulatedAddressLookup, SimulatedBankConnector, SimulatedVerifier,
};
use payer_flow::interfaces::csv::intent_reader::{IntentReader, ScriptStep};
use serde::Serialize;
use std::fs::File;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Intent script CSV file (`intent,field,value`)
    script: PathBuf,

    /// Payment request JSON file
    #[arg(long)]
    request: PathBuf,

    /// Flow configuration JSON file (optional)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to persistent profile database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Device class presenting the flow
    #[arg(long, default_value = "mobile")]
    device: DeviceClass,

    /// Checkout payment method id
    #[arg(long, default_value = "mito")]
    method: PaymentMethod,
}

#[derive(Serialize)]
struct Report {
    surface: Surface,
    flow: FlowView,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "payer_flow=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal()),
        )
        .init();

    let cli = Cli::parse();

    let config = FlowConfig::load(cli.config.as_deref()).into_diagnostic()?;
    let file = File::open(&cli.request).into_diagnostic()?;
    let request: PaymentRequest = serde_json::from_reader(file).into_diagnostic()?;
    info!(ticket = %request.ticket_reference, amount = %request.display_amount(), "Loaded payment request");

    let clock: SharedClock = Arc::new(SystemClock);

    let mut dispatcher = SurfaceDispatcher::new(
        cli.device,
        config.handoff_base_url.clone(),
        config.handoff_timeout(),
    );
    dispatcher.select_method(cli.method).into_diagnostic()?;
    if let Surface::QrHandoff {
        handoff_url,
        countdown,
        ..
    } = dispatcher.route(&request, clock.now())
    {
        info!(%handoff_url, %countdown, "Desktop visitor shown QR handoff, continuing on desktop");
        dispatcher.continue_on_desktop();
    }
    let surface = dispatcher.route(&request, clock.now());

    let medium = open_medium(cli.db_path.as_deref())?;
    let store = PayerProfileStore::new(medium, clock.clone(), config.validity_window());
    let addresses = SimulatedAddressLookup::new()
        .with_latency(Duration::from_millis(config.simulator.latency_ms));
    let lookup_limit = config.external_call_timeout();
    let verifier = SimulatedVerifier::new(config.simulator.clone());
    let bank = SimulatedBankConnector::new(clock.clone())
        .with_latency(Duration::from_millis(config.simulator.latency_ms));
    let controller = FlowController::new(
        request,
        store,
        Box::new(verifier),
        Box::new(bank),
        config,
    );

    let session = FlowSession::start(controller).await.into_diagnostic()?;

    let script = File::open(&cli.script).into_diagnostic()?;
    for step in IntentReader::new(script).steps() {
        let intent = match step {
            Ok(ScriptStep::Intent(intent)) => Ok(intent),
            Ok(ScriptStep::LookupAddress {
                postcode,
                house_number,
            }) => address_edit(&addresses, &postcode, &house_number, lookup_limit)
                .await
                .map(Intent::EditField),
            Err(e) => Err(e),
        };
        match intent {
            Ok(intent) => {
                let name = intent.name();
                if let Err(e) = session.dispatch(intent).await {
                    warn!(intent = name, error = %e, "Rejected intent");
                }
            }
            Err(e) => {
                warn!(error = %e, "Error reading intent");
            }
        }
    }

    let flow = session.shutdown().await.into_diagnostic()?;
    info!(step = %flow.state.step, attempts = flow.state.attempt_counter, "Flow finished");

    let report = Report { surface, flow };
    println!(
        "{}",
        serde_json::to_string_pretty(&report).into_diagnostic()?
    );

    Ok(())
}

#[cfg(feature = "storage-rocksdb")]
fn open_medium(db_path: Option<&Path>) -> Result<ProfileMediumBox> {
    use payer_flow::infrastructure::rocksdb::RocksDbProfileMedium;

    match db_path {
        Some(path) => {
            let medium = RocksDbProfileMedium::open(path).into_diagnostic()?;
            Ok(Box::new(medium))
        }
        None => Ok(Box::new(InMemoryProfileMedium::new())),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_medium(db_path: Option<&Path>) -> Result<ProfileMediumBox> {
    if db_path.is_some() {
        warn!(
            "Persistent storage requested via --db-path, but the 'storage-rocksdb' feature is not enabled. Falling back to in-memory profile storage."
        );
    }
    Ok(Box::new(InMemoryProfileMedium::new()))
}
