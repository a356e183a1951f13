//! Session setup and initialization

use crate::config::Config;
use crate::consts::cli_consts::EVENT_QUEUE_SIZE;
use crate::controller::{ControllerSettings, DashboardController};
use crate::environment::Environment;
use crate::events::WorkerMessage;
use crate::feed::client::FeedClient;
use crate::filter::FilterState;
use crate::network::NetworkClient;
use crate::storage::Storage;
use crate::workers::core::EventSender;
use crate::workers::loader::LoadDispatcher;
use crate::workers::periodic::spawn_ticker;
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

/// Session data for both TUI and headless modes
pub struct SessionData {
    pub controller: DashboardController,
    /// Messages from loader tasks and the ticker
    pub message_receiver: mpsc::Receiver<WorkerMessage>,
    /// Shutdown sender to stop the ticker
    pub shutdown_sender: broadcast::Sender<()>,
    /// Join handles for long-running tasks
    pub join_handles: Vec<JoinHandle<()>>,
}

/// Everything a session needs to know before it starts.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub environment: Environment,
    pub config: Config,
    pub filter: FilterState,
    /// Directory for the watchlist and snapshot cache
    pub state_dir: PathBuf,
    /// Start the periodic ticker. Off for one-shot scans.
    pub periodic: bool,
}

/// Sets up a dashboard session
///
/// Builds the feed client and retry layer, wires the message channel between
/// workers and the controller, and starts the periodic ticker when requested.
/// Must be called from within the tokio runtime.
pub fn setup_session(options: SessionOptions) -> Result<SessionData, Box<dyn Error>> {
    let SessionOptions {
        environment,
        config,
        filter,
        state_dir,
        periodic,
    } = options;

    let feed = FeedClient::new(environment.clone())?;
    let network = NetworkClient::new(config.retry_config());

    let (sender, message_receiver) = mpsc::channel::<WorkerMessage>(EVENT_QUEUE_SIZE);
    let sender = EventSender::new(sender);

    // Create shutdown channel - only one shutdown signal needed
    let (shutdown_sender, _) = broadcast::channel(1);

    let mut join_handles = Vec::new();
    if periodic {
        join_handles.push(spawn_ticker(
            config.check_interval(),
            sender.clone(),
            shutdown_sender.subscribe(),
        ));
    }

    let dispatcher = LoadDispatcher::new(Arc::new(feed), Arc::new(network), sender);
    let controller = DashboardController::new(
        dispatcher,
        Storage::new(state_dir),
        ControllerSettings {
            environment,
            refresh_policy: config.refresh_policy,
            with_background_color: config.with_background_color,
            initial_filter: filter,
        },
    );

    Ok(SessionData {
        controller,
        message_receiver,
        shutdown_sender,
        join_handles,
    })
}
