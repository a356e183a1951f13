//! Headless mode execution

use super::{
    SessionData,
    messages::{print_session_exit_success, print_session_shutdown, print_session_starting},
    report::render_report,
};
use crate::controller::DashboardController;
use crate::ui::dashboard::{CycleOutcome, FinishedCycle};
use std::error::Error;

/// Print queued events that pass the log filter.
fn print_events(controller: &mut DashboardController) {
    for event in controller.state_mut().take_pending_events() {
        if event.should_display() {
            println!("{}", event);
        }
    }
}

fn print_report_if_loaded(controller: &DashboardController, finished: &FinishedCycle) {
    if matches!(finished.outcome, Some(CycleOutcome::Loaded { .. })) {
        print!("{}", render_report(controller.state()));
    }
}

/// Runs the application in headless mode
///
/// Prints worker events to the console and the filtered table after every
/// successful load, until Ctrl+C.
pub async fn run_headless_mode(mut session: SessionData) -> Result<(), Box<dyn Error>> {
    print_session_starting("headless", &session.controller.state().environment);

    // Trigger shutdown on Ctrl+C
    let shutdown_sender_clone = session.shutdown_sender.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_sender_clone.send(());
        }
    });

    let mut shutdown_receiver = session.shutdown_sender.subscribe();
    session.controller.initialize();

    // Event loop: log events to console until shutdown
    loop {
        tokio::select! {
            Some(message) = session.message_receiver.recv() => {
                let finished = session.controller.handle(message);
                print_events(&mut session.controller);
                if let Some(finished) = finished {
                    print_report_if_loaded(&session.controller, &finished);
                }
            }
            _ = shutdown_receiver.recv() => {
                break;
            }
        }
    }

    print_session_shutdown();
    for handle in session.join_handles {
        let _ = handle.await;
    }
    print_session_exit_success();

    Ok(())
}

/// Load once, print the table, and return.
///
/// Fails when neither the feed nor the snapshot cache produced anything to show.
pub async fn run_single_scan(mut session: SessionData) -> Result<(), Box<dyn Error>> {
    let Some(seq) = session.controller.initialize() else {
        return Err("a load is already in progress".into());
    };

    while let Some(message) = session.message_receiver.recv().await {
        let finished = session.controller.handle(message);
        print_events(&mut session.controller);
        if finished.is_some_and(|finished| finished.seq == seq) {
            break;
        }
    }

    let state = session.controller.state();
    if state.snapshot.is_none() {
        let reason = state
            .load_error
            .as_ref()
            .map(|error| error.message.clone())
            .unwrap_or_else(|| "no data".to_string());
        return Err(format!("Could not load scan results: {}", reason).into());
    }
    print!("{}", render_report(state));
    Ok(())
}
