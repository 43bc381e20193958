//! Scenario tests for the association lifecycle state machine.

use ledstrip_core::{ConnectivityManager, LinkAction, LinkEvent, LinkState};

type Manager = ConnectivityManager<100, 30_000>;

fn connected_manager() -> Manager {
    let mut manager = Manager::new();
    manager.handle(LinkEvent::StartRequested);
    manager.handle(LinkEvent::AssociationSucceeded);
    assert!(manager.is_connected());
    manager
}

// -----------------------------------------------------------------------------
// Startup
// -----------------------------------------------------------------------------

#[test]
fn start_begins_association() {
    let mut manager = Manager::new();

    let actions = manager.handle(LinkEvent::StartRequested);

    assert_eq!(manager.state(), LinkState::ConnectingToAp);
    assert_eq!(actions.as_slice(), &[LinkAction::BeginAssociation]);
}

#[test]
fn first_association_success_notifies_first_run() {
    let mut manager = Manager::new();
    manager.handle(LinkEvent::StartRequested);

    let actions = manager.handle(LinkEvent::AssociationSucceeded);

    assert_eq!(manager.state(), LinkState::Connected);
    assert_eq!(actions.as_slice(), &[LinkAction::NotifyUp { first_run: true }]);
}

// -----------------------------------------------------------------------------
// Fallback provisioning network
// -----------------------------------------------------------------------------

#[test]
fn no_credentials_ends_in_fallback_ap_without_retries() {
    let mut manager = Manager::new();
    manager.handle(LinkEvent::StartRequested);

    let actions = manager.handle(LinkEvent::AssociationFailed);
    assert_eq!(actions.as_slice(), &[LinkAction::StartFallbackAp]);

    let actions = manager.handle(LinkEvent::FallbackStarted);
    assert!(actions.is_empty());
    assert_eq!(manager.state(), LinkState::FallbackApActive);

    // Terminal until external reconfiguration: nothing is retried.
    assert!(manager.handle(LinkEvent::RetryTimerFired { generation: 1 }).is_empty());
    assert!(manager.handle(LinkEvent::ReassociateRequested).is_empty());
    assert_eq!(manager.state(), LinkState::FallbackApActive);
}

#[test]
fn fallback_creation_failure_halts() {
    let mut manager = Manager::new();
    manager.handle(LinkEvent::StartRequested);
    manager.handle(LinkEvent::AssociationFailed);

    let actions = manager.handle(LinkEvent::FallbackFailed);

    assert_eq!(actions.as_slice(), &[LinkAction::Halt]);
}

// -----------------------------------------------------------------------------
// Disassociation and scheduled reconnects
// -----------------------------------------------------------------------------

#[test]
fn disassociation_schedules_retry_with_current_backoff() {
    let mut manager = connected_manager();

    let actions = manager.handle(LinkEvent::Disassociated { reason: 8 });

    assert_eq!(manager.state(), LinkState::ReconnectPending);
    assert_eq!(
        actions.as_slice(),
        &[
            LinkAction::NotifyDown { reason: 8 },
            LinkAction::ScheduleRetry {
                after_ms: 100,
                generation: 1
            }
        ]
    );
}

#[test]
fn retry_fires_then_success_resets_backoff_and_is_not_first_run() {
    let mut manager = connected_manager();

    // Two failed rounds grow the delay: 100 then 200.
    manager.handle(LinkEvent::Disassociated { reason: 8 });
    manager.handle(LinkEvent::RetryTimerFired { generation: 1 });
    let actions = manager.handle(LinkEvent::Disassociated { reason: 8 });
    assert_eq!(
        actions.as_slice(),
        &[
            LinkAction::NotifyDown { reason: 8 },
            LinkAction::ScheduleRetry {
                after_ms: 200,
                generation: 2
            }
        ]
    );

    let actions = manager.handle(LinkEvent::RetryTimerFired { generation: 2 });
    assert_eq!(manager.state(), LinkState::ConnectingToAp);
    assert_eq!(actions.as_slice(), &[LinkAction::BeginAssociation]);

    let actions = manager.handle(LinkEvent::AssociationSucceeded);
    assert_eq!(
        actions.as_slice(),
        &[LinkAction::NotifyUp { first_run: false }]
    );

    // Backoff was reset on success: the next loss schedules the floor again.
    let actions = manager.handle(LinkEvent::Disassociated { reason: 2 });
    assert_eq!(
        actions.as_slice(),
        &[
            LinkAction::NotifyDown { reason: 2 },
            LinkAction::ScheduleRetry {
                after_ms: 100,
                generation: 3
            }
        ]
    );
}

#[test]
fn failed_reconnect_attempt_re_enters_the_retry_path() {
    let mut manager = connected_manager();

    manager.handle(LinkEvent::Disassociated { reason: 4 });
    manager.handle(LinkEvent::RetryTimerFired { generation: 1 });
    assert_eq!(manager.state(), LinkState::ConnectingToAp);

    // The attempt itself fails at the driver level.
    let actions = manager.handle(LinkEvent::Disassociated { reason: 4 });

    assert_eq!(manager.state(), LinkState::ReconnectPending);
    assert_eq!(
        actions.as_slice(),
        &[
            LinkAction::NotifyDown { reason: 4 },
            LinkAction::ScheduleRetry {
                after_ms: 200,
                generation: 2
            }
        ]
    );
}

// -----------------------------------------------------------------------------
// Superseded timers
// -----------------------------------------------------------------------------

#[test]
fn stale_retry_timer_is_ignored() {
    let mut manager = connected_manager();
    manager.handle(LinkEvent::Disassociated { reason: 1 });

    // A manual reassociation supersedes the pending timer.
    let actions = manager.handle(LinkEvent::ReassociateRequested);
    assert_eq!(actions.as_slice(), &[LinkAction::BeginAssociation]);
    assert_eq!(manager.state(), LinkState::ConnectingToAp);

    // The superseded timer fires afterwards and must change nothing.
    let actions = manager.handle(LinkEvent::RetryTimerFired { generation: 1 });
    assert!(actions.is_empty());
    assert_eq!(manager.state(), LinkState::ConnectingToAp);
}

#[test]
fn link_loss_reported_after_the_up_notification_still_schedules_retry() {
    let mut manager = Manager::new();
    manager.handle(LinkEvent::StartRequested);
    let actions = manager.handle(LinkEvent::AssociationSucceeded);
    assert_eq!(actions.as_slice(), &[LinkAction::NotifyUp { first_run: true }]);

    // The driver may only surface a drop after the up notification was
    // already dispatched; the loss must still enter the retry path rather
    // than leaving the manager connected with a dead link.
    let actions = manager.handle(LinkEvent::Disassociated { reason: 0 });

    assert_eq!(manager.state(), LinkState::ReconnectPending);
    assert_eq!(
        actions.as_slice(),
        &[
            LinkAction::NotifyDown { reason: 0 },
            LinkAction::ScheduleRetry {
                after_ms: 100,
                generation: 1
            }
        ]
    );
}

#[test]
fn retry_timer_in_connected_state_is_ignored() {
    let mut manager = connected_manager();

    let actions = manager.handle(LinkEvent::RetryTimerFired { generation: 0 });

    assert!(actions.is_empty());
    assert_eq!(manager.state(), LinkState::Connected);
}
