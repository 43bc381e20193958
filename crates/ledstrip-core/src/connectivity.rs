//! WiFi association lifecycle state machine.
//!
//! The manager is pure: the firmware task feeds it driver events and timer
//! expirations, and executes the actions it returns. All transitions are
//! edge-triggered and run to completion on the cooperative executor; the
//! machine itself never blocks or touches hardware.

use heapless::Vec;

use crate::backoff::BackoffCalculator;

/// Upper bound on actions emitted per event (disassociation produces a
/// notification plus a scheduled retry).
pub const MAX_ACTIONS: usize = 2;

pub type Actions = Vec<LinkAction, MAX_ACTIONS>;

/// Exactly one state is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    ConnectingToAp,
    /// Provisioning network is up; terminal until external reconfiguration.
    FallbackApActive,
    Connected,
    /// Waiting for the scheduled reconnect timer.
    ReconnectPending,
}

/// Driver callbacks and timer expirations, as events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    /// Manager start; begin associating with stored credentials.
    StartRequested,
    AssociationSucceeded,
    /// No stored credentials produce an association.
    AssociationFailed,
    /// The provisioning network came up.
    FallbackStarted,
    /// The provisioning network could not be created.
    FallbackFailed,
    /// Driver-reported disassociation.
    Disassociated { reason: u8 },
    /// The scheduled reconnect timer fired. Timers are never cancelled;
    /// a stale `generation` marks one superseded by a later transition.
    RetryTimerFired { generation: u32 },
    /// Operator-requested reassociation, superseding any pending retry.
    ReassociateRequested,
}

/// Side effects for the firmware task to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkAction {
    /// Start an association attempt with stored credentials.
    BeginAssociation,
    /// Bring up the provisioning network.
    StartFallbackAp,
    /// Arrange for `RetryTimerFired { generation }` after the delay.
    ScheduleRetry { after_ms: u32, generation: u32 },
    /// Connectivity is up; dependents may (re)open remote connections.
    NotifyUp { first_run: bool },
    /// Connectivity is down; dependents must treat in-flight remote
    /// connections as invalid.
    NotifyDown { reason: u8 },
    /// No viable path to service; halt the process.
    Halt,
}

/// Association lifecycle manager.
///
/// `FLOOR_MS`/`CEILING_MS` bound the reconnect backoff. The backoff resets
/// exactly on association success, never on an attempt alone.
pub struct ConnectivityManager<const FLOOR_MS: u32, const CEILING_MS: u32> {
    state: LinkState,
    backoff: BackoffCalculator<FLOOR_MS, CEILING_MS>,
    first_run: bool,
    retry_generation: u32,
}

impl<const FLOOR_MS: u32, const CEILING_MS: u32> ConnectivityManager<FLOOR_MS, CEILING_MS> {
    pub const fn new() -> Self {
        Self {
            state: LinkState::Disconnected,
            backoff: BackoffCalculator::new(),
            first_run: true,
            retry_generation: 0,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == LinkState::Connected
    }

    /// Apply one event and return the actions to execute.
    ///
    /// Events that do not apply to the current state (including stale retry
    /// timers) produce no actions and no transition.
    pub fn handle(&mut self, event: LinkEvent) -> Actions {
        let mut actions = Actions::new();

        match (self.state, event) {
            (LinkState::Disconnected, LinkEvent::StartRequested) => {
                self.state = LinkState::ConnectingToAp;
                let _ = actions.push(LinkAction::BeginAssociation);
            }

            (LinkState::ConnectingToAp, LinkEvent::AssociationSucceeded) => {
                self.state = LinkState::Connected;
                self.backoff.reset();
                let _ = actions.push(LinkAction::NotifyUp {
                    first_run: self.first_run,
                });
                self.first_run = false;
            }

            (LinkState::ConnectingToAp, LinkEvent::AssociationFailed) => {
                let _ = actions.push(LinkAction::StartFallbackAp);
            }

            (LinkState::ConnectingToAp, LinkEvent::FallbackStarted) => {
                self.state = LinkState::FallbackApActive;
            }

            (LinkState::ConnectingToAp, LinkEvent::FallbackFailed) => {
                let _ = actions.push(LinkAction::Halt);
            }

            // A failed attempt and a lost link re-enter the retry path the
            // same way; dependents are told either way so they can drop any
            // half-open remote session.
            (
                LinkState::Connected | LinkState::ConnectingToAp,
                LinkEvent::Disassociated { reason },
            ) => {
                self.state = LinkState::ReconnectPending;
                self.retry_generation += 1;
                let _ = actions.push(LinkAction::NotifyDown { reason });
                let _ = actions.push(LinkAction::ScheduleRetry {
                    after_ms: self.backoff.ms_to_next_try(),
                    generation: self.retry_generation,
                });
            }

            (LinkState::ReconnectPending, LinkEvent::RetryTimerFired { generation })
                if generation == self.retry_generation =>
            {
                self.state = LinkState::ConnectingToAp;
                let _ = actions.push(LinkAction::BeginAssociation);
            }

            (
                LinkState::Connected | LinkState::ReconnectPending | LinkState::ConnectingToAp,
                LinkEvent::ReassociateRequested,
            ) => {
                // Supersede any pending retry timer; it will fire with a
                // stale generation and be ignored.
                self.state = LinkState::ConnectingToAp;
                self.retry_generation += 1;
                let _ = actions.push(LinkAction::BeginAssociation);
            }

            // Fallback mode is terminal, and anything else is stale.
            _ => {}
        }

        actions
    }
}

impl<const FLOOR_MS: u32, const CEILING_MS: u32> Default
    for ConnectivityManager<FLOOR_MS, CEILING_MS>
{
    fn default() -> Self {
        Self::new()
    }
}
