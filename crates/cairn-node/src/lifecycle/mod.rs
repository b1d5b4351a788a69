//! # Lifecycle Controller
//!
//! Sole owner of the node's network half. Every online/offline transition
//! is admitted by a compare-and-set on one state cell:
//!
//! | Call | Offline | Starting | Online | Stopping |
//! |------|---------|----------|--------|----------|
//! | `go_online` | run bootstrap | join in-flight | no-op | `Busy` |
//! | `go_offline` | no-op | `Busy` | run teardown | join in-flight |
//!
//! Admitted transitions run on their own task, so a caller that gives up
//! waiting never leaves the cell stuck mid-transition. A transition task
//! that panics is caught and the node falls back to `Offline`. The state,
//! network variant and session generation change together in a single
//! write.
//!
//! While the node is `Offline`, [`LifecycleController::hold_offline`] can
//! pin it there; `go_online` then fails `Busy` until the hold is dropped.

mod session;
mod state;

pub use session::{NetworkState, OnlineSession};
pub use state::LifecycleState;

pub(crate) use session::Bootstrapper;

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info, instrument, warn};

use crate::error::{NodeError, Result};

type Outcome = Option<Result<()>>;

struct LifecycleCell {
    state: LifecycleState,
    generation: u64,
    network: NetworkState,
    in_flight: Option<watch::Receiver<Outcome>>,
    held_by: Option<&'static str>,
}

enum Admission {
    /// Already where the caller wants to be.
    Done,
    Busy(&'static str),
    Join(watch::Receiver<Outcome>),
    Run {
        outcome: watch::Sender<Outcome>,
        session: Option<Arc<OnlineSession>>,
    },
}

/// Gatekeeper of online/offline transitions.
pub struct LifecycleController {
    cell: watch::Sender<LifecycleCell>,
    bootstrapper: Bootstrapper,
}

impl LifecycleController {
    pub(crate) fn new(bootstrapper: Bootstrapper) -> Self {
        let (cell, _) = watch::channel(LifecycleCell {
            state: LifecycleState::Offline,
            generation: 0,
            network: NetworkState::Offline,
            in_flight: None,
            held_by: None,
        });
        Self { cell, bootstrapper }
    }

    // =========================================================================
    // SNAPSHOTS
    // =========================================================================

    pub fn state(&self) -> LifecycleState {
        self.cell.borrow().state
    }

    /// True when the last completed transition was `go_online`.
    ///
    /// The session stays in place until teardown finishes, so this holds
    /// during `Stopping` too.
    pub fn is_online(&self) -> bool {
        matches!(
            self.state(),
            LifecycleState::Online | LifecycleState::Stopping
        )
    }

    /// Number of successful `go_online` transitions so far.
    pub fn generation(&self) -> u64 {
        self.cell.borrow().generation
    }

    /// Current session, if online.
    pub fn session(&self) -> Option<Arc<OnlineSession>> {
        self.cell.borrow().network.session().cloned()
    }

    /// Current network variant.
    pub fn network(&self) -> NetworkState {
        self.cell.borrow().network.clone()
    }

    /// Wait until no transition is in flight and return the settled state.
    pub async fn settled(&self) -> LifecycleState {
        let mut changes = self.cell.subscribe();
        let settled = changes
            .wait_for(|cell| !cell.state.is_transitioning())
            .await
            .map(|cell| cell.state);
        settled.unwrap_or_else(|_| self.state())
    }

    /// Keep the node offline until the returned hold is dropped.
    ///
    /// Fails `Busy` unless the node is `Offline` and not already held.
    pub(crate) fn hold_offline(self: &Arc<Self>, purpose: &'static str) -> Result<OfflineHold> {
        let mut refused = None;
        self.cell.send_if_modified(|cell| {
            if cell.state != LifecycleState::Offline {
                refused = Some(format!("cannot {purpose} while {}", cell.state));
                return false;
            }
            if let Some(holder) = cell.held_by {
                refused = Some(format!("cannot {purpose} during {holder}"));
                return false;
            }
            cell.held_by = Some(purpose);
            true
        });
        match refused {
            Some(reason) => Err(NodeError::Busy(reason)),
            None => Ok(OfflineHold {
                controller: Arc::clone(self),
            }),
        }
    }

    // =========================================================================
    // TRANSITIONS
    // =========================================================================

    /// Bring the swarm and exchange up.
    #[instrument(name = "go_online", skip(self))]
    pub async fn go_online(self: &Arc<Self>) -> Result<()> {
        let admission = self.admit(|cell| match cell.state {
            LifecycleState::Online => Admission::Done,
            LifecycleState::Stopping => Admission::Busy("going offline"),
            LifecycleState::Starting => join(cell),
            LifecycleState::Offline => match cell.held_by {
                Some(holder) => Admission::Busy(holder),
                None => begin(cell, LifecycleState::Starting, None),
            },
        });

        let outcome = match admission {
            Admission::Done => return Ok(()),
            Admission::Busy(what) => return Err(NodeError::Busy(format!("{what} in progress"))),
            Admission::Join(outcome) => outcome,
            Admission::Run { outcome, .. } => {
                let watcher = outcome.subscribe();
                let this = Arc::clone(self);
                tokio::spawn(async move {
                    let run = tokio::spawn({
                        let this = Arc::clone(&this);
                        async move { this.bootstrap().await }
                    });
                    let result = match run.await {
                        Ok(result) => result,
                        Err(e) => {
                            this.abandon(None, &e);
                            Err(NodeError::Cancelled(format!("going online aborted: {e}")))
                        }
                    };
                    outcome.send_replace(Some(result));
                });
                watcher
            }
        };
        await_outcome(outcome).await
    }

    /// Take the swarm and exchange down. Teardown failures are logged, the
    /// node always ends up `Offline`.
    #[instrument(name = "go_offline", skip(self))]
    pub async fn go_offline(self: &Arc<Self>) -> Result<()> {
        let admission = self.admit(|cell| match cell.state {
            LifecycleState::Offline => Admission::Done,
            LifecycleState::Starting => Admission::Busy("going online"),
            LifecycleState::Stopping => join(cell),
            LifecycleState::Online => {
                let session = cell.network.session().cloned();
                begin(cell, LifecycleState::Stopping, session)
            }
        });

        let outcome = match admission {
            Admission::Done => return Ok(()),
            Admission::Busy(what) => return Err(NodeError::Busy(format!("{what} in progress"))),
            Admission::Join(outcome) => outcome,
            Admission::Run { outcome, session } => {
                let watcher = outcome.subscribe();
                let this = Arc::clone(self);
                tokio::spawn(async move {
                    let run = tokio::spawn({
                        let this = Arc::clone(&this);
                        let session = session.clone();
                        async move { this.teardown(session).await }
                    });
                    if let Err(e) = run.await {
                        this.abandon(session, &e);
                    }
                    outcome.send_replace(Some(Ok(())));
                });
                watcher
            }
        };
        await_outcome(outcome).await
    }

    fn admit(&self, decide: impl FnOnce(&mut LifecycleCell) -> Admission) -> Admission {
        let mut admission = Admission::Done;
        self.cell.send_if_modified(|cell| {
            admission = decide(cell);
            matches!(admission, Admission::Run { .. })
        });
        admission
    }

    async fn bootstrap(&self) -> Result<()> {
        let generation = self.generation() + 1;
        info!("[Lifecycle] Going online (session {})", generation);

        match self.bootstrapper.start(generation).await {
            Ok(session) => {
                let session = Arc::new(session);
                self.cell.send_modify(|cell| {
                    cell.state = LifecycleState::Online;
                    cell.generation = generation;
                    cell.network = NetworkState::Online(session);
                    cell.in_flight = None;
                });
                info!("[Lifecycle] Online (session {})", generation);
                Ok(())
            }
            Err(e) => {
                self.cell.send_modify(|cell| {
                    cell.state = LifecycleState::Offline;
                    cell.in_flight = None;
                });
                warn!("[Lifecycle] Going online failed, back to offline: {}", e);
                Err(e)
            }
        }
    }

    async fn teardown(&self, session: Option<Arc<OnlineSession>>) {
        info!("[Lifecycle] Going offline");
        let failures = match &session {
            Some(session) => self.bootstrapper.stop(session).await,
            None => Vec::new(),
        };

        self.cell.send_modify(|cell| {
            cell.state = LifecycleState::Offline;
            cell.network = NetworkState::Offline;
            cell.in_flight = None;
        });

        if failures.is_empty() {
            info!("[Lifecycle] Offline");
        } else {
            warn!(
                "[Lifecycle] Offline with {} teardown failures: {}",
                failures.len(),
                failures.join("; ")
            );
        }
    }

    /// Force the node offline after a transition task died.
    ///
    /// The cell is reset first. Closing `session`'s swarm is then left to a
    /// task of its own.
    fn abandon(&self, session: Option<Arc<OnlineSession>>, cause: &tokio::task::JoinError) {
        error!("[Lifecycle] Transition task died, forcing offline: {}", cause);
        self.bootstrapper.blocks.detach_exchange();
        self.cell.send_modify(|cell| {
            cell.state = LifecycleState::Offline;
            cell.network = NetworkState::Offline;
            cell.in_flight = None;
        });

        if let Some(session) = session {
            tokio::spawn(async move {
                session.exchange().stop().await;
                if let Err(e) = session.swarm().close().await {
                    warn!("[Lifecycle] Could not close abandoned swarm: {}", e);
                }
            });
        }
    }
}

/// Keeps the node `Offline` while alive. See [`LifecycleController::hold_offline`].
pub(crate) struct OfflineHold {
    controller: Arc<LifecycleController>,
}

impl Drop for OfflineHold {
    fn drop(&mut self) {
        self.controller.cell.send_modify(|cell| cell.held_by = None);
    }
}

fn join(cell: &LifecycleCell) -> Admission {
    match &cell.in_flight {
        Some(outcome) => Admission::Join(outcome.clone()),
        None => Admission::Busy("transition"),
    }
}

fn begin(
    cell: &mut LifecycleCell,
    next: LifecycleState,
    session: Option<Arc<OnlineSession>>,
) -> Admission {
    let (outcome, watcher) = watch::channel(None);
    cell.state = next;
    cell.in_flight = Some(watcher);
    Admission::Run { outcome, session }
}

async fn await_outcome(mut outcome: watch::Receiver<Outcome>) -> Result<()> {
    let published = outcome
        .wait_for(Option::is_some)
        .await
        .map(|result| result.clone());
    match published {
        Ok(result) => result.unwrap_or(Ok(())),
        Err(_) => Err(NodeError::Cancelled(
            "lifecycle transition aborted".to_string(),
        )),
    }
}
