//! # WiFi Connection Supervisor
//!
//! Owns the WiFi association state machine. The platform's radio driver is
//! reduced to two capabilities (bring the station up, issue one association
//! attempt) and everything it reports back arrives as discrete [`LinkEvent`]s
//! over a channel consumed by a single supervisor task. No callback runs
//! supervisor code, so there is no reentrancy to reason about.
//!
//! The boot sequence blocks on [`LinkStatus::wait_outcome`] until the machine
//! reaches a terminal state: an address assignment, or retry exhaustion.
//! Retries are bounded and immediate; any backoff is whatever the radio
//! itself imposes.

use embassy_net::Ipv4Address;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use embassy_sync::signal::Signal;

use crate::error::AssociationError;
use crate::fmt::{debug, error, info, warn};

/// Depth of the link event channel. Radio drivers emit events far slower
/// than the supervisor consumes them; a handful of slots absorbs bursts
/// around a disconnect.
pub const LINK_EVENT_DEPTH: usize = 4;

pub type LinkEventChannel = Channel<CriticalSectionRawMutex, LinkEvent, LINK_EVENT_DEPTH>;
pub type LinkEventSender<'a> = Sender<'a, CriticalSectionRawMutex, LinkEvent, LINK_EVENT_DEPTH>;
pub type LinkEventReceiver<'a> = Receiver<'a, CriticalSectionRawMutex, LinkEvent, LINK_EVENT_DEPTH>;

/// Association state of the WiFi station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectionState {
    Idle,
    Connecting,
    Connected,
    Failed,
}

/// Discrete events reported by the platform's radio driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    /// The station interface is up and ready to associate.
    Started,
    /// Association completed and an address was assigned.
    AddressAssigned(Ipv4Address),
    /// Association failed or an established link dropped.
    Disconnected,
}

/// Capability interface over the platform's WiFi association primitive.
///
/// Both calls only issue requests; their outcomes arrive as [`LinkEvent`]s.
/// A failed `connect` call counts against the retry budget just like a
/// `Disconnected` event.
pub trait LinkControl {
    type Error: core::fmt::Debug;

    /// Bring the station interface up. Completion is reported as
    /// [`LinkEvent::Started`].
    async fn start(&mut self) -> Result<(), Self::Error>;

    /// Begin one association attempt.
    async fn connect(&mut self) -> Result<(), Self::Error>;
}

/// Shared outcome context, created by the boot sequence and passed to the
/// supervisor constructor.
///
/// Internally a signal, so each terminal transition wakes exactly one waiter;
/// no polling is involved.
pub struct LinkStatus {
    outcome: Signal<CriticalSectionRawMutex, Result<(), AssociationError>>,
}

impl LinkStatus {
    pub const fn new() -> Self {
        Self {
            outcome: Signal::new(),
        }
    }

    /// Blocks until the supervisor reaches a terminal state.
    pub async fn wait_outcome(&self) -> Result<(), AssociationError> {
        self.outcome.wait().await
    }
}

impl Default for LinkStatus {
    fn default() -> Self {
        Self::new()
    }
}

/// The association state machine. One instance per device, driven by a
/// dedicated task via [`LinkSupervisor::run`].
pub struct LinkSupervisor<'a, C: LinkControl> {
    control: C,
    events: LinkEventReceiver<'a>,
    status: &'a LinkStatus,
    max_retries: u32,
    state: ConnectionState,
    retries: u32,
}

impl<'a, C: LinkControl> LinkSupervisor<'a, C> {
    pub fn new(
        control: C,
        events: LinkEventReceiver<'a>,
        status: &'a LinkStatus,
        max_retries: u32,
    ) -> Self {
        Self {
            control,
            events,
            status,
            max_retries,
            state: ConnectionState::Idle,
            retries: 0,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Starts association and consumes radio events until the task is
    /// cancelled. Terminal transitions are reported through [`LinkStatus`];
    /// after exhaustion the supervisor stays parked in `Failed` until the
    /// caller restarts it.
    pub async fn run(&mut self) -> ! {
        if let Err(e) = self.control.start().await {
            error!("station startup failed: {:?}", e);
            self.state = ConnectionState::Failed;
            self.status.outcome.signal(Err(AssociationError::Startup));
        }
        loop {
            let event = self.events.receive().await;
            self.handle_event(event).await;
        }
    }

    async fn handle_event(&mut self, event: LinkEvent) {
        match event {
            LinkEvent::Started => {
                debug!("station up, associating");
                self.state = ConnectionState::Connecting;
                if self.control.connect().await.is_err() {
                    self.retry().await;
                }
            }
            LinkEvent::AddressAssigned(address) => {
                info!("associated, address {}", address);
                self.retries = 0;
                self.state = ConnectionState::Connected;
                self.status.outcome.signal(Ok(()));
            }
            LinkEvent::Disconnected => match self.state {
                ConnectionState::Connected => {
                    warn!("link lost, re-entering association");
                    self.state = ConnectionState::Connecting;
                    self.retry().await;
                }
                ConnectionState::Connecting => self.retry().await,
                ConnectionState::Idle | ConnectionState::Failed => {
                    debug!("ignoring disconnect in state {:?}", self.state);
                }
            },
        }
    }

    /// Re-issues association until a request is accepted or the budget runs
    /// out. Each iteration consumes one retry, so repeated immediate request
    /// failures terminate just like repeated disconnect events.
    async fn retry(&mut self) {
        loop {
            if self.retries >= self.max_retries {
                error!("association failed after {} retries", self.retries);
                self.state = ConnectionState::Failed;
                self.status
                    .outcome
                    .signal(Err(AssociationError::RetriesExhausted {
                        attempts: self.retries,
                    }));
                return;
            }
            self.retries += 1;
            info!("retrying association ({}/{})", self.retries, self.max_retries);
            match self.control.connect().await {
                Ok(()) => {
                    self.state = ConnectionState::Connecting;
                    return;
                }
                Err(e) => warn!("association request failed: {:?}", e),
            }
        }
    }
}
