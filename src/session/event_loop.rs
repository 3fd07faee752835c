//! The session event loop.
//!
//! Owns the MQTT link exclusively and multiplexes two inputs: session events
//! from the transport and publish requests queued by other tasks. Everything
//! that mutates session state happens inside this single loop, so no locking
//! is needed around it.

use embassy_futures::select::{Either, select};

use crate::config::SessionOptions;
use crate::error::SessionError;
use crate::fmt::{debug, info, warn};
use crate::message::{MessageId, QoS};
use crate::presence::{AddressSource, PresenceAnnouncer};

use super::publisher::{OwnedPublishRequest, PublishRequestReceiver};
use super::registry::{MAX_SUBSCRIPTIONS, TopicRegistry};
use super::traits::{EndpointModule, MessageSink, MqttLink, SessionEvent};

/// Broker-session state. Mutated only on transport events, never polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionState {
    Disconnected,
    Connected,
}

/// Sink implementation that publishes straight through the session's link.
struct LinkSink<'l, L: MqttLink>(&'l mut L);

impl<L: MqttLink> MessageSink for LinkSink<'_, L> {
    type Error = L::Error;

    async fn send(
        &mut self,
        topic: &str,
        payload: &[u8],
        qos: QoS,
        retain: bool,
    ) -> Result<MessageId, Self::Error> {
        self.0.publish(topic, payload, qos, retain).await
    }
}

/// The MQTT session: lifecycle, post-connect sequencing and message dispatch
/// for one endpoint.
pub struct Session<'a, L, M, A>
where
    L: MqttLink,
    M: EndpointModule,
    A: AddressSource,
{
    link: L,
    module: M,
    announcer: PresenceAnnouncer<'a, A>,
    options: SessionOptions<'a>,
    subscriptions: TopicRegistry<MAX_SUBSCRIPTIONS>,
    requests: PublishRequestReceiver<'a>,
    state: SessionState,
}

impl<'a, L, M, A> Session<'a, L, M, A>
where
    L: MqttLink,
    M: EndpointModule,
    A: AddressSource,
{
    /// Builds a session around an exclusive link. The module's subscriptions
    /// are collected once here and replayed on every connect.
    pub fn new(
        link: L,
        module: M,
        announcer: PresenceAnnouncer<'a, A>,
        options: SessionOptions<'a>,
        requests: PublishRequestReceiver<'a>,
    ) -> Self {
        let mut subscriptions = TopicRegistry::new();
        module.register(&mut subscriptions);
        Self {
            link,
            module,
            announcer,
            options,
            subscriptions,
            requests,
            state: SessionState::Disconnected,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Connects and processes events until the transport gives up.
    ///
    /// Returns only on fatal errors: a refused connect or a dead event
    /// stream. Either way the caller owns recovery, which means restarting
    /// the whole connection sequence; this loop never reconnects on its own.
    /// Transport-level reconnects are different: they arrive as another
    /// `Connected` event and re-run the post-connect sequence below.
    pub async fn run(&mut self) -> Result<(), SessionError<L::Error>> {
        info!("connecting to {}", self.options.broker);
        self.link
            .connect(&self.options)
            .await
            .map_err(SessionError::Connect)?;

        loop {
            let Self { link, requests, .. } = self;
            match select(link.next_event(), requests.receive()).await {
                Either::First(event) => match event.map_err(SessionError::EventStream)? {
                    SessionEvent::Connected => self.on_connected().await,
                    SessionEvent::Disconnected => {
                        self.state = SessionState::Disconnected;
                        warn!("session dropped, waiting for transport reconnect");
                    }
                    SessionEvent::Message(msg) => {
                        let Self { link, module, .. } = self;
                        module.on_message(&msg, &mut LinkSink(link)).await;
                    }
                },
                Either::Second(request) => self.forward(request).await,
            }
        }
    }

    /// Fixed post-connect sequence, re-run on every reconnect: presence
    /// first so late subscribers see current status, then subscriptions
    /// (broker-side session loss cleared them), then the module's own start
    /// exchange.
    async fn on_connected(&mut self) {
        self.state = SessionState::Connected;
        info!("session established with {}", self.options.broker);

        {
            let Self {
                link, announcer, ..
            } = self;
            match announcer.announce(&mut LinkSink(link)).await {
                Ok(id) => debug!("presence announced, id={}", id),
                Err(e) => warn!("presence announce failed: {:?}", e),
            }
        }

        {
            let Self {
                link,
                subscriptions,
                ..
            } = self;
            for (topic, qos) in subscriptions.iter() {
                match link.subscribe(topic, qos).await {
                    Ok(()) => debug!("subscribed to {}", topic),
                    Err(e) => warn!("subscribe to {} failed: {:?}", topic, e),
                }
            }
        }

        let Self { link, module, .. } = self;
        module.on_session_start(&mut LinkSink(link)).await;
    }

    /// Hands one queued publish to the link. Requests arriving while the
    /// session is down are dropped: unsent messages are not queued across
    /// outages, only logged.
    async fn forward(&mut self, request: OwnedPublishRequest) {
        if self.state != SessionState::Connected {
            debug!(
                "dropping queued publish to {} while disconnected",
                request.topic.as_str()
            );
            return;
        }
        if let Err(e) = self
            .link
            .publish(
                request.topic.as_str(),
                &request.payload,
                request.qos,
                request.retain,
            )
            .await
        {
            warn!("queued publish to {} failed: {:?}", request.topic.as_str(), e);
        }
    }
}
