use std::{
    collections::HashMap,
    convert::Infallible,
    sync::{Arc, Mutex, PoisonError, RwLock, mpsc::RecvTimeoutError},
    time::{Duration, Instant},
};

use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use tokio::sync::broadcast;
use tokio_stream::{StreamExt, wrappers::BroadcastStream};

use imfo_booking::CurrentUser;
use imfo_core::{PackageId, WizardId};
use imfo_events::{EventBus, InMemoryEventBus};
use imfo_infra::{Collaborators, SessionError, SubmitOutcome, WizardSession, session::WizardEnvelope};

pub type WizardBus = Arc<InMemoryEventBus<WizardEnvelope>>;
pub type Session = WizardSession<WizardBus>;

/// Realtime message broadcasted via SSE.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RealtimeMessage {
    pub wizard_id: WizardId,
    pub topic: String,
    pub sequence_number: u64,
    pub payload: serde_json::Value,
}

struct SessionEntry {
    session: Arc<Session>,
    last_seen: Mutex<Instant>,
}

impl SessionEntry {
    fn new(session: Arc<Session>) -> Self {
        Self {
            session,
            last_seen: Mutex::new(Instant::now()),
        }
    }

    fn touch(&self) {
        *self.last_seen.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    fn idle_since(&self, now: Instant) -> Duration {
        now.saturating_duration_since(*self.last_seen.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Process-wide services: collaborators, the wizard bus and live sessions.
///
/// Sessions leave the registry when discarded, once their booking is
/// confirmed, or after `idle_ttl` without a request.
pub struct AppServices {
    collaborators: Collaborators,
    bus: WizardBus,
    sessions: RwLock<HashMap<WizardId, SessionEntry>>,
    idle_ttl: Duration,
    realtime_tx: broadcast::Sender<RealtimeMessage>,
}

impl AppServices {
    /// Wire services, start the bus → realtime forwarder and the idle sweep.
    ///
    /// Must be called from inside a Tokio runtime.
    pub fn start(collaborators: Collaborators, idle_ttl: Duration) -> Arc<Self> {
        let bus: WizardBus = Arc::new(InMemoryEventBus::new());

        // Realtime channel (SSE): lossy broadcast, wizard-filtered in handlers.
        let (realtime_tx, _realtime_rx) = broadcast::channel::<RealtimeMessage>(256);

        // Background subscriber: bus -> realtime. Ends when the bus is dropped.
        {
            let sub = bus.subscribe();
            let realtime_tx = realtime_tx.clone();
            tokio::task::spawn_blocking(move || {
                loop {
                    match sub.recv_timeout(Duration::from_secs(1)) {
                        Ok(env) => {
                            let payload = match serde_json::to_value(env.payload()) {
                                Ok(v) => v,
                                Err(e) => {
                                    tracing::warn!("event serialization failed: {e}");
                                    continue;
                                }
                            };

                            // Lossy; no backpressure on the wizard.
                            let _ = realtime_tx.send(RealtimeMessage {
                                wizard_id: env.wizard_id(),
                                topic: env.event_type().to_string(),
                                sequence_number: env.sequence_number(),
                                payload,
                            });
                        }
                        Err(RecvTimeoutError::Timeout) => continue,
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            });
        }

        let services = Arc::new(Self {
            collaborators,
            bus,
            sessions: RwLock::new(HashMap::new()),
            idle_ttl,
            realtime_tx,
        });

        // Idle sweep. Holds a weak handle so it stops with the services.
        {
            let services = Arc::downgrade(&services);
            let period = (idle_ttl / 4).clamp(Duration::from_secs(1), Duration::from_secs(60));
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(period);
                ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
                loop {
                    ticker.tick().await;
                    let Some(services) = services.upgrade() else {
                        break;
                    };
                    let evicted = services.evict_idle(Instant::now());
                    if evicted > 0 {
                        tracing::info!(evicted, "idle booking wizards evicted");
                    }
                }
            });
        }

        services
    }

    /// Open a wizard for `package_id` and register it.
    pub async fn open_wizard(
        &self,
        package_id: PackageId,
        user: Option<CurrentUser>,
    ) -> Result<Arc<Session>, SessionError> {
        let session = Arc::new(
            Session::open(package_id, user, self.collaborators.clone(), self.bus.clone()).await?,
        );

        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session.id(), SessionEntry::new(session.clone()));
        Ok(session)
    }

    /// Look up a live wizard. Counts as activity for the idle sweep.
    pub fn session(&self, id: WizardId) -> Option<Arc<Session>> {
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        let entry = sessions.get(&id)?;
        entry.touch();
        Some(entry.session.clone())
    }

    /// Submit a wizard's booking; a confirmed wizard is finished and leaves
    /// the registry.
    pub async fn submit(&self, session: &Session) -> Result<SubmitOutcome, SessionError> {
        let outcome = session.submit().await?;
        if matches!(outcome, SubmitOutcome::Confirmed(_)) && self.discard(session.id()) {
            tracing::debug!(wizard_id = %session.id(), "confirmed booking wizard released");
        }
        Ok(outcome)
    }

    /// Drop a wizard. In-flight submissions finish on their own `Arc`.
    pub fn discard(&self, id: WizardId) -> bool {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some()
    }

    /// Drop every wizard idle for longer than the configured TTL as of `now`.
    pub fn evict_idle(&self, now: Instant) -> usize {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, entry| entry.idle_since(now) <= self.idle_ttl);
        before - sessions.len()
    }

    pub fn session_count(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn subscribe_realtime(&self) -> broadcast::Receiver<RealtimeMessage> {
        self.realtime_tx.subscribe()
    }
}

pub fn wizard_sse_stream(
    rx: broadcast::Receiver<RealtimeMessage>,
    wizard_id: WizardId,
) -> Sse<impl tokio_stream::Stream<Item = Result<SseEvent, Infallible>>> {
    let stream = BroadcastStream::new(rx).filter_map(move |msg| match msg {
        Ok(m) if m.wizard_id == wizard_id => {
            let data = serde_json::to_string(&m).unwrap_or_else(|_| "{}".to_string());
            Some(Ok(SseEvent::default()
                .event(m.topic)
                .id(m.sequence_number.to_string())
                .data(data)))
        }
        _ => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
