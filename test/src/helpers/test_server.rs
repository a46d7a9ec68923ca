use std::{
    collections::HashMap,
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use uuid::Uuid;

use phantom_server::{
    EntityServer, ReconcileReport, ServerConfig, SessionEvent, ViewerId,
};
use phantom_shared::{Codec, EntityMessage, Location};

use super::{RecordingTransport, ScriptedSkinFetcher};

pub const PROTOCOL_1_21_4: i32 = 769;

/// Server settings for tests: no chunk gating, short skin timeout
pub fn test_config() -> ServerConfig {
    ServerConfig {
        require_loaded_chunk: false,
        skin_fetch_timeout: Duration::from_millis(500),
        ..ServerConfig::default()
    }
}

/// An enabled EntityServer wired to an in-memory transport, a scripted skin
/// fetcher and a manual clock. Received packets are decoded per viewer.
pub struct TestServer {
    pub server: EntityServer,
    pub transport: RecordingTransport,
    pub fetcher: Arc<ScriptedSkinFetcher>,
    protocols: HashMap<ViewerId, i32>,
    received: HashMap<ViewerId, Vec<EntityMessage>>,
    now: Instant,
}

impl TestServer {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: ServerConfig) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let transport = RecordingTransport::new();
        let fetcher = Arc::new(ScriptedSkinFetcher::new());
        let mut server = EntityServer::new(config, Box::new(transport.clone()), fetcher.clone());
        server.on_enable();

        Self {
            server,
            transport,
            fetcher,
            protocols: HashMap::new(),
            received: HashMap::new(),
            now: Instant::now(),
        }
    }

    // Clock

    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn advance(&mut self, duration: Duration) {
        self.now += duration;
    }

    // Viewers

    pub fn join(&mut self, location: Location) -> ViewerId {
        self.join_with_protocol(location, PROTOCOL_1_21_4)
    }

    pub fn join_with_protocol(&mut self, location: Location, protocol_id: i32) -> ViewerId {
        let viewer = ViewerId(Uuid::new_v4());
        self.protocols.insert(viewer, protocol_id);
        self.event(
            viewer,
            SessionEvent::Join {
                location,
                protocol_id,
                view_distance: 10,
            },
        );
        viewer
    }

    pub fn event(&mut self, viewer: ViewerId, event: SessionEvent) -> ReconcileReport {
        self.server.handle_event_at(viewer, event, self.now)
    }

    /// Moves the viewer without rate limiting
    pub fn teleport(&mut self, viewer: ViewerId, location: Location) -> ReconcileReport {
        self.event(viewer, SessionEvent::Teleport(location))
    }

    // Ticking

    pub fn tick(&mut self) -> ReconcileReport {
        self.server.tick_at(self.now)
    }

    /// Ticks until every skin fetch has landed and been applied
    pub fn settle_skins(&mut self) {
        for _ in 0..400 {
            self.tick();
            if self.server.skins_in_flight() == 0 {
                return;
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("skin fetches did not finish");
    }

    // Received packets

    /// Everything the viewer received since the last call, decoded
    pub fn take_messages(&mut self, viewer: &ViewerId) -> Vec<EntityMessage> {
        self.collect();
        self.received.remove(viewer).unwrap_or_default()
    }

    /// Drops everything received so far
    pub fn clear_messages(&mut self) {
        self.collect();
        self.received.clear();
    }

    fn collect(&mut self) {
        for (viewer, payload) in self.transport.take() {
            let protocol_id = self.protocols.get(&viewer).copied().unwrap_or(PROTOCOL_1_21_4);
            let codec = Codec::for_protocol_id(protocol_id).unwrap();
            let message = codec
                .decode(&payload)
                .unwrap_or_else(|err| panic!("undecodable packet for {}: {}", viewer, err));
            self.received.entry(viewer).or_default().push(message);
        }
    }
}

impl Default for TestServer {
    fn default() -> Self {
        Self::new()
    }
}
