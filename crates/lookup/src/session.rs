//! Resolver adapter: turns the current query into primary and auxiliary
//! lookups and tracks their state.

use crate::backend::EnsBackend;
use crate::fetch::Fetch;
use enslookup_types::{Address, EnsName, LookupMode, LookupQuery, TextKey};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Lookup state derived from one submitted query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionSnapshot {
    pub query: Option<LookupQuery>,
    /// Normalized name the auxiliary lookups are keyed on.
    pub profile_name: Option<EnsName>,
    /// Forward lookup, active in name mode.
    pub address: Fetch<Address>,
    /// Reverse lookup, active in address mode.
    pub name: Fetch<EnsName>,
    pub avatar: Fetch<String>,
    pub texts: BTreeMap<TextKey, Fetch<String>>,
}

impl ResolutionSnapshot {
    /// Initial state for `query`, before any lookup has answered.
    fn for_query(query: &LookupQuery) -> Self {
        let mut snapshot = Self {
            query: Some(query.clone()),
            ..Default::default()
        };
        if query.is_empty() {
            return snapshot;
        }

        match query.mode {
            LookupMode::Name => match EnsName::parse(&query.value) {
                Ok(name) => {
                    snapshot.address = Fetch::Pending;
                    snapshot.set_profile_pending(name);
                }
                Err(err) => snapshot.address = Fetch::Failed(err.to_string()),
            },
            LookupMode::Address => match query.value.parse::<Address>() {
                Ok(_) => snapshot.name = Fetch::Pending,
                Err(err) => snapshot.name = Fetch::Failed(err.to_string()),
            },
        }
        snapshot
    }

    fn set_profile_pending(&mut self, name: EnsName) {
        self.profile_name = Some(name);
        self.avatar = Fetch::Pending;
        self.texts = TextKey::ALL
            .into_iter()
            .map(|key| (key, Fetch::Pending))
            .collect();
    }

    /// A primary lookup is still running.
    pub fn is_loading(&self) -> bool {
        self.address.is_pending() || self.name.is_pending()
    }

    /// Failure message from either primary lookup.
    pub fn error(&self) -> Option<&str> {
        self.address.error().or_else(|| self.name.error())
    }

    /// No lookup of any kind is still running.
    pub fn is_settled(&self) -> bool {
        !self.is_loading()
            && !self.avatar.is_pending()
            && !self.texts.values().any(Fetch::is_pending)
    }

    pub fn text(&self, key: TextKey) -> Option<&String> {
        self.texts.get(&key).and_then(Fetch::value)
    }
}

struct SessionState {
    generation: u64,
    snapshot: ResolutionSnapshot,
    tasks: Vec<JoinHandle<()>>,
}

struct Shared {
    backend: Arc<dyn EnsBackend>,
    state: RwLock<SessionState>,
    updates: watch::Sender<u64>,
}

impl Shared {
    /// Apply `update` if `generation` is still current; results from an
    /// older submission are dropped.
    fn apply(&self, generation: u64, update: impl FnOnce(&mut ResolutionSnapshot)) -> bool {
        {
            let mut state = self.state.write();
            if state.generation != generation {
                return false;
            }
            update(&mut state.snapshot);
        }
        self.updates.send_modify(|version| *version = version.wrapping_add(1));
        true
    }

    fn track(&self, generation: u64, handles: Vec<JoinHandle<()>>) {
        let mut state = self.state.write();
        if state.generation == generation {
            state.tasks.extend(handles);
        } else {
            handles.iter().for_each(JoinHandle::abort);
        }
    }
}

/// The lookup state of one form: the current query and its lookups.
///
/// Cloning yields another handle to the same session. Submitting spawns
/// tasks on the ambient tokio runtime.
#[derive(Clone)]
pub struct LookupSession {
    shared: Arc<Shared>,
}

impl LookupSession {
    pub fn new(backend: Arc<dyn EnsBackend>) -> Self {
        let (updates, _) = watch::channel(0);
        Self {
            shared: Arc::new(Shared {
                backend,
                state: RwLock::new(SessionState {
                    generation: 0,
                    snapshot: ResolutionSnapshot::default(),
                    tasks: Vec::new(),
                }),
                updates,
            }),
        }
    }

    /// Publish `query`: cancel the previous query's lookups, reset the
    /// snapshot and start the lookups the new query calls for.
    pub fn submit(&self, query: LookupQuery) -> u64 {
        let snapshot = ResolutionSnapshot::for_query(&query);
        let generation = {
            let mut state = self.shared.state.write();
            state.generation += 1;
            for task in state.tasks.drain(..) {
                task.abort();
            }
            state.snapshot = snapshot.clone();
            state.generation
        };
        self.shared
            .updates
            .send_modify(|version| *version = version.wrapping_add(1));

        info!(mode = %query.mode, value = %query.value, generation, "lookup submitted");
        if let Some(err) = snapshot.error() {
            warn!(generation, %err, "lookup input rejected");
        }

        let mut handles = Vec::new();
        match query.mode {
            LookupMode::Name if snapshot.address.is_pending() => {
                if let Some(name) = snapshot.profile_name.clone() {
                    handles.push(self.spawn_forward(generation, name.clone()));
                    handles.extend(spawn_profile(&self.shared, generation, name));
                }
            }
            LookupMode::Address if snapshot.name.is_pending() => {
                if let Ok(address) = query.value.parse::<Address>() {
                    handles.push(self.spawn_reverse(generation, address));
                }
            }
            _ => {}
        }
        self.shared.track(generation, handles);
        generation
    }

    fn spawn_forward(&self, generation: u64, name: EnsName) -> JoinHandle<()> {
        let shared = self.shared.clone();
        tokio::spawn(async move {
            let result = shared.backend.resolve_address(&name).await;
            match &result {
                Ok(address) => debug!(generation, %name, ?address, "forward lookup finished"),
                Err(err) => warn!(generation, %name, %err, "forward lookup failed"),
            }
            shared.apply(generation, |snapshot| {
                snapshot.address = Fetch::from_result(result);
            });
        })
    }

    fn spawn_reverse(&self, generation: u64, address: Address) -> JoinHandle<()> {
        let shared = self.shared.clone();
        tokio::spawn(async move {
            let result = shared.backend.lookup_name(&address).await;
            let profile = match &result {
                Ok(name) => {
                    debug!(generation, %address, ?name, "reverse lookup finished");
                    name.clone()
                }
                Err(err) => {
                    warn!(generation, %address, %err, "reverse lookup failed");
                    None
                }
            };

            let current = shared.apply(generation, |snapshot| {
                snapshot.name = Fetch::from_result(result);
                if let Some(name) = &profile {
                    snapshot.set_profile_pending(name.clone());
                }
            });

            if let (true, Some(name)) = (current, profile) {
                let handles = spawn_profile(&shared, generation, name);
                shared.track(generation, handles);
            }
        })
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> ResolutionSnapshot {
        self.shared.state.read().snapshot.clone()
    }

    pub fn generation(&self) -> u64 {
        self.shared.state.read().generation
    }

    /// Receiver that changes whenever the snapshot does.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.updates.subscribe()
    }

    /// Wait until no lookup is pending and return that snapshot.
    pub async fn settled(&self) -> ResolutionSnapshot {
        let mut updates = self.subscribe();
        loop {
            let snapshot = self.snapshot();
            if snapshot.is_settled() {
                return snapshot;
            }
            if updates.changed().await.is_err() {
                return self.snapshot();
            }
        }
    }
}

/// Issue the avatar and text lookups for `name`; each lands independently.
fn spawn_profile(shared: &Arc<Shared>, generation: u64, name: EnsName) -> Vec<JoinHandle<()>> {
    let mut handles = Vec::with_capacity(TextKey::ALL.len() + 1);

    let avatar_shared = shared.clone();
    let avatar_name = name.clone();
    handles.push(tokio::spawn(async move {
        let result = avatar_shared.backend.avatar(&avatar_name).await;
        if let Err(err) = &result {
            debug!(generation, name = %avatar_name, %err, "avatar lookup failed");
        }
        avatar_shared.apply(generation, |snapshot| {
            snapshot.avatar = Fetch::from_result(result);
        });
    }));

    for key in TextKey::ALL {
        let shared = shared.clone();
        let name = name.clone();
        handles.push(tokio::spawn(async move {
            let result = shared.backend.text(&name, key).await;
            if let Err(err) = &result {
                debug!(generation, %name, %key, %err, "text lookup failed");
            }
            shared.apply(generation, |snapshot| {
                snapshot.texts.insert(key, Fetch::from_result(result));
            });
        }));
    }
    handles
}

/// Resolve `query` to completion and return the settled snapshot.
pub async fn resolve_once(backend: Arc<dyn EnsBackend>, query: LookupQuery) -> ResolutionSnapshot {
    let session = LookupSession::new(backend);
    session.submit(query);
    session.settled().await
}
