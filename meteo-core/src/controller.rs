//! Orchestrates user intents over the store, the weather client, persistence
//! and the map view, and publishes the resulting [`ViewState`].
//!
//! Intents take `&self` and may run concurrently. All mutable state sits
//! behind one mutex that is never held across an `.await`, so every
//! mutation and its publish happen as one step. Saves run after the state
//! lock is released and are ordered by view revision.

use anyhow::Context;
use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::{
    client::WeatherClient,
    config::Config,
    error::{CapacityError, PersistenceError, REFRESH_FAILED_PREFIX, WidgetError},
    map::{MapView, compute_view},
    model::{Coordinate, Widget, WidgetId},
    persistence::{FileStore, PersistenceGateway},
    provider::provider_from_config,
    store::WidgetStore,
    validate::validate,
};

/// How long an error banner stays visible.
pub const BANNER_TTL_SECS: i64 = 5;

#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub max_widgets: usize,
    pub default_center: Coordinate,
    pub zoom_half_extent: f64,
}

impl From<&Config> for ControllerSettings {
    fn from(config: &Config) -> Self {
        Self {
            max_widgets: config.max_widgets,
            default_center: config.map.default_center,
            zoom_half_extent: config.map.zoom_half_extent,
        }
    }
}

/// Transient error message.
#[derive(Debug, Clone, PartialEq)]
pub struct Banner {
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

impl Banner {
    fn new(message: String) -> Self {
        Self {
            message,
            raised_at: Utc::now(),
        }
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.raised_at) < TimeDelta::seconds(BANNER_TTL_SECS)
    }
}

/// Text last submitted through `add`; cleared after a successful add.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoordinateInput {
    pub latitude: String,
    pub longitude: String,
}

/// Everything a presentation layer needs to draw the current state.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    /// Bumped on every publish.
    pub revision: u64,
    /// Newest first.
    pub widgets: Vec<Widget>,
    pub map: MapView,
    pub banner: Option<Banner>,
    pub input: CoordinateInput,
}

impl ViewState {
    fn empty() -> Self {
        Self {
            revision: 0,
            widgets: Vec::new(),
            map: MapView::Placeholder,
            banner: None,
            input: CoordinateInput::default(),
        }
    }
}

#[derive(Debug)]
pub struct RestoreFailure {
    pub coordinates: Coordinate,
    pub error: WidgetError,
}

/// Outcome of replaying saved widgets at startup.
#[derive(Debug, Default)]
pub struct RestoreReport {
    pub restored: Vec<WidgetId>,
    pub failures: Vec<RestoreFailure>,
}

#[derive(Debug)]
struct ControllerState {
    store: WidgetStore,
    focus: Option<Coordinate>,
    map: MapView,
    banner: Option<Banner>,
    input: CoordinateInput,
    revision: u64,
}

/// Widget list as of one published revision.
#[derive(Debug)]
struct Snapshot {
    revision: u64,
    widgets: Vec<Widget>,
}

#[derive(Debug)]
pub struct WidgetController {
    client: WeatherClient,
    persistence: PersistenceGateway,
    settings: ControllerSettings,
    state: Mutex<ControllerState>,
    /// Revision of the last snapshot written to storage.
    saved_revision: Mutex<u64>,
    view_tx: watch::Sender<ViewState>,
}

impl WidgetController {
    pub fn new(
        client: WeatherClient,
        persistence: PersistenceGateway,
        settings: ControllerSettings,
    ) -> Self {
        let (view_tx, _) = watch::channel(ViewState::empty());

        Self {
            client,
            persistence,
            state: Mutex::new(ControllerState {
                store: WidgetStore::new(settings.max_widgets),
                focus: None,
                map: MapView::Placeholder,
                banner: None,
                input: CoordinateInput::default(),
                revision: 0,
            }),
            settings,
            saved_revision: Mutex::new(0),
            view_tx,
        }
    }

    /// Open-Meteo client and file storage, as configured.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        config.validate()?;

        let data_dir = config.data_dir().context("Failed to resolve widget storage directory")?;
        tracing::debug!(data_dir = %data_dir.display(), "using file storage");

        let client = WeatherClient::new(provider_from_config(config));
        let persistence = PersistenceGateway::new(Box::new(FileStore::new(data_dir)), config.max_widgets);

        Ok(Self::new(client, persistence, ControllerSettings::from(config)))
    }

    /// Latest published view.
    pub fn view(&self) -> ViewState {
        self.view_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.view_tx.subscribe()
    }

    /// Validate raw coordinate text, fetch weather and prepend a widget.
    pub async fn add(&self, raw_latitude: &str, raw_longitude: &str) -> Result<WidgetId, WidgetError> {
        self.state.lock().input = CoordinateInput {
            latitude: raw_latitude.to_string(),
            longitude: raw_longitude.to_string(),
        };

        let coordinates = match validate(raw_latitude, raw_longitude).into_result() {
            Ok(coordinates) => coordinates,
            Err(e) => return Err(self.report(e.into(), None)),
        };

        self.add_coordinates(coordinates).await
    }

    async fn add_coordinates(&self, coordinates: Coordinate) -> Result<WidgetId, WidgetError> {
        let full = {
            let state = self.state.lock();
            state.store.is_full().then(|| CapacityError {
                max: state.store.max_widgets(),
            })
        };
        if let Some(e) = full {
            return Err(self.report(e.into(), None));
        }

        let observation = match self.client.fetch(coordinates).await {
            Ok(observation) => observation,
            Err(e) => return Err(self.report(e.into(), None)),
        };

        let (id, snapshot) = {
            let mut guard = self.state.lock();
            let state = &mut *guard;

            // Another add may have filled the store while this one was fetching.
            let id = match state.store.add(observation) {
                Ok(id) => id,
                Err(e) => {
                    let err = WidgetError::from(e);
                    Self::raise(state, err.user_message());
                    self.publish(state);
                    return Err(err);
                }
            };

            tracing::info!(%id, %coordinates, "widget added");

            self.recompute_map(state);
            state.input = CoordinateInput::default();
            (id, self.publish(state))
        };

        self.persist(snapshot);
        Ok(id)
    }

    /// Returns whether a widget was removed; removing an unknown id is a no-op.
    pub fn remove(&self, id: &WidgetId) -> bool {
        let snapshot = {
            let mut guard = self.state.lock();
            let state = &mut *guard;

            if !state.store.remove(id) {
                return false;
            }

            tracing::info!(%id, "widget removed");

            self.recompute_map(state);
            self.publish(state)
        };

        self.persist(snapshot);
        true
    }

    /// Re-fetch weather for a widget. `Ok(false)` when the widget is unknown
    /// or was removed while the fetch was in flight.
    pub async fn refresh(&self, id: &WidgetId) -> Result<bool, WidgetError> {
        let found = {
            let state = self.state.lock();
            state.store.find(id).map(Widget::coordinates)
        };
        let Some(coordinates) = found else {
            return Ok(false);
        };

        let observation = match self.client.fetch(coordinates).await {
            Ok(observation) => observation,
            Err(e) => return Err(self.report(e.into(), Some(REFRESH_FAILED_PREFIX))),
        };

        let snapshot = {
            let mut guard = self.state.lock();
            let state = &mut *guard;

            if !state.store.update(id, observation) {
                tracing::debug!(%id, "widget removed before refresh completed");
                return Ok(false);
            }

            tracing::info!(%id, "widget refreshed");

            self.publish(state)
        };

        self.persist(snapshot);
        Ok(true)
    }

    /// Center the map on a widget until reset. Returns whether it exists.
    pub fn recenter(&self, id: &WidgetId) -> bool {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let Some(coordinates) = state.store.find(id).map(Widget::coordinates) else {
            return false;
        };

        state.focus = Some(coordinates);
        self.recompute_map(state);
        self.publish(state);
        true
    }

    /// Re-create saved widgets with live weather. Individual failures are
    /// collected, never aborting the rest.
    pub async fn restore(&self) -> RestoreReport {
        let saved = self.persistence.load();
        tracing::info!(count = saved.len(), "restoring saved widgets");

        let mut report = RestoreReport::default();

        // Saved newest-first and add prepends: replay oldest-first to keep the order.
        for entry in saved.into_iter().rev() {
            match self.add_coordinates(entry.coordinates).await {
                Ok(id) => report.restored.push(id),
                Err(error) => {
                    tracing::warn!(coordinates = %entry.coordinates, %error, "failed to restore widget");
                    report.failures.push(RestoreFailure {
                        coordinates: entry.coordinates,
                        error,
                    });
                }
            }
        }

        report
    }

    /// Drop every widget, the map focus and the saved slot.
    pub fn reset(&self) -> Result<(), PersistenceError> {
        let snapshot = {
            let mut guard = self.state.lock();
            let state = &mut *guard;

            state.store.clear();
            state.focus = None;
            state.banner = None;
            state.input = CoordinateInput::default();
            self.recompute_map(state);
            self.publish(state)
        };

        self.write_snapshot(snapshot.revision, |persistence| persistence.clear())
    }

    pub fn dismiss_banner(&self) {
        let mut guard = self.state.lock();
        if guard.banner.take().is_some() {
            self.publish(&mut guard);
        }
    }

    fn report(&self, err: WidgetError, prefix: Option<&str>) -> WidgetError {
        match &err {
            WidgetError::Network(e) => tracing::warn!(error = %e, "weather fetch failed"),
            other => tracing::debug!(error = %other, "intent rejected"),
        }

        let message = match prefix {
            Some(prefix) => format!("{prefix}: {}", err.user_message()),
            None => err.user_message(),
        };

        let mut guard = self.state.lock();
        Self::raise(&mut guard, message);
        self.publish(&mut guard);
        err
    }

    fn raise(state: &mut ControllerState, message: String) {
        state.banner = Some(Banner::new(message));
    }

    fn persist(&self, snapshot: Snapshot) {
        let result = self.write_snapshot(snapshot.revision, |persistence| {
            persistence.save(&snapshot.widgets)
        });
        if let Err(e) = result {
            tracing::error!(error = %e, "failed to save widgets");
        }
    }

    /// Runs `write` unless a newer revision already reached storage.
    fn write_snapshot(
        &self,
        revision: u64,
        write: impl FnOnce(&PersistenceGateway) -> Result<(), PersistenceError>,
    ) -> Result<(), PersistenceError> {
        let mut saved = self.saved_revision.lock();
        if revision <= *saved {
            tracing::debug!(revision, saved = *saved, "skipping stale save");
            return Ok(());
        }

        *saved = revision;
        write(&self.persistence)
    }

    fn recompute_map(&self, state: &mut ControllerState) {
        state.map = compute_view(
            state.store.list(),
            state.focus,
            self.settings.default_center,
            self.settings.zoom_half_extent,
        );
    }

    fn publish(&self, state: &mut ControllerState) -> Snapshot {
        state.revision += 1;
        let widgets = state.store.list().to_vec();
        self.view_tx.send_replace(ViewState {
            revision: state.revision,
            widgets: widgets.clone(),
            map: state.map,
            banner: state.banner.clone(),
            input: state.input.clone(),
        });

        Snapshot {
            revision: state.revision,
            widgets,
        }
    }
}
