//! In-memory, newest-first, bounded widget collection.

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{
    error::CapacityError,
    model::{WeatherObservation, Widget, WidgetId},
};

/// Issues `widget-<epoch ms>-<seq>` ids. The sequence keeps ids unique when
/// several widgets are created within one clock tick.
#[derive(Debug, Default)]
pub struct WidgetIdGenerator {
    seq: AtomicU64,
}

impl WidgetIdGenerator {
    pub fn next_id(&self) -> WidgetId {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        WidgetId::new(format!("widget-{}-{seq}", Utc::now().timestamp_millis()))
    }
}

#[derive(Debug)]
pub struct WidgetStore {
    widgets: Vec<Widget>,
    max_widgets: usize,
    ids: WidgetIdGenerator,
}

impl WidgetStore {
    pub fn new(max_widgets: usize) -> Self {
        Self {
            widgets: Vec::with_capacity(max_widgets),
            max_widgets,
            ids: WidgetIdGenerator::default(),
        }
    }

    pub fn max_widgets(&self) -> usize {
        self.max_widgets
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.widgets.len() >= self.max_widgets
    }

    /// Prepend a new widget and return its id.
    pub fn add(&mut self, observation: WeatherObservation) -> Result<WidgetId, CapacityError> {
        if self.is_full() {
            return Err(CapacityError {
                max: self.max_widgets,
            });
        }

        let id = self.ids.next_id();
        self.widgets.insert(
            0,
            Widget {
                id: id.clone(),
                data: observation,
            },
        );
        Ok(id)
    }

    /// Returns whether a widget was removed.
    pub fn remove(&mut self, id: &WidgetId) -> bool {
        let before = self.widgets.len();
        self.widgets.retain(|w| &w.id != id);
        self.widgets.len() != before
    }

    /// Replace a widget's data in place. Returns `false` if the id is unknown.
    pub fn update(&mut self, id: &WidgetId, observation: WeatherObservation) -> bool {
        match self.widgets.iter_mut().find(|w| &w.id == id) {
            Some(widget) => {
                widget.data = observation;
                true
            }
            None => false,
        }
    }

    pub fn find(&self, id: &WidgetId) -> Option<&Widget> {
        self.widgets.iter().find(|w| &w.id == id)
    }

    pub fn list(&self) -> &[Widget] {
        &self.widgets
    }

    pub fn clear(&mut self) {
        self.widgets.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CompassPoint, Coordinate, WeatherCode};
    use std::collections::HashSet;

    fn obs(latitude: f64) -> WeatherObservation {
        WeatherObservation {
            coordinates: Coordinate { latitude, longitude: 10.0 },
            temperature_c: 1.0,
            wind_speed_kmh: 2.0,
            wind_direction: CompassPoint::North,
            weather_code: WeatherCode(0),
            local_time: "12:00".into(),
            timezone: "UTC".into(),
            observed_at_epoch_ms: 0,
        }
    }

    fn latitudes(store: &WidgetStore) -> Vec<f64> {
        store.list().iter().map(|w| w.coordinates().latitude).collect()
    }

    #[test]
    fn add_prepends() {
        let mut store = WidgetStore::new(10);
        store.add(obs(1.0)).expect("add");
        store.add(obs(2.0)).expect("add");
        store.add(obs(3.0)).expect("add");

        assert_eq!(latitudes(&store), vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn ids_are_unique_within_one_tick() {
        let mut store = WidgetStore::new(10);
        let ids: HashSet<_> = (0..10).map(|i| store.add(obs(i as f64)).expect("add")).collect();

        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn add_beyond_capacity_fails() {
        let mut store = WidgetStore::new(10);
        for i in 0..10 {
            store.add(obs(i as f64)).expect("add");
        }

        let err = store.add(obs(99.0)).unwrap_err();
        assert_eq!(err, CapacityError { max: 10 });
        assert_eq!(store.len(), 10);
        assert!(store.is_full());
    }

    #[test]
    fn remove_keeps_order_and_is_idempotent() {
        let mut store = WidgetStore::new(10);
        store.add(obs(1.0)).expect("add");
        let middle = store.add(obs(2.0)).expect("add");
        store.add(obs(3.0)).expect("add");

        assert!(store.remove(&middle));
        assert_eq!(latitudes(&store), vec![3.0, 1.0]);

        assert!(!store.remove(&middle));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn update_replaces_in_place() {
        let mut store = WidgetStore::new(10);
        store.add(obs(1.0)).expect("add");
        let target = store.add(obs(2.0)).expect("add");
        store.add(obs(3.0)).expect("add");

        let mut fresh = obs(2.0);
        fresh.temperature_c = 25.0;
        assert!(store.update(&target, fresh));

        assert_eq!(store.list()[1].id, target);
        assert_eq!(store.list()[1].data.temperature_c, 25.0);
        assert_eq!(latitudes(&store), vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn update_of_unknown_id_is_noop() {
        let mut store = WidgetStore::new(10);
        let id = store.add(obs(1.0)).expect("add");
        store.remove(&id);

        assert!(!store.update(&id, obs(5.0)));
        assert!(store.is_empty());
        assert!(store.find(&id).is_none());
    }
}
