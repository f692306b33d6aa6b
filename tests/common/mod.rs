//! Fake platform collaborators for driving the controller in tests.

#![allow(dead_code)]

use async_trait::async_trait;
use location_picker::network::{GeocodeError, Place, PlaceAddress};
use location_picker::types::{
    CameraRegion, GeoCoordinate, LocationError, PermissionRequest, PermissionStatus, Position,
    PositionOptions,
};
use location_picker::{
    LocationPicker, LocationSource, MapHandle, Navigator, PermissionGate, PickerConfig, PlatformError,
    ReverseGeocoder,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, Weak};
use std::time::Duration;

pub fn coord(lat: f64, lng: f64) -> GeoCoordinate {
    GeoCoordinate::new_unchecked(lat, lng)
}

pub fn place(coords: GeoCoordinate, name: &str) -> Place {
    Place {
        coords,
        display_name: name.to_string(),
        address: PlaceAddress::default(),
    }
}

pub struct FakePermissions {
    answer: Result<PermissionStatus, PlatformError>,
    pub requests: Mutex<Vec<PermissionRequest>>,
}

impl FakePermissions {
    pub fn answering(answer: Result<PermissionStatus, PlatformError>) -> Self {
        Self {
            answer,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl PermissionGate for FakePermissions {
    async fn request(&self, request: &PermissionRequest) -> Result<PermissionStatus, PlatformError> {
        self.requests.lock().unwrap().push(request.clone());
        self.answer.clone()
    }
}

/// Answers queued fixes in order; hangs forever when the queue is empty.
#[derive(Default)]
pub struct FakeLocator {
    fixes: Mutex<VecDeque<(Duration, Result<Position, LocationError>)>>,
    pub calls: Mutex<Vec<PositionOptions>>,
}

impl FakeLocator {
    pub fn push(&self, fix: Result<Position, LocationError>) {
        self.push_delayed(Duration::ZERO, fix);
    }

    pub fn push_delayed(&self, delay: Duration, fix: Result<Position, LocationError>) {
        self.fixes.lock().unwrap().push_back((delay, fix));
    }

    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl LocationSource for FakeLocator {
    async fn current_position(&self, options: PositionOptions) -> Result<Position, LocationError> {
        self.calls.lock().unwrap().push(options);
        let next = self.fixes.lock().unwrap().pop_front();
        match next {
            Some((delay, fix)) => {
                tokio::time::sleep(delay).await;
                fix
            }
            None => std::future::pending().await,
        }
    }
}

/// Resolves every coordinate through a user-supplied rule after a
/// per-coordinate delay.
pub struct FakeGeocoder {
    rule: Box<dyn Fn(GeoCoordinate) -> (Duration, Result<Place, GeocodeError>) + Send + Sync>,
    pub requests: Mutex<Vec<GeoCoordinate>>,
    /// Lookups that ran to the end rather than being dropped mid-wait.
    pub completed: AtomicUsize,
}

impl FakeGeocoder {
    pub fn new(
        rule: impl Fn(GeoCoordinate) -> (Duration, Result<Place, GeocodeError>) + Send + Sync + 'static,
    ) -> Self {
        Self {
            rule: Box::new(rule),
            requests: Mutex::new(Vec::new()),
            completed: AtomicUsize::new(0),
        }
    }

    /// Always answers `name` immediately.
    pub fn named(name: &'static str) -> Self {
        Self::new(move |c| (Duration::ZERO, Ok(place(c, name))))
    }

    pub fn requested(&self) -> Vec<GeoCoordinate> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReverseGeocoder for FakeGeocoder {
    async fn reverse(&self, coords: GeoCoordinate) -> Result<Place, GeocodeError> {
        self.requests.lock().unwrap().push(coords);
        let (delay, result) = (self.rule)(coords);
        tokio::time::sleep(delay).await;
        self.completed.fetch_add(1, Ordering::SeqCst);
        result
    }
}

#[derive(Default)]
pub struct MapLog {
    pub animations: Mutex<Vec<(CameraRegion, Duration)>>,
    pub markers: Mutex<Vec<Option<GeoCoordinate>>>,
    pub dropped: AtomicUsize,
}

/// Map handle that records calls into a shared log.
pub struct RecordingMap(pub Arc<MapLog>);

impl MapHandle for RecordingMap {
    fn animate_to_region(&self, region: CameraRegion, duration: Duration) {
        self.0.animations.lock().unwrap().push((region, duration));
    }

    fn set_marker(&self, marker: Option<GeoCoordinate>) {
        self.0.markers.lock().unwrap().push(marker);
    }
}

impl Drop for RecordingMap {
    fn drop(&mut self) {
        self.0.dropped.fetch_add(1, Ordering::SeqCst);
    }
}

/// Map handle that reads the picker's marker back every time it is driven.
#[derive(Default)]
pub struct ReadBackMap {
    pub picker: OnceLock<Weak<LocationPicker>>,
    pub seen: Arc<Mutex<Vec<Option<GeoCoordinate>>>>,
}

impl ReadBackMap {
    fn read_back(&self) {
        if let Some(picker) = self.picker.get().and_then(Weak::upgrade) {
            let marker = picker.view().marker;
            assert_eq!(marker, picker.marker());
            self.seen.lock().unwrap().push(marker);
        }
    }
}

impl MapHandle for ReadBackMap {
    fn animate_to_region(&self, _region: CameraRegion, _duration: Duration) {
        self.read_back();
    }

    fn set_marker(&self, _marker: Option<GeoCoordinate>) {
        self.read_back();
    }
}

#[derive(Default)]
pub struct FakeNavigator {
    pub back: AtomicUsize,
}

impl Navigator for FakeNavigator {
    fn go_back(&self) {
        self.back.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct Harness {
    pub picker: LocationPicker,
    pub permissions: Arc<FakePermissions>,
    pub locator: Arc<FakeLocator>,
    pub geocoder: Arc<FakeGeocoder>,
    pub navigator: Arc<FakeNavigator>,
}

impl Harness {
    pub fn new(permission: Result<PermissionStatus, PlatformError>, geocoder: FakeGeocoder) -> Self {
        Self::with_config(PickerConfig::default(), permission, geocoder)
    }

    pub fn with_config(
        config: PickerConfig,
        permission: Result<PermissionStatus, PlatformError>,
        geocoder: FakeGeocoder,
    ) -> Self {
        let permissions = Arc::new(FakePermissions::answering(permission));
        let locator = Arc::new(FakeLocator::default());
        let geocoder = Arc::new(geocoder);
        let navigator = Arc::new(FakeNavigator::default());

        let picker = LocationPicker::builder()
            .config(config)
            .permissions(permissions.clone())
            .locator(locator.clone())
            .geocoder(geocoder.clone())
            .navigator(navigator.clone())
            .build()
            .expect("valid picker");

        Self {
            picker,
            permissions,
            locator,
            geocoder,
            navigator,
        }
    }

    pub fn granted(geocoder: FakeGeocoder) -> Self {
        Self::new(Ok(PermissionStatus::Granted), geocoder)
    }

    pub fn attach_map(&self) -> Arc<MapLog> {
        let log = Arc::new(MapLog::default());
        self.picker
            .attach_map(Box::new(RecordingMap(log.clone())))
            .expect("picker is live");
        log
    }
}
