//! Open-Meteo provider and controller tests against a mock HTTP server.

use std::sync::Arc;

use meteo_core::{
    CompassPoint, Coordinate, NetworkError, WeatherClient, WeatherProvider, WidgetController,
    WidgetError,
    controller::ControllerSettings,
    error::FETCH_FAILED_MESSAGE,
    persistence::{MemoryStore, PersistenceGateway},
    provider::openmeteo::OpenMeteoProvider,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MOSCOW: Coordinate = Coordinate {
    latitude: 55.7558,
    longitude: 37.6173,
};

fn moscow_body() -> serde_json::Value {
    serde_json::json!({
        "latitude": 55.75,
        "longitude": 37.625,
        "timezone": "Europe/Moscow",
        "current_weather": {
            "temperature": 5.0,
            "windspeed": 10.0,
            "winddirection": 90,
            "weathercode": 0,
            "time": "2024-01-01T12:00"
        }
    })
}

async fn mount_moscow(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "55.7558"))
        .and(query_param("longitude", "37.6173"))
        .and(query_param("current_weather", "true"))
        .and(query_param("timezone", "auto"))
        .respond_with(ResponseTemplate::new(200).set_body_json(moscow_body()))
        .mount(server)
        .await;
}

fn provider(server: &MockServer) -> OpenMeteoProvider {
    OpenMeteoProvider::new(format!("{}/v1/forecast", server.uri()))
}

fn controller(server: &MockServer) -> WidgetController {
    WidgetController::new(
        WeatherClient::new(Arc::new(provider(server))),
        PersistenceGateway::new(Box::new(MemoryStore::new()), 10),
        ControllerSettings {
            max_widgets: 10,
            default_center: MOSCOW,
            zoom_half_extent: 0.01,
        },
    )
}

#[tokio::test]
async fn test_fetch_current_sends_expected_query() {
    let server = MockServer::start().await;
    mount_moscow(&server).await;

    let raw = provider(&server).fetch_current(MOSCOW).await.unwrap();

    assert_eq!(raw.timezone, "Europe/Moscow");
    assert_eq!(raw.current_weather.temperature, 5.0);
    assert_eq!(raw.current_weather.winddirection, 90.0);
    assert_eq!(raw.current_weather.weathercode, 0);
    assert_eq!(raw.current_weather.time, "2024-01-01T12:00");
}

#[tokio::test]
async fn test_fetch_current_server_error_carries_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = provider(&server).fetch_current(MOSCOW).await.unwrap_err();

    match &err {
        NetworkError::Status { status, body } => {
            assert_eq!(*status, 502);
            assert_eq!(body, "bad gateway");
        }
        other => panic!("expected status error, got {other:?}"),
    }
    assert_eq!(err.user_message(), FETCH_FAILED_MESSAGE);
}

#[tokio::test]
async fn test_fetch_current_malformed_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "timezone": "UTC"
        })))
        .mount(&server)
        .await;

    let err = provider(&server).fetch_current(MOSCOW).await.unwrap_err();
    assert!(matches!(err, NetworkError::Parse(_)));
}

#[tokio::test]
async fn test_add_moscow_widget_end_to_end() {
    let server = MockServer::start().await;
    mount_moscow(&server).await;

    let controller = controller(&server);
    let id = controller.add("55.7558", "37.6173").await.unwrap();

    let view = controller.view();
    assert_eq!(view.widgets.len(), 1);

    let widget = &view.widgets[0];
    assert_eq!(widget.id, id);
    assert_eq!(widget.data.wind_direction, CompassPoint::East);
    assert_eq!(widget.data.wind_direction.label(), "В");
    assert_eq!(widget.data.description(), "Ясно");
    assert_eq!(widget.data.temperature_c, 5.0);
    assert_eq!(widget.data.wind_speed_kmh, 10.0);
    assert_eq!(widget.data.local_time, "12:00");
    assert_eq!(widget.data.timezone, "Europe/Moscow");

    let frame = view.map.frame().unwrap();
    assert_eq!(frame.center, MOSCOW);
}

#[tokio::test]
async fn test_add_with_provider_down_reports_generic_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let controller = controller(&server);
    let err = controller.add("55.7558", "37.6173").await.unwrap_err();

    assert!(matches!(err, WidgetError::Network(_)));
    assert!(controller.view().widgets.is_empty());
    assert_eq!(controller.view().banner.unwrap().message, FETCH_FAILED_MESSAGE);
}
