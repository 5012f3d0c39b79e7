//! Integration tests for `OpenWeatherClient` against a local mock server.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use skycast_core::OpenWeatherClient;
use skycast_core::provider::WeatherProvider;

fn client_for(server: &MockServer) -> OpenWeatherClient {
    OpenWeatherClient::with_base_urls(
        "TEST_KEY".to_string(),
        "en".to_string(),
        server.uri(),
        server.uri(),
    )
}

fn current_weather_body() -> serde_json::Value {
    json!({
        "id": 2643743,
        "name": "London",
        "sys": { "country": "GB" },
        "main": {
            "temp": 11.2,
            "feels_like": 10.1,
            "humidity": 76,
            "pressure": 1012
        },
        "weather": [
            { "main": "Clouds", "description": "overcast clouds" },
            { "main": "Mist", "description": "mist" }
        ],
        "wind": { "speed": 4.1 }
    })
}

#[tokio::test]
async fn current_parses_snapshot_and_sends_expected_params() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "London"))
        .and(query_param("appid", "TEST_KEY"))
        .and(query_param("units", "metric"))
        .and(query_param("lang", "en"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_weather_body()))
        .expect(1)
        .mount(&server)
        .await;

    let snapshot = client_for(&server)
        .current("London")
        .await
        .expect("current weather");

    assert_eq!(snapshot.city_id, 2643743);
    assert_eq!(snapshot.name, "London");
    assert_eq!(snapshot.country, "GB");
    assert_eq!(snapshot.temperature_c, 11.2);
    assert_eq!(snapshot.feels_like_c, 10.1);
    assert_eq!(snapshot.humidity_pct, 76);
    assert_eq!(snapshot.pressure_hpa, 1012);
    assert_eq!(snapshot.wind_speed_mps, 4.1);
    // First condition wins.
    assert_eq!(snapshot.condition_main, "Clouds");
    assert_eq!(snapshot.condition_description, "overcast clouds");
}

#[tokio::test]
async fn unresolved_city_maps_to_city_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({ "cod": "404", "message": "city not found" })),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .current("Nowhereville")
        .await
        .expect_err("must fail");

    assert!(err.is_city_not_found(), "got: {err:?}");
}

#[tokio::test]
async fn provider_outage_is_not_city_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .current("London")
        .await
        .expect_err("must fail");

    assert!(!err.is_city_not_found(), "got: {err:?}");
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn localized_error_body_is_reported_not_panicked() {
    let server = MockServer::start().await;

    // Error body with a multibyte character straddling the truncation cut.
    let body = format!("{}échec du serveur en amont", "x".repeat(199));
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(500).set_body_string(body))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .current("London")
        .await
        .expect_err("must fail");

    assert!(matches!(err, skycast_core::FetchError::Api { .. }), "got: {err:?}");
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn forecast_parses_chronological_entries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("q", "London"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "list": [
                {
                    "dt": 1767268800,
                    "main": { "temp": 8.4 },
                    "weather": [{ "main": "Rain", "description": "light rain" }]
                },
                {
                    "dt": 1767279600,
                    "main": { "temp": 9.9 },
                    "weather": [{ "main": "Clouds", "description": "broken clouds" }]
                }
            ]
        })))
        .mount(&server)
        .await;

    let entries = client_for(&server)
        .forecast("London")
        .await
        .expect("forecast");

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].temperature_c, 8.4);
    assert_eq!(entries[0].condition_main, "Rain");
    assert!(entries[0].timestamp < entries[1].timestamp);
}

#[tokio::test]
async fn suggest_preserves_provider_order_and_limit_param() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/direct"))
        .and(query_param("q", "Lond"))
        .and(query_param("limit", "5"))
        .and(query_param("appid", "TEST_KEY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "London", "country": "GB", "lat": 51.5074, "lon": -0.1278 },
            { "name": "London", "country": "CA", "lat": 42.9836, "lon": -81.2497 },
            { "name": "Londrina", "country": "BR", "lat": -23.3045, "lon": -51.1696 }
        ])))
        .mount(&server)
        .await;

    let suggestions = client_for(&server).suggest("Lond").await.expect("suggest");

    assert_eq!(suggestions.len(), 3);
    assert_eq!(suggestions[0].country, "GB");
    assert_eq!(suggestions[1].country, "CA");
    assert_eq!(suggestions[2].name, "Londrina");
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .current("London")
        .await
        .expect_err("must fail");

    assert!(matches!(err, skycast_core::FetchError::Decode(_)));
}
