use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use weather_decision::config::WeatherConfig;
use weather_decision::models::{LocationFieldType, LocationQuery, ResolvedLocation};
use weather_decision::{ActivityError, Geocoder, OpenWeatherClient, ResolvedCoordinate, WeatherProvider};

fn client_for(server: &MockServer) -> OpenWeatherClient {
    OpenWeatherClient::new(&WeatherConfig {
        api_key: Some("test-key".to_string()),
        base_url: format!("{}/data/2.5", server.uri()),
        geocoding_url: format!("{}/geo/1.0", server.uri()),
        timeout_seconds: 5,
    })
    .unwrap()
}

fn current_weather(main: &str, description: &str, temp: f64) -> serde_json::Value {
    json!({
        "coord": {"lon": -104.99, "lat": 39.74},
        "weather": [{"id": 800, "main": main, "description": description, "icon": "01d"}],
        "main": {"temp": temp, "feels_like": temp, "humidity": 40},
        "sys": {"country": "US"},
        "name": "Denver",
        "cod": 200
    })
}

#[tokio::test]
async fn test_weather_by_coordinates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "39.74"))
        .and(query_param("lon", "-104.99"))
        .and(query_param("appid", "test-key"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_weather("Clear", "clear sky", 21.6)))
        .expect(1)
        .mount(&server)
        .await;

    let location = ResolvedLocation::Coordinate(ResolvedCoordinate::new(39.74, -104.99).unwrap());
    let report = client_for(&server).current_weather(&location).await.unwrap();

    assert_eq!(report.observation.condition_main, "clear");
    assert_eq!(report.observation.description, "clear sky");
    assert_eq!(report.observation.temperature_c, 22);
    assert_eq!(report.observation.humidity_pct, 40);
    assert_eq!(report.location_name.as_deref(), Some("Denver"));
    assert_eq!(report.country.as_deref(), Some("US"));
}

#[tokio::test]
async fn test_weather_by_name_and_zip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "Denver,CO,US"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_weather("Snow", "light snow", -2.5)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("zip", "80202,US"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_weather("Rain", "light rain", 8.0)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);

    let by_name = client
        .current_weather(&ResolvedLocation::Query(LocationQuery::Name("Denver,CO,US".into())))
        .await
        .unwrap();
    assert_eq!(by_name.observation.condition_main, "snow");
    assert_eq!(by_name.observation.temperature_c, -2);

    let by_zip = client
        .current_weather(&ResolvedLocation::Query(LocationQuery::PostalCode("80202,US".into())))
        .await
        .unwrap();
    assert_eq!(by_zip.observation.condition_main, "rain");
}

#[tokio::test]
async fn test_provider_error_keeps_message_and_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"cod": "404", "message": "city not found"})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .current_weather(&ResolvedLocation::Query(LocationQuery::Name("Atlantis".into())))
        .await
        .unwrap_err();

    match err {
        ActivityError::Provider {
            message,
            status,
            response,
        } => {
            assert_eq!(message, "city not found");
            assert_eq!(status, Some(404));
            assert_eq!(response.unwrap()["cod"], "404");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_weather_array_is_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"weather": [], "main": {"temp": 10.0, "humidity": 50}})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server)
        .current_weather(&ResolvedLocation::Query(LocationQuery::Name("Denver".into())))
        .await
        .unwrap_err();
    assert!(matches!(err, ActivityError::Provider { status: None, .. }));
}

#[tokio::test]
async fn test_malformed_body_is_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .current_weather(&ResolvedLocation::Query(LocationQuery::Name("Denver".into())))
        .await
        .unwrap_err();
    assert!(matches!(err, ActivityError::Provider { status: None, .. }));
    assert_eq!(err.status_code(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_geocode_city_hit_and_miss() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .and(query_param("q", "Boulder"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "Boulder", "lat": 40.015, "lon": -105.2705, "country": "US", "state": "Colorado"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .and(query_param("q", "Nowhereville"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let hit = client
        .geocode("Boulder", &LocationFieldType::City)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(hit.lat(), 40.015);
    assert_eq!(hit.lon(), -105.2705);

    let miss = client
        .geocode("Nowhereville", &LocationFieldType::Address)
        .await
        .unwrap();
    assert!(miss.is_none());
}

#[tokio::test]
async fn test_geocode_zip_hit_and_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/1.0/zip"))
        .and(query_param("zip", "80302,US"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "zip": "80302", "name": "Boulder", "lat": 40.0176, "lon": -105.2797, "country": "US"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/geo/1.0/zip"))
        .and(query_param("zip", "00000,US"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"cod": "404", "message": "not found"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);

    let hit = client
        .geocode("80302,US", &LocationFieldType::Zipcode)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(hit.lat(), 40.0176);

    let not_found = client
        .geocode("00000,US", &LocationFieldType::Zipcode)
        .await
        .unwrap();
    assert!(not_found.is_none());
}

#[tokio::test]
async fn test_geocode_unsupported_type_makes_no_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .geocode("u4pruydqqvj", &LocationFieldType::Unsupported("geohash".into()))
        .await
        .unwrap_err();
    assert!(matches!(err, ActivityError::GeocodeFailed { .. }));
}
