use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use retrocast_common::config::ProviderConfig;
use retrocast_common::error::RetrocastError;
use retrocast_forecast_model::{austin, Condition};
use retrocast_weather::{parse_forecast, WeatherClient};

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join("owm")
        .join(name);
    std::fs::read_to_string(path).expect("fixture should be readable")
}

/// Serve canned responses on a local port. `route` maps a request path
/// (without query) to `(status, body)`. Returns the base URL and a hit counter.
fn serve<F>(route: F) -> (String, Arc<AtomicUsize>)
where
    F: Fn(&str) -> (u16, String) + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind local port");
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut request_line = String::new();
            if reader.read_line(&mut request_line).is_err() {
                continue;
            }
            loop {
                let mut header = String::new();
                match reader.read_line(&mut header) {
                    Ok(0) => break,
                    Ok(_) if header == "\r\n" => break,
                    Ok(_) => {}
                    Err(_) => break,
                }
            }

            counter.fetch_add(1, Ordering::SeqCst);
            let target = request_line.split_whitespace().nth(1).unwrap_or("/");
            let path = target.split('?').next().unwrap_or("/");
            let (status, body) = route(path);

            let response = format!(
                "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).ok();
            stream.flush().ok();
        }
    });

    (base_url, hits)
}

fn provider(base_url: &str, retries: u32) -> ProviderConfig {
    ProviderConfig {
        base_url: base_url.to_string(),
        request_timeout_secs: 5,
        retries,
        retry_backoff_ms: 1,
        api_key: None,
    }
}

#[test]
fn fixture_reduces_to_three_days() {
    let (days, offset) = parse_forecast(&fixture("forecast_austin.json")).unwrap();

    assert_eq!(offset.local_minus_utc(), -5 * 3600);
    assert_eq!(days.len(), 3);

    let summary: Vec<_> = days
        .iter()
        .map(|d| (d.date, d.high, d.low, d.condition.clone()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(), 72, 51, Condition::Clear),
            (NaiveDate::from_ymd_opt(2024, 5, 3).unwrap(), 75, 55, Condition::Clouds),
            (NaiveDate::from_ymd_opt(2024, 5, 4).unwrap(), 68, 48, Condition::Rain),
        ]
    );
    assert_eq!(days[0].pressure_hpa, Some(1017.0));
}

#[test]
fn fetch_builds_record_with_map_readings() {
    let forecast = fixture("forecast_austin.json");
    let current = fixture("current_houston.json");
    let (base_url, _) = serve(move |path| match path {
        "/forecast" => (200, forecast.clone()),
        "/weather" => (200, current.clone()),
        _ => (404, r#"{"message":"not found"}"#.to_string()),
    });

    let client = WeatherClient::new(&provider(&base_url, 0), "test-key").unwrap();
    let record = client.fetch_forecast(&austin()).unwrap();

    assert_eq!(record.code, "ATX");
    assert_eq!(record.city, "Austin");
    assert_eq!(record.days.len(), 3);
    assert_eq!(record.issued_at.offset().local_minus_utc(), -5 * 3600);
    assert!(record.validate().is_ok());

    assert_eq!(record.map_title, "UNITED STATES");
    assert_eq!(record.map.len(), austin().map.cities.len());
    assert_eq!(record.map.len(), 4);
    assert_eq!(record.map[0].name, "Houston");
    assert!(record.map.iter().all(|r| r.temp == Some(81)));
    assert!(record
        .map
        .iter()
        .all(|r| r.condition == Some(Condition::Clouds)));
}

#[test]
fn map_failures_do_not_fail_the_location() {
    let forecast = fixture("forecast_austin.json");
    let (base_url, _) = serve(move |path| match path {
        "/forecast" => (200, forecast.clone()),
        _ => (500, "upstream broke".to_string()),
    });

    let client = WeatherClient::new(&provider(&base_url, 0), "test-key").unwrap();
    let record = client.fetch_forecast(&austin()).unwrap();

    assert_eq!(record.days.len(), 3);
    assert!(record.map.iter().all(|r| r.temp.is_none()));
}

#[test]
fn malformed_json_is_a_parse_error() {
    let (base_url, _) = serve(|_| (200, r#"{"list": [{"dt": 1"#.to_string()));

    let client = WeatherClient::new(&provider(&base_url, 0), "test-key").unwrap();
    let err = client.fetch_forecast(&austin()).unwrap_err();

    assert!(matches!(err, RetrocastError::Parse { .. }), "{err}");
    assert!(!err.is_fatal());
}

#[test]
fn client_errors_are_not_retried() {
    let (base_url, hits) = serve(|_| {
        (
            401,
            r#"{"cod":401,"message":"Invalid API key."}"#.to_string(),
        )
    });

    let client = WeatherClient::new(&provider(&base_url, 3), "wrong-key").unwrap();
    let err = client.fetch_forecast(&austin()).unwrap_err();

    match err {
        RetrocastError::Provider { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid API key.");
        }
        other => panic!("expected provider error, got {other}"),
    }
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn server_errors_are_retried_within_budget() {
    let (base_url, hits) = serve(|_| (503, "busy".to_string()));

    let client = WeatherClient::new(&provider(&base_url, 2), "test-key").unwrap();
    let err = client.fetch_forecast(&austin()).unwrap_err();

    assert!(matches!(err, RetrocastError::Provider { status: 503, .. }));
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[test]
fn api_key_never_appears_in_errors() {
    // Nothing listens on this port once the listener is dropped.
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let client = WeatherClient::new(&provider(&base_url, 0), "super-secret-key").unwrap();
    let err = client.fetch_forecast(&austin()).unwrap_err();

    assert!(matches!(err, RetrocastError::Fetch { .. }));
    assert!(!err.to_string().contains("super-secret-key"));
}
