use fxchart::core::config::AppConfig;
use fxchart::core::{FetchError, FetchOutcome, PointIndexing};
use std::fs;
use tracing::info;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod test_utils {
    use super::*;

    pub async fn create_rates_mock_server(
        currency: &str,
        status_code: u16,
        mock_response: &str,
    ) -> MockServer {
        let mock_server = MockServer::start().await;
        let url_path = format!("/exchange_rates/{currency}");

        Mock::given(method("GET"))
            .and(path(&url_path))
            .and(query_param("sort", "date ASC"))
            .respond_with(ResponseTemplate::new(status_code).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub fn write_config(dir: &tempfile::TempDir, base_url: &str, indexing: &str) -> String {
        let config_path = dir.path().join("config.yaml");
        let config_content = format!(
            r#"
base_currency: "MXN"
indexing: {indexing}
providers:
  exchange_rates:
    base_url: {base_url}
    timeout_secs: 5
chart:
  width: 640
  height: 480
"#
        );
        fs::write(&config_path, config_content).expect("Failed to write config file");
        config_path.to_string_lossy().into_owned()
    }

    pub fn chart_args(dir: &tempfile::TempDir, start: i64, end: i64) -> fxchart::ChartArgs {
        fxchart::ChartArgs {
            currency: "USD".parse().unwrap(),
            start: Some(start),
            end: Some(end),
            indexing: None,
            output: Some(dir.path().join("USD_MXN.svg")),
        }
    }
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_mock() {
    let mock_response = r#"[
        {"date": 1705276800, "rate": 17.05},
        {"date": 1705363200, "rate": 17.12},
        {"date": 1705449600, "rate": 17.09}
    ]"#;
    let mock_server = test_utils::create_rates_mock_server("USD", 200, mock_response).await;

    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(&dir, &mock_server.uri(), "timestamp");
    let args = test_utils::chart_args(&dir, 1_705_276_800, 1_705_449_600);
    let output = args.output.clone().unwrap();

    let result = fxchart::run_command(fxchart::AppCommand::Chart(args), Some(&config_path)).await;
    assert!(
        result.is_ok(),
        "Main function failed with: {:?}",
        result.err()
    );

    let svg = fs::read_to_string(&output).expect("Chart was not written");
    info!(bytes = svg.len(), "Chart written");
    assert!(svg.contains("USD/MXN"));
}

#[test_log::test(tokio::test)]
async fn test_timestamp_points_follow_provider_order() {
    let mock_response = r#"[{"date": 100, "rate": 17.5}, {"date": 200, "rate": 17.8}]"#;
    let mock_server = test_utils::create_rates_mock_server("USD", 200, mock_response).await;

    let dir = tempfile::TempDir::new().unwrap();
    let config = AppConfig::load_from_path(test_utils::write_config(
        &dir,
        &mock_server.uri(),
        "timestamp",
    ))
    .unwrap();

    let first = fxchart::chart(test_utils::chart_args(&dir, 100, 200), &config)
        .await
        .unwrap();
    let second = fxchart::chart(test_utils::chart_args(&dir, 100, 200), &config)
        .await
        .unwrap();
    assert_eq!(first, second);

    match first {
        FetchOutcome::Populated(series) => {
            assert_eq!(series.label, "USD/MXN");
            assert_eq!(series.indexing, PointIndexing::Timestamp);
            let points: Vec<(f64, f64)> = series.points.iter().map(|p| (p.x, p.y)).collect();
            assert_eq!(points, vec![(100.0, 17.5), (200.0, 17.8)]);
        }
        other => panic!("Expected populated outcome, got {other:?}"),
    }
}

#[test_log::test(tokio::test)]
async fn test_ordinal_indexing_from_config() {
    let mock_response = r#"[{"date": 100, "rate": 17.5}, {"date": 200, "rate": 17.8}]"#;
    let mock_server = test_utils::create_rates_mock_server("USD", 200, mock_response).await;

    let dir = tempfile::TempDir::new().unwrap();
    let config = AppConfig::load_from_path(test_utils::write_config(
        &dir,
        &mock_server.uri(),
        "ordinal",
    ))
    .unwrap();

    match fxchart::chart(test_utils::chart_args(&dir, 100, 200), &config)
        .await
        .unwrap()
    {
        FetchOutcome::Populated(series) => {
            let xs: Vec<f64> = series.points.iter().map(|p| p.x).collect();
            assert_eq!(xs, vec![0.0, 1.0]);
        }
        other => panic!("Expected populated outcome, got {other:?}"),
    }
}

#[test_log::test(tokio::test)]
async fn test_empty_and_failed_outcomes() {
    let dir = tempfile::TempDir::new().unwrap();

    let empty_server = test_utils::create_rates_mock_server("USD", 200, "[]").await;
    let config = AppConfig::load_from_path(test_utils::write_config(
        &dir,
        &empty_server.uri(),
        "timestamp",
    ))
    .unwrap();
    let outcome = fxchart::chart(test_utils::chart_args(&dir, 100, 200), &config)
        .await
        .unwrap();
    assert_eq!(outcome, FetchOutcome::Empty);

    let failing_server = test_utils::create_rates_mock_server("USD", 503, "").await;
    let config = AppConfig::load_from_path(test_utils::write_config(
        &dir,
        &failing_server.uri(),
        "timestamp",
    ))
    .unwrap();
    let outcome = fxchart::chart(test_utils::chart_args(&dir, 100, 200), &config)
        .await
        .unwrap();
    match outcome {
        FetchOutcome::Failed(FetchError::QueryFailure(reason)) => {
            assert!(reason.contains("503"));
        }
        other => panic!("Expected query failure, got {other:?}"),
    }
}

#[test_log::test(tokio::test)]
async fn test_malformed_rate_fails_whole_request() {
    let mock_response = r#"[{"date": 100, "rate": 17.5}, {"date": 200, "rate": null}]"#;
    let mock_server = test_utils::create_rates_mock_server("USD", 200, mock_response).await;

    let dir = tempfile::TempDir::new().unwrap();
    let config = AppConfig::load_from_path(test_utils::write_config(
        &dir,
        &mock_server.uri(),
        "timestamp",
    ))
    .unwrap();

    let outcome = fxchart::chart(test_utils::chart_args(&dir, 100, 200), &config)
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        FetchOutcome::Failed(FetchError::QueryFailure(_))
    ));
    assert!(!dir.path().join("USD_MXN.svg").exists());
}

#[test_log::test(tokio::test)]
async fn test_inverted_range_issues_no_query() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = tempfile::TempDir::new().unwrap();
    let config = AppConfig::load_from_path(test_utils::write_config(
        &dir,
        &mock_server.uri(),
        "timestamp",
    ))
    .unwrap();

    let outcome = fxchart::chart(test_utils::chart_args(&dir, 200, 100), &config)
        .await
        .unwrap();
    assert_eq!(
        outcome,
        FetchOutcome::Failed(FetchError::InvalidRange {
            start: 200,
            end: 100
        })
    );
}
