//! End-to-end tests against a mock report endpoint and token endpoint.
//!
//! The client is blocking, so each test drives it from `spawn_blocking`
//! while wiremock runs on the async runtime.

use awql_report::{
    AppCredentials, Client, ClientConfig, Error, QueryOptions, ReportResult, UserCredentials,
};
use serde_json::json;
use wiremock::matchers::{body_string, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TSV: &str = "\"ACCOUNT_PERFORMANCE_REPORT (Jan 1, 2012-Jan 25, 2015)\"\n\
                   Day\tClicks\n\
                   2015-01-24\t7\n\
                   2015-01-25\t9\n\
                   Total\t16\n";

fn config(uri: &str) -> ClientConfig {
    ClientConfig {
        url: format!("{}/report", uri),
        token_url: format!("{}/token", uri),
        app: Some(AppCredentials {
            client_id: "client-id".into(),
            client_secret: "client-secret".into(),
            developer_token: "dev-token".into(),
        }),
        user: Some(UserCredentials::new("1/refresh", "123-456-7890")),
        ..ClientConfig::default()
    }
}

async fn mount_token(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=1%2Frefresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-1",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn fluent_query_refreshes_once_and_parses() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("POST"))
        .and(path("/report"))
        .and(header("authorization", "Bearer access-1"))
        .and(header("developertoken", "dev-token"))
        .and(header("clientcustomerid", "123-456-7890"))
        .and(header("includezeroimpressions", "true"))
        .and(body_string(
            "__rdquery=SELECT+Date,Clicks+FROM+ACCOUNT_PERFORMANCE_REPORT+DURING+20120101,20150125&__fmt=TSV",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string(TSV))
        .expect(2)
        .mount(&server)
        .await;

    let uri = server.uri();
    let reports: Vec<ReportResult> = tokio::task::spawn_blocking(move || {
        let mut client = Client::new(config(&uri)).unwrap();
        (0..2)
            .map(|_| {
                client
                    .awql()
                    .select(["Date", "Clicks"])
                    .from("ACCOUNT_PERFORMANCE_REPORT")
                    .during(["20120101", "20150125"])
                    .send()
                    .unwrap()
            })
            .collect()
    })
    .await
    .unwrap();

    for report in &reports {
        assert_eq!(report.report_name, "ACCOUNT_PERFORMANCE_REPORT");
        assert_eq!(report.timeframe, "Jan 1, 2012-Jan 25, 2015");
        assert_eq!(report.total, "16");
        assert_eq!(report.records.len(), 2);
        assert!(report.records.iter().all(|r| r.len() == report.column_names.len()));
        assert_eq!(report.records[1]["clicks"], "9");
        assert_eq!(report.auth.access_token.as_deref(), Some("access-1"));
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn refresh_failure_never_sends_the_report() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Bad Request"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/report"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TSV))
        .expect(0)
        .mount(&server)
        .await;

    let uri = server.uri();
    let err = tokio::task::spawn_blocking(move || {
        let mut client = Client::new(config(&uri)).unwrap();
        client
            .awql_str("SELECT Date FROM ACCOUNT_PERFORMANCE_REPORT")
            .send()
            .unwrap_err()
    })
    .await
    .unwrap();

    match err {
        Error::Authentication(detail) => assert!(detail.contains("invalid_grant"), "{detail}"),
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn permission_denied_is_classified() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;

    Mock::given(method("POST"))
        .and(path("/report"))
        .respond_with(ResponseTemplate::new(400).set_body_string(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <reportDownloadError><ApiError>\
             <type>AuthorizationError.USER_PERMISSION_DENIED</type>\
             <trigger>&lt;null&gt;</trigger><fieldPath></fieldPath>\
             </ApiError></reportDownloadError>",
        ))
        .mount(&server)
        .await;

    let uri = server.uri();
    let err = tokio::task::spawn_blocking(move || {
        let mut client = Client::new(config(&uri)).unwrap();
        client
            .awql_str("SELECT Date FROM ACCOUNT_PERFORMANCE_REPORT")
            .send()
            .unwrap_err()
    })
    .await
    .unwrap();

    assert!(
        matches!(err, Error::Request(ref m) if m == "AuthorizationError.USER_PERMISSION_DENIED"),
        "{err:?}"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn json_credentials_with_cached_token_skip_refresh() {
    let server = MockServer::start().await;
    mount_token(&server, 0).await;

    Mock::given(method("POST"))
        .and(path("/report"))
        .and(header("authorization", "Bearer cached"))
        .and(body_string(
            "__rdquery=SELECT+Date,Clicks+FROM+ACCOUNT_PERFORMANCE_REPORT+WHERE+Clicks>100+AND+Clicks<150+AND+Clicks!=110+DURING+LAST_7_DAYS&__fmt=TSV",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string(TSV))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let report = tokio::task::spawn_blocking(move || {
        let mut client = Client::new(ClientConfig {
            app: None,
            user: None,
            ..config(&uri)
        })
        .unwrap();
        client
            .use_json(&json!({
                "clientId": "client-id",
                "clientSecret": "client-secret",
                "developerToken": "dev-token"
            }))
            .unwrap();
        client
            .use_json(&json!({
                "refreshToken": "1/refresh",
                "clientCustomerId": "123-456-7890",
                "accessToken": "cached",
                "tokenExpires": 4_000_000_000u64
            }))
            .unwrap();

        let options: QueryOptions = serde_json::from_value(json!({
            "select": ["Date", "Clicks"],
            "from": "ACCOUNT_PERFORMANCE_REPORT",
            "where": "Clicks>100",
            "and": ["Clicks<150", "Clicks!=110"],
            "during": "LAST_7_DAYS"
        }))
        .unwrap();
        client.awql_options(&options).send().unwrap()
    })
    .await
    .unwrap();

    assert_eq!(report.auth.access_token.as_deref(), Some("cached"));
    assert_eq!(report.auth.token_expires, Some(4_000_000_000));
}
