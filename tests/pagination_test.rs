use anyhow::Result;
use httpmock::prelude::*;
use serde_json::{json, Value};
use ssp_client::{BaseApi, ClientConfig, DataRequest, Reply};

fn config(server: &MockServer) -> ClientConfig {
    ClientConfig {
        show_progress: false,
        ..ClientConfig::with_base_url(server.base_url())
    }
}

/// 產生 `start..start+n` 的假預測資料
fn predictions(start: usize, n: usize) -> Vec<Value> {
    (start..start + n)
        .map(|i| {
            json!({
                "id": i,
                "name": format!("Object {}", i),
                "principal_designation": format!("2024 A{}", i),
                "date_time": "2024-05-10T03:21:00Z"
            })
        })
        .collect()
}

#[tokio::test]
async fn test_pagination_assembles_exact_count() -> Result<()> {
    let server = MockServer::start_async().await;

    let mut mocks = Vec::new();
    for (page, start, n) in [(1, 0, 100), (2, 100, 100), (3, 200, 50)] {
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/occultations")
                    .query_param("page", page.to_string().as_str())
                    .query_param("pageSize", "100");
                then.status(200)
                    .header("Content-Type", "application/json")
                    .json_body(json!({"count": 250, "results": predictions(start, n)}));
            })
            .await;
        mocks.push(mock);
    }

    let api = BaseApi::new(config(&server), "/api/occultations");
    let request = DataRequest::new().limit(None).show_bar(false);

    let records = api.get_data(&request).await?.data().expect("expected data");

    for mock in &mocks {
        mock.assert_async().await;
    }
    assert_eq!(records.len(), 250);

    // 順序與分頁相同
    let ids: Vec<i64> = records.iter().map(|r| r["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, (0..250).collect::<Vec<i64>>());

    // principal_designation 已改名且位置不變
    let keys: Vec<&str> = records[0].keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["id", "name", "provisional_designation", "date_time"]);
    assert_eq!(records[42]["provisional_designation"], json!("2024 A42"));

    Ok(())
}

#[tokio::test]
async fn test_limit_truncates_and_skips_extra_pages() -> Result<()> {
    let server = MockServer::start_async().await;

    let page1 = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/occultations").query_param("page", "1");
            then.status(200)
                .json_body(json!({"count": 1000, "results": predictions(0, 100)}));
        })
        .await;
    let page2 = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/occultations").query_param("page", "2");
            then.status(200)
                .json_body(json!({"count": 1000, "results": predictions(100, 100)}));
        })
        .await;
    let page3 = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/occultations").query_param("page", "3");
            then.status(200)
                .json_body(json!({"count": 1000, "results": predictions(200, 100)}));
        })
        .await;

    let api = BaseApi::new(config(&server), "/api/occultations");
    let request = DataRequest::new().limit(Some(150)).show_bar(false);

    let records = api.get_data(&request).await?.data().expect("expected data");

    assert_eq!(records.len(), 150);
    assert_eq!(page1.hits_async().await, 1);
    assert_eq!(page2.hits_async().await, 1);
    assert_eq!(page3.hits_async().await, 0);

    Ok(())
}

#[tokio::test]
async fn test_small_limit_sets_page_size() -> Result<()> {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/occultations")
                .query_param("page", "1")
                .query_param("pageSize", "30")
                .query_param("name", "Chariklo,2002 MS4");
            then.status(200)
                .json_body(json!({"count": 500, "results": predictions(0, 30)}));
        })
        .await;

    let api = BaseApi::new(config(&server), "/api/occultations");
    let request = DataRequest::new()
        .param("name", json!(["chariklo", "2002 ms4"]))
        .limit(Some(30))
        .show_bar(false);

    let records = api.get_data(&request).await?.data().expect("expected data");

    mock.assert_async().await;
    assert_eq!(records.len(), 30);

    Ok(())
}

#[tokio::test]
async fn test_empty_result_set() -> Result<()> {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/occultations");
            then.status(200).json_body(json!({"count": 0, "results": []}));
        })
        .await;

    let api = BaseApi::new(config(&server), "/api/occultations");
    let reply = api.get_data(&DataRequest::new().show_bar(false)).await?;

    mock.assert_async().await;
    assert_eq!(reply, Reply::Data(vec![]));

    Ok(())
}

#[tokio::test]
async fn test_http_failure_is_returned_as_value() -> Result<()> {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/occultations");
            then.status(503);
        })
        .await;

    let api = BaseApi::new(config(&server), "/api/occultations");
    let reply = api.get_data(&DataRequest::new().show_bar(false)).await?;

    mock.assert_async().await;
    let failure = reply.failure().expect("expected a failure");
    assert_eq!(failure.error, "An error occurred fetching the data");
    assert_eq!(failure.status_code, Some(503));
    assert_eq!(
        serde_json::to_value(&reply)?,
        json!({"error": "An error occurred fetching the data", "status_code": 503})
    );

    Ok(())
}

#[tokio::test]
async fn test_failed_follow_up_page_is_skipped() -> Result<()> {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/occultations").query_param("page", "1");
            then.status(200)
                .json_body(json!({"count": 25, "results": predictions(0, 10)}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/occultations").query_param("page", "2");
            then.status(500);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/occultations").query_param("page", "3");
            then.status(200)
                .json_body(json!({"count": 25, "results": predictions(20, 5)}));
        })
        .await;

    let config = ClientConfig {
        page_size: 10,
        ..config(&server)
    };
    let api = BaseApi::new(config, "/api/occultations");
    let request = DataRequest::new().limit(None).show_bar(false);

    let records = api.get_data(&request).await?.data().expect("expected data");

    let ids: Vec<i64> = records.iter().map(|r| r["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 20, 21, 22, 23, 24]);

    Ok(())
}

#[tokio::test]
async fn test_fetch_single_record_by_id() -> Result<()> {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/occultations/4321");
            then.status(200).json_body(json!({
                "id": 4321,
                "name": "Chariklo",
                "principal_designation": "1997 CU26"
            }));
        })
        .await;

    let api = BaseApi::new(config(&server), "/api/occultations");
    let records = api
        .get_data(&DataRequest::new().id(4321).show_bar(false))
        .await?
        .data()
        .expect("expected data");

    mock.assert_async().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["provisional_designation"], json!("1997 CU26"));
    assert!(!records[0].contains_key("principal_designation"));

    Ok(())
}

#[tokio::test]
async fn test_custom_headers_are_sent() -> Result<()> {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/occultations")
                .header("Authorization", "Token abc123")
                .header("User-Agent", "ssp-client-tests");
            then.status(200).json_body(json!({"count": 0, "results": []}));
        })
        .await;

    let mut config = config(&server);
    config
        .headers
        .insert("Authorization".to_string(), "Token abc123".to_string());
    config.user_agent = Some("ssp-client-tests".to_string());

    let api = BaseApi::new(config, "/api/occultations");
    api.get_data(&DataRequest::new().show_bar(false)).await?;

    mock.assert_async().await;
    Ok(())
}
