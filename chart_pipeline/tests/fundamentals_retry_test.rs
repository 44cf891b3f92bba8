//! Drives `FinvizSource` + `FundamentalsFetcher` against a local HTTP stub.

use std::{
    num::NonZeroU32,
    sync::{Arc, Mutex},
    time::Duration,
};

use chart_pipeline::fundamentals::{
    Cancellation, FinvizOptions, FinvizSource, FundamentalsError, FundamentalsFetcher, RetryPolicy,
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};

const PAGE: &str = r#"<html><body>
<table class="snapshot-table2">
<tr><td>P/E</td><td><b>18.40</b></td><td>Shs Float</td><td><b>1.20B</b></td></tr>
<tr><td>ROE</td><td><b>-</b></td><td>Gross Margin</td><td><b>44.10%</b></td></tr>
</table>
</body></html>"#;

/// Answers each connection with the next scripted `(status, body)` and
/// records the request head it received.
async fn serve(script: Vec<(u16, &'static str)>) -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();

    tokio::spawn(async move {
        for (status, body) in script {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            log.lock().unwrap().push(String::from_utf8_lossy(&head).into_owned());

            let response = format!(
                "HTTP/1.1 {status} STUB\r\ncontent-type: text/html\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        }
    });

    (format!("http://{addr}/quote.ashx"), seen)
}

fn fetcher(base_url: String, max_attempts: u32) -> FundamentalsFetcher {
    let source = FinvizSource::new(FinvizOptions {
        base_url,
        user_agent: "chart-pipeline-test".into(),
        request_timeout: Duration::from_secs(5),
    })
    .unwrap();
    FundamentalsFetcher::new(
        Arc::new(source),
        RetryPolicy {
            backoff: Duration::from_millis(20),
            max_attempts: NonZeroU32::new(max_attempts),
        },
    )
}

#[tokio::test]
async fn recovers_after_transient_statuses() {
    let (url, seen) = serve(vec![(503, ""), (429, ""), (200, PAGE)]).await;

    let fundamentals = fetcher(url, 5)
        .fetch("ACME", &Cancellation::none())
        .await
        .unwrap();

    assert_eq!(fundamentals.pe, Some(18.4));
    assert_eq!(fundamentals.shares_float, Some(1200.0));
    assert_eq!(fundamentals.roe, None);
    assert!((fundamentals.gross_margin.unwrap() - 0.441).abs() < 1e-12);

    let requests = seen.lock().unwrap();
    assert_eq!(requests.len(), 3);
    assert!(requests[0].starts_with("GET /quote.ashx?t=ACME "), "{}", requests[0]);
    assert!(requests[0].to_lowercase().contains("user-agent: chart-pipeline-test"));
}

#[tokio::test]
async fn not_found_stops_after_one_request() {
    let (url, seen) = serve(vec![(404, ""), (200, PAGE)]).await;

    let err = fetcher(url, 5)
        .fetch("GONE", &Cancellation::none())
        .await
        .unwrap_err();

    assert_eq!(err, FundamentalsError::TickerNotFound("GONE".into()));
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn gives_up_when_attempts_run_out() {
    let (url, seen) = serve(vec![(500, ""), (500, "")]).await;

    let err = fetcher(url, 2)
        .fetch("ACME", &Cancellation::none())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        FundamentalsError::SourceUnavailable {
            attempts: 2,
            cancelled: false
        }
    );
    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn block_page_without_snapshot_table_is_not_retried() {
    let blocked = "<html><body>Access denied</body></html>";
    let (url, seen) = serve(vec![(200, blocked), (200, PAGE)]).await;

    let err = fetcher(url, 5)
        .fetch("ACME", &Cancellation::none())
        .await
        .unwrap_err();

    assert_eq!(err, FundamentalsError::EmptySnapshot("ACME".into()));
    assert_eq!(seen.lock().unwrap().len(), 1);
}
