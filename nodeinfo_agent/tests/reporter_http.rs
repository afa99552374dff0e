//! HttpReporter against a loopback axum server.

use axum::{
    body::Bytes,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    routing::post,
    Router,
};
use nodeinfo_agent::error::DeliveryError;
use nodeinfo_agent::reporter::{HttpReporter, SnapshotSink};
use nodeinfo_agent::types::{ContainerRecord, CpuInfo, InfoBase, NetworkInfo, NodeInfo};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone, Default)]
struct Inbox(Arc<Mutex<Vec<(Option<String>, Bytes)>>>);

async fn accept(State(inbox): State<Inbox>, headers: HeaderMap, body: Bytes) -> StatusCode {
    let ct = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    inbox.0.lock().unwrap().push((ct, body));
    StatusCode::NO_CONTENT
}

async fn unavailable() -> StatusCode {
    StatusCode::SERVICE_UNAVAILABLE
}

async fn serve(inbox: Inbox) -> SocketAddr {
    let app = Router::new()
        .route("/nodes", post(accept))
        .route("/down", post(unavailable))
        .with_state(inbox);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn sample() -> InfoBase {
    InfoBase {
        node_info: NodeInfo {
            runtime_os: "linux".into(),
            operating_system: "Linux".into(),
            platform: "ubuntu".into(),
            host_name: "rack3-node7".into(),
            host_id: "4c4c4544-0042".into(),
            uptime: Duration::from_secs(86_400),
            number_of_processes_running: 312,
            total_memory: 16_000_000_000,
            free_memory: 8_000_000_000,
            percent_used_memory: 50.0,
            disk_serial_number: "S3Z9NB0K".into(),
            total_disk_space: 512_000_000_000,
            used_disk_space: 128_000_000_000,
            free_disk_space: 384_000_000_000,
            percent_disk_space_used: 25.0,
            cpu_info: vec![
                CpuInfo {
                    index_number: 0,
                    vendor_id: "GenuineIntel".into(),
                    family: "6".into(),
                    number_of_cores: 4,
                    model_name: "Intel(R) Xeon(R) E-2224".into(),
                    speed: 3_400,
                    percent_used: Some(12.5),
                },
                CpuInfo {
                    index_number: 1,
                    percent_used: None,
                    ..Default::default()
                },
            ],
            network_info: vec![NetworkInfo {
                interface_name: "eno1".into(),
                mac_address: "3c:ec:ef:00:11:22".into(),
                interface_flags: vec!["up".into(), "broadcast".into(), "multicast".into()],
                ip_addresses: vec!["10.1.3.7/24".into(), "fe80::3eec:efff:fe00:1122/64".into()],
                ip_address: "10.1.3.7/24".into(),
            }],
        },
        container_info: vec![ContainerRecord(json!({
            "Id": "9f1c2e",
            "Name": "/web",
            "State": { "Status": "running", "Pid": 4242 },
            "NetworkSettings": { "IPAddress": "172.17.0.2" },
        }))],
    }
}

#[tokio::test]
async fn posts_json_that_round_trips() {
    let inbox = Inbox::default();
    let addr = serve(inbox.clone()).await;
    let reporter = HttpReporter::new(format!("http://{addr}/nodes")).with_echo(false);

    let snapshot = sample();
    reporter.send(&snapshot).await.unwrap();

    let received = inbox.0.lock().unwrap().clone();
    assert_eq!(received.len(), 1);
    let (content_type, body) = &received[0];
    assert_eq!(content_type.as_deref(), Some("application/json"));
    let decoded: InfoBase = serde_json::from_slice(body).unwrap();
    assert_eq!(decoded, snapshot);
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let addr = serve(Inbox::default()).await;
    let reporter = HttpReporter::new(format!("http://{addr}/down")).with_echo(false);

    let err = reporter.send(&sample()).await.unwrap_err();
    assert!(matches!(
        err,
        DeliveryError::Status { status, .. } if status == 503
    ));
}

#[tokio::test]
async fn empty_url_fails_without_panicking() {
    let reporter = HttpReporter::new("").with_echo(false);
    let err = reporter.send(&sample()).await.unwrap_err();
    assert!(matches!(err, DeliveryError::Request { .. }));
}

#[tokio::test]
async fn refused_connection_is_a_request_error() {
    // bind then drop to get a port nobody listens on
    let port = {
        let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        l.local_addr().unwrap().port()
    };
    let reporter = HttpReporter::new(format!("http://127.0.0.1:{port}/nodes")).with_echo(false);
    let err = reporter.send(&sample()).await.unwrap_err();
    assert!(matches!(err, DeliveryError::Request { .. }));
}

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn body_is_echoed_even_when_delivery_fails() {
    let port = {
        let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        l.local_addr().unwrap().port()
    };
    let out = SharedBuf::default();
    let reporter = HttpReporter::new(format!("http://127.0.0.1:{port}/nodes"))
        .with_echo_writer(out.clone());

    let snapshot = sample();
    assert!(reporter.send(&snapshot).await.is_err());

    let text = String::from_utf8(out.0.lock().unwrap().clone()).unwrap();
    assert!(text.starts_with(r#"{"NodeInfo":"#), "unexpected echo: {text}");
    assert!(text.ends_with('\n'));
    let echoed: InfoBase = serde_json::from_str(text.trim_end()).unwrap();
    assert_eq!(echoed, snapshot);
}

#[tokio::test]
async fn echo_matches_the_posted_body() {
    let inbox = Inbox::default();
    let addr = serve(inbox.clone()).await;
    let out = SharedBuf::default();
    let reporter = HttpReporter::new(format!("http://{addr}/nodes")).with_echo_writer(out.clone());

    reporter.send(&sample()).await.unwrap();

    let echoed = out.0.lock().unwrap().clone();
    let posted = inbox.0.lock().unwrap()[0].1.clone();
    assert_eq!(&echoed[..echoed.len() - 1], &posted[..]);
}
