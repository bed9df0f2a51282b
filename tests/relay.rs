use axum::{Json, Router, extract::State, routing::post};
use std::{collections::HashMap, net::SocketAddr, sync::Arc, time::Duration};
use tokio::{net::TcpListener, sync::Mutex};
use triage_relay::{
    config::{Config, ConfigStore, Settings},
    http::{AppState, create_router},
    report::{CommandResultSet, CommandSpec},
};

type Inbox = Arc<Mutex<Vec<serde_json::Value>>>;

async fn fake_slack() -> (SocketAddr, Inbox) {
    let inbox = Inbox::default();

    let router = Router::new()
        .route(
            "/hook",
            post(
                |State(inbox): State<Inbox>, Json(body): Json<serde_json::Value>| async move {
                    inbox.lock().await.push(body);
                },
            ),
        )
        .with_state(inbox.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });

    (addr, inbox)
}

fn spec(title: &str, command: &str) -> CommandSpec {
    CommandSpec {
        title: title.to_string(),
        command: command.to_string(),
    }
}

/// Start a relay that is its own agent: every resolved host points back at it
async fn relay(slack: SocketAddr) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let config = Config {
        slack: format!("http://{}/hook", slack),
        token: "s3cret".to_string(),
        alerts: HashMap::from([
            (
                "HighLoad".to_string(),
                vec![spec("Greeting", "echo hello"), spec("Failing", "exit 7")],
            ),
            ("DiskFull".to_string(), vec![spec("Df", "echo 91%")]),
        ]),
        hosts: HashMap::from([("web1:9100".to_string(), "127.0.0.1".to_string())]),
    };

    let settings = Settings {
        agent_port: addr.port(),
        unit_timeout: Duration::from_secs(10),
        ..Default::default()
    };

    let state = AppState::new(Arc::new(ConfigStore::fixed(config)), settings).unwrap();
    let router = create_router(state);
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });

    addr
}

const PAYLOAD: &str = r#"{
    "status": "firing",
    "alerts": [
        {
            "status": "firing",
            "labels": {"alertname": "HighLoad", "instance": "web1:9100"},
            "annotations": {"description": "Load is high on web1"},
            "startsAt": "2024-05-01T10:00:00Z"
        },
        {
            "status": "firing",
            "labels": {"alertname": "DiskFull", "instance": "web1:9100"},
            "annotations": {"description": "Disk almost full on web1"},
            "startsAt": "2024-05-01T10:01:00Z"
        },
        {
            "status": "resolved",
            "labels": {"alertname": "HighLoad", "instance": "web1:9100"},
            "annotations": {"description": "Load was high"},
            "startsAt": "2024-05-01T09:00:00Z"
        },
        {
            "status": "firing",
            "labels": {"alertname": "HighLoad", "instance": ""},
            "annotations": {"description": "No instance"},
            "startsAt": "2024-05-01T10:02:00Z"
        }
    ],
    "externalURL": "http://alertmanager:9093"
}"#;

fn texts(message: &serde_json::Value) -> Vec<String> {
    message["blocks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|block| block["text"]["text"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn webhook_relays_agent_reports_to_slack() {
    let (slack, inbox) = fake_slack().await;
    let relay = relay(slack).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/webhook?token=s3cret", relay))
        .body(PAYLOAD)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);

    // The webhook only answers once every alert has been handled
    let inbox = inbox.lock().await;
    assert_eq!(inbox.len(), 2);

    let mut messages: Vec<_> = inbox.iter().map(texts).collect();
    messages.sort();

    assert_eq!(
        messages,
        [
            vec![
                "Disk almost full on web1".to_string(),
                "*Df*".to_string(),
                "```91%```".to_string(),
            ],
            vec![
                "Load is high on web1".to_string(),
                "*Greeting*".to_string(),
                "```hello```".to_string(),
                "*Failing*".to_string(),
                "```exit status: 7```".to_string(),
            ],
        ]
    );

    assert_eq!(inbox[0]["blocks"][0]["type"], "header");
    assert_eq!(inbox[0]["blocks"][1]["type"], "section");
}

#[tokio::test]
async fn webhook_with_bad_token_relays_nothing() {
    let (slack, inbox) = fake_slack().await;
    let relay = relay(slack).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/webhook?token=wrong", relay))
        .body(PAYLOAD)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid token");
    assert!(inbox.lock().await.is_empty());
}

async fn fetch_report(client: &reqwest::Client, url: &str) -> CommandResultSet {
    client
        .get(url)
        .query(&[("token", "s3cret"), ("alertName", "HighLoad")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn concurrent_reports_for_the_same_alert_stay_separate() {
    let (slack, _) = fake_slack().await;
    let relay = relay(slack).await;
    let client = reqwest::Client::new();
    let url = format!("http://{}/report", relay);

    let (a, b) = tokio::join!(fetch_report(&client, &url), fetch_report(&client, &url));

    for report in [a, b] {
        let outputs: Vec<_> = report.commands.iter().map(|c| c.output.as_str()).collect();
        assert_eq!(outputs, ["hello", "exit status: 7"]);
    }
}
