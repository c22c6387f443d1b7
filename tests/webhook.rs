use embedhook::{webhook, Config, DispatchRequest, Outcome, ScalarEdit, Session, Severity};
use embedhook::{FieldUpdate, Transport};
use serde_json::json;
use std::io::{Read, Write};
use std::net::TcpListener;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn release_session(url: &str) -> Session {
    let mut session = Session::new(&Config::default());
    session.set_webhook(url);
    session.set_username("Bot");
    session.edit(ScalarEdit::Title("Release".into())).unwrap();
    session.edit(ScalarEdit::Color("#00ff00".into())).unwrap();
    let index = session.add_field().unwrap();
    session
        .update_field(
            index,
            FieldUpdate {
                name: Some("Version".into()),
                value: Some("1.0".into()),
                inline: Some(true),
            },
        )
        .unwrap();
    session
}

#[tokio::test]
async fn delivers_the_exact_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/webhooks/1/token"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "username": "Bot",
            "embeds": [{
                "title": "Release",
                "color": 65280,
                "fields": [{ "name": "Version", "value": "1.0", "inline": true }]
            }]
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = release_session(&format!("{}/api/webhooks/1/token", server.uri()));
    let request = session.prepare_dispatch(chrono::Utc::now()).unwrap();
    let client = webhook::Client::new(&Config::default()).unwrap();
    let outcome = request.send(&client).await;

    assert_eq!(outcome, Outcome::Delivered { status: 204 });
    assert_eq!(outcome.status().severity, Severity::Success);
}

#[tokio::test]
async fn not_found_is_rejected_and_embed_survives() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"message":"Unknown Webhook"}"#))
        .mount(&server)
        .await;

    let mut session = release_session(&format!("{}/api/webhooks/1/gone", server.uri()));
    let before = session.embed.clone();
    let now = chrono::Utc::now();
    let request = session.prepare_dispatch(now).unwrap();
    let client = webhook::Client::new(&Config::default()).unwrap();
    let outcome = request.send(&client).await;
    session.finish_dispatch(&outcome, now);

    assert_eq!(
        outcome,
        Outcome::Rejected {
            status: 404,
            body: r#"{"message":"Unknown Webhook"}"#.into(),
        }
    );
    let notice = session.notifier().visible(now).unwrap();
    assert_eq!(notice.status.severity, Severity::Error);
    assert_eq!(notice.status.message, "Failed to send embed");
    assert_eq!(session.embed, before);
}

#[tokio::test]
async fn unreachable_host_is_a_transport_failure() {
    let client = webhook::Client::new(&Config::default()).unwrap();
    let request = DispatchRequest {
        url: "http://127.0.0.1:1/hook".into(),
        payload: release_session("http://127.0.0.1:1/hook").payload(),
    };
    let outcome = request.send(&client).await;
    assert!(matches!(outcome, Outcome::TransportFailure { .. }));
    assert_eq!(outcome.status().severity, Severity::Error);
}

#[tokio::test]
async fn client_is_usable_as_a_trait_object() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;

    let client = webhook::Client::new(&Config::default()).unwrap();
    let transport: &dyn Transport = &client;
    let session = release_session(&server.uri());
    let reply = transport
        .post(&format!("{}/hook", server.uri()), &session.payload())
        .await
        .unwrap();
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body, "{}");
}

#[tokio::test]
async fn configured_user_agent_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("user-agent", "release-bot/2"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = webhook::Client::new(&Config::default().user_agent("release-bot/2")).unwrap();
    let reply = client
        .post(&server.uri(), &release_session(&server.uri()).payload())
        .await
        .unwrap();
    assert_eq!(reply.status, 204);
}

/// Answers one request with a body shorter than its declared length, then hangs up.
fn cut_off_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let read = stream.read(&mut chunk).unwrap();
            request.extend_from_slice(&chunk[..read]);
            let text = String::from_utf8_lossy(&request).to_lowercase();
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|value| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if request.len() >= end + 4 + length {
                    break;
                }
            }
            if read == 0 {
                break;
            }
        }
        stream
            .write_all(b"HTTP/1.1 502 Bad Gateway\r\ncontent-length: 64\r\n\r\nshort")
            .unwrap();
    });
    format!("http://{addr}/hook")
}

#[tokio::test]
async fn unreadable_body_still_reports_status() {
    let url = cut_off_server();
    let client = webhook::Client::new(&Config::default()).unwrap();
    let request = DispatchRequest {
        payload: release_session(&url).payload(),
        url,
    };
    assert_eq!(
        request.send(&client).await,
        Outcome::Rejected {
            status: 502,
            body: String::new(),
        }
    );
}
