// tests/integration_tests.rs
use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::Mutex;

use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use serde_json::{json, Value};

use homework_bot::api::{HomeworkApi, PracticumClient};
use homework_bot::config::{PracticumConfig, TelegramConfig};
use homework_bot::errors::{DeliveryError, FetchError};
use homework_bot::notifier::{Notifier, TelegramNotifier};
use homework_bot::poller::{Poller, PollerOptions, FAILURE_PREFIX};

const API_TOKEN: &str = "secret";
const BOT_TOKEN: &str = "123:abc";
const CHAT_ID: &str = "42";
const START: i64 = 1_700_000_000;

/// Everything the fake servers observed.
#[derive(Default)]
struct Seen {
    from_dates: Mutex<Vec<i64>>,
    messages: Mutex<Vec<String>>,
}

fn authorized(req: &HttpRequest) -> bool {
    req.headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        == Some("OAuth secret")
}

fn record_from_date(seen: &Seen, query: &HashMap<String, String>) -> bool {
    match query.get("from_date").and_then(|v| v.parse::<i64>().ok()) {
        Some(from_date) => {
            seen.from_dates.lock().unwrap().push(from_date);
            true
        }
        None => false,
    }
}

async fn approved(
    req: HttpRequest,
    query: web::Query<HashMap<String, String>>,
    seen: web::Data<Seen>,
) -> HttpResponse {
    if !authorized(&req) || !record_from_date(&seen, &query) {
        return HttpResponse::Unauthorized().finish();
    }
    HttpResponse::Ok().json(json!({
        "homeworks": [{"homework_name": "hw1", "status": "approved"}],
        "current_date": START
    }))
}

async fn archived(req: HttpRequest) -> HttpResponse {
    if !authorized(&req) {
        return HttpResponse::Unauthorized().finish();
    }
    HttpResponse::Ok().json(json!({
        "homeworks": [{"homework_name": "hw1", "status": "archived"}]
    }))
}

async fn rate_limited() -> HttpResponse {
    HttpResponse::TooManyRequests()
        .insert_header(("Retry-After", "60"))
        .finish()
}

async fn garbage() -> HttpResponse {
    HttpResponse::Ok().content_type("text/html").body("<html>maintenance</html>")
}

async fn send_message(body: web::Json<Value>, seen: web::Data<Seen>) -> HttpResponse {
    match (body["chat_id"].as_str(), body["text"].as_str()) {
        (Some(CHAT_ID), Some(text)) => {
            seen.messages.lock().unwrap().push(text.to_string());
            HttpResponse::Ok().json(json!({"ok": true, "result": {"message_id": 1}}))
        }
        _ => HttpResponse::BadRequest().json(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: chat not found"
        })),
    }
}

/// Starts the fake homework API and Bot API on a free local port.
fn spawn_server(seen: web::Data<Seen>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(seen.clone())
            .route("/approved/", web::get().to(approved))
            .route("/archived/", web::get().to(archived))
            .route("/limited/", web::get().to(rate_limited))
            .route("/garbage/", web::get().to(garbage))
            .route(
                &format!("/bot{}/sendMessage", BOT_TOKEN),
                web::post().to(send_message),
            )
    })
    .workers(1)
    .listen(listener)
    .unwrap()
    .run();
    actix_rt::spawn(server);

    format!("http://127.0.0.1:{}", port)
}

fn practicum(base: &str, path: &str) -> PracticumClient {
    PracticumClient::new(
        reqwest::Client::new(),
        PracticumConfig {
            endpoint: format!("{}{}", base, path),
            token: API_TOKEN.to_string(),
        },
    )
}

fn telegram(base: &str, chat_id: &str) -> TelegramNotifier {
    TelegramNotifier::new(
        reqwest::Client::new(),
        TelegramConfig {
            api_base: base.to_string(),
            token: BOT_TOKEN.to_string(),
            chat_id: chat_id.to_string(),
        },
    )
}

fn unused_port_base() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

#[actix_web::test]
async fn test_fetch_returns_decoded_body() {
    let seen = web::Data::new(Seen::default());
    let base = spawn_server(seen.clone());

    let body = practicum(&base, "/approved/").fetch(START).await.unwrap();

    assert_eq!(body["homeworks"][0]["homework_name"], "hw1");
    assert_eq!(*seen.from_dates.lock().unwrap(), vec![START]);
}

#[actix_web::test]
async fn test_fetch_unexpected_status() {
    let seen = web::Data::new(Seen::default());
    let base = spawn_server(seen);

    let err = practicum(&base, "/limited/").fetch(START).await.unwrap_err();

    match err {
        FetchError::UnexpectedStatus {
            status,
            headers,
            url,
            ..
        } => {
            assert_eq!(status, 429);
            assert_eq!(headers.get("retry-after").unwrap(), "60");
            assert!(url.ends_with(&format!("/limited/?from_date={}", START)));
        }
        other => panic!("expected UnexpectedStatus, got {:?}", other),
    }
}

#[actix_web::test]
async fn test_fetch_rejects_non_json_body() {
    let seen = web::Data::new(Seen::default());
    let base = spawn_server(seen);

    let err = practicum(&base, "/garbage/").fetch(START).await.unwrap_err();

    assert!(matches!(err, FetchError::Decode(_)));
}

#[actix_web::test]
async fn test_fetch_transport_failure() {
    let base = unused_port_base();

    let err = practicum(&base, "/approved/").fetch(START).await.unwrap_err();

    assert!(matches!(err, FetchError::Transport(_)));
}

#[actix_web::test]
async fn test_notify_delivers_to_chat() {
    let seen = web::Data::new(Seen::default());
    let base = spawn_server(seen.clone());

    telegram(&base, CHAT_ID).notify("привет").await.unwrap();

    assert_eq!(*seen.messages.lock().unwrap(), vec!["привет".to_string()]);
}

#[actix_web::test]
async fn test_notify_rejected_by_bot_api() {
    let seen = web::Data::new(Seen::default());
    let base = spawn_server(seen.clone());

    let err = telegram(&base, "-1").notify("привет").await.unwrap_err();

    match err {
        DeliveryError::Rejected {
            status,
            description,
        } => {
            assert_eq!(status, 400);
            assert_eq!(description, "Bad Request: chat not found");
        }
        other => panic!("expected Rejected, got {:?}", other),
    }
    assert!(seen.messages.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn test_first_cycle_announces_status_then_stays_quiet() {
    let seen = web::Data::new(Seen::default());
    let base = spawn_server(seen.clone());
    let mut poller = Poller::new(
        practicum(&base, "/approved/"),
        telegram(&base, CHAT_ID),
        PollerOptions::default(),
        START,
    );

    let first = poller.run_cycle(START + 600).await;
    let second = poller.run_cycle(START + 1200).await;

    assert_eq!(first.notifications, 1);
    assert_eq!(second.notifications, 0);
    assert!(second.error.is_none());
    assert_eq!(
        *seen.messages.lock().unwrap(),
        vec![
            "Изменился статус проверки работы \"hw1\". Работа проверена: ревьюеру всё понравилось. Ура!"
                .to_string()
        ]
    );
    assert_eq!(*seen.from_dates.lock().unwrap(), vec![START, START + 600]);
}

#[actix_web::test]
async fn test_rate_limited_api_is_reported_once() {
    let seen = web::Data::new(Seen::default());
    let base = spawn_server(seen.clone());
    let mut poller = Poller::new(
        practicum(&base, "/limited/"),
        telegram(&base, CHAT_ID),
        PollerOptions::default(),
        START,
    );

    let first = poller.run_cycle(START + 600).await;
    poller.run_cycle(START + 1200).await;

    assert!(first.error.as_deref().unwrap().contains("429"));
    let messages = seen.messages.lock().unwrap();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with(FAILURE_PREFIX));
    assert!(messages[0].contains("429"));
}

#[actix_web::test]
async fn test_unknown_status_is_reported_once() {
    let seen = web::Data::new(Seen::default());
    let base = spawn_server(seen.clone());
    let mut poller = Poller::new(
        practicum(&base, "/archived/"),
        telegram(&base, CHAT_ID),
        PollerOptions::default(),
        START,
    );

    for i in 1..=3 {
        let outcome = poller.run_cycle(START + i * 600).await;
        assert!(outcome.error.is_some());
    }

    assert_eq!(
        *seen.messages.lock().unwrap(),
        vec![format!(
            "{}Статус \"archived\" домашней работы \"hw1\" не действительный",
            FAILURE_PREFIX
        )]
    );
}
