use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use std::io::{Cursor, Read};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use snowline_api::{app, AppState};
use snowline_store::app_config::{AuthConfig, BusinessRules, Config, DatabaseConfig, ServerConfig, StorageBackend};
use snowline_store::MemoryStore;

fn test_config() -> Config {
    Config {
        server: ServerConfig { port: 0 },
        database: DatabaseConfig {
            backend: StorageBackend::Memory,
            url: String::new(),
            max_connections: 1,
        },
        auth: AuthConfig {
            jwt_secret: "test-secret".to_string(),
            jwt_expiration_seconds: 3600,
            admin_username: "admin".to_string(),
            admin_password: "letmein".to_string(),
        },
        business_rules: BusinessRules {
            max_rental_days: 14,
            max_lesson_participants: 6,
            lesson_day_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            lesson_day_end: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            languages: vec!["en".to_string(), "lv".to_string(), "ru".to_string()],
            currency: "EUR".to_string(),
        },
    }
}

fn test_app() -> Router {
    let repos = MemoryStore::seeded().into_repositories();
    app(AppState::new(repos, &test_config()))
}

fn in_days(days: i64) -> NaiveDate {
    chrono::Local::now().date_naive() + Duration::days(days)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>, token: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn login(app: &Router) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/admin/login",
        Some(json!({ "username": "admin", "password": "letmein" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

async fn product_ids(app: &Router, query: &str) -> Vec<(String, i64)> {
    let (status, body) = send(app, Method::GET, &format!("/api/products{query}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    body.as_array()
        .unwrap()
        .iter()
        .map(|p| (p["id"].as_str().unwrap().to_string(), p["price_cents"].as_i64().unwrap()))
        .collect()
}

fn booking_body(ids: &[String], start: NaiveDate, end: NaiveDate) -> Value {
    json!({
        "name": "Janis Ozols",
        "email": "Janis@Example.com",
        "phone": "+37129999999",
        "product_ids": ids,
        "start_date": start,
        "end_date": end,
        "notes": "Pick up at 9",
    })
}

fn lesson_body(date: NaiveDate, start: &str, hours: u32, people: usize) -> Value {
    let participants: Vec<Value> = (0..people)
        .map(|i| json!({ "name": format!("Guest {}", i + 1), "age": 12 }))
        .collect();
    json!({
        "name": "Liga Ozola",
        "email": "liga@example.com",
        "phone": "+37126000000",
        "date": date,
        "start_time": start,
        "duration_hours": hours,
        "discipline": "SKI",
        "level": "BEGINNER",
        "language": "en",
        "participants": participants,
    })
}

async fn submit_booking(app: &Router, ids: &[String], start: NaiveDate, end: NaiveDate) -> Value {
    let (status, body) = send(app, Method::POST, "/api/bookings", Some(booking_body(ids, start, end)), None).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

#[tokio::test]
async fn test_health_and_catalog() {
    let app = test_app();

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    assert_eq!(product_ids(&app, "").await.len(), 11);
    assert_eq!(product_ids(&app, "?product_type=ski").await.len(), 3);
    assert_eq!(product_ids(&app, "?product_type=SKI&professional=true").await.len(), 1);

    let (status, body) = send(&app, Method::GET, "/api/products?product_type=sled", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("sled"));

    let (status, body) = send(&app, Method::GET, "/api/price-list", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 7);

    let (status, body) = send(&app, Method::GET, "/api/lessons/options", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["durations"], json!([1, 2, 3]));
    assert_eq!(body["max_participants"], 6);
    assert_eq!(body["currency"], "EUR");
}

#[tokio::test]
async fn test_booking_quote_and_submit() {
    let app = test_app();
    let products = product_ids(&app, "?product_type=SKI").await;
    let ids: Vec<String> = products.iter().take(2).map(|(id, _)| id.clone()).collect();
    let daily: i64 = products.iter().take(2).map(|(_, price)| price).sum();

    let (start, end) = (in_days(10), in_days(12));
    let (status, quote) = send(
        &app,
        Method::POST,
        "/api/bookings/quote",
        Some(json!({ "product_ids": ids, "start_date": start, "end_date": end })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(quote["days"], 3);
    assert_eq!(quote["daily_total_cents"], daily);
    assert_eq!(quote["total_cents"], daily * 3);

    let booking = submit_booking(&app, &ids, start, end).await;
    assert_eq!(booking["status"], "PENDING");
    assert_eq!(booking["total_price_cents"], daily * 3);
    assert_eq!(booking["contact"]["email"], "janis@example.com");
    assert_eq!(booking["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_booking_validation_errors() {
    let app = test_app();
    let ids: Vec<String> = product_ids(&app, "?product_type=HELMET").await.into_iter().map(|(id, _)| id).collect();

    let cases = vec![
        booking_body(&ids, in_days(-1), in_days(2)),
        booking_body(&ids, in_days(5), in_days(3)),
        booking_body(&ids, in_days(1), in_days(15)),
        booking_body(&[uuid::Uuid::new_v4().to_string()], in_days(1), in_days(2)),
        booking_body(&[], in_days(1), in_days(2)),
        booking_body(&[ids[0].clone(), ids[0].clone()], in_days(1), in_days(2)),
    ];
    for body in cases {
        let (status, response) = send(&app, Method::POST, "/api/bookings", Some(body), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{response}");
        assert!(response["error"].is_string());
    }

    let mut bad_email = booking_body(&ids, in_days(1), in_days(2));
    bad_email["email"] = json!("not-an-email");
    let (status, _) = send(&app, Method::POST, "/api/bookings", Some(bad_email), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Exactly the maximum rental length is accepted
    submit_booking(&app, &ids, in_days(1), in_days(14)).await;
}

#[tokio::test]
async fn test_admin_requires_token() {
    let app = test_app();

    let (status, body) = send(&app, Method::GET, "/api/admin/dashboard", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, Method::GET, "/api/admin/dashboard", None, Some("garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/admin/login",
        Some(json!({ "username": "admin", "password": "wrong" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = login(&app).await;
    let (status, body) = send(&app, Method::GET, "/api/admin/dashboard", None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bookings"]["pending"], 0);
}

#[tokio::test]
async fn test_booking_status_lifecycle() {
    let app = test_app();
    let token = login(&app).await;
    let ids: Vec<String> = product_ids(&app, "?product_type=SNOWBOARD").await.into_iter().map(|(id, _)| id).take(1).collect();
    let booking = submit_booking(&app, &ids, in_days(3), in_days(4)).await;
    let uri = format!("/api/admin/bookings/{}/status", booking["id"].as_str().unwrap());

    let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({ "status": "CONFIRMED" })), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "CONFIRMED");

    // Same status again is a no-op
    let (status, _) = send(&app, Method::PATCH, &uri, Some(json!({ "status": "CONFIRMED" })), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({ "status": "PENDING" })), Some(&token)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());

    let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({ "status": "COMPLETED" })), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "COMPLETED");

    let (status, _) = send(&app, Method::PATCH, &uri, Some(json!({ "status": "CANCELLED" })), Some(&token)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_admin_booking_edit_and_search() {
    let app = test_app();
    let token = login(&app).await;
    let products = product_ids(&app, "?product_type=SKI").await;
    let ids: Vec<String> = products.iter().take(1).map(|(id, _)| id.clone()).collect();
    let booking = submit_booking(&app, &ids, in_days(5), in_days(6)).await;
    let id = booking["id"].as_str().unwrap();

    // Admin edits may extend the range; the total is recomputed
    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/admin/bookings/{id}"),
        Some(booking_body(&ids, in_days(5), in_days(8))),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_price_cents"], products[0].1 * 4);

    let (status, body) = send(&app, Method::GET, "/api/admin/bookings?q=ozols", None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = send(&app, Method::GET, "/api/admin/bookings?status=confirmed", None, Some(&token)).await;
    assert!(body.as_array().unwrap().is_empty());

    let (status, _) = send(&app, Method::GET, "/api/admin/bookings?status=LOST", None, Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::DELETE, &format!("/api/admin/bookings/{id}"), None, Some(&token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::GET, &format!("/api/admin/bookings/{id}"), None, Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_lesson_pricing_and_validation() {
    let app = test_app();
    let date = in_days(7);

    let (status, quote) = send(&app, Method::POST, "/api/lessons/quote", Some(lesson_body(date, "10:00", 2, 2)), None).await;
    assert_eq!(status, StatusCode::OK, "{quote}");
    assert_eq!(quote["total_price_cents"], 10000);

    let (status, lesson) = send(&app, Method::POST, "/api/lessons", Some(lesson_body(date, "10:00", 2, 2)), None).await;
    assert_eq!(status, StatusCode::CREATED, "{lesson}");
    assert_eq!(lesson["status"], "PENDING");
    assert_eq!(lesson["total_price_cents"], 10000);
    assert_eq!(lesson["participants"].as_array().unwrap().len(), 2);

    let invalid = vec![
        lesson_body(date, "10:00", 2, 0),
        lesson_body(date, "10:00", 2, 7),
        lesson_body(date, "16:00", 2, 1),
        lesson_body(date, "10:00", 4, 1),
        lesson_body(in_days(-2), "10:00", 1, 1),
    ];
    for body in invalid {
        let (status, response) = send(&app, Method::POST, "/api/lessons", Some(body), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{response}");
    }

    let mut german = lesson_body(date, "10:00", 1, 1);
    german["language"] = json!("de");
    let (status, _) = send(&app, Method::POST, "/api/lessons", Some(german), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_teacher_assignment_conflicts() {
    let app = test_app();
    let token = login(&app).await;
    let date = in_days(9);

    let (_, first) = send(&app, Method::POST, "/api/lessons", Some(lesson_body(date, "10:00", 2, 1)), None).await;
    let (_, second) = send(&app, Method::POST, "/api/lessons", Some(lesson_body(date, "11:00", 1, 1)), None).await;
    let (_, third) = send(&app, Method::POST, "/api/lessons", Some(lesson_body(date, "12:00", 1, 1)), None).await;

    let (_, teachers) = send(&app, Method::GET, "/api/admin/teachers", None, Some(&token)).await;
    let teacher_id = teachers[0]["id"].as_str().unwrap().to_string();
    let assign = |lesson: &Value| format!("/api/admin/lessons/{}/teacher", lesson["id"].as_str().unwrap());

    let (status, body) = send(&app, Method::PATCH, &assign(&first), Some(json!({ "teacher_id": teacher_id })), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["teacher_id"], teacher_id.as_str());

    let (status, _) = send(&app, Method::PATCH, &assign(&second), Some(json!({ "teacher_id": teacher_id })), Some(&token)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Back-to-back lessons do not overlap
    let (status, _) = send(&app, Method::PATCH, &assign(&third), Some(json!({ "teacher_id": teacher_id })), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        Method::PATCH,
        &assign(&second),
        Some(json!({ "teacher_id": uuid::Uuid::new_v4() })),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Cancelling the first lesson frees the slot
    let status_uri = format!("/api/admin/lessons/{}/status", first["id"].as_str().unwrap());
    send(&app, Method::PATCH, &status_uri, Some(json!({ "status": "CANCELLED" })), Some(&token)).await;
    let (status, _) = send(&app, Method::PATCH, &assign(&second), Some(json!({ "teacher_id": teacher_id })), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, assigned) = send(
        &app,
        Method::GET,
        &format!("/api/admin/lessons?teacher_id={teacher_id}"),
        None,
        Some(&token),
    )
    .await;
    assert_eq!(assigned.as_array().unwrap().len(), 3);

    // Deleting the teacher unassigns every lesson
    let (status, _) = send(&app, Method::DELETE, &format!("/api/admin/teachers/{teacher_id}"), None, Some(&token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, lesson) = send(
        &app,
        Method::GET,
        &format!("/api/admin/lessons/{}", third["id"].as_str().unwrap()),
        None,
        Some(&token),
    )
    .await;
    assert!(lesson["teacher_id"].is_null());
}

#[tokio::test]
async fn test_teacher_names_are_unique() {
    let app = test_app();
    let token = login(&app).await;

    let (status, teacher) = send(&app, Method::POST, "/api/admin/teachers", Some(json!({ "name": "Ilze Liepa" })), Some(&token)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(&app, Method::POST, "/api/admin/teachers", Some(json!({ "name": "ilze liepa" })), Some(&token)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/admin/teachers/{}", teacher["id"].as_str().unwrap()),
        Some(json!({ "name": "Ilze Liepa-Kalna" })),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ilze Liepa-Kalna");

    let (status, _) = send(&app, Method::POST, "/api/admin/teachers", Some(json!({ "name": "   " })), Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_calendar_and_revenue() {
    let app = test_app();
    let token = login(&app).await;
    let products = product_ids(&app, "?product_type=HELMET").await;
    let ids = vec![products[0].0.clone()];
    let start = in_days(20);

    let first = submit_booking(&app, &ids, start, start + Duration::days(2)).await;
    submit_booking(&app, &ids, start, start).await;
    let (_, lesson) = send(&app, Method::POST, "/api/lessons", Some(lesson_body(start, "10:00", 1, 3)), None).await;

    let uri = format!("/api/admin/calendar?year={}&month={}", start.format("%Y"), start.format("%m"));
    let (status, calendar) = send(&app, Method::GET, &uri, None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let day = calendar["days"]
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["date"] == json!(start))
        .unwrap();
    assert_eq!(day["rental_guests"], 2);
    assert_eq!(day["lesson_guests"], 3);
    assert_eq!(day["total_guests"], 5);

    let (status, _) = send(&app, Method::GET, "/api/admin/calendar?year=2027&month=13", None, Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Only confirmed and completed reservations count as revenue
    let confirm = json!({ "status": "CONFIRMED" });
    send(
        &app,
        Method::PATCH,
        &format!("/api/admin/bookings/{}/status", first["id"].as_str().unwrap()),
        Some(confirm.clone()),
        Some(&token),
    )
    .await;
    send(
        &app,
        Method::PATCH,
        &format!("/api/admin/lessons/{}/status", lesson["id"].as_str().unwrap()),
        Some(confirm),
        Some(&token),
    )
    .await;

    let uri = format!("/api/admin/reports/revenue?from={start}&to={start}&granularity=day");
    let (status, report) = send(&app, Method::GET, &uri, None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let rental = products[0].1 * 3;
    let lesson_price = 4000 + 2 * 1500;
    assert_eq!(report["rental_total_cents"], rental);
    assert_eq!(report["lesson_total_cents"], lesson_price);
    assert_eq!(report["total_cents"], rental + lesson_price);
    assert_eq!(report["buckets"].as_array().unwrap().len(), 1);
    assert_eq!(report["rental_by_product_type"]["HELMET"], rental);

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/admin/reports/revenue?granularity=week",
        None,
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_revenue_range_with_one_end() {
    let app = test_app();
    let token = login(&app).await;
    let year = chrono::Local::now().date_naive().year();

    // Only `to`: the range starts on Jan 1 of that year, even for a past year
    let uri = format!("/api/admin/reports/revenue?to={}-06-30", year - 1);
    let (status, report) = send(&app, Method::GET, &uri, None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK, "{report}");
    assert_eq!(report["from"], format!("{}-01-01", year - 1));
    assert_eq!(report["buckets"].as_array().unwrap().len(), 6);

    // Only `from`: the range runs to Dec 31 of that year
    let uri = format!("/api/admin/reports/revenue?from={}-11-05", year + 2);
    let (status, report) = send(&app, Method::GET, &uri, None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK, "{report}");
    assert_eq!(report["to"], format!("{}-12-31", year + 2));
    assert_eq!(report["buckets"].as_array().unwrap().len(), 2);

    let uri = format!("/api/admin/reports/revenue?from={year}-03-01&to={year}-02-01");
    let (status, _) = send(&app, Method::GET, &uri, None, Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_calendar_with_one_parameter() {
    let app = test_app();
    let token = login(&app).await;
    let today = chrono::Local::now().date_naive();

    let (status, calendar) = send(&app, Method::GET, "/api/admin/calendar?year=2030", None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(calendar["year"], 2030);
    assert_eq!(calendar["month"], today.month());
    assert_eq!(calendar["days"][0]["date"], format!("2030-{:02}-01", today.month()));

    let (status, calendar) = send(&app, Method::GET, "/api/admin/calendar?month=2", None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(calendar["year"], today.year());
    assert_eq!(calendar["days"][0]["date"], format!("{}-02-01", today.year()));

    let (status, _) = send(&app, Method::GET, "/api/admin/calendar?month=0", None, Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_product_and_pricing_management() {
    let app = test_app();
    let token = login(&app).await;

    let (status, product) = send(
        &app,
        Method::POST,
        "/api/admin/products",
        Some(json!({ "product_type": "GOGGLES", "name": "Smith I/O", "price_cents": 600, "size": " ", "professional": true })),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(product["is_professional"], true);
    assert_eq!(product["is_standard"], false);
    assert!(product["size"].is_null());

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/admin/products",
        Some(json!({ "product_type": "GOGGLES", "name": "Cheap", "price_cents": -1 })),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Prices are capped so report totals stay in range
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/admin/products",
        Some(json!({ "product_type": "GOGGLES", "name": "Gold", "price_cents": 100_000_001 })),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, pricing) = send(
        &app,
        Method::PUT,
        "/api/admin/lesson-pricing",
        Some(json!({ "people": 2, "duration_hours": 1, "price_cents": 6100 })),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pricing["price_cents"], 6100);

    let (_, rows) = send(&app, Method::GET, "/api/lesson-pricing", None, None).await;
    assert_eq!(rows.as_array().unwrap().len(), 18);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/admin/lesson-pricing/{}", pricing["id"].as_str().unwrap()),
        None,
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // The deleted cell can no longer be booked
    let (status, body) = send(&app, Method::POST, "/api/lessons/quote", Some(lesson_body(in_days(4), "10:00", 1, 2)), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("2 people"));
}

#[tokio::test]
async fn test_export_workbook() {
    let app = test_app();
    let token = login(&app).await;
    let ids: Vec<String> = product_ids(&app, "?product_type=POLES").await.into_iter().map(|(id, _)| id).collect();
    submit_booking(&app, &ids, in_days(2), in_days(3)).await;
    let (status, _) = send(&app, Method::POST, "/api/lessons", Some(lesson_body(in_days(2), "11:00", 2, 2)), None).await;
    assert_eq!(status, StatusCode::CREATED);

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/admin/export")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .starts_with("attachment"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
    let mut read_part = |name: &str| {
        let mut xml = String::new();
        archive.by_name(name).unwrap().read_to_string(&mut xml).unwrap();
        xml
    };

    let workbook = read_part("xl/workbook.xml");
    assert!(workbook.contains(r#"name="Bookings""#));
    assert!(workbook.contains(r#"name="Lessons""#));
    assert!(read_part("xl/worksheets/sheet1.xml").contains(r#"<row r="2""#));
    assert!(read_part("xl/worksheets/sheet2.xml").contains(r#"<row r="2""#));

    let strings = read_part("xl/sharedStrings.xml");
    for text in ["Janis Ozols", "Pick up at 9", "Liga Ozola", "Guest 2 (12)"] {
        assert!(strings.contains(text), "missing {text}");
    }
}
