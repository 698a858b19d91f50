// tests/api_tests.rs

use campus_admin::{routes, state::AppState};
use serde_json::{Value, json};

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
async fn spawn_app() -> String {
    // In-memory repositories: every test gets a fresh, isolated store.
    let state = AppState::in_memory();
    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

async fn create_department(client: &reqwest::Client, address: &str, code: &str, name: &str) -> Value {
    let response = client
        .post(format!("{}/api/departments", address))
        .json(&json!({ "code": code, "name": name }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 201);
    response.json().await.unwrap()
}

#[tokio::test]
async fn health_check_reports_storage() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/health", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");
}

#[tokio::test]
async fn unknown_path_is_404() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let doc: Value = client
        .get(format!("{}/api/openapi.json", address))
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();

    assert!(doc["paths"]["/api/departments/{id}/faculty/{faculty_id}"]["post"].is_object());
    assert!(doc["paths"]["/api/examinations/course/{course_id}"]["get"].is_object());
}

#[tokio::test]
async fn announcement_content_is_sanitized() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/announcements", address))
        .json(&json!({
            "title": "  Exam timetable  ",
            "content": "<p>Timetable is out</p><script>alert('x')</script>",
            "audience": "students",
            "attachment_url": "https://campus.example.edu/timetable.pdf"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["title"], "Exam timetable");
    assert_eq!(body["content"], "<p>Timetable is out</p>");
    assert_eq!(body["audience"], "students");
    assert_eq!(body["is_pinned"], false);

    // Nothing readable left after sanitization
    let response = client
        .post(format!("{}/api/announcements", address))
        .json(&json!({ "title": "Sneaky", "content": "<script>alert('x')</script>" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn escaped_content_must_fit_the_length_limit() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Every '&' is stored as "&amp;", so 20000 of them overflow the limit once cleaned
    let response = client
        .post(format!("{}/api/announcements", address))
        .json(&json!({ "title": "Ampersands", "content": "&".repeat(20000) }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("after sanitization"));

    let response = client
        .post(format!("{}/api/announcements", address))
        .json(&json!({ "title": "Ampersands", "content": "&".repeat(4000) }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 201);
    let created: Value = response.json().await.unwrap();
    assert_eq!(created["content"].as_str().unwrap().chars().count(), 20000);

    let response = client
        .put(format!("{}/api/announcements/{}", address, created["id"]))
        .json(&json!({ "content": "&".repeat(4001) }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn bad_path_and_query_values_use_the_error_shape() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    for url in [
        format!("{}/api/announcements/abc", address),
        format!("{}/api/announcements?audience=alumni", address),
        format!("{}/api/examinations?exam_type=oral", address),
        format!("{}/api/examinations/course/intro-101", address),
    ] {
        let response = client.get(&url).send().await.expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 400, "{url}");
        let body: Value = response.json().await.unwrap();
        assert!(body["error"].is_string(), "{url}");
    }

    let response = client
        .post(format!("{}/api/departments/1/faculty/x", address))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn announcement_validation_failures() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let cases = [
        json!({ "title": "", "content": "body" }),
        json!({ "title": "Bad link", "content": "body", "attachment_url": "not a url" }),
        json!({ "title": "Bad audience", "content": "body", "audience": "alumni" }),
        json!({ "title": "Orphan", "content": "body", "department_id": 404 }),
    ];

    for case in cases {
        let response = client
            .post(format!("{}/api/announcements", address))
            .json(&case)
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 400, "payload {case}");
        let body: Value = response.json().await.unwrap();
        assert!(body["error"].is_string());
    }

    // Malformed JSON still yields the JSON error shape
    let response = client
        .post(format!("{}/api/announcements", address))
        .header("Content-Type", "application/json")
        .body("{\"title\": ")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn announcements_list_pinned_first_and_filters() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let dept = create_department(&client, &address, "HIST", "History").await;

    for (title, audience, pinned, department_id) in [
        ("Open day", "all", false, Value::Null),
        ("Fee deadline", "students", true, Value::Null),
        ("Staff meeting", "faculty", false, dept["id"].clone()),
    ] {
        let response = client
            .post(format!("{}/api/announcements", address))
            .json(&json!({
                "title": title,
                "content": "<p>details</p>",
                "audience": audience,
                "is_pinned": pinned,
                "department_id": department_id
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 201);
    }

    let all: Vec<Value> = client
        .get(format!("{}/api/announcements", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let titles: Vec<&str> = all.iter().map(|a| a["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["Fee deadline", "Staff meeting", "Open day"]);

    let faculty_only: Vec<Value> = client
        .get(format!("{}/api/announcements", address))
        .query(&[("audience", "faculty")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(faculty_only.len(), 1);
    assert_eq!(faculty_only[0]["title"], "Staff meeting");

    let pinned: Vec<Value> = client
        .get(format!("{}/api/announcements", address))
        .query(&[("pinned", "true")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(pinned.len(), 1);
    assert_eq!(pinned[0]["title"], "Fee deadline");

    // Deleting the department detaches its announcements
    let response = client
        .delete(format!("{}/api/departments/{}", address, dept["id"]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);

    let by_dept: Vec<Value> = client
        .get(format!("{}/api/announcements", address))
        .query(&[("department_id", dept["id"].to_string())])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(by_dept.is_empty());
}

#[tokio::test]
async fn empty_update_returns_current_record() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let dept = create_department(&client, &address, "BIO", "Biology").await;

    let response = client
        .put(format!("{}/api/departments/{}", address, dept["id"]))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, dept);

    let response = client
        .put(format!("{}/api/departments/9999", address))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn department_conflicts_and_faculty_rules() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let cs = create_department(&client, &address, "CS", "Computer Science").await;
    create_department(&client, &address, "MATH", "Mathematics").await;

    // Duplicate code
    let response = client
        .post(format!("{}/api/departments", address))
        .json(&json!({ "code": "CS", "name": "Cognitive Science" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 409);

    // Renaming onto another department's name
    let response = client
        .put(format!("{}/api/departments/{}", address, cs["id"]))
        .json(&json!({ "name": "Mathematics" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 409);

    // Lower-case code is invalid
    let response = client
        .post(format!("{}/api/departments", address))
        .json(&json!({ "code": "chem", "name": "Chemistry" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    // Faculty association
    let url = format!("{}/api/departments/{}/faculty/5", address, cs["id"]);
    assert_eq!(client.post(&url).send().await.unwrap().status().as_u16(), 201);
    assert_eq!(client.post(&url).send().await.unwrap().status().as_u16(), 409);

    let response = client
        .post(format!("{}/api/departments/{}/faculty/0", address, cs["id"]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    let response = client
        .post(format!("{}/api/departments/424242/faculty/5", address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);

    // Departments are listed by code
    let list: Vec<Value> = client
        .get(format!("{}/api/departments", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let codes: Vec<&str> = list.iter().map(|d| d["code"].as_str().unwrap()).collect();
    assert_eq!(codes, vec!["CS", "MATH"]);
    assert_eq!(list[0]["faculty_ids"], json!([5]));
}

#[tokio::test]
async fn examination_filters_and_validation() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    for (course_id, exam_type, scheduled_at) in [
        (101, "midterm", "2025-10-20T09:00:00Z"),
        (101, "final", "2025-12-18T09:00:00Z"),
        (202, "quiz", "2025-11-05T14:00:00Z"),
    ] {
        let response = client
            .post(format!("{}/api/examinations", address))
            .json(&json!({
                "course_id": course_id,
                "title": format!("{} {}", course_id, exam_type),
                "exam_type": exam_type,
                "scheduled_at": scheduled_at,
                "duration_minutes": 90,
                "venue": "Main Hall"
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 201);
    }

    let all: Vec<Value> = client
        .get(format!("{}/api/examinations", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let types: Vec<&str> = all.iter().map(|e| e["exam_type"].as_str().unwrap()).collect();
    assert_eq!(types, vec!["midterm", "quiz", "final"]);

    let november: Vec<Value> = client
        .get(format!("{}/api/examinations", address))
        .query(&[("from", "2025-11-01T00:00:00Z"), ("to", "2025-11-30T23:59:59Z")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(november.len(), 1);
    assert_eq!(november[0]["course_id"], 202);

    let finals: Vec<Value> = client
        .get(format!("{}/api/examinations", address))
        .query(&[("exam_type", "final")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(finals.len(), 1);

    let response = client
        .get(format!("{}/api/examinations", address))
        .query(&[("from", "2025-12-01T00:00:00Z"), ("to", "2025-11-01T00:00:00Z")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    let course: Vec<Value> = client
        .get(format!("{}/api/examinations/course/101", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(course.len(), 2);
    assert_eq!(course[0]["exam_type"], "midterm");

    let response = client
        .post(format!("{}/api/examinations", address))
        .json(&json!({
            "course_id": 101,
            "title": "Too long",
            "exam_type": "final",
            "scheduled_at": "2025-12-18T09:00:00Z",
            "duration_minutes": 601
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    let response = client
        .put(format!("{}/api/examinations/777", address))
        .json(&json!({ "venue": "Room 1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}
