//! API integration tests
//!
//! These run against a live server with a migrated database.
//! Run with: cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

fn unique_suffix() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos()
}

/// Get an admin token. Registration may 409 if a previous run already
/// created the account; login is what matters.
async fn admin_token(client: &Client) -> String {
    let _ = client
        .post(format!("{}/auth/admin/register", BASE_URL))
        .json(&json!({"username": "it-admin", "password": "it-admin-pass"}))
        .send()
        .await
        .expect("Failed to send register request");

    let response = client
        .post(format!("{}/auth/admin/login", BASE_URL))
        .json(&json!({"username": "it-admin", "password": "it-admin-pass"}))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Register a fresh student and return their token
async fn new_student_token(client: &Client) -> String {
    let n = unique_suffix();
    let email = format!("student{}@campus.test", n);

    let response = client
        .post(format!("{}/auth/student/register", BASE_URL))
        .json(&json!({
            "name": "Test Student",
            "roll_no": format!("R{}", n),
            "department": "CS",
            "email": email,
            "password": "student-pass"
        }))
        .send()
        .await
        .expect("Failed to send register request");
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/auth/student/login", BASE_URL))
        .json(&json!({"email": email, "password": "student-pass"}))
        .send()
        .await
        .expect("Failed to send login request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Create a book with the given copy count, returning its id
async fn create_book(client: &Client, token: &str, total_copies: i64) -> i64 {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "title": "Integration Testing in Practice",
            "author": "T. Harness",
            "isbn": format!("978-{}", unique_suffix()),
            "category": "Technology",
            "total_copies": total_copies
        }))
        .send()
        .await
        .expect("Failed to send create request");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse create response");
    assert_eq!(body["available_copies"], body["total_copies"]);
    body["id"].as_i64().expect("No book ID")
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_student_login_invalid_password() {
    let client = Client::new();
    let n = unique_suffix();
    let email = format!("student{}@campus.test", n);

    let response = client
        .post(format!("{}/auth/student/register", BASE_URL))
        .json(&json!({
            "name": "Login Test",
            "roll_no": format!("R{}", n),
            "email": email,
            "password": "correct-pass"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/auth/student/login", BASE_URL))
        .json(&json!({"email": email, "password": "wrong-pass"}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_student_registration_conflicts() {
    let client = Client::new();
    let n = unique_suffix();
    let payload = json!({
        "name": "Dup Student",
        "roll_no": format!("R{}", n),
        "email": format!("dup{}@campus.test", n),
        "password": "student-pass"
    });

    let response = client
        .post(format!("{}/auth/student/register", BASE_URL))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/auth/student/register", BASE_URL))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_list_books_is_public() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body.is_array());
    // Default filter: only Active books are listed
    for book in body.as_array().unwrap() {
        assert_eq!(book["status"], "Active");
    }
}

#[tokio::test]
#[ignore]
async fn test_create_book_requires_admin() {
    let client = Client::new();

    // No token at all
    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "title": "Nope",
            "author": "Nobody",
            "isbn": format!("978-{}", unique_suffix()),
            "category": "Other"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);

    // Student token is not enough
    let student = new_student_token(&client).await;
    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", student))
        .json(&json!({
            "title": "Nope",
            "author": "Nobody",
            "isbn": format!("978-{}", unique_suffix()),
            "category": "Other"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_isbn_conflicts() {
    let client = Client::new();
    let token = admin_token(&client).await;
    let isbn = format!("978-{}", unique_suffix());

    let payload = json!({
        "title": "First Edition",
        "author": "A. Writer",
        "isbn": isbn,
        "category": "Fiction",
        "total_copies": 1
    });

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/books", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_borrow_return_cycle() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let student_a = new_student_token(&client).await;
    let student_b = new_student_token(&client).await;

    let book_id = create_book(&client, &admin, 3).await;

    // Student A borrows: 3 -> 2, due date 14 days out
    let response = client
        .post(format!("{}/books/{}/borrow", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", student_a))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["available_copies"], 2);
    assert!(body["due_date"].is_string());

    // A's borrowed list has exactly this book, not overdue
    let response = client
        .get(format!("{}/students/me/borrowed", BASE_URL))
        .header("Authorization", format!("Bearer {}", student_a))
        .send()
        .await
        .expect("Failed to send request");
    let borrowed: Value = response.json().await.expect("Failed to parse response");
    let borrowed = borrowed.as_array().unwrap();
    assert_eq!(borrowed.len(), 1);
    assert_eq!(borrowed[0]["id"].as_i64().unwrap(), book_id);
    assert_eq!(borrowed[0]["is_overdue"], false);

    // Student B borrows: 2 -> 1
    let response = client
        .post(format!("{}/books/{}/borrow", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", student_b))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["available_copies"], 1);

    // A returns: 1 -> 2, and A's list is empty again
    let response = client
        .post(format!("{}/books/{}/return", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", student_a))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["available_copies"], 2);

    let response = client
        .get(format!("{}/students/me/borrowed", BASE_URL))
        .header("Authorization", format!("Bearer {}", student_a))
        .send()
        .await
        .expect("Failed to send request");
    let borrowed: Value = response.json().await.expect("Failed to parse response");
    assert!(borrowed.as_array().unwrap().is_empty());

    // Delete while B still holds a copy: rejected
    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    // B returns, then delete succeeds
    let response = client
        .post(format!("{}/books/{}/return", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", student_b))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);
}

#[tokio::test]
#[ignore]
async fn test_borrow_with_no_copies_fails() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let student = new_student_token(&client).await;

    let book_id = create_book(&client, &admin, 0).await;

    let response = client
        .post(format!("{}/books/{}/borrow", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", student))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "NoCopiesAvailable");

    // No mutation happened
    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    let book: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(book["available_copies"], 0);
    assert!(book["borrowed_by"].as_array().unwrap().is_empty());
}

#[tokio::test]
#[ignore]
async fn test_double_borrow_fails() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let student = new_student_token(&client).await;

    let book_id = create_book(&client, &admin, 2).await;

    let response = client
        .post(format!("{}/books/{}/borrow", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", student))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .post(format!("{}/books/{}/borrow", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", student))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "AlreadyBorrowed");
}

#[tokio::test]
#[ignore]
async fn test_return_without_loan_fails() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let student = new_student_token(&client).await;

    let book_id = create_book(&client, &admin, 1).await;

    let response = client
        .post(format!("{}/books/{}/return", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", student))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "NoActiveLoan");
}

#[tokio::test]
#[ignore]
async fn test_inactive_book_cannot_be_borrowed() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let student = new_student_token(&client).await;

    let book_id = create_book(&client, &admin, 1).await;

    let response = client
        .put(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&json!({"status": "Inactive"}))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .post(format!("{}/books/{}/borrow", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", student))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "NotBorrowable");
}

#[tokio::test]
#[ignore]
async fn test_adjust_total_copies() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let student = new_student_token(&client).await;

    let book_id = create_book(&client, &admin, 2).await;

    // One copy out on loan
    let response = client
        .post(format!("{}/books/{}/borrow", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", student))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    // Shrink to exactly the borrowed count: available becomes 0
    let response = client
        .put(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&json!({"total_copies": 1}))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["total_copies"], 1);
    assert_eq!(body["available_copies"], 0);

    // Below the borrowed count: rejected, book unchanged
    let response = client
        .put(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&json!({"total_copies": 0}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    let book: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(book["total_copies"], 1);
    assert_eq!(book["available_copies"], 0);

    // Grow: borrowed count preserved
    let response = client
        .put(format!("{}/books/{}", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&json!({"total_copies": 5}))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["total_copies"], 5);
    assert_eq!(body["available_copies"], 4);
}

#[tokio::test]
#[ignore]
async fn test_book_details_show_borrowers() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let student = new_student_token(&client).await;

    let book_id = create_book(&client, &admin, 1).await;

    let response = client
        .post(format!("{}/books/{}/borrow", BASE_URL, book_id))
        .header("Authorization", format!("Bearer {}", student))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    let book: Value = response.json().await.expect("Failed to parse response");

    let borrowers = book["borrowed_by"].as_array().unwrap();
    assert_eq!(borrowers.len(), 1);
    assert_eq!(borrowers[0]["student_name"], "Test Student");
    assert!(borrowers[0]["due_date"].is_string());

    // Counter matches the derived list length
    let total = book["total_copies"].as_i64().unwrap();
    let available = book["available_copies"].as_i64().unwrap();
    assert_eq!(total - available, borrowers.len() as i64);
}

#[tokio::test]
#[ignore]
async fn test_stats_overview() {
    let client = Client::new();
    let admin = admin_token(&client).await;

    let response = client
        .get(format!("{}/books/stats/overview", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["total_books"].is_number());
    let total = body["total_copies"].as_i64().unwrap();
    let available = body["available_copies"].as_i64().unwrap();
    assert_eq!(body["borrowed_copies"].as_i64().unwrap(), total - available);
    assert!(body["category_stats"].is_array());

    // Admin-only
    let student = new_student_token(&client).await;
    let response = client
        .get(format!("{}/books/stats/overview", BASE_URL))
        .header("Authorization", format!("Bearer {}", student))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);
}
