//! RestClient against a one-shot local HTTP responder

use bigdecimal::BigDecimal;
use hisab_kitab_core::{
    ClientConfig, Customer, CustomerService, HisabError, RestClient, StaffService, User,
    UserService,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

fn header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|window| window == b"\r\n\r\n")
}

/// Accept one connection, answer it with `status` and `body`, and hand back the raw request
async fn respond_once(status: &'static str, body: &'static str) -> (RestClient, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut chunk = [0u8; 1024];

        loop {
            let read = socket.read(&mut chunk).await.unwrap();
            if read == 0 {
                break;
            }
            request.extend_from_slice(&chunk[..read]);

            if let Some(end) = header_end(&request) {
                let headers = String::from_utf8_lossy(&request[..end]).to_lowercase();
                let content_length = headers
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .map(|value| value.trim().parse::<usize>().unwrap())
                    .unwrap_or(0);
                if request.len() >= end + 4 + content_length {
                    break;
                }
            }
        }

        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();

        String::from_utf8_lossy(&request).into_owned()
    });

    let client = RestClient::new(&ClientConfig {
        base_url: format!("http://{addr}/api/"),
        timeout_secs: 5,
    })
    .unwrap();

    (client, handle)
}

#[tokio::test]
async fn test_list_customers_for_user() {
    let (client, server) = respond_once(
        "200 OK",
        r#"[{"customerID": 11, "name": "Ramesh", "mobile": "9000000001", "rate": 100,
            "quantity": 2, "discountInRs": 0, "discountInPer": 10, "description": "",
            "receivedAmt": 80, "total": 180, "userID": 3}]"#,
    )
    .await;

    let customers = client.list_customers_for_user(3).await.unwrap();
    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0].customer_id, Some(11));
    assert_eq!(customers[0].total, BigDecimal::from(180));

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /api/Customers?userID=3 HTTP/1.1"), "{request}");
}

#[tokio::test]
async fn test_create_user_posts_json() {
    let (client, server) = respond_once(
        "201 Created",
        r#"{"userID": 1, "name": "Asha", "mobile": "9876543210", "password": "secret",
            "businessName": "Asha Dairy", "paidAmount": 0, "recAmount": 0,
            "staffs": [], "customers": []}"#,
    )
    .await;

    let user = User::new(
        "Asha".to_string(),
        "9876543210".to_string(),
        "secret".to_string(),
        "Asha Dairy".to_string(),
    );
    let created = client.create_user(&user).await.unwrap();
    assert_eq!(created.user_id, Some(1));

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/Users HTTP/1.1"), "{request}");
    assert!(request.contains(r#""businessName":"Asha Dairy""#), "{request}");
    assert!(!request.contains("userID"), "{request}");
}

#[tokio::test]
async fn test_put_accepts_no_content() {
    let (client, server) = respond_once("204 No Content", "").await;

    let customer: Customer = serde_json::from_str(
        r#"{"customerID": 11, "name": "Ramesh", "mobile": "9000000001", "rate": 12.5,
            "quantity": 2, "total": 25, "userID": 3}"#,
    )
    .unwrap();
    client.update_customer(11, &customer).await.unwrap();

    let request = server.await.unwrap();
    assert!(request.starts_with("PUT /api/Customers/11 HTTP/1.1"), "{request}");
    assert!(request.contains(r#""rate":12.5"#), "{request}");
}

#[tokio::test]
async fn test_delete_staff() {
    let (client, server) = respond_once("204 No Content", "").await;

    client.delete_staff(4).await.unwrap();

    let request = server.await.unwrap();
    assert!(request.starts_with("DELETE /api/Staffs/4 HTTP/1.1"), "{request}");
}

#[tokio::test]
async fn test_not_found_and_server_errors() {
    let (client, server) = respond_once("404 Not Found", "").await;
    let err = client.get_user(99).await.unwrap_err();
    assert!(matches!(err, HisabError::NotFound(_)));
    server.await.unwrap();

    let (client, server) = respond_once("500 Internal Server Error", "boom").await;
    let err = client.list_staff_for_user(1).await.unwrap_err();
    assert!(matches!(err, HisabError::Remote(ref m) if m.contains("500")), "{err}");
    assert_eq!(err.alert().message, "Something went wrong. Please try again.");
    let request = server.await.unwrap();
    assert!(request.starts_with("GET /api/Staffs?userId=1 HTTP/1.1"), "{request}");
}

#[tokio::test]
async fn test_malformed_body_is_a_decode_error() {
    let (client, server) = respond_once("200 OK", r#"{"unexpected": true}"#).await;
    let err = client.list_users().await.unwrap_err();
    assert!(matches!(err, HisabError::Decode(_)));
    server.await.unwrap();
}

