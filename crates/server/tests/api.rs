//! End-to-end API tests.
//!
//! Each test spawns the full router on an ephemeral port over a private
//! in-memory `SQLite` database and drives it with reqwest.

use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use tradepost_server::{config::Config, db, routes, state::AppState};

/// A running test server.
struct TestApp {
    base_url: String,
    client: Client,
}

impl TestApp {
    /// Spawn the app on an ephemeral port with a fresh in-memory database.
    async fn spawn() -> Self {
        // A single pooled connection keeps the in-memory database alive for
        // the lifetime of the test.
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .expect("valid sqlite url")
            .foreign_keys(true);
        let pool: SqlitePool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .expect("connect in-memory sqlite");
        db::schema::ensure_schema(&pool)
            .await
            .expect("ensure schema");

        let config = Config {
            database_url: "sqlite::memory:".to_owned(),
            host: Ipv4Addr::LOCALHOST.into(),
            port: 0,
        };
        let state = AppState::new(config, pool);
        let app = routes::router().with_state(state);

        let listener =
            tokio::net::TcpListener::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0)))
                .await
                .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });

        Self {
            base_url: format!("http://{addr}"),
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn create_customer(&self, email: &str, telephone: &str) -> Value {
        let resp = self
            .client
            .post(self.url("/customers"))
            .json(&json!({
                "first_name": "Jane",
                "last_name": "Doe",
                "email": email,
                "telephone": telephone,
            }))
            .send()
            .await
            .expect("create customer");
        assert_eq!(resp.status(), StatusCode::CREATED);
        resp.json().await.expect("customer body")
    }
}

#[tokio::test]
async fn health_check_works() {
    let app = TestApp::spawn().await;
    let resp = app
        .client
        .get(app.url("/health"))
        .send()
        .await
        .expect("health request");
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.expect("body"), "OK");
}

#[tokio::test]
async fn create_customer_round_trips_all_fields() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .post(app.url("/customers"))
        .json(&json!({
            "first_name": "John",
            "last_name": "Doe",
            "email": "john@example.com",
            "telephone": "1234567890",
            "addresses": [{
                "kind": "billing",
                "street": "123 Main St",
                "city": "Test City",
                "state": "TS",
                "zip_code": "12345"
            }]
        }))
        .send()
        .await
        .expect("create customer");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = resp.json().await.expect("body");
    assert_eq!(body["first_name"], "John");
    assert_eq!(body["last_name"], "Doe");
    assert_eq!(body["email"], "john@example.com");
    assert_eq!(body["telephone"], "1234567890");
    assert!(body["id"].as_i64().is_some());

    let addresses = body["addresses"].as_array().expect("addresses array");
    assert_eq!(addresses.len(), 1);
    assert_eq!(addresses[0]["kind"], "billing");
    assert_eq!(addresses[0]["street"], "123 Main St");
    assert_eq!(addresses[0]["city"], "Test City");
    assert_eq!(addresses[0]["state"], "TS");
    assert_eq!(addresses[0]["zip_code"], "12345");

    // Lookup by email and by telephone both find the same customer.
    for query in ["email=john@example.com", "telephone=1234567890"] {
        let resp = app
            .client
            .get(app.url(&format!("/customers/history?{query}")))
            .send()
            .await
            .expect("history request");
        assert_eq!(resp.status(), StatusCode::OK);
        let history: Value = resp.json().await.expect("history body");
        assert_eq!(history["customer"]["id"], body["id"]);
        assert_eq!(history["customer"]["email"], "john@example.com");
        assert_eq!(history["orders"].as_array().expect("orders").len(), 0);
    }
}

#[tokio::test]
async fn duplicate_email_or_telephone_conflicts() {
    let app = TestApp::spawn().await;
    app.create_customer("dup@example.com", "1112223333").await;

    // Same email, different telephone.
    let resp = app
        .client
        .post(app.url("/customers"))
        .json(&json!({
            "first_name": "Other",
            "last_name": "Person",
            "email": "dup@example.com",
            "telephone": "9998887777",
        }))
        .send()
        .await
        .expect("conflict request");
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = resp.json().await.expect("error body");
    assert!(body["error"].as_str().expect("error string").contains("email"));

    // Same telephone, different email.
    let resp = app
        .client
        .post(app.url("/customers"))
        .json(&json!({
            "first_name": "Other",
            "last_name": "Person",
            "email": "other@example.com",
            "telephone": "1112223333",
        }))
        .send()
        .await
        .expect("conflict request");
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // The conflicting requests left no partial rows behind.
    let resp = app
        .client
        .get(app.url("/customers/history?email=other@example.com"))
        .send()
        .await
        .expect("history request");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_customer_validates_payload() {
    let app = TestApp::spawn().await;

    let cases = [
        json!({"first_name": " ", "last_name": "Doe", "email": "a@b.c", "telephone": "1234567890"}),
        json!({"first_name": "Jane", "last_name": "", "email": "a@b.c", "telephone": "1234567890"}),
        json!({"first_name": "Jane", "last_name": "Doe", "email": "not-an-email", "telephone": "1234567890"}),
        json!({"first_name": "Jane", "last_name": "Doe", "email": "a@b.c", "telephone": "123"}),
        json!({"first_name": "Jane", "last_name": "Doe", "email": "a@b.c", "telephone": "1234567890",
               "addresses": [{"kind": "billing", "street": "", "city": "C", "state": "S", "zip_code": "1"}]}),
    ];

    for case in cases {
        let resp = app
            .client
            .post(app.url("/customers"))
            .json(&case)
            .send()
            .await
            .expect("invalid create");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "case: {case}");
    }
}

#[tokio::test]
async fn history_requires_exactly_one_lookup_key() {
    let app = TestApp::spawn().await;
    app.create_customer("one@example.com", "1234567890").await;

    for query in [
        "",
        "email=one@example.com&telephone=1234567890",
    ] {
        let resp = app
            .client
            .get(app.url(&format!("/customers/history?{query}")))
            .send()
            .await
            .expect("history request");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "query: {query:?}");
    }

    let resp = app
        .client
        .get(app.url("/customers/history?email=unknown@example.com"))
        .send()
        .await
        .expect("history request");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.expect("error body");
    assert_eq!(body["error"], "Not found: no customer matches the given key");
}

#[tokio::test]
async fn order_for_unknown_customer_is_not_found() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .post(app.url("/customers/9999/orders"))
        .json(&json!({"channel": "online", "total_amount": 10.0}))
        .send()
        .await
        .expect("order request");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.expect("error body");
    assert_eq!(body["error"], "Not found: customer 9999");
}

#[tokio::test]
async fn online_order_links_inline_and_existing_shipping_addresses() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .post(app.url("/customers"))
        .json(&json!({
            "first_name": "Jane",
            "last_name": "Doe",
            "email": "jane@example.com",
            "telephone": "1234567890",
            "addresses": [{
                "kind": "shipping",
                "street": "1 Existing Way",
                "city": "Town",
                "state": "TS",
                "zip_code": "11111"
            }]
        }))
        .send()
        .await
        .expect("create customer");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let customer: Value = resp.json().await.expect("customer body");
    let customer_id = customer["id"].as_i64().expect("customer id");
    let existing_address_id = customer["addresses"][0]["id"].as_i64().expect("address id");

    let resp = app
        .client
        .post(app.url(&format!("/customers/{customer_id}/orders")))
        .json(&json!({
            "channel": "online",
            "total_amount": 42.5,
            "shipping_address_ids": [existing_address_id],
            "shipping_addresses": [{
                "street": "2 New Rd",
                "city": "Town",
                "state": "TS",
                "zip_code": "22222"
            }]
        }))
        .send()
        .await
        .expect("create order");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let order: Value = resp.json().await.expect("order body");
    assert_eq!(order["channel"], "online");
    assert_eq!(order["customer_id"].as_i64(), Some(customer_id));
    let shipping = order["shipping_addresses"].as_array().expect("addresses");
    assert_eq!(shipping.len(), 2);
    for address in shipping {
        assert_eq!(address["kind"], "shipping");
        assert_eq!(address["customer_id"].as_i64(), Some(customer_id));
    }

    // The order shows up in the history with its shipping addresses.
    let resp = app
        .client
        .get(app.url("/customers/history?email=jane@example.com"))
        .send()
        .await
        .expect("history request");
    assert_eq!(resp.status(), StatusCode::OK);
    let history: Value = resp.json().await.expect("history body");
    let orders = history["orders"].as_array().expect("orders");
    assert_eq!(orders.len(), 1);
    assert_eq!(
        orders[0]["shipping_addresses"]
            .as_array()
            .expect("shipping addresses")
            .len(),
        2
    );
    // The inline address is now owned by the customer too.
    assert_eq!(
        history["customer"]["addresses"]
            .as_array()
            .expect("customer addresses")
            .len(),
        2
    );
}

#[tokio::test]
async fn order_validation_rules() {
    let app = TestApp::spawn().await;
    let customer = app.create_customer("rules@example.com", "2223334444").await;
    let customer_id = customer["id"].as_i64().expect("customer id");

    // Negative total.
    let resp = app
        .client
        .post(app.url(&format!("/customers/{customer_id}/orders")))
        .json(&json!({"channel": "online", "total_amount": -1.0}))
        .send()
        .await
        .expect("order request");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // In-store order carrying a shipping address.
    let resp = app
        .client
        .post(app.url(&format!("/customers/{customer_id}/orders")))
        .json(&json!({
            "channel": "in_store",
            "total_amount": 5.0,
            "shipping_addresses": [{
                "street": "1 St", "city": "C", "state": "S", "zip_code": "1"
            }]
        }))
        .send()
        .await
        .expect("order request");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Unknown channel tag is rejected before reaching the handler.
    let resp = app
        .client
        .post(app.url(&format!("/customers/{customer_id}/orders")))
        .json(&json!({"channel": "mail_order", "total_amount": 5.0}))
        .send()
        .await
        .expect("order request");
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // In-store order without shipping addresses is fine and carries none.
    let resp = app
        .client
        .post(app.url(&format!("/customers/{customer_id}/orders")))
        .json(&json!({"channel": "in_store", "total_amount": 5.0}))
        .send()
        .await
        .expect("order request");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let order: Value = resp.json().await.expect("order body");
    assert_eq!(order["shipping_addresses"].as_array().expect("array").len(), 0);
}

#[tokio::test]
async fn orders_by_zip_counts_billing_zips() {
    let app = TestApp::spawn().await;

    for (email, telephone, zip) in [
        ("zip1@example.com", "3334445555", "11111"),
        ("zip2@example.com", "4445556666", "22222"),
    ] {
        let resp = app
            .client
            .post(app.url("/customers"))
            .json(&json!({
                "first_name": "Zip",
                "last_name": "Tester",
                "email": email,
                "telephone": telephone,
                "addresses": [{
                    "kind": "billing",
                    "street": "1 Billing St",
                    "city": "City",
                    "state": "ST",
                    "zip_code": zip
                }]
            }))
            .send()
            .await
            .expect("create customer");
        assert_eq!(resp.status(), StatusCode::CREATED);
        let customer: Value = resp.json().await.expect("body");
        let customer_id = customer["id"].as_i64().expect("id");

        let resp = app
            .client
            .post(app.url(&format!("/customers/{customer_id}/orders")))
            .json(&json!({"channel": "in_store", "total_amount": 10.0}))
            .send()
            .await
            .expect("create order");
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = app
        .client
        .get(app.url("/analytics/orders/by-zip?kind=billing"))
        .send()
        .await
        .expect("by-zip request");
    assert_eq!(resp.status(), StatusCode::OK);
    let rows: Value = resp.json().await.expect("rows");
    let rows = rows.as_array().expect("array");
    assert_eq!(rows.len(), 2);
    // Equal counts, so ZIPs come back in ascending order.
    assert_eq!(rows[0]["zip_code"], "11111");
    assert_eq!(rows[0]["order_count"], 1);
    assert_eq!(rows[1]["zip_code"], "22222");
    assert_eq!(rows[1]["order_count"], 1);

    // Neither customer has a shipping address.
    let resp = app
        .client
        .get(app.url("/analytics/orders/by-zip?kind=shipping"))
        .send()
        .await
        .expect("by-zip request");
    assert_eq!(resp.status(), StatusCode::OK);
    let rows: Value = resp.json().await.expect("rows");
    assert_eq!(rows.as_array().expect("array").len(), 0);
}

#[tokio::test]
async fn top_in_store_customers_orders_and_limits() {
    let app = TestApp::spawn().await;

    // Six customers with in-store order counts 5,4,3,2,1,0.
    for (i, count) in [5u32, 4, 3, 2, 1, 0].into_iter().enumerate() {
        let customer = app
            .create_customer(&format!("top{i}@example.com"), &format!("555000{i:04}"))
            .await;
        let customer_id = customer["id"].as_i64().expect("id");
        for _ in 0..count {
            let resp = app
                .client
                .post(app.url(&format!("/customers/{customer_id}/orders")))
                .json(&json!({"channel": "in_store", "total_amount": 1.0}))
                .send()
                .await
                .expect("create order");
            assert_eq!(resp.status(), StatusCode::CREATED);
        }
    }

    let resp = app
        .client
        .get(app.url("/analytics/in-store/top-customers"))
        .send()
        .await
        .expect("top customers request");
    assert_eq!(resp.status(), StatusCode::OK);
    let rows: Value = resp.json().await.expect("rows");
    let rows = rows.as_array().expect("array");

    // The zero-count customer is excluded; the rest come back descending.
    assert_eq!(rows.len(), 5);
    let counts: Vec<i64> = rows
        .iter()
        .map(|r| r["order_count"].as_i64().expect("count"))
        .collect();
    assert_eq!(counts, vec![5, 4, 3, 2, 1]);

    // An explicit limit truncates the ranking.
    let resp = app
        .client
        .get(app.url("/analytics/in-store/top-customers?limit=2"))
        .send()
        .await
        .expect("top customers request");
    let rows: Value = resp.json().await.expect("rows");
    assert_eq!(rows.as_array().expect("array").len(), 2);
}

#[tokio::test]
async fn in_store_hours_reports_buckets() {
    let app = TestApp::spawn().await;
    let customer = app.create_customer("hours@example.com", "7778889999").await;
    let customer_id = customer["id"].as_i64().expect("id");

    for _ in 0..3 {
        let resp = app
            .client
            .post(app.url(&format!("/customers/{customer_id}/orders")))
            .json(&json!({"channel": "in_store", "total_amount": 1.0}))
            .send()
            .await
            .expect("create order");
        assert_eq!(resp.status(), StatusCode::CREATED);
    }
    // Online orders never count toward in-store hours.
    let resp = app
        .client
        .post(app.url(&format!("/customers/{customer_id}/orders")))
        .json(&json!({"channel": "online", "total_amount": 1.0}))
        .send()
        .await
        .expect("create order");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app
        .client
        .get(app.url("/analytics/in-store/hours"))
        .send()
        .await
        .expect("hours request");
    assert_eq!(resp.status(), StatusCode::OK);
    let rows: Value = resp.json().await.expect("rows");
    let rows = rows.as_array().expect("array");

    // All three in-store orders were created just now; allow for the rare
    // run that straddles an hour boundary.
    assert!(!rows.is_empty() && rows.len() <= 2);
    let total: i64 = rows
        .iter()
        .map(|r| r["order_count"].as_i64().expect("count"))
        .sum();
    assert_eq!(total, 3);
    for row in rows {
        let hour = row["hour"].as_i64().expect("hour");
        assert!((0..24).contains(&hour));
    }
}
