//! Router tests against an in-memory SQLite store.

use axum::{
  body::Body,
  http::{HeaderMap, Request, StatusCode, header},
};
use serde_json::Value;
use stockroom_core::store::{InventoryStore, PendingSignup};
use stockroom_core::user::{NewUser, Role};
use stockroom_store_sqlite::SqliteStore;
use tower::ServiceExt as _;

use super::*;
use crate::auth::{hash_password, token_digest};

async fn make_state(config: ServerConfig) -> AppState<SqliteStore> {
  let store = SqliteStore::open_in_memory().await.unwrap();
  AppState::new(store, config)
}

async fn default_state() -> AppState<SqliteStore> {
  make_state(ServerConfig::default()).await
}

struct Reply {
  status:  StatusCode,
  headers: HeaderMap,
  body:    Value,
}

async fn send(
  state: &AppState<SqliteStore>,
  method: &str,
  uri: &str,
  token: Option<&str>,
  form: Option<&str>,
) -> Reply {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(token) = token {
    builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
  }
  let body = match form {
    Some(form) => {
      builder = builder
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
      Body::from(form.to_string())
    }
    None => Body::empty(),
  };
  let resp = router(state.clone())
    .oneshot(builder.body(body).unwrap())
    .await
    .unwrap();

  let status = resp.status();
  let headers = resp.headers().clone();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let body = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  Reply { status, headers, body }
}

async fn get(state: &AppState<SqliteStore>, uri: &str, token: &str) -> Reply {
  send(state, "GET", uri, Some(token), None).await
}

async fn post(
  state: &AppState<SqliteStore>,
  uri: &str,
  token: Option<&str>,
  form: &str,
) -> Reply {
  send(state, "POST", uri, token, Some(form)).await
}

/// Sign up and sign in; returns the session token.
async fn register(state: &AppState<SqliteStore>, email: &str, role: Role) -> String {
  let signup = post(
    state,
    "/api/auth/signup",
    None,
    &format!("email={email}&password=pw&fullName=&role={role}"),
  )
  .await;
  assert_eq!(signup.status, StatusCode::CREATED, "{}", signup.body);
  login(state, email, "pw").await
}

async fn login(state: &AppState<SqliteStore>, email: &str, password: &str) -> String {
  let resp = post(
    state,
    "/api/auth/login",
    None,
    &format!("email={email}&password={password}"),
  )
  .await;
  assert_eq!(resp.status, StatusCode::OK, "{}", resp.body);
  resp.body["token"].as_str().unwrap().to_owned()
}

async fn create_product(
  state: &AppState<SqliteStore>,
  token: &str,
  name: &str,
  category: &str,
) -> String {
  let resp = post(
    state,
    "/api/admin/products",
    Some(token),
    &format!("name={name}&price=10&category={category}"),
  )
  .await;
  assert_eq!(resp.status, StatusCode::CREATED, "{}", resp.body);
  resp.body["product_id"].as_str().unwrap().to_owned()
}

// ── Gates ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_needs_no_session() {
  let state = default_state().await;
  let resp = send(&state, "GET", "/api/health", None, None).await;
  assert_eq!(resp.status, StatusCode::OK);
  assert_eq!(resp.body["status"], "ok");
}

#[tokio::test]
async fn missing_session_redirects_to_login() {
  let state = default_state().await;
  for uri in ["/api", "/api/sales", "/api/reports", "/api/admin"] {
    let resp = send(&state, "GET", uri, None, None).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED, "{uri}");
    assert_eq!(resp.body["redirect"], "/auth/login", "{uri}");
  }
}

#[tokio::test]
async fn unknown_token_is_unauthenticated() {
  let state = default_state().await;
  let resp = get(&state, "/api", "deadbeef").await;
  assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn worker_is_sent_home_from_admin_pages() {
  let state = default_state().await;
  let token = register(&state, "w@example.com", Role::Worker).await;

  for uri in ["/api/admin", "/api/admin/products"] {
    let resp = get(&state, uri, &token).await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN, "{uri}");
    assert_eq!(resp.body["redirect"], "/", "{uri}");
  }
}

#[tokio::test]
async fn worker_cannot_create_products() {
  let state = default_state().await;
  let token = register(&state, "w@example.com", Role::Worker).await;

  let resp = post(&state, "/api/admin/products", Some(&token), "name=Lamp&price=5").await;
  assert_eq!(resp.status, StatusCode::FORBIDDEN);
  assert_eq!(resp.body["error"], "Unauthorized to create products");
  assert_eq!(state.store.count_products().await.unwrap(), 0);
}

// ── Sign up / sign in ───────────────────────────────────────────────────────

#[tokio::test]
async fn sign_in_sets_cookie_and_home_reflects_role() {
  let state = default_state().await;
  post(
    &state,
    "/api/auth/signup",
    None,
    "email=ada@example.com&password=pw&fullName=Ada",
  )
  .await;

  let resp = post(&state, "/api/auth/login", None, "email=ada@example.com&password=pw").await;
  assert_eq!(resp.status, StatusCode::OK);
  let cookie = resp.headers[header::SET_COOKIE].to_str().unwrap().to_owned();
  assert!(cookie.starts_with("stockroom_session="));
  assert!(cookie.contains("HttpOnly"));

  // The cookie alone authenticates.
  let pair = cookie.split(';').next().unwrap().to_owned();
  let req = Request::builder()
    .uri("/api")
    .header(header::COOKIE, pair)
    .body(Body::empty())
    .unwrap();
  let home = router(state.clone()).oneshot(req).await.unwrap();
  assert_eq!(home.status(), StatusCode::OK);
  let bytes = axum::body::to_bytes(home.into_body(), usize::MAX).await.unwrap();
  let body: Value = serde_json::from_slice(&bytes).unwrap();
  assert_eq!(body["display_name"], "Ada");
  assert_eq!(body["is_admin"], false);
  assert_eq!(body["actor"]["role"], "worker");
}

#[tokio::test]
async fn bad_credentials_are_rejected() {
  let state = default_state().await;
  register(&state, "ada@example.com", Role::Worker).await;

  for form in [
    "email=ada@example.com&password=wrong",
    "email=nobody@example.com&password=pw",
  ] {
    let resp = post(&state, "/api/auth/login", None, form).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST, "{form}");
    assert_eq!(resp.body["error"], "Invalid login credentials", "{form}");
  }
}

#[tokio::test]
async fn duplicate_sign_up_is_rejected() {
  let state = default_state().await;
  register(&state, "ada@example.com", Role::Worker).await;
  let resp = post(&state, "/api/auth/signup", None, "email=ada@example.com&password=x").await;
  assert_eq!(resp.status, StatusCode::BAD_REQUEST);
  assert_eq!(resp.body["error"], "User already registered");
}

#[tokio::test]
async fn admin_sign_up_can_be_disabled() {
  let state = make_state(ServerConfig {
    allow_admin_signup: false,
    ..ServerConfig::default()
  })
  .await;
  let resp = post(
    &state,
    "/api/auth/signup",
    None,
    "email=root@example.com&password=pw&role=admin",
  )
  .await;
  assert_eq!(resp.status, StatusCode::BAD_REQUEST);
  assert_eq!(state.store.count_users().await.unwrap(), 0);
}

#[tokio::test]
async fn confirmation_defers_account_creation() {
  let state = make_state(ServerConfig {
    require_email_confirmation: true,
    ..ServerConfig::default()
  })
  .await;

  let resp = post(&state, "/api/auth/signup", None, "email=ada@example.com&password=pw").await;
  assert_eq!(resp.status, StatusCode::ACCEPTED);
  assert_eq!(resp.body["message"], "Check your email to confirm your account.");
  assert_eq!(state.store.count_users().await.unwrap(), 0);

  let early = post(&state, "/api/auth/login", None, "email=ada@example.com&password=pw").await;
  assert_eq!(early.body["error"], "Email not confirmed");

  // The issued token only reaches the log; replace it with a known one.
  state
    .store
    .create_pending_signup(PendingSignup {
      email:         "ada@example.com".into(),
      password_hash: hash_password("pw").unwrap(),
      full_name:     None,
      role:          Role::Worker,
      token_hash:    token_digest("known-token"),
    })
    .await
    .unwrap();

  let bad = post(&state, "/api/auth/confirm", None, "token=guess").await;
  assert_eq!(bad.status, StatusCode::BAD_REQUEST);

  let ok = post(&state, "/api/auth/confirm", None, "token=known-token").await;
  assert_eq!(ok.status, StatusCode::CREATED);
  assert_eq!(ok.body["user"]["email"], "ada@example.com");

  login(&state, "ada@example.com", "pw").await;
}

#[tokio::test]
async fn confirming_an_email_registered_meanwhile_is_a_bad_request() {
  let state = make_state(ServerConfig {
    require_email_confirmation: true,
    ..ServerConfig::default()
  })
  .await;
  state
    .store
    .create_pending_signup(PendingSignup {
      email:         "ada@example.com".into(),
      password_hash: hash_password("pw").unwrap(),
      full_name:     None,
      role:          Role::Worker,
      token_hash:    token_digest("late-token"),
    })
    .await
    .unwrap();
  state
    .store
    .create_user(NewUser {
      email:         "ada@example.com".into(),
      password_hash: hash_password("pw").unwrap(),
      full_name:     None,
      role:          Role::Worker,
    })
    .await
    .unwrap();

  let resp = post(&state, "/api/auth/confirm", None, "token=late-token").await;
  assert_eq!(resp.status, StatusCode::BAD_REQUEST);
  assert_eq!(resp.body["error"], "User already registered");
  assert_eq!(state.store.count_users().await.unwrap(), 1);
}

#[tokio::test]
async fn logout_ends_the_session() {
  let state = default_state().await;
  let token = register(&state, "ada@example.com", Role::Worker).await;

  let resp = send(&state, "POST", "/api/auth/logout", Some(&token), None).await;
  assert_eq!(resp.status, StatusCode::NO_CONTENT);
  assert!(
    resp.headers[header::SET_COOKIE]
      .to_str()
      .unwrap()
      .contains("Max-Age=0")
  );
  assert_eq!(get(&state, "/api", &token).await.status, StatusCode::UNAUTHORIZED);
}

// ── Catalog and sales ───────────────────────────────────────────────────────

#[tokio::test]
async fn sales_are_scoped_by_role() {
  let state = default_state().await;
  let admin = register(&state, "admin@example.com", Role::Admin).await;
  let worker = register(&state, "worker@example.com", Role::Worker).await;
  let tv = create_product(&state, &admin, "TV", "Electronics").await;

  let catalog = get(&state, "/api/products", &worker).await;
  assert_eq!(catalog.body.as_array().unwrap().len(), 1);

  let sold = post(
    &state,
    "/api/sales",
    Some(&worker),
    &format!("productId={tv}&quantity=2&unitPrice=99.5&notes=cash"),
  )
  .await;
  assert_eq!(sold.status, StatusCode::CREATED, "{}", sold.body);
  assert_eq!(sold.body["total_amount"], 199.0);

  post(
    &state,
    "/api/sales",
    Some(&admin),
    &format!("productId={tv}&quantity=1&unitPrice=100"),
  )
  .await;

  let mine = get(&state, "/api/sales", &worker).await;
  assert_eq!(mine.body["sales"].as_array().unwrap().len(), 1);
  assert_eq!(mine.body["summary"]["total_quantity"], 2);
  assert_eq!(mine.body["sales"][0]["product"]["name"], "TV");

  let all = get(&state, "/api/sales", &admin).await;
  assert_eq!(all.body["sales"].as_array().unwrap().len(), 2);
  assert_eq!(all.body["summary"]["total_revenue"], 299.0);
}

#[tokio::test]
async fn invalid_sale_is_rejected_without_write() {
  let state = default_state().await;
  let admin = register(&state, "admin@example.com", Role::Admin).await;
  let tv = create_product(&state, &admin, "TV", "Electronics").await;

  let resp = post(
    &state,
    "/api/sales",
    Some(&admin),
    &format!("productId={tv}&quantity=0&unitPrice=1"),
  )
  .await;
  assert_eq!(resp.status, StatusCode::BAD_REQUEST);
  let sales = get(&state, "/api/sales", &admin).await;
  assert!(sales.body["sales"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn admin_dashboard_and_catalog() {
  let state = default_state().await;
  let admin = register(&state, "admin@example.com", Role::Admin).await;
  let lamp = create_product(&state, &admin, "Lamp", "Home").await;
  create_product(&state, &admin, "Desk", "Home").await;

  for _ in 0..6 {
    post(
      &state,
      "/api/sales",
      Some(&admin),
      &format!("productId={lamp}&quantity=1&unitPrice=10"),
    )
    .await;
  }

  let dash = get(&state, "/api/admin", &admin).await;
  assert_eq!(dash.status, StatusCode::OK);
  assert_eq!(dash.body["product_count"], 2);
  assert_eq!(dash.body["user_count"], 1);
  assert_eq!(dash.body["sale_count"], 6);
  assert_eq!(dash.body["total_revenue"], 60.0);
  assert_eq!(dash.body["recent_sales"].as_array().unwrap().len(), 5);

  let catalog = get(&state, "/api/admin/products", &admin).await;
  assert_eq!(catalog.body["summary"]["product_count"], 2);
  assert_eq!(catalog.body["summary"]["average_price"], 10.0);
  assert_eq!(catalog.body["products"][0]["name"], "Desk");
}

// ── Reports ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn report_over_todays_sales() {
  let state = default_state().await;
  let admin = register(&state, "admin@example.com", Role::Admin).await;
  let tv = create_product(&state, &admin, "TV", "Electronics").await;
  let lamp = create_product(&state, &admin, "Lamp", "Home").await;
  for (pid, qty) in [(&tv, 1), (&lamp, 3), (&tv, 2)] {
    post(
      &state,
      "/api/sales",
      Some(&admin),
      &format!("productId={pid}&quantity={qty}&unitPrice=10"),
    )
    .await;
  }

  let resp = get(&state, "/api/reports?category=Electronics", &admin).await;
  assert_eq!(resp.status, StatusCode::OK, "{}", resp.body);
  assert_eq!(resp.body["summary"]["order_count"], 2);
  assert_eq!(resp.body["summary"]["total_revenue"], 30.0);
  assert_eq!(resp.body["daily"].as_array().unwrap().len(), 1);
  assert_eq!(resp.body["top_products"][0]["product"]["name"], "TV");
  assert_eq!(resp.body["filters"]["category"], "Electronics");
}

#[tokio::test]
async fn report_with_no_matches_is_all_zeroes() {
  let state = default_state().await;
  let admin = register(&state, "admin@example.com", Role::Admin).await;
  let tv = create_product(&state, &admin, "TV", "Electronics").await;
  post(
    &state,
    "/api/sales",
    Some(&admin),
    &format!("productId={tv}&quantity=1&unitPrice=10"),
  )
  .await;

  let resp = get(
    &state,
    "/api/reports?from=2000-01-01&to=2000-01-31&category=Electronics",
    &admin,
  )
  .await;
  assert_eq!(resp.status, StatusCode::OK);
  assert_eq!(resp.body["summary"]["order_count"], 0);
  assert_eq!(resp.body["summary"]["average_order_value"], 0.0);
  assert!(resp.body["top_products"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn worker_report_leaves_out_other_workers_sales() {
  let state = default_state().await;
  let admin = register(&state, "admin@example.com", Role::Admin).await;
  let alice = register(&state, "alice@example.com", Role::Worker).await;
  let bob = register(&state, "bob@example.com", Role::Worker).await;
  let tv = create_product(&state, &admin, "TV", "Electronics").await;

  for (token, qty) in [(&alice, 1), (&bob, 4), (&bob, 2)] {
    let resp = post(
      &state,
      "/api/sales",
      Some(token),
      &format!("productId={tv}&quantity={qty}&unitPrice=10"),
    )
    .await;
    assert_eq!(resp.status, StatusCode::CREATED, "{}", resp.body);
  }

  let mine = get(&state, "/api/reports", &alice).await;
  assert_eq!(mine.status, StatusCode::OK, "{}", mine.body);
  assert_eq!(mine.body["is_admin"], false);
  assert_eq!(mine.body["summary"]["order_count"], 1);
  assert_eq!(mine.body["summary"]["total_quantity"], 1);
  assert_eq!(mine.body["summary"]["total_revenue"], 10.0);
  assert_eq!(mine.body["top_products"][0]["total_quantity"], 1);

  let everyone = get(&state, "/api/reports", &admin).await;
  assert_eq!(everyone.body["summary"]["order_count"], 3);
  assert_eq!(everyone.body["summary"]["total_quantity"], 7);
}

#[tokio::test]
async fn malformed_report_dates_are_bad_requests() {
  let state = default_state().await;
  let token = register(&state, "w@example.com", Role::Worker).await;

  let resp = get(&state, "/api/reports?from=01/02/2024", &token).await;
  assert_eq!(resp.status, StatusCode::BAD_REQUEST);

  // Empty values are ignored.
  let resp = get(&state, "/api/reports?from=&to=&category=", &token).await;
  assert_eq!(resp.status, StatusCode::OK);
}
