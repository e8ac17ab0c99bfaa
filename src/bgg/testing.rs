//! In-process stand-in for the BGG XML API.

use std::sync::{
  Arc,
  atomic::{AtomicU32, Ordering},
};

use axum::{
  Router,
  extract::{Query, State},
  http::{HeaderMap, StatusCode},
  routing::get,
};
use dashmap::DashMap;
use serde::Deserialize;

use crate::{prelude::*, state::Config};

const TOKEN: &str = "test-token";

#[derive(Default)]
pub struct MockBgg {
  state: Arc<MockState>,
}

#[derive(Default)]
pub struct MockState {
  plays: DashMap<(String, u32), (u16, String)>,
  things: DashMap<i64, (u16, String)>,
  things_failure: AtomicU32,
  not_ready: AtomicU32,
  play_hits: AtomicU32,
  thing_hits: DashMap<i64, u32>,
}

pub struct MockServer {
  pub url: String,
  pub state: Arc<MockState>,
}

impl MockBgg {
  pub fn add_plays_page(&self, username: &str, page: u32, body: String) {
    self.add_plays_response(username, page, 200, body);
  }

  pub fn add_plays_response(
    &self,
    username: &str,
    page: u32,
    status: u16,
    body: String,
  ) {
    self.state.plays.insert((username.to_owned(), page), (status, body));
  }

  pub fn add_thing(&self, id: i64, name: &str, image: &str) {
    self.state.things.insert(id, (200, thing_xml(id, name, image)));
  }

  pub fn fail_things(&self, status: u16) {
    self.state.things_failure.store(status as u32, Ordering::SeqCst);
  }

  /// The next `n` requests to `/plays` answer 202.
  pub fn set_not_ready(&self, n: u32) {
    self.state.not_ready.store(n, Ordering::SeqCst);
  }

  pub async fn serve(&self) -> MockServer {
    let app = Router::new()
      .route("/plays", get(plays))
      .route("/thing", get(things))
      .with_state(self.state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    MockServer { url: format!("http://{addr}"), state: self.state.clone() }
  }
}

impl MockState {
  pub fn play_hits(&self) -> u32 {
    self.play_hits.load(Ordering::SeqCst)
  }

  pub fn thing_hits(&self, id: i64) -> u32 {
    self.thing_hits.get(&id).map(|n| *n).unwrap_or(0)
  }

  fn take_not_ready(&self) -> bool {
    self
      .not_ready
      .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
      .is_ok()
  }
}

fn authorized(headers: &HeaderMap) -> bool {
  headers.get("authorization").and_then(|v| v.to_str().ok())
    == Some(&format!("Bearer {TOKEN}"))
}

#[derive(Deserialize)]
struct PlaysQuery {
  username: String,
  page: u32,
}

async fn plays(
  State(state): State<Arc<MockState>>,
  headers: HeaderMap,
  Query(q): Query<PlaysQuery>,
) -> (StatusCode, String) {
  state.play_hits.fetch_add(1, Ordering::SeqCst);
  if !authorized(&headers) {
    return (StatusCode::UNAUTHORIZED, String::new());
  }
  if state.take_not_ready() {
    return (StatusCode::ACCEPTED, String::new());
  }
  match state.plays.get(&(q.username, q.page)) {
    Some(entry) => {
      (StatusCode::from_u16(entry.0).unwrap(), entry.1.clone())
    }
    None => (StatusCode::OK, plays_doc(&[])),
  }
}

#[derive(Deserialize)]
struct ThingQuery {
  id: i64,
}

async fn things(
  State(state): State<Arc<MockState>>,
  headers: HeaderMap,
  Query(q): Query<ThingQuery>,
) -> (StatusCode, String) {
  state.thing_hits.entry(q.id).and_modify(|n| *n += 1).or_insert(1);
  if !authorized(&headers) {
    return (StatusCode::UNAUTHORIZED, String::new());
  }
  let failure = state.things_failure.load(Ordering::SeqCst);
  if failure != 0 {
    return (StatusCode::from_u16(failure as u16).unwrap(), String::new());
  }
  match state.things.get(&q.id) {
    Some(entry) => (StatusCode::from_u16(entry.0).unwrap(), entry.1.clone()),
    None => (StatusCode::OK, "<items/>".to_owned()),
  }
}

pub fn plays_doc(plays: &[String]) -> String {
  format!(
    r#"<?xml version="1.0" encoding="utf-8"?><plays total="{}" page="1">{}</plays>"#,
    plays.len(),
    plays.concat()
  )
}

pub fn play_xml(
  id: i64,
  date: &str,
  location: &str,
  game_id: Option<i64>,
) -> String {
  match game_id {
    Some(game_id) => format!(
      r#"<play id="{id}" date="{date}" quantity="1" location="{location}"><item name="Game {game_id}" objecttype="thing" objectid="{game_id}"/></play>"#
    ),
    None => {
      format!(r#"<play id="{id}" date="{date}" quantity="1" location="{location}"/>"#)
    }
  }
}

pub fn thing_xml(id: i64, name: &str, image: &str) -> String {
  format!(
    r#"<items><item type="boardgame" id="{id}"><image>{image}</image><name type="primary" sortindex="1" value="{name}"/></item></items>"#
  )
}

pub fn fast_config(base: &str) -> Config {
  Config {
    bgg_token: TOKEN.to_owned(),
    location: "MEEPLE HALL".to_owned(),
    start_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
    rescan_days: 14,
    api_base: base.to_owned(),
    request_timeout: Duration::from_secs(5),
    not_ready_delay: Duration::from_millis(5),
    not_ready_retries: 2,
    sync_interval: Duration::from_secs(21600),
    database_url: "sqlite::memory:".to_owned(),
  }
}
