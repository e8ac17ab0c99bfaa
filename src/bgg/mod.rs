use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use crate::{prelude::*, state::Config};

/// One play parsed off the wire. The location is transient: it drives
/// reconciliation and is never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayRow {
  pub id: i64,
  pub game_id: i64,
  pub date: NaiveDate,
  pub location: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameInfo {
  pub name: Option<String>,
  pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaysDoc {
  #[serde(rename = "play", default)]
  plays: Vec<PlayElem>,
}

#[derive(Debug, Deserialize)]
struct PlayElem {
  #[serde(rename = "@id")]
  id: Option<i64>,
  #[serde(rename = "@date")]
  date: Option<String>,
  #[serde(rename = "@location")]
  location: Option<String>,
  item: Option<ItemElem>,
}

#[derive(Debug, Deserialize)]
struct ItemElem {
  #[serde(rename = "@objectid")]
  objectid: Option<i64>,
}

impl PlayElem {
  // Records missing an id, a parseable date or an item reference are
  // dropped rather than failing the page.
  fn into_row(self) -> Option<PlayRow> {
    let date =
      NaiveDate::parse_from_str(self.date.as_deref()?, "%Y-%m-%d").ok()?;
    Some(PlayRow {
      id: self.id?,
      game_id: self.item?.objectid?,
      date,
      location: self.location.unwrap_or_default().to_uppercase(),
    })
  }
}

#[derive(Debug, Deserialize)]
struct ThingDoc {
  #[serde(rename = "item", default)]
  items: Vec<ThingElem>,
}

#[derive(Debug, Deserialize)]
struct ThingElem {
  #[serde(rename = "name", default)]
  names: Vec<NameElem>,
  image: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NameElem {
  #[serde(rename = "@type")]
  kind: Option<String>,
  #[serde(rename = "@value")]
  value: Option<String>,
}

impl ThingDoc {
  fn into_info(self) -> GameInfo {
    let Some(item) = self.items.into_iter().next() else {
      return GameInfo::default();
    };
    let name = item
      .names
      .iter()
      .find(|n| n.kind.as_deref() == Some("primary"))
      .or_else(|| item.names.first())
      .and_then(|n| n.value.clone());
    GameInfo { name, image_url: item.image.filter(|url| !url.is_empty()) }
  }
}

fn parse_plays(body: &str) -> Result<Vec<PlayRow>> {
  let doc: PlaysDoc = quick_xml::de::from_str(body)?;
  let total = doc.plays.len();
  let rows: Vec<_> =
    doc.plays.into_iter().filter_map(PlayElem::into_row).collect();
  if rows.len() < total {
    debug!("Skipped {} malformed plays", total - rows.len());
  }
  Ok(rows)
}

fn parse_game(body: &str) -> Result<GameInfo> {
  let doc: ThingDoc = quick_xml::de::from_str(body)?;
  Ok(doc.into_info())
}

pub struct BggClient {
  http: reqwest::Client,
  base_url: String,
  token: String,
  not_ready_delay: Duration,
  not_ready_retries: u32,
}

impl BggClient {
  pub fn new(config: &Config) -> Result<Self> {
    let http =
      reqwest::Client::builder().timeout(config.request_timeout).build()?;
    Ok(Self {
      http,
      base_url: config.api_base.clone(),
      token: config.bgg_token.clone(),
      not_ready_delay: config.not_ready_delay,
      not_ready_retries: config.not_ready_retries,
    })
  }

  /// One page of a user's play history, newest first.
  pub async fn plays_page(
    &self,
    username: &str,
    page: u32,
  ) -> Result<Vec<PlayRow>> {
    let page = page.to_string();
    let body = self
      .get_xml("/plays", &[("username", username), ("page", page.as_str())])
      .await?;
    parse_plays(&body)
  }

  /// Catalog metadata for one game. Best effort: every failure mode
  /// degrades to empty fields so a lookup can never block reconciliation.
  pub async fn game_info(&self, game_id: i64) -> GameInfo {
    let id = game_id.to_string();
    let body = match self.get_xml("/thing", &[("id", id.as_str())]).await {
      Ok(body) => body,
      Err(err) => {
        warn!("Game fetch failed for {game_id}: {err}");
        return GameInfo::default();
      }
    };

    parse_game(&body).unwrap_or_else(|err| {
      warn!("Malformed game document for {game_id}: {err}");
      GameInfo::default()
    })
  }

  // GET with bearer auth. 202 means the remote is still assembling the
  // response; back off and re-issue the same request up to the cap.
  async fn get_xml(
    &self,
    path: &str,
    query: &[(&str, &str)],
  ) -> Result<String> {
    let url = format!("{}{}", self.base_url, path);
    let mut delay = self.not_ready_delay;
    let mut attempts = 0;

    loop {
      let res = self
        .http
        .get(&url)
        .query(query)
        .bearer_auth(&self.token)
        .send()
        .await?;

      if res.status() == StatusCode::ACCEPTED {
        attempts += 1;
        if attempts > self.not_ready_retries {
          return Err(Error::NotReady { attempts });
        }
        debug!(
          "BGG not ready for {path} (202), retry {attempts}/{} in {delay:?}",
          self.not_ready_retries
        );
        time::sleep(delay).await;
        delay *= 2;
        continue;
      }

      if !res.status().is_success() {
        let status = res.status().as_u16();
        let body: String =
          res.text().await.unwrap_or_default().chars().take(500).collect();
        return Err(Error::BadStatus { status, body });
      }

      return Ok(res.text().await?);
    }
  }
}

#[cfg(test)]
pub(crate) mod testing;
