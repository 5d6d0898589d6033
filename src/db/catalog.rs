//! Learners, decks, and cards: the catalog the engine schedules against.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CardRow {
  pub id: i64,
  pub deck_id: i64,
  pub front: String,
  pub back: String,
}

pub fn insert_learner(conn: &Connection, name: &str) -> Result<i64> {
  conn.execute(
    "INSERT INTO learners (name, created_at) VALUES (?1, ?2)",
    params![name, Utc::now().to_rfc3339()],
  )?;
  Ok(conn.last_insert_rowid())
}

pub fn insert_deck(conn: &Connection, name: &str) -> Result<i64> {
  conn.execute(
    "INSERT INTO decks (name, created_at) VALUES (?1, ?2)",
    params![name, Utc::now().to_rfc3339()],
  )?;
  Ok(conn.last_insert_rowid())
}

pub fn insert_card(conn: &Connection, deck_id: i64, front: &str, back: &str) -> Result<i64> {
  conn.execute(
    "INSERT INTO cards (deck_id, front, back) VALUES (?1, ?2, ?3)",
    params![deck_id, front, back],
  )?;
  Ok(conn.last_insert_rowid())
}

pub fn learner_exists(conn: &Connection, learner_id: i64) -> Result<bool> {
  let count: i64 = conn.query_row(
    "SELECT COUNT(*) FROM learners WHERE id = ?1",
    params![learner_id],
    |row| row.get(0),
  )?;
  Ok(count > 0)
}

pub fn deck_exists(conn: &Connection, deck_id: i64) -> Result<bool> {
  let count: i64 = conn.query_row(
    "SELECT COUNT(*) FROM decks WHERE id = ?1",
    params![deck_id],
    |row| row.get(0),
  )?;
  Ok(count > 0)
}

/// Deck a card belongs to, or None when the card does not exist
pub fn get_card_deck(conn: &Connection, card_id: i64) -> Result<Option<i64>> {
  conn
    .query_row(
      "SELECT deck_id FROM cards WHERE id = ?1",
      params![card_id],
      |row| row.get(0),
    )
    .optional()
}

pub fn get_card(conn: &Connection, card_id: i64) -> Result<Option<CardRow>> {
  conn
    .query_row(
      "SELECT id, deck_id, front, back FROM cards WHERE id = ?1",
      params![card_id],
      |row| {
        Ok(CardRow {
          id: row.get(0)?,
          deck_id: row.get(1)?,
          front: row.get(2)?,
          back: row.get(3)?,
        })
      },
    )
    .optional()
}

pub fn get_deck_cards(conn: &Connection, deck_id: i64) -> Result<Vec<CardRow>> {
  let mut stmt =
    conn.prepare("SELECT id, deck_id, front, back FROM cards WHERE deck_id = ?1 ORDER BY id")?;

  let cards = stmt
    .query_map(params![deck_id], |row| {
      Ok(CardRow {
        id: row.get(0)?,
        deck_id: row.get(1)?,
        front: row.get(2)?,
        back: row.get(3)?,
      })
    })?
    .collect::<Result<Vec<_>>>()?;
  Ok(cards)
}
