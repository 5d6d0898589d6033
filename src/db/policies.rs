//! Deck policy persistence. Reads fall back to defaults when a deck has
//! no stored row.

use rusqlite::{params, Connection, OptionalExtension, Result};

use crate::domain::DeckLearningPolicy;

pub fn get_policy(conn: &Connection, deck_id: i64) -> Result<DeckLearningPolicy> {
  let stored = conn
    .query_row(
      r#"
      SELECT required_correct_to_learn, auto_mark_learned, reset_on_wrong_answer
      FROM deck_policies
      WHERE deck_id = ?1
      "#,
      params![deck_id],
      |row| {
        Ok(DeckLearningPolicy {
          required_correct_to_learn: row.get(0)?,
          auto_mark_learned: row.get::<_, i64>(1)? != 0,
          reset_on_wrong_answer: row.get::<_, i64>(2)? != 0,
        })
      },
    )
    .optional()?;

  Ok(stored.unwrap_or_default())
}

pub fn set_policy(conn: &Connection, deck_id: i64, policy: &DeckLearningPolicy) -> Result<()> {
  conn.execute(
    r#"
    INSERT INTO deck_policies (deck_id, required_correct_to_learn, auto_mark_learned,
                               reset_on_wrong_answer)
    VALUES (?1, ?2, ?3, ?4)
    ON CONFLICT (deck_id) DO UPDATE SET
      required_correct_to_learn = excluded.required_correct_to_learn,
      auto_mark_learned = excluded.auto_mark_learned,
      reset_on_wrong_answer = excluded.reset_on_wrong_answer
    "#,
    params![
      deck_id,
      policy.required_correct_to_learn,
      policy.auto_mark_learned as i64,
      policy.reset_on_wrong_answer as i64,
    ],
  )?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::{insert_deck, run_migrations};

  fn test_conn() -> (Connection, i64) {
    let conn = Connection::open_in_memory().unwrap();
    run_migrations(&conn).unwrap();
    let deck = insert_deck(&conn, "French A1").unwrap();
    (conn, deck)
  }

  #[test]
  fn test_unset_policy_falls_back_to_defaults() {
    let (conn, deck) = test_conn();
    let policy = get_policy(&conn, deck).unwrap();
    assert_eq!(policy, DeckLearningPolicy::default());
  }

  #[test]
  fn test_set_and_get_roundtrip() {
    let (conn, deck) = test_conn();
    let policy = DeckLearningPolicy {
      required_correct_to_learn: 5,
      auto_mark_learned: false,
      reset_on_wrong_answer: true,
    };
    set_policy(&conn, deck, &policy).unwrap();

    assert_eq!(get_policy(&conn, deck).unwrap(), policy);
  }

  #[test]
  fn test_set_overwrites_existing() {
    let (conn, deck) = test_conn();
    let first = DeckLearningPolicy {
      required_correct_to_learn: 2,
      ..Default::default()
    };
    set_policy(&conn, deck, &first).unwrap();

    let second = DeckLearningPolicy {
      required_correct_to_learn: 4,
      reset_on_wrong_answer: true,
      ..Default::default()
    };
    set_policy(&conn, deck, &second).unwrap();

    assert_eq!(get_policy(&conn, deck).unwrap(), second);
  }
}
