use rusqlite::{Connection, Result};

pub fn run_migrations(conn: &Connection) -> Result<()> {
  // Create tables with COMPLETE schema for new databases
  // Migrations below handle upgrades for existing databases
  conn.execute_batch(
    r#"
    CREATE TABLE IF NOT EXISTS learners (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      name TEXT NOT NULL UNIQUE,
      created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS decks (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      name TEXT NOT NULL,
      created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS cards (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      deck_id INTEGER NOT NULL,
      front TEXT NOT NULL,
      back TEXT NOT NULL,
      FOREIGN KEY (deck_id) REFERENCES decks(id)
    );

    CREATE TABLE IF NOT EXISTS review_events (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      learner_id INTEGER NOT NULL,
      card_id INTEGER NOT NULL,
      reviewed_at TEXT NOT NULL,
      outcome TEXT NOT NULL,
      study_mode TEXT NOT NULL,
      confidence_before INTEGER,
      confidence_after INTEGER,
      response_time_ms INTEGER,
      FOREIGN KEY (learner_id) REFERENCES learners(id),
      FOREIGN KEY (card_id) REFERENCES cards(id)
    );

    CREATE TABLE IF NOT EXISTS mastery_states (
      learner_id INTEGER NOT NULL,
      card_id INTEGER NOT NULL,
      confidence_score INTEGER NOT NULL DEFAULT 0,
      mastery_level TEXT NOT NULL DEFAULT 'new',
      streak INTEGER NOT NULL DEFAULT 0,
      total_attempts INTEGER NOT NULL DEFAULT 0,
      successful_attempts INTEGER NOT NULL DEFAULT 0,
      interval_days INTEGER NOT NULL DEFAULT 1,
      ease_factor REAL NOT NULL DEFAULT 2.5,
      last_reviewed_at TEXT NOT NULL,
      next_due_at TEXT NOT NULL,
      PRIMARY KEY (learner_id, card_id),
      FOREIGN KEY (learner_id) REFERENCES learners(id),
      FOREIGN KEY (card_id) REFERENCES cards(id)
    );

    CREATE TABLE IF NOT EXISTS deck_policies (
      deck_id INTEGER PRIMARY KEY,
      required_correct_to_learn INTEGER NOT NULL DEFAULT 3,
      auto_mark_learned INTEGER NOT NULL DEFAULT 1,
      reset_on_wrong_answer INTEGER NOT NULL DEFAULT 0,
      FOREIGN KEY (deck_id) REFERENCES decks(id)
    );

    -- Indexes
    CREATE INDEX IF NOT EXISTS idx_mastery_due ON mastery_states(learner_id, next_due_at);
    CREATE INDEX IF NOT EXISTS idx_cards_deck ON cards(deck_id);
    CREATE INDEX IF NOT EXISTS idx_review_events_card ON review_events(card_id);
    CREATE INDEX IF NOT EXISTS idx_review_events_learner ON review_events(learner_id, reviewed_at);
    "#,
  )?;

  // ============================================================
  // MIGRATIONS FOR EXISTING DATABASES
  // These are no-ops for new databases (columns already exist)
  // ============================================================

  // Migration: response latency tracking on review events
  add_column_if_missing(conn, "review_events", "response_time_ms", "INTEGER")?;

  Ok(())
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
  conn
    .prepare(&format!("SELECT {} FROM {} LIMIT 1", column, table))
    .is_ok()
}

/// Add a column if it doesn't already exist
fn add_column_if_missing(conn: &Connection, table: &str, column: &str, column_def: &str) -> Result<()> {
  if !column_exists(conn, table, column) {
    conn.execute(
      &format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, column_def),
      [],
    )?;
  }
  Ok(())
}
