use super::*;

pub fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    Ok(())
}

pub fn ensure_schema(connection: &Connection) -> Result<()> {
    connection.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS metadata (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS chapters (
          chapter_key TEXT PRIMARY KEY,
          transcript_filename TEXT NOT NULL,
          transcript_sha256 TEXT NOT NULL,
          normalized_char_count INTEGER NOT NULL,
          expected_heading_count INTEGER NOT NULL,
          updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS topics (
          chapter_key TEXT NOT NULL,
          heading_number TEXT NOT NULL,
          heading_title TEXT NOT NULL,
          body_text TEXT NOT NULL,
          start_offset INTEGER NOT NULL,
          end_offset INTEGER NOT NULL,
          recovered INTEGER NOT NULL DEFAULT 0,
          updated_at TEXT NOT NULL,
          PRIMARY KEY (chapter_key, heading_number),
          FOREIGN KEY(chapter_key) REFERENCES chapters(chapter_key)
        );

        CREATE TABLE IF NOT EXISTS questions (
          chapter_key TEXT NOT NULL,
          position INTEGER NOT NULL,
          question_number TEXT NOT NULL,
          question_text TEXT NOT NULL,
          updated_at TEXT NOT NULL,
          PRIMARY KEY (chapter_key, position),
          FOREIGN KEY(chapter_key) REFERENCES chapters(chapter_key)
        );

        CREATE INDEX IF NOT EXISTS idx_topics_chapter ON topics(chapter_key);
        CREATE INDEX IF NOT EXISTS idx_questions_chapter ON questions(chapter_key);
        ",
    )?;

    let now = now_utc_string();
    connection.execute(
        "INSERT INTO metadata(key, value) VALUES('db_schema_version', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        [DB_SCHEMA_VERSION],
    )?;
    connection.execute(
        "INSERT INTO metadata(key, value) VALUES('db_updated_at', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        [now],
    )?;

    Ok(())
}

pub fn replace_chapter_rows(
    connection: &mut Connection,
    entry: &TranscriptEntry,
    extraction: &ChapterExtraction,
    expected_heading_count: usize,
) -> Result<ChapterInsertStats> {
    let now = now_utc_string();
    let recovered: HashSet<&str> = extraction
        .recovered_numbers
        .iter()
        .map(String::as_str)
        .collect();

    let tx = connection.transaction()?;
    let mut stats = ChapterInsertStats::default();

    tx.execute(
        "
        INSERT INTO chapters(
          chapter_key, transcript_filename, transcript_sha256,
          normalized_char_count, expected_heading_count, updated_at
        )
        VALUES(?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT(chapter_key) DO UPDATE SET
          transcript_filename=excluded.transcript_filename,
          transcript_sha256=excluded.transcript_sha256,
          normalized_char_count=excluded.normalized_char_count,
          expected_heading_count=excluded.expected_heading_count,
          updated_at=excluded.updated_at
        ",
        params![
            entry.chapter_key,
            entry.filename,
            entry.sha256,
            extraction.normalized_char_count as i64,
            expected_heading_count as i64,
            now,
        ],
    )?;

    {
        let mut statement = tx.prepare(
            "
            INSERT INTO topics(
              chapter_key, heading_number, heading_title, body_text,
              start_offset, end_offset, recovered, updated_at
            )
            VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(chapter_key, heading_number) DO UPDATE SET
              heading_title=excluded.heading_title,
              body_text=excluded.body_text,
              start_offset=excluded.start_offset,
              end_offset=excluded.end_offset,
              recovered=excluded.recovered,
              updated_at=excluded.updated_at
            ",
        )?;

        for topic in &extraction.topics {
            statement.execute(params![
                entry.chapter_key,
                topic.heading_number,
                topic.heading_title,
                topic.body,
                topic.start_offset as i64,
                topic.end_offset as i64,
                recovered.contains(topic.heading_number.as_str()),
                now,
            ])?;
            stats.topics_upserted += 1;
        }
    }

    tx.execute(
        "DELETE FROM questions WHERE chapter_key = ?1",
        params![entry.chapter_key],
    )?;

    {
        let mut statement = tx.prepare(
            "
            INSERT INTO questions(chapter_key, position, question_number, question_text, updated_at)
            VALUES(?1, ?2, ?3, ?4, ?5)
            ",
        )?;

        for (index, question) in extraction.questions.iter().enumerate() {
            statement.execute(params![
                entry.chapter_key,
                (index + 1) as i64,
                question.number,
                question.text,
                now,
            ])?;
            stats.questions_inserted += 1;
        }
    }

    tx.commit()?;
    Ok(stats)
}

pub fn count_rows(connection: &Connection, sql: &str) -> Result<i64> {
    let count = connection.query_row(sql, [], |row| row.get(0))?;
    Ok(count)
}
