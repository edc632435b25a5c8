//! Cached response entries.
//!
//! Entries are keyed by `(bucket, url)`. Writes go through
//! [`CacheDb::replace_entries`], which stores a whole batch in one
//! transaction.

use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, types::Type};

/// A stored response.
///
/// `stored_at` is stamped by the store on write and is `None` for responses
/// that never went through a bucket (fresh fetches, synthesized misses).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct StoredResponse {
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub stored_at: Option<String>,
}

impl StoredResponse {
    /// The response handed out for requests with no cached entry:
    /// status 404, no headers, empty body.
    pub fn not_found(url: impl Into<String>) -> Self {
        Self { url: url.into(), status: 404, headers: Vec::new(), body: Vec::new(), stored_at: None }
    }

    /// Whether this response came out of a bucket.
    pub fn is_cached(&self) -> bool {
        self.stored_at.is_some()
    }

    /// First header value matching `name` case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl CacheDb {
    /// Make a bucket hold exactly this batch of responses.
    ///
    /// The bucket is created if absent. Entries whose URL is not in the batch
    /// are dropped. Either the whole batch lands or nothing changes.
    pub async fn replace_entries(&self, bucket: &str, entries: Vec<StoredResponse>) -> Result<usize, Error> {
        let bucket = bucket.to_string();
        let now = chrono::Utc::now().to_rfc3339();

        let rows = entries
            .into_iter()
            .map(|entry| {
                let headers_json = serde_json::to_string(&entry.headers)
                    .map_err(|e| Error::InvalidInput(format!("failed to encode headers for {}: {e}", entry.url)))?;
                Ok((entry, headers_json))
            })
            .collect::<Result<Vec<_>, Error>>()?;

        self.conn
            .call(move |conn| -> Result<usize, Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT OR IGNORE INTO buckets (name, created_at) VALUES (?1, ?2)",
                    params![bucket, now],
                )?;

                let dropped = tx.execute("DELETE FROM entries WHERE bucket = ?1", params![bucket])?;
                tracing::debug!(bucket = %bucket, dropped, "cleared bucket before replace");

                for (entry, headers_json) in &rows {
                    tx.execute(
                        "INSERT INTO entries (bucket, url, status, headers_json, body, stored_at)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                         ON CONFLICT(bucket, url) DO UPDATE SET
                            status = excluded.status,
                            headers_json = excluded.headers_json,
                            body = excluded.body,
                            stored_at = excluded.stored_at",
                        params![bucket, entry.url, entry.status, headers_json, entry.body, now],
                    )?;
                }

                tx.commit()?;
                Ok(rows.len())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up the entry stored under exactly `url` in `bucket`.
    ///
    /// Returns None if the bucket or the entry doesn't exist.
    pub async fn match_entry(&self, bucket: &str, url: &str) -> Result<Option<StoredResponse>, Error> {
        let bucket = bucket.to_string();
        let url = url.to_string();
        self.conn
            .call(move |conn| -> Result<Option<StoredResponse>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT url, status, headers_json, body, stored_at
                     FROM entries WHERE bucket = ?1 AND url = ?2",
                )?;

                let result = stmt.query_row(params![bucket, url], |row| {
                    let headers_json: String = row.get(2)?;
                    let headers = serde_json::from_str(&headers_json)
                        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;
                    Ok(StoredResponse {
                        url: row.get(0)?,
                        status: row.get(1)?,
                        headers,
                        body: row.get(3)?,
                        stored_at: Some(row.get(4)?),
                    })
                });

                match result {
                    Ok(entry) => Ok(Some(entry)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// List the URLs stored in a bucket, sorted.
    pub async fn entry_urls(&self, bucket: &str) -> Result<Vec<String>, Error> {
        let bucket = bucket.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT url FROM entries WHERE bucket = ?1 ORDER BY url ASC")?;
                let urls = stmt
                    .query_map(params![bucket], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(urls)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_response(url: &str, body: &str) -> StoredResponse {
        StoredResponse {
            url: url.to_string(),
            status: 200,
            headers: vec![("content-type".to_string(), "text/css".to_string())],
            body: body.as_bytes().to_vec(),
            stored_at: None,
        }
    }

    #[tokio::test]
    async fn test_replace_and_match() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let response = make_response("http://localhost:8080/style.css", "body { margin: 0 }");

        db.replace_entries("period-tracker-v1", vec![response.clone()]).await.unwrap();

        let stored = db
            .match_entry("period-tracker-v1", "http://localhost:8080/style.css")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, 200);
        assert_eq!(stored.body, response.body);
        assert_eq!(stored.header("Content-Type"), Some("text/css"));
        assert!(stored.is_cached());
    }

    #[tokio::test]
    async fn test_replace_creates_bucket() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.replace_entries("fresh", vec![make_response("http://localhost:8080/", "<html>")])
            .await
            .unwrap();
        assert!(db.has_bucket("fresh").await.unwrap());
    }

    #[tokio::test]
    async fn test_rewrite_same_url_keeps_one_entry() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let url = "http://localhost:8080/app.js";
        db.replace_entries("b", vec![make_response(url, "v1")]).await.unwrap();
        db.replace_entries("b", vec![make_response(url, "v2")]).await.unwrap();

        assert_eq!(db.entry_urls("b").await.unwrap(), vec![url.to_string()]);
        let stored = db.match_entry("b", url).await.unwrap().unwrap();
        assert_eq!(stored.body, b"v2".to_vec());
    }

    #[tokio::test]
    async fn test_replace_drops_unlisted_urls() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let kept = "http://localhost:8080/";
        let dropped = "http://localhost:8080/old.js";
        db.replace_entries("b", vec![make_response(kept, "v1"), make_response(dropped, "v1")])
            .await
            .unwrap();

        let written = db.replace_entries("b", vec![make_response(kept, "v2")]).await.unwrap();

        assert_eq!(written, 1);
        assert_eq!(db.entry_urls("b").await.unwrap(), vec![kept.to_string()]);
        assert_eq!(db.match_entry("b", kept).await.unwrap().unwrap().body, b"v2".to_vec());
    }

    #[tokio::test]
    async fn test_match_is_scoped_to_bucket() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let url = "http://localhost:8080/index.html";
        db.replace_entries("period-tracker-v0", vec![make_response(url, "old")])
            .await
            .unwrap();

        assert!(db.match_entry("period-tracker-v1", url).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_match_is_exact() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.replace_entries("b", vec![make_response("http://localhost:8080/app.js", "x")])
            .await
            .unwrap();

        assert!(db.match_entry("b", "http://localhost:8080/app.js?v=2").await.unwrap().is_none());
        assert!(db.match_entry("b", "http://localhost:8080/APP.js").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_bucket_drops_entries() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let url = "http://localhost:8080/";
        db.replace_entries("old", vec![make_response(url, "x")]).await.unwrap();
        db.delete_bucket("old").await.unwrap();

        assert!(db.entry_urls("old").await.unwrap().is_empty());
        assert!(db.match_entry("old", url).await.unwrap().is_none());
    }

    #[test]
    fn test_not_found_shape() {
        let response = StoredResponse::not_found("http://localhost:8080/missing.png");
        assert_eq!(response.status, 404);
        assert!(response.body.is_empty());
        assert!(response.headers.is_empty());
        assert!(!response.is_cached());
    }
}
