//! Read-only access to the GOG Galaxy 2.0 database.

use super::game::RawGameRow;
use crate::config::Selector;
use crate::error::{Result, TilesError};
use rusqlite::{params_from_iter, Connection, OpenFlags, OptionalExtension};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Source of raw game rows for a selector.
pub trait GameSource {
    /// Return the rows `(releaseKey, iconFileName, titleValue)` matching `selector`.
    fn fetch(&self, selector: &Selector) -> Result<Vec<RawGameRow>>;
}

/// Joins shared by every selector. `{source}` is the row source producing
/// release keys, `{key}` the column holding them, `{filter}` an extra
/// predicate.
const GAME_INFO_JOINS: &str = "{source}
LEFT JOIN WebCache wc ON {key} = wc.releaseKey
LEFT JOIN WebCacheResources wcr ON wc.id = wcr.webCacheId
LEFT JOIN WebCacheResourceTypes wcrt ON wcrt.id = wcr.webCacheResourceTypeId
LEFT JOIN GamePieces gp ON {key} = gp.releaseKey
LEFT JOIN GamePieceTypes gpt ON gpt.id = gp.gamePieceTypeId
LEFT JOIN UserReleaseProperties urp ON {key} = urp.releaseKey
WHERE wcrt.type = 'squareIcon' AND gpt.type = 'title' AND urp.isHidden = 0 AND gp.userId <> 0 {filter}";

const TAGGED_SOURCE: &str =
    "SELECT urt.releaseKey, wcr.filename, gp.value FROM UserReleaseTags urt";

// Platform 85 reports its games as installed whether they are or not.
const INSTALLED_SOURCE: &str = "SELECT Installed.releaseKey, wcr.filename, gp.value FROM
    (SELECT 'gog_' || ibp.productId AS releaseKey FROM InstalledBaseProducts ibp
    UNION ALL
    SELECT p.name || '_' || iep.productId AS releaseKey FROM InstalledExternalProducts iep
    JOIN Platforms p ON iep.platformId = p.id WHERE iep.platformId <> 85) AS Installed";

const OWNED_SOURCE: &str = "SELECT lr.releaseKey, wcr.filename, gp.value FROM LibraryReleases lr";

const LAST_CACHE_UPDATE: &str =
    "SELECT updateDate FROM GamePieceCacheUpdateDates WHERE userId <> 0";

fn build_query(source: &str, key: &str, filter: &str) -> String {
    GAME_INFO_JOINS
        .replace("{source}", source)
        .replace("{key}", key)
        .replace("{filter}", filter)
}

/// SQL text and bound parameters for a selector.
fn selector_query(selector: &Selector) -> (String, Vec<String>) {
    match selector {
        Selector::Tag(tag) => (
            build_query(TAGGED_SOURCE, "urt.releaseKey", "AND urt.tag = ?1"),
            vec![tag.clone()],
        ),
        Selector::Installed => (
            build_query(INSTALLED_SOURCE, "Installed.releaseKey", ""),
            Vec::new(),
        ),
        Selector::AllOwned => (
            build_query(OWNED_SOURCE, "lr.releaseKey", "AND lr.userId <> 0"),
            Vec::new(),
        ),
    }
}

/// Game source backed by the Galaxy SQLite database, opened read-only.
pub struct SqliteGameStore {
    path: PathBuf,
    conn: Connection,
}

impl SqliteGameStore {
    /// Open the database without write access.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| TilesError::SourceUnavailable {
            message: format!(
                "Error while trying to open GOG Galaxy 2.0 database at '{}'",
                path.display()
            ),
            source: Some(e),
        })?;

        debug!("Opened GOG Galaxy database at {}", path.display());

        Ok(Self {
            path: path.to_path_buf(),
            conn,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Date of the last game-piece cache refresh, if Galaxy recorded one.
    pub fn last_cache_update(&self) -> Result<Option<String>> {
        let date = self
            .conn
            .query_row(LAST_CACHE_UPDATE, [], |row| row.get::<_, Option<String>>(0))
            .optional()?;
        Ok(date.flatten())
    }
}

impl GameSource for SqliteGameStore {
    fn fetch(&self, selector: &Selector) -> Result<Vec<RawGameRow>> {
        match self.last_cache_update() {
            Ok(Some(date)) => info!("Last cache update was on '{}'", date),
            Ok(None) => warn!("GOG Galaxy has not recorded a cache update yet"),
            Err(e) => warn!("Error while trying to get latest cache update. {}", e),
        }

        let (sql, params) = selector_query(selector);
        let mut stmt = self.conn.prepare(&sql).map_err(|e| TilesError::SourceUnavailable {
            message: "Error while running query on database".to_string(),
            source: Some(e),
        })?;

        let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
            Ok(RawGameRow {
                release_key: row.get(0)?,
                icon_file_name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                title: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            })
        })?;

        let mut games = Vec::new();
        for row in rows {
            games.push(row?);
        }

        debug!("Query for {} returned {} rows", selector, games.len());
        Ok(games)
    }
}
