//! Shared fixtures: a Galaxy-shaped SQLite database and in-memory host mocks.

#![allow(dead_code)]

use async_trait::async_trait;
use galaxy_tiles::{CommandBatch, CommandOutput, CommandRunner, ConfigStore, ConfigValue, Confirmation};
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const SCHEMA: &str = "
CREATE TABLE WebCacheResourceTypes (id INTEGER PRIMARY KEY, type TEXT);
CREATE TABLE WebCache (id INTEGER PRIMARY KEY AUTOINCREMENT, releaseKey TEXT, userId INTEGER);
CREATE TABLE WebCacheResources (webCacheId INTEGER, webCacheResourceTypeId INTEGER, filename TEXT);
CREATE TABLE GamePieceTypes (id INTEGER PRIMARY KEY, type TEXT);
CREATE TABLE GamePieces (releaseKey TEXT, gamePieceTypeId INTEGER, userId INTEGER, value TEXT);
CREATE TABLE UserReleaseProperties (releaseKey TEXT, userId INTEGER, isHidden INTEGER);
CREATE TABLE UserReleaseTags (releaseKey TEXT, userId INTEGER, tag TEXT);
CREATE TABLE LibraryReleases (releaseKey TEXT, userId INTEGER);
CREATE TABLE InstalledBaseProducts (productId INTEGER);
CREATE TABLE InstalledExternalProducts (productId TEXT, platformId INTEGER);
CREATE TABLE Platforms (id INTEGER PRIMARY KEY, name TEXT);
CREATE TABLE GamePieceCacheUpdateDates (userId INTEGER, updateDate TEXT);

INSERT INTO WebCacheResourceTypes VALUES (1, 'squareIcon'), (2, 'background');
INSERT INTO GamePieceTypes VALUES (1, 'title'), (2, 'meta');
INSERT INTO Platforms VALUES (1, 'steam'), (85, 'xboxone');
INSERT INTO GamePieceCacheUpdateDates VALUES (1, '2026-10-01 12:00:00');
";

/// One library entry of the fixture.
pub struct FixtureGame<'a> {
    pub release_key: &'a str,
    pub title: &'a str,
    pub icon: &'a str,
    pub tags: &'a [&'a str],
    pub hidden: bool,
}

/// Galaxy database in a temporary directory.
pub struct GalaxyFixture {
    pub path: PathBuf,
    conn: Connection,
}

impl GalaxyFixture {
    pub fn create(dir: &Path) -> Self {
        let path = dir.join("galaxy-2.0.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        Self { path, conn }
    }

    pub fn add_game(&self, game: FixtureGame<'_>) {
        let conn = &self.conn;
        conn.execute(
            "INSERT INTO WebCache (releaseKey, userId) VALUES (?1, 1)",
            params![game.release_key],
        )
        .unwrap();
        let cache_id = conn.last_insert_rowid();
        conn.execute(
            "INSERT INTO WebCacheResources VALUES (?1, 1, ?2), (?1, 2, 'background.webp')",
            params![cache_id, game.icon],
        )
        .unwrap();

        let value = format!("{{\"title\":\"{}\"}}", game.title);
        conn.execute(
            "INSERT INTO GamePieces VALUES (?1, 1, 1, ?2), (?1, 2, 1, '{\"meta\":1}')",
            params![game.release_key, value],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO UserReleaseProperties VALUES (?1, 1, ?2)",
            params![game.release_key, game.hidden as i64],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO LibraryReleases VALUES (?1, 1)",
            params![game.release_key],
        )
        .unwrap();
        for tag in game.tags {
            conn.execute(
                "INSERT INTO UserReleaseTags VALUES (?1, 1, ?2)",
                params![game.release_key, tag],
            )
            .unwrap();
        }
    }

    pub fn install_gog(&self, product_id: i64) {
        self.conn
            .execute(
                "INSERT INTO InstalledBaseProducts VALUES (?1)",
                params![product_id],
            )
            .unwrap();
    }

    pub fn install_external(&self, product_id: &str, platform_id: i64) {
        self.conn
            .execute(
                "INSERT INTO InstalledExternalProducts VALUES (?1, ?2)",
                params![product_id, platform_id],
            )
            .unwrap();
    }
}

/// A small library covering every selector:
///
/// | key        | title              | tagged | installed        | hidden |
/// |------------|--------------------|--------|------------------|--------|
/// | gog_1      | Beta               | yes    | yes              | no     |
/// | gog_2      | Alpha: Remastered  | yes    | no               | no     |
/// | steam_3    | Gamma              | no     | yes              | no     |
/// | xboxone_4  | Delta              | no     | yes, platform 85 | no     |
/// | gog_5      | Secret             | yes    | no               | yes    |
/// | gog_6      | Beta               | yes    | no               | no     |
pub fn sample_library(dir: &Path) -> GalaxyFixture {
    let fixture = GalaxyFixture::create(dir);
    let tagged: &[&str] = &["StartMenuTiles"];

    fixture.add_game(FixtureGame {
        release_key: "gog_1",
        title: "Beta",
        icon: "beta_icon.webp",
        tags: tagged,
        hidden: false,
    });
    fixture.add_game(FixtureGame {
        release_key: "gog_2",
        title: "Alpha: Remastered",
        icon: "alpha_icon.png",
        tags: tagged,
        hidden: false,
    });
    fixture.add_game(FixtureGame {
        release_key: "steam_3",
        title: "Gamma",
        icon: "gamma_icon.webp",
        tags: &[],
        hidden: false,
    });
    fixture.add_game(FixtureGame {
        release_key: "xboxone_4",
        title: "Delta",
        icon: "delta_icon.webp",
        tags: &[],
        hidden: false,
    });
    fixture.add_game(FixtureGame {
        release_key: "gog_5",
        title: "Secret",
        icon: "secret_icon.webp",
        tags: tagged,
        hidden: true,
    });
    fixture.add_game(FixtureGame {
        release_key: "gog_6",
        title: "Beta",
        icon: "beta_icon.webp",
        tags: tagged,
        hidden: false,
    });

    fixture.install_gog(1);
    fixture.install_external("3", 1);
    fixture.install_external("4", 85);
    fixture
}

/// Records every batch and answers with a clean result.
#[derive(Default)]
pub struct RecordingRunner {
    batches: Mutex<Vec<CommandBatch>>,
}

impl RecordingRunner {
    pub fn batches(&self) -> Vec<CommandBatch> {
        self.batches.lock().unwrap().clone()
    }

    pub fn labels(&self) -> Vec<String> {
        self.batches()
            .iter()
            .map(|b| b.label().to_string())
            .collect()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, batch: &CommandBatch) -> galaxy_tiles::Result<CommandOutput> {
        self.batches.lock().unwrap().push(batch.clone());
        Ok(CommandOutput::ok())
    }
}

/// Policy values kept in memory.
#[derive(Default)]
pub struct MemoryStore {
    pub values: BTreeMap<String, ConfigValue>,
    pub writes: usize,
}

impl ConfigStore for MemoryStore {
    fn get_value(&self, name: &str) -> io::Result<Option<ConfigValue>> {
        Ok(self.values.get(name).cloned())
    }

    fn set_value(&mut self, name: &str, value: &ConfigValue) -> io::Result<()> {
        self.writes += 1;
        self.values.insert(name.to_string(), value.clone());
        Ok(())
    }

    fn delete_value(&mut self, name: &str) -> io::Result<()> {
        self.writes += 1;
        self.values.remove(name);
        Ok(())
    }
}

/// Fixed answer to the confirmation prompt.
pub struct FixedAnswer(pub bool);

impl Confirmation for FixedAnswer {
    fn confirm(&mut self, _warning: &str) -> bool {
        self.0
    }
}
