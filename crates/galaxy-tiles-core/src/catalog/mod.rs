//! Game catalog: loads, normalizes, deduplicates and validates the games to place.
//!
//! Rows come from a [`GameSource`], usually the Galaxy database through
//! [`SqliteGameStore`]. The result is sorted by title so that layouts are
//! reproducible across runs.

mod game;
mod store;

pub use game::{normalize_icon, sanitize, strip_prefix, GameRecord, RawGameRow};
pub use store::{GameSource, SqliteGameStore};

use crate::config::{CatalogLimits, Selector};
use crate::error::{Result, TilesError};
use std::collections::HashSet;
use tracing::{info, warn};

/// Non-fatal conditions found while loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogWarning {
    /// A second release with an already accepted title was dropped.
    DuplicateTitle {
        title: String,
        kept: String,
        rejected: String,
    },
    /// A release whose title sanitizes to nothing was dropped.
    EmptyTitle { release_key: String },
    /// More games than the shell handles comfortably.
    Capacity { count: usize },
}

/// Games accepted for placement plus everything worth telling the user.
#[derive(Debug, Clone)]
pub struct LoadedCatalog {
    pub games: Vec<GameRecord>,
    pub warnings: Vec<CatalogWarning>,
}

impl LoadedCatalog {
    pub fn has_capacity_warning(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, CatalogWarning::Capacity { .. }))
    }
}

/// Loads the working set of games from a source.
pub struct GameCatalog<S> {
    source: S,
}

impl<S: GameSource> GameCatalog<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Load the games matching `selector`.
    pub fn load(&self, selector: &Selector) -> Result<LoadedCatalog> {
        info!("Reading GOG Galaxy 2.0 database...");
        let rows = self.source.fetch(selector)?;

        info!("Parsing games...");
        let mut warnings = Vec::new();
        let mut games = normalize(rows, &mut warnings);
        games.sort_by(|a, b| a.sanitized_title.cmp(&b.sanitized_title));

        let count = games.len();
        if count == 0 {
            return Err(TilesError::EmptyResult {
                selector: selector.to_string(),
            });
        }
        if count > CatalogLimits::HARD_LIMIT {
            return Err(TilesError::CapacityExceeded {
                count,
                limit: CatalogLimits::HARD_LIMIT,
            });
        }
        if count > CatalogLimits::SOFT_LIMIT {
            warn!(
                "Adding too many tiles causes unexpected behaviour. {} tiles will be added.",
                count
            );
            warnings.push(CatalogWarning::Capacity { count });
        }

        info!("Found {} games for {}", count, selector);
        Ok(LoadedCatalog { games, warnings })
    }
}

/// Normalize rows in order, keeping the first record for each title.
fn normalize(rows: Vec<RawGameRow>, warnings: &mut Vec<CatalogWarning>) -> Vec<GameRecord> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut games: Vec<GameRecord> = Vec::with_capacity(rows.len());

    for row in rows {
        let game = GameRecord::from_row(row);

        if game.sanitized_title.is_empty() {
            warn!(
                "'{}' has no usable title and will be skipped.",
                game.release_key
            );
            warnings.push(CatalogWarning::EmptyTitle {
                release_key: game.release_key,
            });
            continue;
        }

        if !seen.insert(game.sanitized_title.clone()) {
            let kept = games
                .iter()
                .find(|g| g.sanitized_title == game.sanitized_title)
                .map(|g| g.release_key.clone())
                .unwrap_or_default();
            warn!(
                "'{}' ({}) already exists with ReleaseKey '{}'. Hide one of them in your games library.",
                game.sanitized_title, game.release_key, kept
            );
            warnings.push(CatalogWarning::DuplicateTitle {
                title: game.sanitized_title,
                kept,
                rejected: game.release_key,
            });
            continue;
        }

        games.push(game);
    }

    games
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct FixedSource {
        rows: Vec<RawGameRow>,
        requested: RefCell<Vec<Selector>>,
    }

    impl FixedSource {
        fn new(rows: Vec<RawGameRow>) -> Self {
            Self {
                rows,
                requested: RefCell::new(Vec::new()),
            }
        }

        fn titled(count: usize) -> Self {
            Self::new(
                (0..count)
                    .map(|i| {
                        RawGameRow::new(
                            format!("gog_{}", i),
                            format!("{}.webp", i),
                            format!("{{\"title\":\"Game {:03}\"}}", i),
                        )
                    })
                    .collect(),
            )
        }
    }

    impl GameSource for FixedSource {
        fn fetch(&self, selector: &Selector) -> Result<Vec<RawGameRow>> {
            self.requested.borrow_mut().push(selector.clone());
            Ok(self.rows.clone())
        }
    }

    struct BrokenSource;

    impl GameSource for BrokenSource {
        fn fetch(&self, _selector: &Selector) -> Result<Vec<RawGameRow>> {
            Err(TilesError::SourceUnavailable {
                message: "disk on fire".into(),
                source: None,
            })
        }
    }

    #[test]
    fn test_load_sorts_by_title() {
        let catalog = GameCatalog::new(FixedSource::new(vec![
            RawGameRow::new("gog_3", "c.png", "t:Gamma"),
            RawGameRow::new("gog_1", "a.png", "t:Alpha"),
            RawGameRow::new("gog_2", "b.png", "t:Beta"),
        ]));

        let loaded = catalog.load(&Selector::default()).unwrap();
        let titles: Vec<_> = loaded.games.iter().map(|g| g.sanitized_title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "Beta", "Gamma"]);
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn test_sorting_is_ordinal() {
        let catalog = GameCatalog::new(FixedSource::new(vec![
            RawGameRow::new("gog_1", "a.png", "t:beta"),
            RawGameRow::new("gog_2", "b.png", "t:Zeta"),
            RawGameRow::new("gog_3", "c.png", "t:(Alpha)"),
        ]));

        let loaded = catalog.load(&Selector::default()).unwrap();
        let titles: Vec<_> = loaded.games.iter().map(|g| g.sanitized_title.as_str()).collect();
        assert_eq!(titles, vec!["(Alpha)", "Zeta", "beta"]);
    }

    #[test]
    fn test_duplicate_titles_keep_first_seen() {
        let catalog = GameCatalog::new(FixedSource::new(vec![
            RawGameRow::new("steam_42", "s.png", "t:Portal"),
            RawGameRow::new("gog_7", "g.png", "t:Portal"),
            RawGameRow::new("gog_8", "h.png", "t:Port@al"),
        ]));

        let loaded = catalog.load(&Selector::AllOwned).unwrap();
        assert_eq!(loaded.games.len(), 1);
        assert_eq!(loaded.games[0].release_key, "steam_42");
        assert_eq!(
            loaded.warnings,
            vec![
                CatalogWarning::DuplicateTitle {
                    title: "Portal".into(),
                    kept: "steam_42".into(),
                    rejected: "gog_7".into(),
                },
                CatalogWarning::DuplicateTitle {
                    title: "Portal".into(),
                    kept: "steam_42".into(),
                    rejected: "gog_8".into(),
                },
            ]
        );
    }

    #[test]
    fn test_titles_are_unique_after_load() {
        let mut rows = Vec::new();
        for i in 0..40 {
            rows.push(RawGameRow::new(format!("a_{}", i), "i.png", format!("t:Game {}", i % 13)));
        }
        let loaded = GameCatalog::new(FixedSource::new(rows))
            .load(&Selector::Installed)
            .unwrap();

        let unique: HashSet<_> = loaded.games.iter().map(|g| &g.sanitized_title).collect();
        assert_eq!(unique.len(), loaded.games.len());
        assert_eq!(loaded.games.len(), 13);
    }

    #[test]
    fn test_empty_titles_are_rejected() {
        let catalog = GameCatalog::new(FixedSource::new(vec![
            RawGameRow::new("gog_1", "a.png", "t:™™"),
            RawGameRow::new("gog_2", "b.png", "t:Real"),
        ]));

        let loaded = catalog.load(&Selector::default()).unwrap();
        assert_eq!(loaded.games.len(), 1);
        assert_eq!(
            loaded.warnings,
            vec![CatalogWarning::EmptyTitle {
                release_key: "gog_1".into()
            }]
        );
    }

    #[test]
    fn test_empty_result_is_error() {
        let catalog = GameCatalog::new(FixedSource::new(Vec::new()));
        let result = catalog.load(&Selector::Tag("Nothing".into()));
        match result {
            Err(TilesError::EmptyResult { selector }) => assert_eq!(selector, "tag 'Nothing'"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_capacity_limits() {
        let at_soft = GameCatalog::new(FixedSource::titled(80))
            .load(&Selector::AllOwned)
            .unwrap();
        assert!(!at_soft.has_capacity_warning());

        let above_soft = GameCatalog::new(FixedSource::titled(81))
            .load(&Selector::AllOwned)
            .unwrap();
        assert!(above_soft.has_capacity_warning());
        assert_eq!(above_soft.games.len(), 81);

        let at_hard = GameCatalog::new(FixedSource::titled(150))
            .load(&Selector::AllOwned)
            .unwrap();
        assert_eq!(
            at_hard.warnings,
            vec![CatalogWarning::Capacity { count: 150 }]
        );

        let above_hard = GameCatalog::new(FixedSource::titled(151)).load(&Selector::AllOwned);
        assert!(matches!(
            above_hard,
            Err(TilesError::CapacityExceeded {
                count: 151,
                limit: 150
            })
        ));
    }

    #[test]
    fn test_source_errors_propagate() {
        let result = GameCatalog::new(BrokenSource).load(&Selector::default());
        assert!(matches!(result, Err(TilesError::SourceUnavailable { .. })));
    }

    #[test]
    fn test_selector_is_forwarded() {
        let catalog = GameCatalog::new(FixedSource::titled(1));
        catalog.load(&Selector::Installed).unwrap();
        assert_eq!(
            *catalog.source().requested.borrow(),
            vec![Selector::Installed]
        );
    }
}
