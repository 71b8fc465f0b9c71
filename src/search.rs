use clap::ValueEnum;
use futures_util::future::try_join_all;
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api_connection::endpoints::NON_ALCOHOLIC_TAG;
use crate::api_connection::ApiConnectionError;
use crate::directories::{BeverageDirectory, RecipeDirectory, RegionalDirectory};
use crate::models::{serialize_keyed, Beverage, Recipe, RegionalRecipe};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Name,
    Ingredient,
    Letter,
    Regional,
    Mocktail,
}

/// Which upstream a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchSource {
    Generic,
    Regional,
    Beverage,
}

/// Display state: one bucket per source. A search replaces all three.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResults {
    pub recipes: Vec<Recipe>,
    #[serde(serialize_with = "serialize_keyed")]
    pub regional: Vec<RegionalRecipe>,
    pub beverages: Vec<Beverage>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty() && self.regional.is_empty() && self.beverages.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Input was blank or malformed; nothing was sent and state is unchanged.
    Skipped,
    Completed,
    /// Some sources failed and were emptied; the others were kept.
    Degraded { failed: Vec<SearchSource> },
    /// A newer search started while this one was in flight; its results
    /// were dropped.
    Superseded,
}

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("search failed: {0}")]
    Upstream(#[from] ApiConnectionError),

    #[error("search timed out after {0:?}")]
    TimedOut(Duration),
}

impl SearchError {
    pub fn notice(&self) -> &'static str {
        "Search failed. Please try again."
    }
}

#[derive(Debug, Default)]
struct SearchState {
    mode: Option<SearchMode>,
    term: String,
    results: SearchResults,
}

/// Routes a (mode, term) search to the right upstream calls and merges the
/// answers into one result set.
pub struct SearchDispatcher {
    generic: Arc<dyn RecipeDirectory>,
    regional: Arc<dyn RegionalDirectory>,
    beverages: Arc<dyn BeverageDirectory>,
    timeout: Duration,
    generation: AtomicU64,
    state: Mutex<SearchState>,
}

impl SearchDispatcher {
    pub fn new(
        generic: Arc<dyn RecipeDirectory>,
        regional: Arc<dyn RegionalDirectory>,
        beverages: Arc<dyn BeverageDirectory>,
        timeout: Duration,
    ) -> Self {
        Self {
            generic,
            regional,
            beverages,
            timeout,
            generation: AtomicU64::new(0),
            state: Mutex::new(SearchState::default()),
        }
    }

    pub async fn results(&self) -> SearchResults {
        self.state.lock().await.results.clone()
    }

    pub async fn current_query(&self) -> Option<(SearchMode, String)> {
        let state = self.state.lock().await;
        state.mode.map(|mode| (mode, state.term.clone()))
    }

    /// Runs one search. On failure every bucket is cleared before the error
    /// is returned, so no stale results survive a failed search.
    pub async fn search(&self, mode: SearchMode, term: &str) -> Result<SearchOutcome, SearchError> {
        let term = term.trim();
        if term.is_empty() {
            debug!(?mode, "blank search term, nothing to do");
            return Ok(SearchOutcome::Skipped);
        }
        let letter = match mode {
            SearchMode::Letter => {
                let mut chars = term.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(c),
                    _ => {
                        debug!(term, "letter search needs exactly one character");
                        return Ok(SearchOutcome::Skipped);
                    }
                }
            }
            _ => None,
        };

        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        info!(?mode, term, ticket, "search started");

        let fetched = tokio::time::timeout(self.timeout, self.fetch(mode, term, letter)).await;

        let mut state = self.state.lock().await;
        if self.generation.load(Ordering::SeqCst) != ticket {
            debug!(ticket, "search superseded, dropping its results");
            return Ok(SearchOutcome::Superseded);
        }
        state.mode = Some(mode);
        state.term = term.to_string();

        match fetched {
            Ok(Ok((results, failed))) => {
                info!(
                    recipes = results.recipes.len(),
                    regional = results.regional.len(),
                    beverages = results.beverages.len(),
                    "search completed"
                );
                state.results = results;
                if failed.is_empty() {
                    Ok(SearchOutcome::Completed)
                } else {
                    Ok(SearchOutcome::Degraded { failed })
                }
            }
            Ok(Err(e)) => {
                warn!(error = %e, "search failed");
                state.results = SearchResults::default();
                Err(SearchError::Upstream(e))
            }
            Err(_) => {
                warn!(timeout = ?self.timeout, "search timed out");
                state.results = SearchResults::default();
                Err(SearchError::TimedOut(self.timeout))
            }
        }
    }

    async fn fetch(
        &self,
        mode: SearchMode,
        term: &str,
        letter: Option<char>,
    ) -> Result<(SearchResults, Vec<SearchSource>), ApiConnectionError> {
        let mut results = SearchResults::default();
        let mut failed = Vec::new();

        match (mode, letter) {
            (SearchMode::Name, _) => {
                results.recipes = self.generic.search_by_name(term).await?;
            }
            (SearchMode::Letter, Some(letter)) => {
                results.recipes = self.generic.search_by_first_letter(letter).await?;
            }
            (SearchMode::Letter, None) => {}
            (SearchMode::Ingredient, _) => {
                let (generic, regional) = tokio::join!(
                    self.generic_by_ingredient(term),
                    self.regional.filter_by_ingredient(term)
                );
                match (generic, regional) {
                    (Err(e), Err(regional_err)) => {
                        warn!(error = %regional_err, "regional ingredient search failed");
                        return Err(e);
                    }
                    (generic, regional) => {
                        results.recipes = degrade(generic, SearchSource::Generic, &mut failed);
                        results.regional = degrade(regional, SearchSource::Regional, &mut failed);
                    }
                }
            }
            (SearchMode::Regional, _) => {
                let needle = term.to_lowercase();
                results.regional = self
                    .regional
                    .list_all()
                    .await?
                    .into_iter()
                    .filter(|recipe| recipe.matches_term(&needle))
                    .collect();
            }
            (SearchMode::Mocktail, _) => {
                let stubs = self.beverages.filter_by_category(NON_ALCOHOLIC_TAG).await?;
                results.beverages = resolve_all(stubs.iter().map(|stub| {
                    let id = stub.id.clone();
                    async move {
                        self.beverages
                            .lookup_by_id(&id)
                            .await?
                            .ok_or(ApiConnectionError::MissingRecord(id))
                    }
                }))
                .await?;
            }
        }

        Ok((results, failed))
    }

    /// Ingredient filter returns stubs; each is resolved to the full record.
    async fn generic_by_ingredient(&self, term: &str) -> Result<Vec<Recipe>, ApiConnectionError> {
        let stubs = self.generic.filter_by_ingredient(term).await?;
        debug!(stubs = stubs.len(), "resolving ingredient stubs");
        resolve_all(stubs.iter().map(|stub| {
            let id = stub.id.clone();
            async move {
                self.generic
                    .lookup_by_id(&id)
                    .await?
                    .ok_or(ApiConnectionError::MissingRecord(id))
            }
        }))
        .await
    }
}

/// All-or-nothing join: one failed lookup fails the whole batch.
async fn resolve_all<T, F>(lookups: impl IntoIterator<Item = F>) -> Result<Vec<T>, ApiConnectionError>
where
    F: Future<Output = Result<T, ApiConnectionError>>,
{
    try_join_all(lookups).await
}

fn degrade<T>(
    result: Result<Vec<T>, ApiConnectionError>,
    source: SearchSource,
    failed: &mut Vec<SearchSource>,
) -> Vec<T> {
    result.unwrap_or_else(|e| {
        warn!(?source, error = %e, "source failed, showing no results from it");
        failed.push(source);
        Vec::new()
    })
}
