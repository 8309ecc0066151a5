//! Coding-profile statistics for the foreground panel.
//!
//! Fetches solved-problem counts from the alfa-leetcode-api in a background
//! thread and keeps a JSON copy in the cache directory so the panel has
//! something to show when the network is down.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// Base URL of the statistics API.
const API_BASE: &str = "https://alfa-leetcode-api.onrender.com";

/// Timeout for HTTP requests.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Name of the cache file in the cache directory.
pub const CACHE_FILE: &str = "stats.json";

/// How often the worker wakes up to check for stop or refresh requests.
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Question count used as the gauge ceiling until the real total is known.
const FALLBACK_TOTAL_QUESTIONS: u32 = 600;

/// Solved-problem counts at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodingStats {
    pub total_solved: u32,
    pub easy_solved: u32,
    pub medium_solved: u32,
    pub hard_solved: u32,
    /// Problem counts available per difficulty, if fetched.
    #[serde(default)]
    pub totals: Option<QuestionTotals>,
    pub fetched_at: DateTime<Utc>,
}

impl CodingStats {
    /// Younger than `max_age` at `now`.
    pub fn is_fresh(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(self.fetched_at);
        age.to_std().map(|age| age < max_age).unwrap_or(true)
    }

    /// Denominator for the overall progress gauge.
    pub fn total_questions(&self) -> u32 {
        self.totals
            .as_ref()
            .map(|t| t.all)
            .filter(|&all| all > 0)
            .unwrap_or(FALLBACK_TOTAL_QUESTIONS)
    }
}

/// Problem counts available on the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionTotals {
    pub all: u32,
    pub easy: u32,
    pub medium: u32,
    pub hard: u32,
}

/// `/<user>/solved` response (partial - only fields we need).
#[derive(Debug, Deserialize)]
struct SolvedResponse {
    #[serde(rename = "solvedProblem", default)]
    solved_problem: u32,
    #[serde(rename = "easySolved", default)]
    easy_solved: u32,
    #[serde(rename = "mediumSolved", default)]
    medium_solved: u32,
    #[serde(rename = "hardSolved", default)]
    hard_solved: u32,
}

/// `/totalQuestions` response.
#[derive(Debug, Deserialize)]
struct TotalQuestionsResponse {
    data: TotalQuestionsData,
}

#[derive(Debug, Deserialize)]
struct TotalQuestionsData {
    #[serde(rename = "allQuestionsCount")]
    all_questions_count: Vec<DifficultyCount>,
}

#[derive(Debug, Deserialize)]
struct DifficultyCount {
    difficulty: String,
    count: u32,
}

impl TotalQuestionsResponse {
    fn totals(&self) -> QuestionTotals {
        let count = |name: &str| {
            self.data
                .all_questions_count
                .iter()
                .find(|c| c.difficulty == name)
                .map(|c| c.count)
                .unwrap_or(0)
        };
        QuestionTotals {
            all: count("All"),
            easy: count("Easy"),
            medium: count("Medium"),
            hard: count("Hard"),
        }
    }
}

/// Where the latest snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsSource {
    /// Nothing loaded yet.
    None,
    /// Read from the cache file.
    Cache,
    /// Fetched from the API.
    Live,
}

/// Snapshot shared with the UI thread.
#[derive(Debug, Clone)]
pub struct StatsSnapshot {
    pub stats: Option<CodingStats>,
    pub source: StatsSource,
    pub refreshing: bool,
}

impl Default for StatsSnapshot {
    fn default() -> Self {
        Self {
            stats: None,
            source: StatsSource::None,
            refreshing: false,
        }
    }
}

/// Stats monitor that fetches statistics in a background thread.
#[derive(Debug)]
pub struct StatsMonitor {
    /// Current snapshot updated by the background thread.
    snapshot: Arc<RwLock<StatsSnapshot>>,
    /// Cached snapshot for when the lock is contended.
    cached_snapshot: Arc<RwLock<StatsSnapshot>>,
    username: String,
    refresh_interval: Duration,
    cache_path: Option<PathBuf>,
    /// Set by the UI to ask for an immediate fetch.
    refresh_requested: Arc<RwLock<bool>>,
    /// Flag to signal thread termination.
    running: Arc<RwLock<bool>>,
}

impl StatsMonitor {
    pub fn new(username: String, refresh_interval: Duration, cache_path: Option<PathBuf>) -> Self {
        Self {
            snapshot: Arc::new(RwLock::new(StatsSnapshot::default())),
            cached_snapshot: Arc::new(RwLock::new(StatsSnapshot::default())),
            username,
            refresh_interval,
            cache_path,
            refresh_requested: Arc::new(RwLock::new(false)),
            running: Arc::new(RwLock::new(false)),
        }
    }

    /// Default cache location under the platform cache directory.
    pub fn default_cache_path() -> Option<PathBuf> {
        nightsky_config::project_dirs().map(|dirs| dirs.cache_dir().join(CACHE_FILE))
    }

    /// Load the cache and start the background fetching thread.
    pub fn start(&self) {
        if let Ok(mut running) = self.running.write() {
            if *running {
                return;
            }
            *running = true;
        }

        if let Some(cached) = self.cache_path.as_deref().and_then(load_cache) {
            debug!("loaded cached stats from {}", cached.fetched_at);
            publish(
                &self.snapshot,
                &self.cached_snapshot,
                StatsSnapshot {
                    stats: Some(cached),
                    source: StatsSource::Cache,
                    refreshing: false,
                },
            );
        }

        let snapshot = self.snapshot.clone();
        let cached_snapshot = self.cached_snapshot.clone();
        let refresh_requested = self.refresh_requested.clone();
        let running = self.running.clone();
        let username = self.username.clone();
        let cache_path = self.cache_path.clone();
        let refresh_interval = self.refresh_interval;

        thread::spawn(move || {
            // Fetch immediately on start
            fetch_and_update(&username, cache_path.as_deref(), &snapshot, &cached_snapshot);
            let mut last_fetch = Instant::now();

            loop {
                if let Ok(is_running) = running.read()
                    && !*is_running
                {
                    break;
                }

                let forced = refresh_requested
                    .write()
                    .map(|mut requested| std::mem::take(&mut *requested))
                    .unwrap_or(false);

                if forced || last_fetch.elapsed() >= refresh_interval {
                    fetch_and_update(&username, cache_path.as_deref(), &snapshot, &cached_snapshot);
                    last_fetch = Instant::now();
                }

                thread::sleep(POLL_INTERVAL);
            }
        });
    }

    /// Stop the background thread.
    pub fn stop(&self) {
        if let Ok(mut running) = self.running.write() {
            *running = false;
        }
    }

    /// Ask the background thread to fetch now.
    pub fn request_refresh(&self) {
        if let Ok(mut requested) = self.refresh_requested.write() {
            *requested = true;
        }
    }

    /// Current snapshot.
    /// Uses try_read with fallback to the cached snapshot to avoid blocking.
    pub fn snapshot(&self) -> StatsSnapshot {
        if let Ok(s) = self.snapshot.try_read() {
            return s.clone();
        }
        if let Ok(c) = self.cached_snapshot.read() {
            return c.clone();
        }
        StatsSnapshot::default()
    }
}

impl Drop for StatsMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Write `snapshot` to both shared slots.
fn publish(
    shared: &Arc<RwLock<StatsSnapshot>>,
    cached: &Arc<RwLock<StatsSnapshot>>,
    snapshot: StatsSnapshot,
) {
    if let Ok(mut s) = shared.write() {
        *s = snapshot.clone();
    }
    if let Ok(mut c) = cached.write() {
        *c = snapshot;
    }
}

/// Mark the shared snapshot as refreshing.
fn set_refreshing(shared: &Arc<RwLock<StatsSnapshot>>, cached: &Arc<RwLock<StatsSnapshot>>) {
    let mut current = shared.read().map(|s| s.clone()).unwrap_or_default();
    current.refreshing = true;
    publish(shared, cached, current);
}

/// Fetch statistics and update shared state, falling back to the cache.
fn fetch_and_update(
    username: &str,
    cache_path: Option<&Path>,
    shared: &Arc<RwLock<StatsSnapshot>>,
    cached: &Arc<RwLock<StatsSnapshot>>,
) {
    set_refreshing(shared, cached);

    match fetch_stats(username) {
        Ok(stats) => {
            info!(
                "fetched stats for {username}: {} solved",
                stats.total_solved
            );
            if let Some(path) = cache_path
                && let Err(e) = save_cache(path, &stats)
            {
                warn!("could not write stats cache {}: {e}", path.display());
            }
            publish(
                shared,
                cached,
                StatsSnapshot {
                    stats: Some(stats),
                    source: StatsSource::Live,
                    refreshing: false,
                },
            );
        }
        Err(e) => {
            warn!("stats fetch failed: {e}");
            // Keep what we have; otherwise try the cache file
            let mut current = shared.read().map(|s| s.clone()).unwrap_or_default();
            if current.stats.is_none()
                && let Some(stats) = cache_path.and_then(load_cache)
            {
                current.stats = Some(stats);
                current.source = StatsSource::Cache;
            }
            current.refreshing = false;
            publish(shared, cached, current);
        }
    }
}

/// Fetch solved counts and, best effort, the question totals.
fn fetch_stats(username: &str) -> Result<CodingStats, String> {
    let agent = ureq::Agent::config_builder()
        .timeout_global(Some(REQUEST_TIMEOUT))
        .build()
        .new_agent();

    let solved: SolvedResponse = agent
        .get(&format!("{API_BASE}/{username}/solved"))
        .call()
        .map_err(|e| format!("HTTP error: {e}"))?
        .body_mut()
        .read_json()
        .map_err(|e| format!("JSON parse error: {e}"))?;

    let totals = agent
        .get(&format!("{API_BASE}/totalQuestions"))
        .call()
        .ok()
        .and_then(|mut response| response.body_mut().read_json::<TotalQuestionsResponse>().ok())
        .map(|response| response.totals());

    Ok(stats_from_response(solved, totals, Utc::now()))
}

fn stats_from_response(
    solved: SolvedResponse,
    totals: Option<QuestionTotals>,
    fetched_at: DateTime<Utc>,
) -> CodingStats {
    CodingStats {
        total_solved: solved.solved_problem,
        easy_solved: solved.easy_solved,
        medium_solved: solved.medium_solved,
        hard_solved: solved.hard_solved,
        totals,
        fetched_at,
    }
}

/// Read a cached snapshot; unreadable or corrupt caches count as absent.
pub fn load_cache(path: &Path) -> Option<CodingStats> {
    let contents = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&contents) {
        Ok(stats) => Some(stats),
        Err(e) => {
            warn!("ignoring corrupt stats cache {}: {e}", path.display());
            None
        }
    }
}

/// Write a snapshot to the cache file, creating its directory.
pub fn save_cache(path: &Path, stats: &CodingStats) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(stats).map_err(std::io::Error::other)?;
    fs::write(path, json)
}
