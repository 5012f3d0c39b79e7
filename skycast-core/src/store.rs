//! Application state container.
//!
//! All mutation goes through [`Action`] values applied by a pure reducer;
//! orchestration operations sequence provider calls and dispatch actions.
//! Theme and favorites changes are mirrored to the preference store by a
//! write-through step inside `dispatch`, keeping the reducer itself free of
//! I/O. Consumers observe the state through [`Store::snapshot`] or the watch
//! subscription from [`Store::subscribe`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, sleep};

use crate::error::FetchError;
use crate::model::{FavoriteCity, ForecastEntry, Suggestion, Theme, WeatherSnapshot};
use crate::persist::{self, KEY_DARK_MODE, KEY_FAVORITES, PreferenceStore};
use crate::provider::WeatherProvider;

/// Idle pause before a queued suggestion lookup fires.
pub const SUGGESTION_DEBOUNCE: Duration = Duration::from_millis(300);

/// Loading stays visible at least this long to avoid spinner flicker.
pub const MIN_LOADING_VISIBLE: Duration = Duration::from_millis(500);

/// Queries shorter than this never hit the network.
pub const MIN_SUGGESTION_QUERY_LEN: usize = 2;

/// Upper bound on the suggestion list length.
pub const MAX_SUGGESTIONS: usize = 5;

pub const MSG_MISSING_CITY: &str = "Please enter a city name.";
pub const MSG_CITY_NOT_FOUND: &str = "City not found. Please enter a valid city name.";
pub const MSG_WEATHER_UNAVAILABLE: &str = "Could not fetch the weather. Please try again.";
pub const MSG_FORECAST_UNAVAILABLE: &str = "Could not fetch the forecast.";
pub const MSG_SUGGESTIONS_UNAVAILABLE: &str = "Could not load city suggestions. Please try again.";

/// Everything the presentation layer renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub query: String,
    pub weather: Option<WeatherSnapshot>,
    pub forecast: Vec<ForecastEntry>,
    pub error: Option<String>,
    pub suggestions: Vec<Suggestion>,
    pub show_suggestions: bool,
    pub loading: bool,
    pub dark_mode: bool,
    pub favorites: Vec<FavoriteCity>,
}

impl AppState {
    pub fn theme(&self) -> Theme {
        Theme::from_dark_mode(self.dark_mode)
    }
}

/// One atomic state transition.
#[derive(Debug, Clone)]
pub enum Action {
    SetQuery(String),
    SetWeather(Option<WeatherSnapshot>),
    SetForecast(Vec<ForecastEntry>),
    SetError(Option<String>),
    SetSuggestions(Vec<Suggestion>),
    SetShowSuggestions(bool),
    SetLoading(bool),
    ToggleTheme,
    SetTheme(bool),
    AddFavorite(FavoriteCity),
    RemoveFavorite(i64),
}

fn reduce(state: &mut AppState, action: Action) {
    match action {
        Action::SetQuery(query) => state.query = query,
        Action::SetWeather(weather) => state.weather = weather,
        Action::SetForecast(forecast) => state.forecast = forecast,
        Action::SetError(error) => state.error = error,
        Action::SetSuggestions(mut suggestions) => {
            suggestions.truncate(MAX_SUGGESTIONS);
            state.suggestions = suggestions;
        }
        Action::SetShowSuggestions(show) => state.show_suggestions = show,
        Action::SetLoading(loading) => state.loading = loading,
        Action::ToggleTheme => state.dark_mode = !state.dark_mode,
        Action::SetTheme(dark_mode) => state.dark_mode = dark_mode,
        Action::AddFavorite(favorite) => {
            if !state.favorites.iter().any(|f| f.id == favorite.id) {
                state.favorites.push(favorite);
            }
        }
        Action::RemoveFavorite(id) => state.favorites.retain(|f| f.id != id),
    }
}

/// Which persisted value an action maps onto.
#[derive(Debug, Clone, Copy)]
enum Mirror {
    Theme,
    Favorites,
}

fn mirror_of(action: &Action) -> Option<Mirror> {
    match action {
        Action::ToggleTheme | Action::SetTheme(_) => Some(Mirror::Theme),
        Action::AddFavorite(_) | Action::RemoveFavorite(_) => Some(Mirror::Favorites),
        _ => None,
    }
}

/// Constructor-injected state container.
#[derive(Debug)]
pub struct Store {
    state: Mutex<AppState>,
    updates: watch::Sender<AppState>,
    provider: Arc<dyn WeatherProvider>,
    prefs: Arc<dyn PreferenceStore>,
    suggestion_epoch: AtomicU64,
}

impl Store {
    /// Build a store over a weather provider and a preference store, seeding
    /// theme and favorites from persisted state.
    pub fn new(provider: Arc<dyn WeatherProvider>, prefs: Arc<dyn PreferenceStore>) -> Arc<Self> {
        let state = AppState {
            dark_mode: persist::load(prefs.as_ref(), KEY_DARK_MODE, false),
            favorites: persist::load(prefs.as_ref(), KEY_FAVORITES, Vec::new()),
            ..AppState::default()
        };
        let (updates, _) = watch::channel(state.clone());

        Arc::new(Self {
            state: Mutex::new(state),
            updates,
            provider,
            prefs,
            suggestion_epoch: AtomicU64::new(0),
        })
    }

    /// Current state, by value.
    pub fn snapshot(&self) -> AppState {
        self.lock_state().clone()
    }

    /// Watch every state transition. The receiver starts at the current
    /// state.
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.updates.subscribe()
    }

    /// Current visual theme; applying it is the presentation layer's job.
    pub fn theme(&self) -> Theme {
        self.lock_state().theme()
    }

    /// Apply one action, mirror theme/favorites changes to persistence, and
    /// notify subscribers.
    pub fn dispatch(&self, action: Action) {
        let mirror = mirror_of(&action);

        let snapshot = {
            let mut state = self.lock_state();
            reduce(&mut state, action);
            state.clone()
        };

        match mirror {
            Some(Mirror::Theme) => {
                persist::save(self.prefs.as_ref(), KEY_DARK_MODE, &snapshot.dark_mode);
            }
            Some(Mirror::Favorites) => {
                persist::save(self.prefs.as_ref(), KEY_FAVORITES, &snapshot.favorites);
            }
            None => {}
        }

        let _ = self.updates.send(snapshot);
    }

    pub fn set_query(&self, query: impl Into<String>) {
        self.dispatch(Action::SetQuery(query.into()));
    }

    pub fn set_show_suggestions(&self, show: bool) {
        self.dispatch(Action::SetShowSuggestions(show));
    }

    /// Debounced suggestion lookup: schedules a request that fires after
    /// [`SUGGESTION_DEBOUNCE`] unless a newer call supersedes it. Responses
    /// arriving after a newer call are discarded, so a slow stale lookup can
    /// never overwrite fresher suggestions.
    pub fn queue_suggestions(self: &Arc<Self>, query: impl Into<String>) {
        let epoch = self.next_suggestion_epoch();
        let store = Arc::clone(self);
        let query = query.into();

        tokio::spawn(async move {
            sleep(SUGGESTION_DEBOUNCE).await;
            if store.current_suggestion_epoch() != epoch {
                return;
            }
            store.lookup_suggestions(&query, epoch).await;
        });
    }

    /// Immediate suggestion lookup. Queries shorter than
    /// [`MIN_SUGGESTION_QUERY_LEN`] clear the list without a network call;
    /// failures set a retry message and clear the list. Never propagates an
    /// error.
    pub async fn request_suggestions(&self, query: &str) {
        let epoch = self.next_suggestion_epoch();
        self.lookup_suggestions(query, epoch).await;
    }

    async fn lookup_suggestions(&self, query: &str, epoch: u64) {
        if query.chars().count() < MIN_SUGGESTION_QUERY_LEN {
            self.dispatch(Action::SetSuggestions(Vec::new()));
            return;
        }

        let result = self.provider.suggest(query).await;

        if self.current_suggestion_epoch() != epoch {
            tracing::debug!(query, "discarding stale suggestion response");
            return;
        }

        match result {
            Ok(suggestions) => self.dispatch(Action::SetSuggestions(suggestions)),
            Err(err) => {
                tracing::warn!(query, %err, "suggestion lookup failed");
                self.dispatch(Action::SetSuggestions(Vec::new()));
                self.dispatch(Action::SetError(Some(MSG_SUGGESTIONS_UNAVAILABLE.to_string())));
            }
        }
    }

    /// Fetch current weather (and, best effort, the forecast) for `city`, or
    /// for the current query text when `city` is `None`.
    ///
    /// No-op while a fetch is already in flight. The in-flight request is
    /// never cancelled; only further invocations are suppressed until it
    /// resolves. Loading stays set for at least [`MIN_LOADING_VISIBLE`].
    pub async fn fetch_weather(&self, city: Option<&str>) {
        let city = match city {
            Some(city) => city.trim().to_string(),
            None => self.snapshot().query.trim().to_string(),
        };

        if city.is_empty() {
            self.dispatch(Action::SetError(Some(MSG_MISSING_CITY.to_string())));
            return;
        }

        if !self.begin_fetch() {
            return;
        }
        let started = Instant::now();

        match self.provider.current(&city).await {
            Ok(snapshot) => {
                self.dispatch(Action::SetWeather(Some(snapshot)));
                self.dispatch(Action::SetShowSuggestions(false));

                // A forecast outage must not block showing current weather.
                match self.provider.forecast(&city).await {
                    Ok(entries) => self.dispatch(Action::SetForecast(entries)),
                    Err(err) => {
                        tracing::warn!(
                            city,
                            %err,
                            "forecast fetch failed, keeping current weather"
                        );
                    }
                }
            }
            Err(err) => {
                tracing::warn!(city, %err, "weather fetch failed");
                self.dispatch(Action::SetError(Some(weather_error_message(&err).to_string())));
                self.dispatch(Action::SetWeather(None));
            }
        }

        let elapsed = started.elapsed();
        if elapsed < MIN_LOADING_VISIBLE {
            sleep(MIN_LOADING_VISIBLE - elapsed).await;
        }
        self.dispatch(Action::SetLoading(false));
    }

    /// Fetch only the forecast for `city`. Independent of the loading flag;
    /// failure sets the error message but keeps an existing weather
    /// snapshot.
    pub async fn fetch_forecast_only(&self, city: &str) {
        let city = city.trim();
        if city.is_empty() {
            self.dispatch(Action::SetError(Some(MSG_MISSING_CITY.to_string())));
            return;
        }

        match self.provider.forecast(city).await {
            Ok(entries) => self.dispatch(Action::SetForecast(entries)),
            Err(err) => {
                tracing::warn!(city, %err, "forecast fetch failed");
                self.dispatch(Action::SetError(Some(MSG_FORECAST_UNAVAILABLE.to_string())));
            }
        }
    }

    /// Pin the currently displayed city. No-op without a snapshot or when the
    /// city is already pinned; the updated list is persisted on change.
    pub fn add_favorite(&self) {
        let snapshot = self.snapshot();
        let Some(weather) = snapshot.weather.as_ref() else {
            return;
        };
        if snapshot.favorites.iter().any(|f| f.id == weather.city_id) {
            return;
        }

        self.dispatch(Action::AddFavorite(FavoriteCity::from_snapshot(weather)));
    }

    /// Unpin a city by provider id. Idempotent; the list is re-persisted even
    /// when the id was absent.
    pub fn remove_favorite(&self, id: i64) {
        self.dispatch(Action::RemoveFavorite(id));
    }

    /// Flip the dark-mode flag; the new value is persisted.
    pub fn toggle_theme(&self) {
        self.dispatch(Action::ToggleTheme);
    }

    /// Set the dark-mode flag; the new value is persisted.
    pub fn set_theme(&self, dark_mode: bool) {
        self.dispatch(Action::SetTheme(dark_mode));
    }

    /// Atomically claim the loading flag and clear the previous error.
    /// Returns `false` when a fetch is already in flight.
    fn begin_fetch(&self) -> bool {
        let snapshot = {
            let mut state = self.lock_state();
            if state.loading {
                return false;
            }
            state.loading = true;
            state.error = None;
            state.clone()
        };
        let _ = self.updates.send(snapshot);
        true
    }

    fn next_suggestion_epoch(&self) -> u64 {
        self.suggestion_epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn current_suggestion_epoch(&self) -> u64 {
        self.suggestion_epoch.load(Ordering::SeqCst)
    }

    fn lock_state(&self) -> MutexGuard<'_, AppState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn weather_error_message(err: &FetchError) -> &'static str {
    if err.is_city_not_found() {
        MSG_CITY_NOT_FOUND
    } else {
        MSG_WEATHER_UNAVAILABLE
    }
}
