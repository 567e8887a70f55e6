use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Context;
use axum::{
    Form, Json, Router,
    extract::{Path, Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::signal;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info, warn};

use fittrack_core::models::{
    DayUpdate, NewMeal, NewSavedMeal, NewWorkout, SavedMeal, Settings, SettingsUpdate, non_blank,
    parse_checkbox, parse_optional_date, parse_optional_f64, parse_optional_i64,
};
use fittrack_core::service::{DashboardView, DayView, Tracker, WeeklyView, WorkoutsView};
use fittrack_core::suggest::MealSuggestions;

use crate::commands::today;

const BODY_LIMIT: usize = 1024 * 1024; // 1 MB

#[derive(Clone)]
struct AppState {
    tracker: Arc<Mutex<Tracker>>,
    api_key: Option<String>,
}

impl AppState {
    fn tracker(&self) -> MutexGuard<'_, Tracker> {
        self.tracker
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

// --- Form types ---
//
// Every field arrives as optional text. Blank means absent; anything else must parse.

#[derive(Deserialize, Default)]
struct DayForm {
    day: Option<String>,
    weight_am: Option<String>,
    waist_in: Option<String>,
    walking_miles: Option<String>,
    active_calories: Option<String>,
    walk_done: Option<String>,
    lift_done: Option<String>,
    if_done: Option<String>,
    rings_closed: Option<String>,
    cal_target: Option<String>,
    prot_target: Option<String>,
    notes: Option<String>,
}

#[derive(Deserialize, Default)]
struct MealForm {
    day: Option<String>,
    time: Option<String>,
    name: Option<String>,
    calories: Option<String>,
    protein_g: Option<String>,
}

#[derive(Deserialize, Default)]
struct SavedMealForm {
    name: Option<String>,
    calories: Option<String>,
    protein_g: Option<String>,
}

#[derive(Deserialize, Default)]
struct LogSavedForm {
    day: Option<String>,
    time: Option<String>,
}

#[derive(Deserialize, Default)]
struct SettingsForm {
    start_weight: Option<String>,
    goal_weight: Option<String>,
    goal_date: Option<String>,
}

#[derive(Deserialize, Default)]
struct WorkoutForm {
    day: Option<String>,
    workout_type: Option<String>,
    minutes: Option<String>,
    calories: Option<String>,
    notes: Option<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// --- Error handling ---

enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Internal(err) => {
                error!("Internal server error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

fn bad_request(err: &anyhow::Error) -> ApiError {
    ApiError::BadRequest(format!("{err:#}"))
}

/// Form date, or today when the field is missing or blank.
fn form_date(value: Option<&str>) -> Result<NaiveDate, ApiError> {
    Ok(parse_optional_date(value)
        .map_err(|e| bad_request(&e))?
        .unwrap_or_else(today))
}

fn form_f64(value: Option<&str>) -> Result<Option<f64>, ApiError> {
    parse_optional_f64(value).map_err(|e| bad_request(&e))
}

fn form_i64(value: Option<&str>) -> Result<Option<i64>, ApiError> {
    parse_optional_i64(value).map_err(|e| bad_request(&e))
}

fn day_redirect(date: NaiveDate) -> Redirect {
    Redirect::to(&format!("/day/{}", date.format("%Y-%m-%d")))
}

impl DayForm {
    fn to_update(&self) -> Result<DayUpdate, ApiError> {
        Ok(DayUpdate {
            weight_am: form_f64(self.weight_am.as_deref())?,
            waist_in: form_f64(self.waist_in.as_deref())?,
            walking_miles: form_f64(self.walking_miles.as_deref())?,
            active_calories: form_i64(self.active_calories.as_deref())?,
            walk_done: parse_checkbox(self.walk_done.as_deref()),
            lift_done: parse_checkbox(self.lift_done.as_deref()),
            if_done: parse_checkbox(self.if_done.as_deref()),
            rings_closed: parse_checkbox(self.rings_closed.as_deref()),
            cal_target: form_i64(self.cal_target.as_deref())?,
            prot_target: form_i64(self.prot_target.as_deref())?,
            notes: self.notes.clone(),
        })
    }
}

impl MealForm {
    fn to_new_meal(&self) -> Result<NewMeal, ApiError> {
        Ok(NewMeal {
            date: form_date(self.day.as_deref())?,
            time: non_blank(self.time.as_deref()),
            name: self.name.clone().unwrap_or_default(),
            calories: form_i64(self.calories.as_deref())?,
            protein_g: form_i64(self.protein_g.as_deref())?,
        })
    }
}

// --- Middleware ---

async fn require_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if let Some(ref expected_key) = state.api_key {
        let authorized = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|token| token == expected_key);

        if !authorized {
            warn!(path = %request.uri().path(), "Rejected request without a valid API key");
            return (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: "Invalid or missing API key".to_string(),
                }),
            )
                .into_response();
        }
    }
    next.run(request).await
}

async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static("default-src 'none'"),
    );
    response
}

// --- Views ---

async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardView>, ApiError> {
    let view = state
        .tracker()
        .dashboard(today())
        .context("failed to build dashboard")?;
    Ok(Json(view))
}

async fn day_view(
    State(state): State<AppState>,
    Path(date_str): Path<String>,
) -> Result<Json<DayView>, ApiError> {
    let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("Invalid date '{date_str}'. Use YYYY-MM-DD")))?;
    let view = state
        .tracker()
        .day_view(date)
        .context("failed to load day")?;
    Ok(Json(view))
}

async fn weekly(State(state): State<AppState>) -> Result<Json<WeeklyView>, ApiError> {
    let view = state
        .tracker()
        .weekly(today())
        .context("failed to build weekly summary")?;
    Ok(Json(view))
}

async fn get_settings(State(state): State<AppState>) -> Json<Settings> {
    Json(state.tracker().settings().clone())
}

async fn list_saved(State(state): State<AppState>) -> Result<Json<Vec<SavedMeal>>, ApiError> {
    let saved = state
        .tracker()
        .saved_meals()
        .context("failed to list saved meals")?;
    Ok(Json(saved))
}

async fn meal_suggestions(
    State(state): State<AppState>,
) -> Result<Json<MealSuggestions>, ApiError> {
    let suggestions = state
        .tracker()
        .meal_suggestions(today())
        .context("failed to build meal suggestions")?;
    Ok(Json(suggestions))
}

async fn list_workouts(State(state): State<AppState>) -> Result<Json<WorkoutsView>, ApiError> {
    let view = state
        .tracker()
        .workouts(today())
        .context("failed to list workouts")?;
    Ok(Json(view))
}

async fn export_csv(State(state): State<AppState>) -> Result<Response, ApiError> {
    let csv = state.tracker().export_csv().context("failed to export CSV")?;
    Ok((
        [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
        csv,
    )
        .into_response())
}

// --- Form handlers ---

async fn update_day(
    State(state): State<AppState>,
    Form(form): Form<DayForm>,
) -> Result<Redirect, ApiError> {
    let date = form_date(form.day.as_deref())?;
    let update = form.to_update()?;
    state
        .tracker()
        .update_day(date, &update)
        .context("failed to update day")?;
    info!(%date, "Updated day");
    Ok(day_redirect(date))
}

async fn add_meal(
    State(state): State<AppState>,
    Form(form): Form<MealForm>,
) -> Result<Redirect, ApiError> {
    let meal = form.to_new_meal()?;
    if let Some(saved) = state
        .tracker()
        .add_meal(&meal)
        .context("failed to add meal")?
    {
        info!(id = saved.id, date = %saved.date, "Logged meal");
    }
    Ok(day_redirect(meal.date))
}

async fn quick_add_meal(
    State(state): State<AppState>,
    Form(form): Form<MealForm>,
) -> Result<Redirect, ApiError> {
    let meal = form.to_new_meal()?;
    let saved = state
        .tracker()
        .quick_add_meal(&meal)
        .context("failed to quick-add meal")?;
    info!(id = saved.id, date = %saved.date, "Quick-added meal");
    Ok(day_redirect(saved.date))
}

async fn delete_meal(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Redirect, ApiError> {
    let tracker = state.tracker();
    tracker
        .meal(id)
        .map_err(|_| ApiError::NotFound(format!("Meal {id} not found")))?;
    let meal = tracker.delete_meal(id).context("failed to delete meal")?;
    info!(id, date = %meal.date, "Deleted meal");
    Ok(day_redirect(meal.date))
}

async fn update_settings(
    State(state): State<AppState>,
    Form(form): Form<SettingsForm>,
) -> Result<Redirect, ApiError> {
    let update = SettingsUpdate {
        start_weight: form_f64(form.start_weight.as_deref())?,
        goal_weight: form_f64(form.goal_weight.as_deref())?,
        goal_date: parse_optional_date(form.goal_date.as_deref()).map_err(|e| bad_request(&e))?,
    };
    state
        .tracker()
        .update_settings(&update)
        .context("failed to update settings")?;
    info!("Updated settings");
    Ok(Redirect::to("/settings"))
}

async fn add_saved(
    State(state): State<AppState>,
    Form(form): Form<SavedMealForm>,
) -> Result<Redirect, ApiError> {
    let meal = NewSavedMeal {
        name: form.name.clone().unwrap_or_default(),
        calories: form_i64(form.calories.as_deref())?,
        protein_g: form_i64(form.protein_g.as_deref())?,
    };
    if let Some(saved) = state
        .tracker()
        .add_saved_meal(&meal)
        .context("failed to save meal")?
    {
        info!(id = saved.id, "Saved meal template");
    }
    Ok(Redirect::to("/saved"))
}

async fn delete_saved(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Redirect, ApiError> {
    let tracker = state.tracker();
    tracker
        .saved_meal(id)
        .map_err(|_| ApiError::NotFound(format!("Saved meal {id} not found")))?;
    tracker
        .delete_saved_meal(id)
        .context("failed to delete saved meal")?;
    info!(id, "Deleted saved meal");
    Ok(Redirect::to("/saved"))
}

async fn log_saved(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<LogSavedForm>,
) -> Result<Redirect, ApiError> {
    let date = form_date(form.day.as_deref())?;
    let tracker = state.tracker();
    tracker
        .saved_meal(id)
        .map_err(|_| ApiError::NotFound(format!("Saved meal {id} not found")))?;
    let meal = tracker
        .log_saved_meal(id, date, form.time.as_deref())
        .context("failed to log saved meal")?;
    info!(id = meal.id, saved_id = id, %date, "Logged saved meal");
    Ok(day_redirect(date))
}

async fn add_workout(
    State(state): State<AppState>,
    Form(form): Form<WorkoutForm>,
) -> Result<Redirect, ApiError> {
    let workout = NewWorkout {
        date: form_date(form.day.as_deref())?,
        workout_type: form.workout_type.clone().unwrap_or_default(),
        minutes: form_i64(form.minutes.as_deref())?.unwrap_or_default(),
        calories: form_i64(form.calories.as_deref())?.unwrap_or_default(),
        notes: form.notes.clone(),
    };
    if let Some(saved) = state
        .tracker()
        .add_workout(&workout)
        .context("failed to log workout")?
    {
        info!(id = saved.id, workout_type = %saved.workout_type, "Logged workout");
    }
    Ok(Redirect::to("/workouts"))
}

// --- Router builder ---

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/day/update", post(update_day))
        .route("/day/{date}", get(day_view))
        .route("/meal/add", post(add_meal))
        .route("/meal/quick_add", post(quick_add_meal))
        .route("/meal/delete/{id}", post(delete_meal))
        .route("/weekly", get(weekly))
        .route("/settings", get(get_settings))
        .route("/settings/update", post(update_settings))
        .route("/saved", get(list_saved))
        .route("/saved/add", post(add_saved))
        .route("/saved/delete/{id}", post(delete_saved))
        .route("/saved/log/{id}", post(log_saved))
        .route("/meals", get(meal_suggestions))
        .route("/workouts", get(list_workouts).post(add_workout))
        .route("/export.csv", get(export_csv))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .layer(middleware::from_fn(security_headers))
        .with_state(state)
}

// --- Server startup ---

pub async fn start_server(
    tracker: Tracker,
    port: u16,
    bind: &str,
    api_key: Option<String>,
    new_api_key: bool,
) -> anyhow::Result<()> {
    let state = AppState {
        tracker: Arc::new(Mutex::new(tracker)),
        api_key: api_key.clone(),
    };

    let app = build_router(state);

    if let Some(ref key) = api_key {
        if !new_api_key {
            eprintln!(
                "API key: {} (see api_key file in data directory)",
                key_preview(key)
            );
        }
    } else {
        warn!("Authentication disabled (--no-auth). The server is open to anyone.");
    }

    if bind != "127.0.0.1" && bind != "localhost" && api_key.is_none() {
        warn!(
            "Listening on {bind} with no authentication. Any device on your network can access this server."
        );
    }

    let address = format!("{bind}:{port}");
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Listening on http://{address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// First and last four characters of `key`. Keys too short to abbreviate are masked.
fn key_preview(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() < 8 {
        return "*".repeat(chars.len().max(4));
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install terminate handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
