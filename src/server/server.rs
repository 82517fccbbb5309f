use anyhow::{Context, Result};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use rand::distr::{Alphanumeric, SampleString};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::services::ServeDir;
use tracing::{debug, error, info};

#[cfg(feature = "slowdown")]
use super::slowdown_request;
use super::{log_requests, metrics, session::Session, state::*, ServerConfig};
use crate::config::WrapSettings;
use crate::store::{User, UserStore, WrapStore};
use crate::wrapped::{
    build_snapshot, card_filename, duo, game, render_card, slides, DuoError, DuoSlides, Slide,
    TimeRange, WrapSnapshot,
};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

fn epoch_secs(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Failure of a route handler.
#[derive(Debug)]
enum ApiError {
    NotFound,
    Duo(DuoError),
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl From<DuoError> for ApiError {
    fn from(err: DuoError) -> Self {
        ApiError::Duo(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
            ApiError::Duo(err) => {
                let status = match err {
                    DuoError::InviteeNotFound => StatusCode::NOT_FOUND,
                    _ => StatusCode::CONFLICT,
                };
                (status, Json(json!({ "error": err.to_string() }))).into_response()
            }
            ApiError::Internal(err) => {
                error!("Request failed: {:#}", err);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Deserialize, Debug)]
struct CreateWrapBody {
    #[serde(default)]
    pub time_range: TimeRange,
    pub access_token: String,
}

#[derive(Serialize)]
struct CreatedWrapResponse {
    pub id: usize,
    pub slides: Vec<Slide>,
}

#[derive(Serialize)]
struct WrapSummaryResponse {
    pub id: usize,
    pub time_range: TimeRange,
    pub created: u64,
}

#[derive(Serialize)]
struct WrapResponse {
    pub id: usize,
    pub snapshot: WrapSnapshot,
    pub slides: Vec<Slide>,
}

#[derive(Deserialize, Debug)]
struct GuessBody {
    pub user_guess: String,
    pub answer: String,
}

#[derive(Serialize)]
struct GuessResponse {
    pub correct: bool,
}

#[derive(Deserialize, Debug)]
struct InviteBody {
    /// Handle of the invited user.
    pub invitee: String,
}

#[derive(Serialize)]
struct InvitationCreatedResponse {
    pub id: usize,
}

#[derive(Serialize)]
struct PendingInvitationResponse {
    pub id: usize,
    pub inviter: String,
    pub created: u64,
}

#[derive(Serialize)]
struct AuthorizeUrlResponse {
    pub url: String,
    pub state: String,
}

#[derive(Serialize)]
struct ProfileResponse {
    pub id: usize,
    pub handle: String,
    pub first_name: String,
    pub created: u64,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        ProfileResponse {
            id: user.id,
            handle: user.handle,
            first_name: user.first_name,
            created: epoch_secs(user.created),
        }
    }
}

/// Slides are recomposed on every read, only the game slide differs
/// between two compositions of the same snapshot.
fn compose_slides(first_name: &str, snapshot: &WrapSnapshot) -> Vec<Slide> {
    slides::compose(first_name, snapshot, &mut rand::rng())
}

fn get_session_user(store: &GuardedStore, session: &Session) -> ApiResult<User> {
    // The token outlived its user only if the account was deleted meanwhile.
    store.get_user(session.user_id)?.ok_or(ApiError::NotFound)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
    };
    Json(stats)
}

async fn get_authorize_url(
    _session: Session,
    State(catalog_client): State<GuardedCatalogClient>,
) -> ApiResult<Json<AuthorizeUrlResponse>> {
    let state = Alphanumeric.sample_string(&mut rand::rng(), 16);
    let url = catalog_client
        .authorize_url(&state)
        .ok_or(ApiError::NotFound)?;
    Ok(Json(AuthorizeUrlResponse { url, state }))
}

async fn post_wrap(
    session: Session,
    State(state): State<ServerState>,
    Json(body): Json<CreateWrapBody>,
) -> ApiResult<Json<CreatedWrapResponse>> {
    let user = get_session_user(&state.store, &session)?;
    let settings = &state.wrap_settings;
    let fetch_limit = settings.fetch_limit();
    let catalog = &state.catalog_client;

    let (tracks, artists, recently_played) = tokio::join!(
        catalog.fetch_top_tracks(&body.access_token, body.time_range, fetch_limit),
        catalog.fetch_top_artists(&body.access_token, body.time_range, fetch_limit),
        catalog.fetch_recently_played(&body.access_token, settings.recently_played_limit),
    );
    debug!(
        "Building wrap for user {} from {} tracks, {} artists, {} plays",
        user.id,
        tracks.len(),
        artists.len(),
        recently_played.len()
    );

    let snapshot = build_snapshot(
        user.id,
        body.time_range,
        tracks,
        artists,
        &recently_played,
        &settings.snapshot_settings(),
        chrono::Utc::now(),
    );
    let id = state.store.save_wrap(user.id, &snapshot)?;
    metrics::record_wrap_generated(body.time_range.as_str());
    info!("Saved wrap {} for user {}", id, user.id);

    Ok(Json(CreatedWrapResponse {
        id,
        slides: compose_slides(&user.first_name, &snapshot),
    }))
}

async fn get_wraps(
    session: Session,
    State(store): State<GuardedStore>,
) -> ApiResult<Json<Vec<WrapSummaryResponse>>> {
    let wraps = store
        .list_wraps(session.user_id)?
        .into_iter()
        .map(|wrap| WrapSummaryResponse {
            id: wrap.id,
            time_range: wrap.time_range,
            created: epoch_secs(wrap.created),
        })
        .collect();
    Ok(Json(wraps))
}

async fn get_wrap(
    session: Session,
    State(store): State<GuardedStore>,
    Path(id): Path<usize>,
) -> ApiResult<Json<WrapResponse>> {
    let user = get_session_user(&store, &session)?;
    let wrap = store.get_wrap(user.id, id)?.ok_or(ApiError::NotFound)?;
    let slides = compose_slides(&user.first_name, &wrap.snapshot);
    Ok(Json(WrapResponse {
        id: wrap.id,
        snapshot: wrap.snapshot,
        slides,
    }))
}

async fn delete_wrap(
    session: Session,
    State(store): State<GuardedStore>,
    Path(id): Path<usize>,
) -> ApiResult<StatusCode> {
    if store.delete_wrap(session.user_id, id)? {
        Ok(StatusCode::OK)
    } else {
        Err(ApiError::NotFound)
    }
}

async fn get_wrap_card(
    session: Session,
    State(store): State<GuardedStore>,
    Path(id): Path<usize>,
) -> ApiResult<Response> {
    let user = get_session_user(&store, &session)?;
    let wrap = store.get_wrap(user.id, id)?.ok_or(ApiError::NotFound)?;
    let png = render_card(&wrap.snapshot, &user.handle)
        .with_context(|| format!("Failed to render card for wrap {}", id))?;

    Ok((
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", card_filename(wrap.id)),
            ),
        ],
        png,
    )
        .into_response())
}

async fn post_game_guess(_session: Session, Json(body): Json<GuessBody>) -> Json<GuessResponse> {
    let correct = game::validate_guess(&body.user_guess, &body.answer);
    metrics::record_game_guess(correct);
    Json(GuessResponse { correct })
}

async fn post_duo_invitation(
    session: Session,
    State(store): State<GuardedStore>,
    Json(body): Json<InviteBody>,
) -> ApiResult<(StatusCode, Json<InvitationCreatedResponse>)> {
    let invitee_id = store.get_user_id(&body.invitee)?;
    let has_pending = match invitee_id {
        Some(invitee_id) => store.has_pending_invitation(session.user_id, invitee_id)?,
        None => false,
    };
    let invitee_id =
        duo::check_invitation(session.user_id, &body.invitee, invitee_id, has_pending)?;

    let id = store.create_invitation(session.user_id, invitee_id)?;
    metrics::record_duo_invitation("sent");
    info!(
        "User {} invited user {} to Duo Wrapped ({})",
        session.user_id, invitee_id, id
    );
    Ok((StatusCode::CREATED, Json(InvitationCreatedResponse { id })))
}

async fn get_duo_invitations(
    session: Session,
    State(store): State<GuardedStore>,
) -> ApiResult<Json<Vec<PendingInvitationResponse>>> {
    let invitations = store.list_pending_invitations(session.user_id)?;
    let mut pending = Vec::with_capacity(invitations.len());
    for invitation in invitations {
        // Inviters deleted meanwhile take their invitations with them.
        if let Some(inviter) = store.get_user(invitation.inviter_id)? {
            pending.push(PendingInvitationResponse {
                id: invitation.id,
                inviter: inviter.handle,
                created: epoch_secs(invitation.created),
            });
        }
    }
    Ok(Json(pending))
}

async fn accept_duo_invitation(
    session: Session,
    State(store): State<GuardedStore>,
    Path(id): Path<usize>,
) -> ApiResult<StatusCode> {
    let invitation = store
        .get_invitation(id)?
        .filter(|invitation| invitation.invitee_id == session.user_id)
        .ok_or(ApiError::NotFound)?;

    let latest_wrap = store
        .get_latest_wrap(session.user_id)?
        .map(|wrap| wrap.snapshot);
    let shared_wrap = duo::check_acceptance(&invitation, latest_wrap)?;

    if !store.accept_invitation(id, &shared_wrap)? {
        return Err(DuoError::AlreadyAccepted.into());
    }
    metrics::record_duo_invitation("accepted");
    Ok(StatusCode::OK)
}

async fn get_duo(
    session: Session,
    State(store): State<GuardedStore>,
    Path(id): Path<usize>,
) -> ApiResult<Json<DuoSlides>> {
    let invitation = store
        .get_invitation(id)?
        .filter(|invitation| {
            invitation.inviter_id == session.user_id || invitation.invitee_id == session.user_id
        })
        .ok_or(ApiError::NotFound)?;

    let inviter = store
        .get_user(invitation.inviter_id)?
        .ok_or(ApiError::NotFound)?;
    let invitee = store
        .get_user(invitation.invitee_id)?
        .ok_or(ApiError::NotFound)?;
    let inviter_wrap = store
        .get_latest_wrap(inviter.id)?
        .map(|wrap| wrap.snapshot);

    let duo_slides = duo::compose_duo(
        &invitation,
        &inviter.first_name,
        inviter_wrap.as_ref(),
        &invitee.first_name,
        &mut rand::rng(),
    )?;
    Ok(Json(duo_slides))
}

async fn get_profile(
    session: Session,
    State(store): State<GuardedStore>,
) -> ApiResult<Json<ProfileResponse>> {
    let user = get_session_user(&store, &session)?;
    Ok(Json(user.into()))
}

async fn delete_account(
    session: Session,
    State(store): State<GuardedStore>,
) -> ApiResult<StatusCode> {
    if store.delete_user(session.user_id)? {
        info!("Deleted account of user {}", session.user_id);
        Ok(StatusCode::OK)
    } else {
        Err(ApiError::NotFound)
    }
}

pub fn make_app(
    config: ServerConfig,
    store: GuardedStore,
    catalog_client: GuardedCatalogClient,
    wrap_settings: WrapSettings,
) -> Router {
    let state = ServerState {
        config: config.clone(),
        start_time: Instant::now(),
        store,
        catalog_client,
        wrap_settings,
        hash: env!("GIT_HASH").to_string(),
    };

    let catalog_routes: Router = Router::new()
        .route("/authorize-url", get(get_authorize_url))
        .with_state(state.clone());

    let wrap_routes: Router = Router::new()
        .route("/", get(get_wraps).post(post_wrap))
        .route("/{id}", get(get_wrap).delete(delete_wrap))
        .route("/{id}/card.png", get(get_wrap_card))
        .with_state(state.clone());

    let game_routes: Router = Router::new()
        .route("/guess", post(post_game_guess))
        .with_state(state.clone());

    let duo_routes: Router = Router::new()
        .route(
            "/invitations",
            get(get_duo_invitations).post(post_duo_invitation),
        )
        .route("/invitations/{id}/accept", post(accept_duo_invitation))
        .route("/{id}", get(get_duo))
        .with_state(state.clone());

    let user_routes: Router = Router::new()
        .route("/profile", get(get_profile))
        .route("/", axum::routing::delete(delete_account))
        .with_state(state.clone());

    let home_router: Router = match config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    let mut app: Router = home_router
        .nest("/v1/catalog", catalog_routes)
        .nest("/v1/wraps", wrap_routes)
        .nest("/v1/game", game_routes)
        .nest("/v1/duo", duo_routes)
        .nest("/v1/user", user_routes);

    #[cfg(feature = "slowdown")]
    {
        app = app.layer(middleware::from_fn(slowdown_request));
    }
    app = app.layer(middleware::from_fn_with_state(state, log_requests));

    app
}

pub async fn run_server(
    config: ServerConfig,
    store: GuardedStore,
    catalog_client: GuardedCatalogClient,
    wrap_settings: WrapSettings,
    metrics_port: u16,
) -> Result<()> {
    let port = config.port;
    let app = make_app(config, store, catalog_client, wrap_settings);
    let metrics_app = Router::new().route("/metrics", get(metrics::metrics_handler));

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    let metrics_listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", metrics_port))
        .await
        .with_context(|| format!("Failed to bind metrics port {}", metrics_port))?;

    info!("Ready to serve at port {}!", port);
    info!("Metrics available at port {}!", metrics_port);
    tokio::try_join!(
        async { axum::serve(listener, app).await },
        async { axum::serve(metrics_listener, metrics_app).await },
    )?;
    Ok(())
}
