use crate::core::{Completion, DeckError, TransitionId};
use crate::models::{
    ActionResponse, Coordinates, CreateDeckRequest, CreateDeckResponse, Direction, ErrorResponse,
    HealthResponse, OffsetRequest, ReloadDeckRequest, SavedListResponse, SwipeRequest,
};
use crate::services::{
    CacheManager, CandidateFeed, DeckSession, RefreshError, SavedListStore, SessionRegistry,
    SharedSession, StoreProjection,
};
use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionRegistry,
    pub feed: Arc<dyn CandidateFeed>,
    pub saved: Arc<dyn SavedListStore>,
    pub cache: Arc<CacheManager>,
}

/// Configure all deck routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/decks", web::post().to(create_deck))
        .route("/decks/{id}", web::get().to(get_deck))
        .route("/decks/{id}", web::delete().to(close_deck))
        .route("/decks/{id}/reload", web::post().to(reload_deck))
        .route("/decks/{id}/touch/start", web::post().to(touch_start))
        .route("/decks/{id}/touch/move", web::post().to(touch_move))
        .route("/decks/{id}/touch/end", web::post().to(touch_end))
        .route("/decks/{id}/discard", web::post().to(discard))
        .route("/decks/{id}/select", web::post().to(select))
        .route("/decks/{id}/swipe", web::post().to(swipe))
        .route("/decks/{id}/undo", web::post().to(undo))
        .route(
            "/decks/{id}/transitions/{transition_id}/complete",
            web::post().to(complete_transition),
        )
        .route("/saved", web::get().to(get_saved));
}

fn error_response(status: u16, error: &str, message: String) -> HttpResponse {
    let body = ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status,
    };
    match status {
        400 => HttpResponse::BadRequest().json(body),
        404 => HttpResponse::NotFound().json(body),
        409 => HttpResponse::Conflict().json(body),
        _ => HttpResponse::InternalServerError().json(body),
    }
}

/// Invariant violations are already logged by the engine; the action is dropped
fn deck_error_response(e: DeckError) -> HttpResponse {
    error_response(409, "deck_state", e.to_string())
}

async fn find_session(state: &AppState, id: &str) -> Result<SharedSession, HttpResponse> {
    state.sessions.get(id).await.ok_or_else(|| {
        error_response(404, "session_not_found", format!("No deck session {}", id))
    })
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let saved_healthy = match state.saved.health_check().await {
        Ok(healthy) => healthy,
        Err(e) => {
            tracing::warn!("Saved-list store health check failed: {}", e);
            false
        }
    };

    let status = if saved_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        sessions: state.sessions.len(),
        saved_store: saved_healthy,
        cache: state.cache.stats(),
        timestamp: chrono::Utc::now(),
    })
}

/// Load candidates for the session's location; feed failures leave an empty deck
async fn refresh(
    session: &mut DeckSession,
    feed: &dyn CandidateFeed,
    location: Coordinates,
) -> Result<Option<String>, HttpResponse> {
    match session.refresh_with(feed, location).await {
        Ok(count) => {
            tracing::info!("Session {} loaded {} candidates", session.id, count);
            Ok(None)
        }
        Err(RefreshError::Feed(e)) => Ok(Some(format!("{}: {}", e.kind(), e))),
        Err(RefreshError::Deck(e)) => Err(deck_error_response(e)),
    }
}

/// Open a deck
///
/// POST /api/v1/decks
///
/// Request body:
/// ```json
/// { "userId": "string", "latitude": 1.35, "longitude": 103.82 }
/// ```
async fn create_deck(state: web::Data<AppState>, req: web::Json<CreateDeckRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(400, "validation_failed", errors.to_string());
    }

    let projection = Arc::new(StoreProjection::spawn(req.user_id.clone(), state.saved.clone()));
    let (session_id, session) = match state.sessions.create(&req.user_id, projection).await {
        Ok(created) => created,
        Err(e) => {
            tracing::error!("Failed to create deck for {}: {}", req.user_id, e);
            return error_response(500, "deck_create_failed", e.to_string());
        }
    };

    let mut session = session.lock().await;
    let feed_error = match refresh(&mut session, state.feed.as_ref(), req.location()).await {
        Ok(feed_error) => feed_error,
        Err(resp) => return resp,
    };

    HttpResponse::Ok().json(CreateDeckResponse {
        session_id,
        deck: session.engine.snapshot(),
        feed_error,
    })
}

async fn get_deck(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let session = match find_session(&state, &path).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let session = session.lock().await;
    HttpResponse::Ok().json(session.engine.snapshot())
}

async fn close_deck(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    if state.sessions.close(&path).await {
        HttpResponse::NoContent().finish()
    } else {
        error_response(404, "session_not_found", format!("No deck session {}", path))
    }
}

/// Refill a deck from a new location fix
///
/// POST /api/v1/decks/{id}/reload
async fn reload_deck(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<ReloadDeckRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(400, "validation_failed", errors.to_string());
    }
    let session = match find_session(&state, &path).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    let mut session = session.lock().await;
    let feed_error = match refresh(&mut session, state.feed.as_ref(), req.location()).await {
        Ok(feed_error) => feed_error,
        Err(resp) => return resp,
    };

    HttpResponse::Ok().json(CreateDeckResponse {
        session_id: session.id.clone(),
        deck: session.engine.snapshot(),
        feed_error,
    })
}

async fn touch_start(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let session = match find_session(&state, &path).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let mut session = session.lock().await;

    let accepted = session.engine.touch_start();
    HttpResponse::Ok().json(ActionResponse::new(accepted, session.engine.snapshot()))
}

async fn touch_move(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<OffsetRequest>,
) -> impl Responder {
    if !req.is_finite() {
        return error_response(400, "invalid_offset", "dx and dy must be finite".to_string());
    }
    let session = match find_session(&state, &path).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let mut session = session.lock().await;

    let transform = session.engine.touch_move(req.into_inner().into());
    let mut response = ActionResponse::new(transform.is_some(), session.engine.snapshot());
    response.transform = transform;
    HttpResponse::Ok().json(response)
}

async fn touch_end(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<OffsetRequest>,
) -> impl Responder {
    if !req.is_finite() {
        return error_response(400, "invalid_offset", "dx and dy must be finite".to_string());
    }
    let session = match find_session(&state, &path).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let mut session = session.lock().await;

    let animation = session.engine.touch_end(req.into_inner().into());
    animation_response(&session, animation)
}

async fn discard(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    request_swipe(&state, &path, Direction::Left).await
}

async fn select(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    request_swipe(&state, &path, Direction::Right).await
}

async fn swipe(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<SwipeRequest>,
) -> impl Responder {
    request_swipe(&state, &path, req.direction).await
}

async fn request_swipe(state: &AppState, id: &str, direction: Direction) -> HttpResponse {
    let session = match find_session(state, id).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let mut session = session.lock().await;

    let animation = session.engine.request_swipe(direction);
    animation_response(&session, animation)
}

fn animation_response(session: &DeckSession, animation: Option<crate::core::AnimationRequest>) -> HttpResponse {
    let mut response = ActionResponse::new(animation.is_some(), session.engine.snapshot());
    response.animation = animation;
    HttpResponse::Ok().json(response)
}

async fn undo(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let session = match find_session(&state, &path).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let mut session = session.lock().await;

    match session.engine.request_undo() {
        Ok(accepted) => HttpResponse::Ok().json(ActionResponse::new(accepted, session.engine.snapshot())),
        Err(e) => deck_error_response(e),
    }
}

/// Animation completion signal
///
/// POST /api/v1/decks/{id}/transitions/{transition_id}/complete
///
/// The only request that can move a card off the deck.
async fn complete_transition(
    state: web::Data<AppState>,
    path: web::Path<(String, u64)>,
) -> impl Responder {
    let (id, transition_id) = path.into_inner();
    let session = match find_session(&state, &id).await {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let mut session = session.lock().await;

    match session.engine.complete_transition(TransitionId(transition_id)) {
        Ok(Completion::Committed(record)) => {
            let mut response = ActionResponse::new(true, session.engine.snapshot());
            response.committed = Some(record);
            HttpResponse::Ok().json(response)
        }
        Ok(Completion::Settled) => HttpResponse::Ok().json(ActionResponse::new(true, session.engine.snapshot())),
        Ok(Completion::Ignored) => HttpResponse::Ok().json(ActionResponse::new(false, session.engine.snapshot())),
        Err(e) => deck_error_response(e),
    }
}

/// Saved places for a user
///
/// GET /api/v1/saved?userId={userId}
async fn get_saved(
    state: web::Data<AppState>,
    query: web::Query<std::collections::HashMap<String, String>>,
) -> impl Responder {
    let user_id = match query.get("userId") {
        Some(id) if !id.is_empty() => id,
        _ => {
            return error_response(400, "missing_user_id", "userId query parameter is required".to_string());
        }
    };

    match state.saved.list(user_id).await {
        Ok(places) => HttpResponse::Ok().json(SavedListResponse {
            user_id: user_id.clone(),
            count: places.len(),
            places,
        }),
        Err(e) => {
            tracing::error!("Failed to fetch saved list for {}: {}", user_id, e);
            error_response(500, "saved_list_failed", e.to_string())
        }
    }
}
