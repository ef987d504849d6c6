//! Slash-command endpoints.

use actix_web::{HttpResponse, post, web};
use tracing::{debug, warn};

use super::render;
use crate::metrics::record_rejection;
use crate::model::{AppState, CommandForm, CommandKind, Rejection};

/// Owner filter that stands for the caller
const SELF_FILTER: &str = "me";

fn reject(kind: CommandKind, rejection: Rejection) -> HttpResponse {
    warn!(command = %kind, reason = rejection.reason(), "Rejected slash command");
    record_rejection(kind.key(), rejection.reason());
    match rejection {
        Rejection::Token => HttpResponse::Unauthorized().finish(),
        Rejection::Command => HttpResponse::BadRequest().finish(),
    }
}

fn verify(data: &AppState, kind: CommandKind, form: &CommandForm) -> Result<(), HttpResponse> {
    data.command(kind)
        .verify(form)
        .map_err(|rejection| reject(kind, rejection))
}

#[post("/lock")]
pub async fn lock(data: web::Data<AppState>, form: web::Form<CommandForm>) -> HttpResponse {
    if let Err(response) = verify(&data, CommandKind::Lock, &form) {
        return response;
    }
    debug!(lock_name = %form.text, user = %form.user_name, "Lock requested");

    match data.engine.acquire(&form.text, &form.user_name).await {
        Ok(outcome) => render::acquire(&outcome),
        Err(e) => render::lock_error(&e),
    }
}

#[post("/unlock")]
pub async fn unlock(data: web::Data<AppState>, form: web::Form<CommandForm>) -> HttpResponse {
    if let Err(response) = verify(&data, CommandKind::Unlock, &form) {
        return response;
    }
    debug!(lock_name = %form.text, user = %form.user_name, "Unlock requested");

    match data.engine.release(&form.text, &form.user_name).await {
        Ok(outcome) => render::release(&outcome),
        Err(e) => render::lock_error(&e),
    }
}

#[post("/viewlock")]
pub async fn view_lock(data: web::Data<AppState>, form: web::Form<CommandForm>) -> HttpResponse {
    if let Err(response) = verify(&data, CommandKind::View, &form) {
        return response;
    }

    match data.engine.inspect(&form.text).await {
        Ok(outcome) => render::inspect(&outcome),
        Err(e) => render::lock_error(&e),
    }
}

#[post("/listlocks")]
pub async fn list_locks(data: web::Data<AppState>, form: web::Form<CommandForm>) -> HttpResponse {
    if let Err(response) = verify(&data, CommandKind::List, &form) {
        return response;
    }

    let filter = if form.text.trim().eq_ignore_ascii_case(SELF_FILTER) {
        form.user_name.as_str()
    } else {
        form.text.trim()
    };

    match data.engine.enumerate(filter).await {
        Ok(result) => render::enumerate(&result),
        Err(e) => render::lock_error(&e),
    }
}
