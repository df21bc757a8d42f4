//! `GET /`: the signed-in landing view.

use axum::Json;
use serde::Serialize;
use stockroom_core::user::Actor;

use crate::auth::Authenticated;

#[derive(Debug, Serialize)]
pub struct Home {
  pub display_name: String,
  pub is_admin:     bool,
  pub actor:        Actor,
}

/// `GET /`
pub async fn handler(auth: Authenticated) -> Json<Home> {
  let actor = auth.actor;
  Json(Home {
    display_name: actor.full_name.clone().unwrap_or_else(|| actor.email.clone()),
    is_admin: actor.is_admin(),
    actor,
  })
}
