//! Console routes for interactive users (session + tenant chain).

use actix_web::{get, HttpResponse, Responder};
use serde_json::json;

use auth_gateway_core::http::security::AuthenticatedUser;

#[get("/console/groups")]
pub async fn groups(user: AuthenticatedUser) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "success": true,
        "data": {
            "requestedBy": user.get_username(),
            "tenant": user.get_tenant(),
            "groups": ["demo_group"]
        }
    }))
}
