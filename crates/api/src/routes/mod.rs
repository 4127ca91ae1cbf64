pub mod auth;
pub mod committees;
pub mod health;
pub mod hotels;
pub mod media;
pub mod quotes;
pub mod schedules;
pub mod schools;
pub mod secretariates;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/login                       login (public, rate limited)
/// /auth/me                          token identity (admin)
///
/// /committees                       list (public), create (admin)
/// /committees/positions             bulk reorder (admin)
/// /committees/{id}                  get (public), update, delete (admin)
///
/// /secretariates                    list (public), create (admin)
/// /secretariates/positions          bulk reorder (admin)
/// /secretariates/{id}               get (public), update, delete (admin)
///
/// /hotels, /hotels/{id}             read public, write admin
/// /quotes, /quotes/{id}             read public, write admin
/// /schedules, /schedules/{id}       read public, write admin
///
/// /schools                          register (public, rate limited), list (admin)
/// /schools/{id}                     get, update, delete (admin)
///
/// /media                            list bucket objects (admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/committees", committees::router())
        .nest("/secretariates", secretariates::router())
        .nest("/hotels", hotels::router())
        .nest("/quotes", quotes::router())
        .nest("/schedules", schedules::router())
        .nest("/schools", schools::router())
        .nest("/media", media::router())
}
