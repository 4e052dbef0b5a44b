use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::handlers::{admin, bookings, schedules};
use crate::middleware::rate_limit::create_public_governor;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // IP-based governor for the unauthenticated search routes
    let public_governor = create_public_governor();

    // Public availability routes (search, nearest-date, reference data)
    let public_routes = Router::new()
        .route("/schedules", get(schedules::search_schedules))
        .route("/schedules/search-nearest", post(schedules::search_nearest))
        .route("/routes", get(schedules::list_routes))
        .layer(public_governor);

    // Booking lifecycle routes
    let booking_routes = Router::new()
        .route("/", post(bookings::create_booking))
        .route("/", get(bookings::list_bookings))
        .route("/{id}", get(bookings::get_booking))
        .route("/{id}/status", post(bookings::update_status))
        .route("/{id}/reschedule", post(bookings::reschedule));

    // Reference-data administration
    let admin_routes = Router::new()
        // Route management
        .route("/routes", get(admin::list_routes))
        .route("/routes", post(admin::create_route))
        .route("/routes/{id}", put(admin::update_route))
        .route("/routes/{id}", delete(admin::delete_route))
        // Ferry management
        .route("/ferries", get(admin::list_ferries))
        .route("/ferries", post(admin::create_ferry))
        .route("/ferries/{id}", put(admin::update_ferry))
        .route("/ferries/{id}", delete(admin::delete_ferry))
        // Schedule management
        .route("/schedules", get(admin::list_schedules))
        .route("/schedules", post(admin::create_schedule))
        .route("/schedules/{id}", put(admin::update_schedule))
        .route("/schedules/{id}", delete(admin::delete_schedule))
        // Sailing date administration
        .route("/schedules/{id}/dates", post(admin::create_sailing_dates))
        .route("/schedules/{id}/dates", get(admin::list_sailing_dates))
        .route("/schedule-dates/{id}", patch(admin::update_sailing_date))
        .route("/schedule-dates/{id}", delete(admin::delete_sailing_date));

    // Combine all routes
    Router::new()
        .nest("/api", public_routes)
        .nest("/api/bookings", booking_routes)
        .nest("/api/admin", admin_routes)
        .with_state(state)
}
