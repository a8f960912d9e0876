//! Route definitions for the Warehouse Inventory Management Platform

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Protected routes - item catalog
        .nest("/items", item_routes())
        // Protected routes - partition units
        .nest("/partitions", partition_routes())
        // Protected routes - large item units
        .nest("/large-items", large_item_routes())
        // Protected routes - container units
        .nest("/containers", container_routes())
        // Protected routes - RFID tags
        .nest("/rfid-tags", rfid_tag_routes())
        // Protected routes - storage sections
        .nest("/storage-sections", storage_section_routes())
        // Protected routes - transaction journal
        .nest("/transactions", transaction_routes())
        // Protected routes - stock-level dashboard
        .nest("/dashboard", dashboard_routes())
        // Protected routes - vision inference
        .nest("/vision", vision_routes())
}

/// Item catalog routes (protected)
fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_items).post(handlers::create_item))
        .route(
            "/:item_id",
            get(handlers::get_item)
                .put(handlers::update_item)
                .delete(handlers::delete_item),
        )
        .route("/:item_id/stats", get(handlers::get_item_stats))
        .route("/:item_id/history", get(handlers::get_item_history))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Partition unit routes (protected)
fn partition_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_partitions).post(handlers::create_partition),
        )
        .route("/by-rfid/:tag_id", get(handlers::get_partition_by_rfid))
        .route(
            "/:partition_id",
            get(handlers::get_partition)
                .put(handlers::update_partition)
                .delete(handlers::delete_partition),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Large item unit routes (protected)
fn large_item_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_large_items).post(handlers::create_large_item),
        )
        .route("/by-rfid/:tag_id", get(handlers::get_large_item_by_rfid))
        .route(
            "/:unit_id",
            get(handlers::get_large_item)
                .put(handlers::update_large_item)
                .delete(handlers::delete_large_item),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Container unit routes (protected)
fn container_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_containers).post(handlers::create_container),
        )
        .route("/by-rfid/:tag_id", get(handlers::get_container_by_rfid))
        .route(
            "/:container_id",
            get(handlers::get_container)
                .put(handlers::update_container)
                .delete(handlers::delete_container),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// RFID tag routes (protected)
fn rfid_tag_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_rfid_tags).post(handlers::create_rfid_tag),
        )
        .route(
            "/:tag_id",
            get(handlers::get_rfid_tag).delete(handlers::delete_rfid_tag),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Storage section routes (protected)
fn storage_section_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_storage_sections).post(handlers::create_storage_section),
        )
        .route(
            "/:section_id",
            get(handlers::get_storage_section)
                .put(handlers::update_storage_section)
                .delete(handlers::delete_storage_section),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Transaction journal routes (protected)
fn transaction_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_transactions))
        .route("/recent", get(handlers::recent_transactions))
        .route("/stats", get(handlers::transaction_stats))
        .route("/:transaction_id", get(handlers::get_transaction))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Stock-level dashboard routes (protected)
fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/item-status-history",
            get(handlers::item_status_history),
        )
        .route("/items/:item_id/history", get(handlers::item_history))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Vision inference routes (protected)
fn vision_routes() -> Router<AppState> {
    Router::new()
        .route("/infer", post(handlers::infer_empty_slots))
        .route_layer(middleware::from_fn(auth_middleware))
}
