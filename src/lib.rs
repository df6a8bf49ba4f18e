//! Calendar, events and leave backend.
//!
//! The pure date logic lives in [`calendar`], [`availability`] and
//! [`cycles`]; [`routes`] exposes it over HTTP on top of a [`store`].

pub mod availability;
pub mod calendar;
pub mod config;
pub mod cycles;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;

use std::sync::Arc;

use axum::{routing::get, Router};
use chrono::{DateTime, NaiveDate, Utc};
use tower_http::trace::TraceLayer;

use crate::store::CalendarStore;

/// Source of "now" for handlers.
#[derive(Debug, Clone, Copy)]
pub enum Clock {
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(at) => *at,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CalendarStore>,
    pub clock: Clock,
}

impl AppState {
    pub fn new(store: Arc<dyn CalendarStore>) -> Self {
        Self {
            store,
            clock: Clock::System,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::records::routes(state.clone()))
        .merge(routes::symptoms::routes(state.clone()))
        .merge(routes::calendar::routes(state.clone()))
        .merge(routes::bleeding::routes(state.clone()))
        .merge(routes::cycle::routes(state.clone()))
        .merge(routes::cycle_stats::routes(state.clone()))
        .merge(routes::events::routes(state.clone()))
        .merge(routes::leave::routes(state))
        .route("/health", get(|| async { "✅ Backend up" }))
        .layer(TraceLayer::new_for_http())
}
