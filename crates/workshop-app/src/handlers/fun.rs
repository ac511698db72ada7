//! Content endpoints: jokes, fortunes, dance moves, greetings and the like.
//!
//! They exist to generate varied traffic and log lines during the workshop.

use crate::models::{
    timestamp, EnvResponse, GreetParams, JokeResponse, MessageResponse, UserStatistics,
    UserStatsResponse,
};
use crate::routes::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Timelike;
use std::sync::Arc;
use tracing::info;

const JOKES: [&str; 5] = [
    "Why do programmers prefer dark mode? Because light attracts bugs!",
    "Why do Java developers wear glasses? Because they don't C#!",
    "How many programmers does it take to change a light bulb? None, it's a hardware problem!",
    "I told my computer I needed a break, and it said 'No problem, I'll go to sleep.'",
    "Why was the developer unhappy at their job? They wanted arrays!",
];

const FORTUNES: [&str; 5] = [
    "Today is a great day to try something new! 🌟",
    "Good news will come to you by mail. 📬",
    "You will conquer coding bugs with ease today! 🐞",
    "Expect a pleasant surprise before the day's end! 🎁",
    "Avoid unnecessary risks today, stay safe! 🚦",
];

const DANCE_MOVES: [&str; 7] = [
    "Moonwalk 🌙",
    "Robot 🤖",
    "The Floss 🦷",
    "Jazz Hands ✋",
    "Salsa 💃",
    "Shimmy 🤸‍♂️",
    "Breakdance 🕺",
];

const DEFAULT_GREET_NAME: &str = "Friend";

/// Greeting for a local hour of day (0-23).
pub fn greeting_for_hour(hour: u32) -> &'static str {
    match hour {
        5..=11 => "Rise and shine ☀️ Good morning",
        12..=17 => "Hope you're having a lovely afternoon 🌻 Good afternoon",
        18..=21 => "Relax and unwind 🌙 Good evening",
        _ => "Night owl spotted! 🦉 Good night",
    }
}

/// Handler for `GET /random-joke`.
pub async fn random_joke(State(state): State<Arc<AppState>>) -> Json<JokeResponse> {
    let joke = state.faults.choose(&JOKES).copied().unwrap_or_default();

    info!("Random joke delivered");
    Json(JokeResponse {
        joke,
        timestamp: timestamp(),
    })
}

/// Handler for `GET /fortune`.
pub async fn fortune(State(state): State<Arc<AppState>>) -> Json<MessageResponse> {
    let fortune = state.faults.choose(&FORTUNES).copied().unwrap_or_default();
    let message = format!("Your fortune: {}", fortune);

    info!("Fortune given: {}", message);
    Json(MessageResponse::timestamped(message))
}

/// Handler for `GET /dance-move`.
pub async fn dance_move(State(state): State<Arc<AppState>>) -> Json<MessageResponse> {
    let dance_move = state
        .faults
        .choose(&DANCE_MOVES)
        .copied()
        .unwrap_or_default();
    let message = format!("Time to bust a move: {}! 💃🕺", dance_move);

    info!("Dance move suggested: {}", message);
    Json(MessageResponse::timestamped(message))
}

/// Handler for `GET /greet?name=`.
pub async fn greet(Query(params): Query<GreetParams>) -> Json<MessageResponse> {
    let name = params.name.as_deref().unwrap_or(DEFAULT_GREET_NAME);
    let hour = chrono::Local::now().hour();
    let message = format!("{}, {}!", greeting_for_hour(hour), name);

    info!("Greeting sent: {}", message);
    Json(MessageResponse::timestamped(message))
}

/// Handler for `GET /user-stats`.
///
/// Everything is random except `errors_logged`, which is the real failed
/// request count.
pub async fn user_stats(State(state): State<Arc<AppState>>) -> Json<UserStatsResponse> {
    let faults = &state.faults;
    let server_load = (faults.uniform(0.1, 2.5) * 100.0).round() / 100.0;

    let statistics = UserStatistics {
        users_online: faults.int_in(1..=100),
        new_signups: faults.int_in(0..=20),
        errors_logged: state.metrics.snapshot().failed_requests,
        server_load,
    };

    info!("User stats generated");
    Json(UserStatsResponse {
        statistics,
        timestamp: timestamp(),
    })
}

/// Handler for `GET /env`.
///
/// Only the whitelisted variables captured in the configuration are revealed.
pub async fn env(State(state): State<Arc<AppState>>) -> Json<EnvResponse> {
    info!("Environment variables fetched");
    Json(EnvResponse {
        environment: state.config.exposed_env.clone(),
        timestamp: timestamp(),
    })
}
