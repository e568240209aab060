/*
 * Responsibility
 * - /volleyball 系の GET handler
 * - mock データを返すだけ (実データ連携に差し替えるまでの placeholder)
 */
use axum::Json;
use chrono::Utc;
use serde_json::json;

use crate::api::v1::dto::sports::{ApiResponse, LeagueTable, LeagueTableRow, LiveMatch};

pub async fn live_matches() -> Json<ApiResponse<Vec<LiveMatch>>> {
    let mut extras = serde_json::Map::new();
    extras.insert(
        "notes".to_string(),
        json!("sample data - replace with a real feed"),
    );

    let m = LiveMatch {
        sport: "Volleyball".to_string(),
        league: "Superliga".to_string(),
        home_team: "Time A".to_string(),
        away_team: "Time B".to_string(),
        status: "LIVE".to_string(),
        score: "1-0".to_string(),
        start_time: Utc::now(),
        extras,
    };

    Json(ApiResponse::ok(vec![m]))
}

pub async fn leagues() -> Json<ApiResponse<Vec<LeagueTable>>> {
    let table = LeagueTable {
        league: "Superliga".to_string(),
        rows: vec![
            LeagueTableRow {
                position: 1,
                team: "Time A".to_string(),
                played: 10,
                wins: 7,
                draws: 2,
                losses: 1,
                points: 23,
            },
            LeagueTableRow {
                position: 2,
                team: "Time B".to_string(),
                played: 10,
                wins: 7,
                draws: 1,
                losses: 2,
                points: 22,
            },
        ],
    };

    Json(ApiResponse::ok(vec![table]))
}

pub async fn top_stats() -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::ok(json!({
        "leaders": [
            { "name": "Atleta 1", "metric": "valor" },
            { "name": "Atleta 2", "metric": "valor" },
        ]
    })))
}

pub async fn extras() -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::ok(json!({
        "example": "volleyball-specific extra content"
    })))
}
