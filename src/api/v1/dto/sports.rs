/*
 * Responsibility
 * - スポーツ情報の response DTO
 * - 現状は mock データをそのまま返す薄いラッパー (実データ連携は未接続)
 */
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Uniform envelope for the sports-data endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self { data }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LiveMatch {
    pub sport: String,
    pub league: String,
    pub home_team: String,
    pub away_team: String,
    pub status: String,
    pub score: String,
    pub start_time: DateTime<Utc>,
    pub extras: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeagueTable {
    pub league: String,
    pub rows: Vec<LeagueTableRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeagueTableRow {
    pub position: u32,
    pub team: String,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub points: u32,
}
