use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;

pub mod config;

pub const FALLBACK_FACTORS: [&str; 2] = ["Data unavailable", "Using heuristic fallback"];
pub const FALLBACK_ACTION: &str = "Monitor manually";
pub const FALLBACK_PROBABILITY: f64 = 50.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::High,
        RiskLevel::Critical,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Critical => "Critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRequest {
    pub location: String,
    pub time_of_day: String,
    pub density_description: String,
}

impl PredictionRequest {
    pub fn new(
        location: impl Into<String>,
        time_of_day: impl Into<String>,
        density_description: impl Into<String>,
    ) -> Self {
        Self {
            location: location.into(),
            time_of_day: time_of_day.into(),
            density_description: density_description.into(),
        }
    }

    pub fn missing_field(&self) -> Option<&'static str> {
        if self.location.trim().is_empty() {
            return Some("location");
        }
        if self.time_of_day.trim().is_empty() {
            return Some("time of day");
        }
        if self.density_description.trim().is_empty() {
            return Some("density description");
        }
        None
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub location: String,
    pub risk_level: RiskLevel,
    pub probability: f64,
    pub factors: Vec<String>,
    pub recommended_action: String,
}

impl PredictionResult {
    pub fn fallback(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            risk_level: RiskLevel::Medium,
            probability: FALLBACK_PROBABILITY,
            factors: FALLBACK_FACTORS.iter().map(|f| f.to_string()).collect(),
            recommended_action: FALLBACK_ACTION.to_string(),
        }
    }
}

pub fn clamp_probability(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub text: String,
    pub timestamp: SystemTime,
    #[serde(default)]
    pub is_error: bool,
}

impl ChatMessage {
    pub fn user(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id, ChatRole::User, text, false)
    }

    pub fn assistant(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id, ChatRole::Assistant, text, false)
    }

    pub fn assistant_error(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id, ChatRole::Assistant, text, true)
    }

    fn new(id: impl Into<String>, role: ChatRole, text: impl Into<String>, is_error: bool) -> Self {
        Self {
            id: id.into(),
            role,
            text: text.into(),
            timestamp: SystemTime::now(),
            is_error,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum GuidelineCategory {
    General,
    Finance,
    Technical,
    Coordination,
}

impl GuidelineCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            GuidelineCategory::General => "General",
            GuidelineCategory::Finance => "Finance",
            GuidelineCategory::Technical => "Technical",
            GuidelineCategory::Coordination => "Coordination",
        }
    }
}

impl fmt::Display for GuidelineCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct GuidelinePoint {
    pub id: u32,
    pub title: &'static str,
    pub description: &'static str,
    pub category: GuidelineCategory,
}
