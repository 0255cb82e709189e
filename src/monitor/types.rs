//! Monitoring value objects
//!
//! Telemetry snapshots are immutable once created: they are appended to
//! history, never mutated. `InterventionRecord` is the one exception —
//! its outcome fields change via an explicit record-outcome operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ordered risk severity classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    None,
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskLevel {
    /// Levels at or above `High` synthesize an alert on ingestion.
    pub fn is_alerting(self) -> bool {
        self >= RiskLevel::High
    }
}

/// Snapshot of inferred user affect at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionalState {
    pub timestamp: DateTime<Utc>,
    pub primary_emotion: String,
    /// 0.0–1.0; accepted as-is, validation is the producer's responsibility
    pub intensity: f64,
    /// 0.0–1.0
    pub confidence: f64,
    #[serde(default)]
    pub indicators: Vec<String>,
}

/// Snapshot of derived risk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub timestamp: DateTime<Utc>,
    pub risk_level: RiskLevel,
    /// 0.0–1.0
    pub risk_score: f64,
    #[serde(default)]
    pub risk_factors: Vec<String>,
}

/// Aggregate session statistics; only the latest value is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringMetrics {
    pub timestamp: DateTime<Utc>,
    pub engagement_score: f64,
    pub session_duration_secs: u64,
    #[serde(default)]
    pub message_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionType {
    Immediate,
    Deferred,
    Scheduled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionOutcome {
    Pending,
    Successful,
    Unsuccessful,
}

/// A triggered therapeutic intervention.
///
/// `outcome`, `user_response` and `follow_up_required` are the only fields
/// ever mutated post-creation, via `MonitoringStore::record_intervention_outcome`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterventionRecord {
    pub intervention_id: String,
    pub intervention_type: InterventionType,
    pub intervention: String,
    pub triggered_at: DateTime<Utc>,
    pub outcome: InterventionOutcome,
    pub user_response: Option<String>,
    pub follow_up_required: bool,
}

impl InterventionRecord {
    pub fn new(
        intervention_id: impl Into<String>,
        intervention_type: InterventionType,
        intervention: impl Into<String>,
    ) -> Self {
        Self {
            intervention_id: intervention_id.into(),
            intervention_type,
            intervention: intervention.into(),
            triggered_at: Utc::now(),
            outcome: InterventionOutcome::Pending,
            user_response: None,
            follow_up_required: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Crisis,
    Intervention,
    Warning,
    Info,
}

/// Alert severity mirrors the risk ladder, with `Medium` used for
/// non-immediate intervention alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl From<RiskLevel> for AlertSeverity {
    fn from(level: RiskLevel) -> Self {
        match level {
            RiskLevel::None => AlertSeverity::Info,
            RiskLevel::Low => AlertSeverity::Low,
            RiskLevel::Moderate => AlertSeverity::Medium,
            RiskLevel::High => AlertSeverity::High,
            RiskLevel::Critical => AlertSeverity::Critical,
        }
    }
}

/// UI-facing notification derived from a risk assessment or intervention.
///
/// Ids are generated at creation and never reused. Dismissal removes the
/// alert from the active set entirely; acknowledgement keeps it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub acknowledged: bool,
    pub action_required: bool,
}

impl Alert {
    pub fn new(
        kind: AlertKind,
        severity: AlertSeverity,
        title: impl Into<String>,
        message: impl Into<String>,
        action_required: bool,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            severity,
            title: title.into(),
            message: message.into(),
            timestamp: Utc::now(),
            acknowledged: false,
            action_required,
        }
    }
}

/// Ascending risk-score thresholds, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    pub low: f64,
    pub moderate: f64,
    pub high: f64,
    pub critical: f64,
}

impl RiskThresholds {
    pub fn is_ascending(&self) -> bool {
        (0.0..=1.0).contains(&self.low)
            && self.low < self.moderate
            && self.moderate < self.high
            && self.high < self.critical
            && self.critical <= 1.0
    }
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            low: 0.25,
            moderate: 0.5,
            high: 0.75,
            critical: 0.9,
        }
    }
}

/// Alert delivery channel toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertChannels {
    pub audio: bool,
    pub visual: bool,
    pub push: bool,
}

impl Default for AlertChannels {
    fn default() -> Self {
        Self {
            audio: false,
            visual: true,
            push: false,
        }
    }
}

/// Independent retention limits for the three bounded histories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionLimits {
    pub emotional_states: usize,
    pub risk_assessments: usize,
    pub interventions: usize,
}

impl Default for RetentionLimits {
    fn default() -> Self {
        Self {
            emotional_states: 50,
            risk_assessments: 50,
            interventions: 20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct MonitoringSettings {
    pub thresholds: RiskThresholds,
    pub channels: AlertChannels,
    pub retention: RetentionLimits,
}

/// Session-scoping handle correlating telemetry to one user/session pair.
///
/// There is no separate "active" flag; a session is active while the store
/// holds one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoringSession {
    pub session_id: String,
    pub user_id: String,
    pub started_at: DateTime<Utc>,
}

impl MonitoringSession {
    pub fn new(session_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            user_id: user_id.into(),
            started_at: Utc::now(),
        }
    }
}

/// Inbound telemetry, decoded at the transport boundary before it reaches
/// the reducer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TelemetryEvent {
    EmotionalState(EmotionalState),
    RiskAssessment(RiskAssessment),
    Metrics(MonitoringMetrics),
    Intervention(InterventionRecord),
}
