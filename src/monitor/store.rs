//! Monitoring state store
//!
//! Owns all client-visible monitoring state and reduces inbound telemetry
//! into bounded history plus derived alerts. Every operation is a
//! synchronous, atomic reducer step; the store never performs I/O and
//! never fails except where `SettingsError` is explicitly returned.

use super::types::{
    Alert, AlertChannels, AlertKind, AlertSeverity, EmotionalState, InterventionOutcome,
    InterventionRecord, InterventionType, MonitoringMetrics, MonitoringSession,
    MonitoringSettings, RetentionLimits, RiskAssessment, RiskLevel, RiskThresholds,
    TelemetryEvent,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;

/// Errors from settings updates. Telemetry ingestion never fails.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("risk thresholds must be ascending and within [0, 1]")]
    InvalidThresholds,
    #[error("retention limits must be positive")]
    InvalidRetention,
}

/// Commands the UI (or the subscription handler) dispatches to the store.
///
/// Ingestion is usually driven by [`TelemetryEvent`]s from the push
/// channel; the rest are user-facing operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum MonitorCommand {
    StartSession { session: MonitoringSession },
    StopSession,
    RecordInterventionOutcome {
        intervention_id: String,
        outcome: InterventionOutcome,
        user_response: Option<String>,
    },
    AcknowledgeAlert { id: String },
    DismissAlert { id: String },
    ClearAllAlerts,
    UpdateSettings { settings: MonitoringSettings },
    UpdateRiskThresholds { thresholds: RiskThresholds },
    UpdateAlertChannels { channels: AlertChannels },
    UpdateRetentionLimits { retention: RetentionLimits },
    ClearHistoricalData,
    SetError { message: String },
    ClearError,
}

/// The monitoring state store.
///
/// Histories are bounded FIFO buffers: appending at capacity evicts the
/// oldest entry. This is a client-side cache of recent telemetry, not the
/// system of record.
#[derive(Debug, Clone, Default)]
pub struct MonitoringStore {
    session: Option<MonitoringSession>,
    current_emotional_state: Option<EmotionalState>,
    current_risk_assessment: Option<RiskAssessment>,
    current_metrics: Option<MonitoringMetrics>,
    emotional_state_history: VecDeque<EmotionalState>,
    risk_assessment_history: VecDeque<RiskAssessment>,
    intervention_history: VecDeque<InterventionRecord>,
    alerts: Vec<Alert>,
    settings: MonitoringSettings,
    error: Option<String>,
    last_updated: Option<DateTime<Utc>>,
}

impl MonitoringStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: MonitoringSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    pub fn session(&self) -> Option<&MonitoringSession> {
        self.session.as_ref()
    }

    /// Derived from presence of a current session, not a separate field.
    pub fn is_monitoring(&self) -> bool {
        self.session.is_some()
    }

    pub fn current_emotional_state(&self) -> Option<&EmotionalState> {
        self.current_emotional_state.as_ref()
    }

    pub fn current_risk_assessment(&self) -> Option<&RiskAssessment> {
        self.current_risk_assessment.as_ref()
    }

    pub fn current_metrics(&self) -> Option<&MonitoringMetrics> {
        self.current_metrics.as_ref()
    }

    pub fn emotional_state_history(&self) -> &VecDeque<EmotionalState> {
        &self.emotional_state_history
    }

    pub fn risk_assessment_history(&self) -> &VecDeque<RiskAssessment> {
        &self.risk_assessment_history
    }

    pub fn intervention_history(&self) -> &VecDeque<InterventionRecord> {
        &self.intervention_history
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn settings(&self) -> &MonitoringSettings {
        &self.settings
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    // ------------------------------------------------------------------
    // Session lifecycle
    // ------------------------------------------------------------------

    /// Idempotent: replaces any existing session. Current-value fields are
    /// left alone; they are cleared on stop, not on start.
    pub fn start_session(&mut self, session: MonitoringSession) {
        tracing::info!(session_id = %session.session_id, user_id = %session.user_id, "monitoring session started");
        self.session = Some(session);
        self.touch();
    }

    /// Clears the session handle and current-value fields. Histories and
    /// alerts survive; `clear_historical_data` removes those explicitly.
    pub fn stop_session(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::info!(session_id = %session.session_id, "monitoring session stopped");
        }
        self.current_emotional_state = None;
        self.current_risk_assessment = None;
        self.current_metrics = None;
        self.touch();
    }

    // ------------------------------------------------------------------
    // Telemetry ingestion
    // ------------------------------------------------------------------

    /// Single dispatch point for the push-channel subscription handler.
    pub fn apply(&mut self, event: TelemetryEvent) {
        match event {
            TelemetryEvent::EmotionalState(state) => self.ingest_emotional_state(state),
            TelemetryEvent::RiskAssessment(assessment) => self.ingest_risk_assessment(assessment),
            TelemetryEvent::Metrics(metrics) => self.ingest_metrics(metrics),
            TelemetryEvent::Intervention(record) => self.add_intervention(record),
        }
    }

    /// Values are accepted as-is; out-of-range intensity is the producer's
    /// problem, not rejected here.
    pub fn ingest_emotional_state(&mut self, state: EmotionalState) {
        push_bounded(
            &mut self.emotional_state_history,
            state.clone(),
            self.settings.retention.emotional_states,
        );
        self.current_emotional_state = Some(state);
        self.touch();
    }

    /// Appends to bounded history and, for `High`/`Critical` readings,
    /// synthesizes an alert. Every qualifying ingestion produces a fresh
    /// alert; there is no suppression window.
    pub fn ingest_risk_assessment(&mut self, assessment: RiskAssessment) {
        if assessment.risk_level.is_alerting() {
            self.alerts.push(risk_alert(&assessment));
            tracing::warn!(
                risk_level = ?assessment.risk_level,
                risk_score = assessment.risk_score,
                "high-risk assessment ingested, alert raised"
            );
        }
        push_bounded(
            &mut self.risk_assessment_history,
            assessment.clone(),
            self.settings.retention.risk_assessments,
        );
        self.current_risk_assessment = Some(assessment);
        self.touch();
    }

    /// Replaces the current metrics; no history is kept.
    pub fn ingest_metrics(&mut self, metrics: MonitoringMetrics) {
        self.current_metrics = Some(metrics);
        self.touch();
    }

    /// Appends to the bounded intervention history and unconditionally
    /// synthesizes an intervention alert.
    pub fn add_intervention(&mut self, record: InterventionRecord) {
        self.alerts.push(intervention_alert(&record));
        push_bounded(
            &mut self.intervention_history,
            record,
            self.settings.retention.interventions,
        );
        self.touch();
    }

    /// Looks up the intervention by id within history. Unknown ids are a
    /// silent no-op (logged, not an error).
    pub fn record_intervention_outcome(
        &mut self,
        intervention_id: &str,
        outcome: InterventionOutcome,
        user_response: Option<String>,
    ) {
        let Some(record) = self
            .intervention_history
            .iter_mut()
            .find(|r| r.intervention_id == intervention_id)
        else {
            tracing::debug!(intervention_id, "outcome recorded for unknown intervention, ignoring");
            return;
        };
        record.outcome = outcome;
        if user_response.is_some() {
            record.user_response = user_response;
        }
        record.follow_up_required = outcome != InterventionOutcome::Successful;
        self.touch();
    }

    // ------------------------------------------------------------------
    // Alert lifecycle
    // ------------------------------------------------------------------

    /// Marks the alert acknowledged; the alert stays in the active set.
    /// No-op if the id is absent.
    pub fn acknowledge_alert(&mut self, id: &str) {
        match self.alerts.iter_mut().find(|a| a.id == id) {
            Some(alert) => {
                alert.acknowledged = true;
                self.touch();
            }
            None => tracing::debug!(alert_id = id, "acknowledge for unknown alert, ignoring"),
        }
    }

    /// Removes the alert from the active set entirely. Dismissal is
    /// permanent; the id is never reused. No-op if the id is absent.
    pub fn dismiss_alert(&mut self, id: &str) {
        let before = self.alerts.len();
        self.alerts.retain(|a| a.id != id);
        if self.alerts.len() == before {
            tracing::debug!(alert_id = id, "dismiss for unknown alert, ignoring");
        } else {
            self.touch();
        }
    }

    pub fn clear_all_alerts(&mut self) {
        self.alerts.clear();
        self.touch();
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    /// Full settings replacement. Goes through the same threshold and
    /// retention checks as the partial updates.
    pub fn update_settings(&mut self, settings: MonitoringSettings) -> Result<(), SettingsError> {
        validate_thresholds(&settings.thresholds)?;
        validate_retention(settings.retention.emotional_states)?;
        validate_retention(settings.retention.risk_assessments)?;
        validate_retention(settings.retention.interventions)?;
        self.settings = settings;
        self.touch();
        Ok(())
    }

    /// Rejects a non-ascending or out-of-range ladder. The upstream design
    /// accepted anything here; the stricter check is deliberate.
    pub fn update_risk_thresholds(
        &mut self,
        thresholds: RiskThresholds,
    ) -> Result<(), SettingsError> {
        validate_thresholds(&thresholds)?;
        self.settings.thresholds = thresholds;
        self.touch();
        Ok(())
    }

    pub fn update_alert_channels(&mut self, channels: AlertChannels) {
        self.settings.channels = channels;
        self.touch();
    }

    /// Lowered retention limits apply on the next append; an existing
    /// over-long history is not truncated by the settings change alone.
    pub fn update_retention_limits(&mut self, retention: RetentionLimits) -> Result<(), SettingsError> {
        validate_retention(retention.emotional_states)?;
        validate_retention(retention.risk_assessments)?;
        validate_retention(retention.interventions)?;
        self.settings.retention = retention;
        self.touch();
        Ok(())
    }

    /// Empties the three histories and the active alert set. Current-value
    /// fields and the session handle are untouched.
    pub fn clear_historical_data(&mut self) {
        self.emotional_state_history.clear();
        self.risk_assessment_history.clear();
        self.intervention_history.clear();
        self.alerts.clear();
        self.touch();
    }

    // ------------------------------------------------------------------
    // Transport error surface
    // ------------------------------------------------------------------

    /// Transport failures land here, decoupled from data ingestion.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Command dispatch used by the monitor pump.
    pub fn dispatch(&mut self, command: MonitorCommand) -> Result<(), SettingsError> {
        match command {
            MonitorCommand::StartSession { session } => self.start_session(session),
            MonitorCommand::StopSession => self.stop_session(),
            MonitorCommand::RecordInterventionOutcome {
                intervention_id,
                outcome,
                user_response,
            } => self.record_intervention_outcome(&intervention_id, outcome, user_response),
            MonitorCommand::AcknowledgeAlert { id } => self.acknowledge_alert(&id),
            MonitorCommand::DismissAlert { id } => self.dismiss_alert(&id),
            MonitorCommand::ClearAllAlerts => self.clear_all_alerts(),
            MonitorCommand::UpdateSettings { settings } => {
                self.update_settings(settings)?;
            }
            MonitorCommand::UpdateRiskThresholds { thresholds } => {
                self.update_risk_thresholds(thresholds)?;
            }
            MonitorCommand::UpdateAlertChannels { channels } => {
                self.update_alert_channels(channels);
            }
            MonitorCommand::UpdateRetentionLimits { retention } => {
                self.update_retention_limits(retention)?;
            }
            MonitorCommand::ClearHistoricalData => self.clear_historical_data(),
            MonitorCommand::SetError { message } => self.set_error(message),
            MonitorCommand::ClearError => self.clear_error(),
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.last_updated = Some(Utc::now());
    }
}

/// FIFO append: evicts the oldest entry once the limit is reached.
fn push_bounded<T>(history: &mut VecDeque<T>, item: T, limit: usize) {
    while history.len() >= limit.max(1) {
        history.pop_front();
    }
    history.push_back(item);
}

fn validate_thresholds(thresholds: &RiskThresholds) -> Result<(), SettingsError> {
    if thresholds.is_ascending() {
        Ok(())
    } else {
        Err(SettingsError::InvalidThresholds)
    }
}

fn validate_retention(limit: usize) -> Result<(), SettingsError> {
    if limit > 0 {
        Ok(())
    } else {
        Err(SettingsError::InvalidRetention)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn risk_alert(assessment: &RiskAssessment) -> Alert {
    let critical = assessment.risk_level == RiskLevel::Critical;
    let percent = (assessment.risk_score * 100.0).round() as u32;
    Alert::new(
        if critical {
            AlertKind::Crisis
        } else {
            AlertKind::Warning
        },
        AlertSeverity::from(assessment.risk_level),
        if critical {
            "Critical risk detected"
        } else {
            "Elevated risk detected"
        },
        format!(
            "Risk score {percent}% with {} contributing factor(s)",
            assessment.risk_factors.len()
        ),
        critical,
    )
}

fn intervention_alert(record: &InterventionRecord) -> Alert {
    let severity = if record.intervention_type == InterventionType::Immediate {
        AlertSeverity::High
    } else {
        AlertSeverity::Medium
    };
    Alert::new(
        AlertKind::Intervention,
        severity,
        "Intervention triggered",
        record.intervention.clone(),
        record.follow_up_required,
    )
}
