//! Learning System
//!
//! Pattern recognition over execution feedback, built on the graph mirror
//! port. Successful executions produce feedback events; each event becomes
//! a Learning node, is scored for impact, and is folded into an aggregated
//! Pattern node. Patterns with a high running success rate feed back into
//! recommendations. Everything here is best-effort from the orchestrator's
//! point of view and eventually consistent with the primary store.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::models::graph::{LearningNode, PatternNode};
use crate::models::report::{AgentLearning, LearningReport, Recommendation};
use crate::services::agents::AgentKind;
use crate::services::graph::GraphMirror;
use crate::utils::error::AppResult;

/// Default confidence attached to recorded feedback
const DEFAULT_CONFIDENCE: f64 = 0.8;

/// Initial success rate for a newly observed pattern
const INITIAL_SUCCESS_RATE: f64 = 0.5;

/// Minimum success rate for a pattern to be recommended
const RECOMMENDATION_THRESHOLD: f64 = 0.7;

/// Kind of feedback derived from an execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    QualityImprovement,
    ErrorResolution,
    Optimization,
    UserFeedback,
    Performance,
}

impl FeedbackKind {
    /// The pattern type this feedback aggregates into
    pub fn pattern_type(&self) -> &'static str {
        match self {
            Self::QualityImprovement => "quality_pattern",
            Self::ErrorResolution => "error_pattern",
            Self::Optimization => "optimization_pattern",
            Self::UserFeedback => "user_preference_pattern",
            Self::Performance => "performance_pattern",
        }
    }
}

/// Metrics extracted from one execution's outcome
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedbackData {
    /// Category of the task the execution was for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_category: Option<String>,
    /// Agent that produced the output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    /// Quality improvement over baseline, in [-0.5, 0.5]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_delta: Option<f64>,
    /// Performance improvement over baseline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_delta: Option<f64>,
    /// User rating on a 0-5 scale
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_rating: Option<f64>,
    /// Reduction in error rate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_reduction: Option<f64>,
}

impl FeedbackData {
    /// Impact score in [0, 1]: a 0.5 baseline shifted by the weighted
    /// deltas, clamped
    pub fn impact_score(&self) -> f64 {
        let mut score = 0.5;
        if let Some(quality_delta) = self.quality_delta {
            score += quality_delta * 0.3;
        }
        if let Some(performance_delta) = self.performance_delta {
            score += performance_delta * 0.2;
        }
        if let Some(user_rating) = self.user_rating {
            score += (user_rating / 5.0) * 0.3;
        }
        if let Some(error_reduction) = self.error_reduction {
            score += error_reduction * 0.2;
        }
        score.clamp(0.0, 1.0)
    }

    /// Human-readable pattern description from the salient features
    fn pattern_description(&self, pattern_type: &str) -> String {
        let mut features = Vec::new();
        if let Some(ref category) = self.task_category {
            features.push(format!("category:{}", category));
        }
        if let Some(ref agent) = self.agent_name {
            features.push(format!("agent:{}", agent));
        }
        let feature_str = if features.is_empty() {
            "general".to_string()
        } else {
            features.join(", ")
        };
        format!("{} - {}", pattern_type, feature_str)
    }
}

/// Manages feedback collection and pattern recognition
pub struct LearningSystem {
    mirror: Arc<dyn GraphMirror>,
}

impl LearningSystem {
    /// Create a learning system over the given mirror
    pub fn new(mirror: Arc<dyn GraphMirror>) -> Self {
        Self { mirror }
    }

    /// Record feedback from a task execution; returns the learning id
    pub fn record_feedback(
        &self,
        execution_id: &str,
        kind: FeedbackKind,
        data: &FeedbackData,
    ) -> AppResult<String> {
        let learning_id = uuid::Uuid::new_v4().to_string();
        let pattern_type = kind.pattern_type();
        let impact_score = data.impact_score();

        self.mirror.record_learning(&LearningNode {
            learning_id: learning_id.clone(),
            execution_id: execution_id.to_string(),
            pattern_type: pattern_type.to_string(),
            feedback: serde_json::to_value(data)?,
            confidence: DEFAULT_CONFIDENCE,
            impact_score,
        })?;

        let description = self.fold_into_pattern(pattern_type, data)?;
        self.mirror
            .link_learning_to_pattern(&learning_id, &description)?;

        tracing::info!(
            learning_id = %learning_id,
            pattern_type = %pattern_type,
            impact = impact_score,
            "Recorded learning"
        );
        Ok(learning_id)
    }

    /// Upsert the pattern this feedback belongs to, bumping its frequency.
    /// Returns the description of the pattern that was written.
    fn fold_into_pattern(&self, pattern_type: &str, data: &FeedbackData) -> AppResult<String> {
        let description = data.pattern_description(pattern_type);
        let existing = self.mirror.find_patterns(pattern_type, 1)?;

        let node = match existing.into_iter().next() {
            Some(pattern) => PatternNode {
                frequency: pattern.frequency + 1,
                ..pattern
            },
            None => PatternNode {
                description: description.clone(),
                pattern_type: pattern_type.to_string(),
                frequency: 1,
                success_rate: INITIAL_SUCCESS_RATE,
            },
        };
        let written = node.description.clone();
        self.mirror.upsert_pattern(&node)?;
        Ok(written)
    }

    /// Recommendations for a task category: high-success patterns whose
    /// description matches the category
    pub fn recommendations(&self, category: &str) -> AppResult<Vec<Recommendation>> {
        let category_tag = format!("category:{}", category);
        let mut recommendations = Vec::new();

        for kind in [
            FeedbackKind::QualityImprovement,
            FeedbackKind::ErrorResolution,
            FeedbackKind::Optimization,
            FeedbackKind::UserFeedback,
            FeedbackKind::Performance,
        ] {
            for pattern in self.mirror.find_patterns(kind.pattern_type(), 5)? {
                if pattern.success_rate > RECOMMENDATION_THRESHOLD
                    && (pattern.description.contains(&category_tag)
                        || pattern.description.ends_with("general"))
                {
                    recommendations.push(Recommendation {
                        advice: advice_for(&pattern.description).to_string(),
                        pattern: pattern.description,
                        success_rate: pattern.success_rate,
                        frequency: pattern.frequency,
                    });
                }
            }
        }

        Ok(recommendations)
    }

    /// What one agent has learned over time
    pub fn agent_learning(&self, agent_name: &str) -> AppResult<AgentLearning> {
        let insights = self.mirror.learning_insights(Some(agent_name))?;

        match insights {
            Some(insights) => Ok(AgentLearning {
                agent_name: agent_name.to_string(),
                total_learnings: insights.total_learnings,
                unique_patterns: insights.unique_patterns,
                avg_confidence: insights.avg_confidence,
                avg_impact: insights.avg_impact,
                pattern_types: insights.pattern_types,
                learning_velocity: learning_velocity(insights.total_learnings).to_string(),
            }),
            None => Ok(AgentLearning {
                agent_name: agent_name.to_string(),
                total_learnings: 0,
                unique_patterns: 0,
                avg_confidence: 0.0,
                avg_impact: 0.0,
                pattern_types: Vec::new(),
                learning_velocity: learning_velocity(0).to_string(),
            }),
        }
    }

    /// System-wide learning report
    pub fn report(&self) -> AppResult<LearningReport> {
        let overall = self.mirror.learning_insights(None)?.unwrap_or_default();

        let mut agents = Vec::new();
        for kind in AgentKind::all() {
            agents.push(self.agent_learning(kind.as_str())?);
        }

        Ok(LearningReport {
            generated_at: chrono::Utc::now().to_rfc3339(),
            total_learnings: overall.total_learnings,
            total_patterns: overall.unique_patterns,
            system_maturity: system_maturity(overall.total_learnings, overall.unique_patterns)
                .to_string(),
            agents,
        })
    }
}

/// How fast an agent is accumulating learnings
fn learning_velocity(total: i64) -> &'static str {
    match total {
        0 => "no_learning",
        1..=9 => "slow",
        10..=49 => "moderate",
        _ => "fast",
    }
}

/// Overall maturity of the learning corpus
fn system_maturity(learnings: i64, patterns: i64) -> &'static str {
    if learnings == 0 {
        "nascent"
    } else if learnings < 20 || patterns < 5 {
        "developing"
    } else if learnings < 100 || patterns < 20 {
        "maturing"
    } else {
        "mature"
    }
}

/// Rule-based advice derived from a pattern description
fn advice_for(description: &str) -> &'static str {
    if description.contains("error_pattern") {
        "Implement additional error handling based on past failures"
    } else if description.contains("quality_pattern") {
        "Apply quality improvement techniques from similar tasks"
    } else if description.contains("optimization_pattern") {
        "Use optimization strategies that worked before"
    } else {
        "Follow best practices from similar successful tasks"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::graph::MemoryGraphMirror;

    fn system() -> LearningSystem {
        LearningSystem::new(Arc::new(MemoryGraphMirror::new()))
    }

    #[test]
    fn test_impact_score_baseline() {
        assert!((FeedbackData::default().impact_score() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_impact_score_weights_and_clamp() {
        let data = FeedbackData {
            quality_delta: Some(0.3),
            performance_delta: Some(0.1),
            ..Default::default()
        };
        assert!((data.impact_score() - 0.61).abs() < 1e-9);

        let maxed = FeedbackData {
            quality_delta: Some(5.0),
            user_rating: Some(5.0),
            ..Default::default()
        };
        assert!((maxed.impact_score() - 1.0).abs() < f64::EPSILON);

        let floored = FeedbackData {
            quality_delta: Some(-5.0),
            ..Default::default()
        };
        assert!(floored.impact_score().abs() < f64::EPSILON);
    }

    #[test]
    fn test_record_feedback_creates_and_folds_patterns() {
        let learning = system();
        let data = FeedbackData {
            task_category: Some("content".to_string()),
            agent_name: Some("content_writer".to_string()),
            quality_delta: Some(0.3),
            ..Default::default()
        };

        learning
            .record_feedback("e1", FeedbackKind::QualityImprovement, &data)
            .unwrap();
        learning
            .record_feedback("e2", FeedbackKind::QualityImprovement, &data)
            .unwrap();

        let patterns = learning
            .mirror
            .find_patterns("quality_pattern", 5)
            .unwrap();
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].frequency, 2);
    }

    #[test]
    fn test_recommendations_filter_by_success_rate() {
        let learning = system();
        learning
            .mirror
            .upsert_pattern(&PatternNode {
                description: "quality_pattern - category:content".to_string(),
                pattern_type: "quality_pattern".to_string(),
                frequency: 8,
                success_rate: 0.9,
            })
            .unwrap();
        learning
            .mirror
            .upsert_pattern(&PatternNode {
                description: "error_pattern - category:content".to_string(),
                pattern_type: "error_pattern".to_string(),
                frequency: 3,
                success_rate: 0.4,
            })
            .unwrap();

        let recommendations = learning.recommendations("content").unwrap();
        assert_eq!(recommendations.len(), 1);
        assert!(recommendations[0].pattern.contains("quality_pattern"));
        assert!(recommendations[0].advice.contains("quality"));
    }

    #[test]
    fn test_velocity_thresholds() {
        assert_eq!(learning_velocity(0), "no_learning");
        assert_eq!(learning_velocity(9), "slow");
        assert_eq!(learning_velocity(10), "moderate");
        assert_eq!(learning_velocity(50), "fast");
    }

    #[test]
    fn test_maturity_thresholds() {
        assert_eq!(system_maturity(0, 0), "nascent");
        assert_eq!(system_maturity(19, 10), "developing");
        assert_eq!(system_maturity(50, 10), "maturing");
        assert_eq!(system_maturity(150, 30), "mature");
    }

    #[test]
    fn test_report_covers_all_agents() {
        let learning = system();
        let report = learning.report().unwrap();
        assert_eq!(report.agents.len(), 4);
        assert_eq!(report.system_maturity, "nascent");
    }
}
