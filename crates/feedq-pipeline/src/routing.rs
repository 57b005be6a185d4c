//! Rule-based routing of scored feedback to an owning team and a next step.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use feedq_core::{Signals, Tag, WeightedCue};
use serde::Serialize;

use crate::tokens::{tokenize, CueMatcher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    CoreApp,
    Frontend,
    Performance,
    ProductManagement,
    CustomerSupport,
    FinanceBilling,
    UxDesign,
}

impl Team {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Team::CoreApp => "Engineering (Core App)",
            Team::Frontend => "Engineering (Frontend)",
            Team::Performance => "Engineering (Performance)",
            Team::ProductManagement => "Product Management",
            Team::CustomerSupport => "Customer Success / Support",
            Team::FinanceBilling => "Finance / Billing",
            Team::UxDesign => "UX Design",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NextStep {
    CriticalBugTicket,
    BugBacklog,
    PerformanceInvestigation,
    ProductBacklog,
    DesignReview,
    BillingFollowUp,
    Escalate,
    Triage,
}

impl NextStep {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            NextStep::CriticalBugTicket => "Open a P1 ticket and reproduce in staging",
            NextStep::BugBacklog => "Check logs for related errors and add to the sprint backlog",
            NextStep::PerformanceInvestigation => "Profile slow paths and review caching",
            NextStep::ProductBacklog => "Add to the product backlog and schedule a user interview",
            NextStep::DesignReview => "Schedule a design review and update help docs",
            NextStep::BillingFollowUp => "Review the account's billing status and contact the customer",
            NextStep::Escalate => "Escalate to the team lead with an investigation plan",
            NextStep::Triage => "Review details and assign an owner",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActionPlan {
    pub team: Team,
    pub next_step: NextStep,
}

/// Score at or above which a bug is treated as critical, and an item with
/// no other routing signal is escalated on impact.
const CRITICAL_SCORE: f64 = 0.7;

fn group(words: &[&str]) -> CueMatcher {
    let cues: Vec<WeightedCue> = words.iter().map(|w| WeightedCue::new(w, 1.0)).collect();
    CueMatcher::new(&cues)
}

static BILLING: LazyLock<CueMatcher> = LazyLock::new(|| {
    group(&[
        "payment", "payments", "billing", "invoice", "subscription", "charge", "charged", "refund",
        "price", "pricing", "cost",
    ])
});
static UX: LazyLock<CueMatcher> = LazyLock::new(|| {
    group(&[
        "design", "color", "colors", "layout", "visual", "ugly", "beautiful", "interface",
        "confusing", "unclear", "hard to find", "difficult",
    ])
});
static PERFORMANCE: LazyLock<CueMatcher> = LazyLock::new(|| {
    group(&[
        "slow", "performance", "loading", "lag", "laggy", "timeout", "speed", "sluggish",
    ])
});
static FRONTEND: LazyLock<CueMatcher> = LazyLock::new(|| {
    group(&["button", "click", "ui", "display", "screen", "page", "form", "input"])
});
static FEATURE: LazyLock<CueMatcher> = LazyLock::new(|| {
    group(&["feature", "add", "wish", "would like", "suggestion", "improve"])
});
static SUPPORT: LazyLock<CueMatcher> = LazyLock::new(|| {
    group(&["how to", "help", "tutorial", "guide", "setup", "account"])
});

/// Pick an owning team and a next step for a scored item.
#[must_use]
pub fn route(text_norm: &str, tags: &BTreeSet<Tag>, signals: Signals, priority: f64) -> ActionPlan {
    let tokens = tokenize(text_norm);
    ActionPlan {
        team: team_for(&tokens, tags),
        next_step: next_step_for(&tokens, tags, signals, priority),
    }
}

fn team_for(tokens: &[&str], tags: &BTreeSet<Tag>) -> Team {
    let by_keyword = [
        (&*BILLING, Team::FinanceBilling),
        (&*UX, Team::UxDesign),
        (&*PERFORMANCE, Team::Performance),
        (&*FRONTEND, Team::Frontend),
        (&*FEATURE, Team::ProductManagement),
        (&*SUPPORT, Team::CustomerSupport),
    ];
    if let Some((_, team)) = by_keyword.iter().find(|(m, _)| m.any(tokens)) {
        return *team;
    }

    if tags.contains(&Tag::Bug) {
        Team::CoreApp
    } else if tags.contains(&Tag::FeatureRequest) {
        Team::ProductManagement
    } else if tags.contains(&Tag::Billing) {
        Team::FinanceBilling
    } else {
        Team::CoreApp
    }
}

fn next_step_for(tokens: &[&str], tags: &BTreeSet<Tag>, signals: Signals, priority: f64) -> NextStep {
    let is_bug = tags.contains(&Tag::Bug);
    if is_bug && (priority >= CRITICAL_SCORE || signals.urgency >= CRITICAL_SCORE) {
        NextStep::CriticalBugTicket
    } else if is_bug {
        NextStep::BugBacklog
    } else if PERFORMANCE.any(tokens) {
        NextStep::PerformanceInvestigation
    } else if tags.contains(&Tag::FeatureRequest) || FEATURE.any(tokens) {
        NextStep::ProductBacklog
    } else if UX.any(tokens) {
        NextStep::DesignReview
    } else if tags.contains(&Tag::Billing) || BILLING.any(tokens) {
        NextStep::BillingFollowUp
    } else if signals.impact >= CRITICAL_SCORE {
        NextStep::Escalate
    } else {
        NextStep::Triage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals(urgency: f64, impact: f64) -> Signals {
        Signals {
            sentiment: 0.0,
            urgency,
            impact,
        }
    }

    fn tags(list: &[Tag]) -> BTreeSet<Tag> {
        list.iter().copied().collect()
    }

    #[test]
    fn urgent_bug_gets_critical_ticket() {
        let plan = route(
            "the app crashes on launch",
            &tags(&[Tag::Bug, Tag::Negative]),
            signals(0.8, 0.3),
            0.6,
        );
        assert_eq!(plan.team, Team::CoreApp);
        assert_eq!(plan.next_step, NextStep::CriticalBugTicket);
    }

    #[test]
    fn low_priority_bug_goes_to_backlog() {
        let plan = route("minor error in footer", &tags(&[Tag::Bug]), signals(0.3, 0.1), 0.3);
        assert_eq!(plan.next_step, NextStep::BugBacklog);
    }

    #[test]
    fn billing_keywords_win_team_routing() {
        let plan = route(
            "the checkout page crashed after payment",
            &tags(&[Tag::Bug, Tag::Billing]),
            signals(0.5, 0.5),
            0.5,
        );
        assert_eq!(plan.team, Team::FinanceBilling);
    }

    #[test]
    fn slow_screens_go_to_performance() {
        let plan = route("search is so slow", &tags(&[Tag::Neutral]), signals(0.2, 0.1), 0.2);
        assert_eq!(plan.team, Team::Performance);
        assert_eq!(plan.next_step, NextStep::PerformanceInvestigation);
    }

    #[test]
    fn feature_request_goes_to_product() {
        let plan = route(
            "would love a dark mode",
            &tags(&[Tag::FeatureRequest, Tag::Neutral]),
            signals(0.1, 0.0),
            0.1,
        );
        assert_eq!(plan.team, Team::ProductManagement);
        assert_eq!(plan.next_step, NextStep::ProductBacklog);
    }

    #[test]
    fn high_impact_without_other_signal_escalates() {
        let plan = route("everyone noticed", &tags(&[Tag::Neutral]), signals(0.2, 0.8), 0.4);
        assert_eq!(plan.team, Team::CoreApp);
        assert_eq!(plan.next_step, NextStep::Escalate);
    }

    #[test]
    fn nothing_matches_falls_back_to_triage() {
        let plan = route("hello there", &tags(&[Tag::Neutral]), signals(0.1, 0.0), 0.1);
        assert_eq!(
            plan,
            ActionPlan {
                team: Team::CoreApp,
                next_step: NextStep::Triage
            }
        );
    }
}
