//! Compiled-in default cue tables for the lexicon scorer and tag extractor.
//!
//! Terms are lowercase; multi-word terms match consecutive tokens. Every
//! table can be replaced wholesale from the pipeline YAML file.

/// Sentiment cues. Positive weights are praise, negative weights complaints.
pub(crate) const SENTIMENT_CUES: &[(&str, f64)] = &[
    // Positive
    ("love", 0.6),
    ("loved", 0.6),
    ("loving", 0.5),
    ("great", 0.5),
    ("excellent", 0.7),
    ("amazing", 0.7),
    ("awesome", 0.7),
    ("fantastic", 0.7),
    ("perfect", 0.7),
    ("best", 0.6),
    ("good", 0.4),
    ("nice", 0.4),
    ("helpful", 0.5),
    ("easy", 0.4),
    ("intuitive", 0.5),
    ("smooth", 0.4),
    ("reliable", 0.5),
    ("recommend", 0.5),
    ("happy", 0.5),
    ("useful", 0.4),
    ("beautiful", 0.5),
    ("thanks", 0.3),
    ("thank", 0.3),
    // Negative
    ("crash", -0.7),
    ("crashes", -0.7),
    ("crashed", -0.7),
    ("crashing", -0.7),
    ("broken", -0.6),
    ("buggy", -0.6),
    ("bug", -0.4),
    ("bugs", -0.4),
    ("error", -0.4),
    ("errors", -0.4),
    ("fail", -0.5),
    ("fails", -0.5),
    ("failed", -0.5),
    ("failing", -0.5),
    ("not working", -0.6),
    ("slow", -0.4),
    ("bad", -0.5),
    ("terrible", -0.8),
    ("awful", -0.8),
    ("horrible", -0.8),
    ("worst", -0.8),
    ("hate", -0.7),
    ("useless", -0.7),
    ("unusable", -0.8),
    ("frustrating", -0.6),
    ("frustrated", -0.6),
    ("annoying", -0.5),
    ("disappointed", -0.6),
    ("disappointing", -0.6),
    ("confusing", -0.4),
    ("affected", -0.4),
    ("stuck", -0.4),
    ("freeze", -0.5),
    ("freezes", -0.5),
    ("lost", -0.4),
    ("waste", -0.5),
    ("overcharged", -0.6),
    ("refund", -0.4),
];

/// Tokens that flip the polarity of a sentiment cue shortly after them.
pub(crate) const NEGATORS: &[&str] = &[
    "not", "no", "never", "don't", "doesn't", "didn't", "isn't", "wasn't", "aren't", "can't",
    "cannot", "won't", "wouldn't", "hardly", "without",
];

pub(crate) const URGENCY_CUES: &[(&str, f64)] = &[
    ("urgent", 0.8),
    ("urgently", 0.8),
    ("asap", 0.8),
    ("emergency", 0.8),
    ("outage", 0.8),
    ("data loss", 0.8),
    ("immediately", 0.7),
    ("critical", 0.7),
    ("blocker", 0.7),
    ("lost data", 0.7),
    ("crash", 0.6),
    ("crashes", 0.6),
    ("crashed", 0.6),
    ("crashing", 0.6),
    ("not working", 0.6),
    ("all customers", 0.6),
    ("broken", 0.5),
    ("blocked", 0.5),
    ("deadline", 0.5),
    ("fail", 0.4),
    ("fails", 0.4),
    ("failed", 0.4),
    ("stuck", 0.4),
    ("freeze", 0.4),
    ("freezes", 0.4),
    ("frozen", 0.4),
    ("refund", 0.4),
    ("down", 0.3),
    ("error", 0.3),
    ("can't", 0.3),
    ("cannot", 0.3),
    ("cancel", 0.3),
    ("every time", 0.3),
    ("affected", 0.3),
];

/// Scale and business-critical-surface language.
pub(crate) const IMPACT_CUES: &[(&str, f64)] = &[
    ("all users", 0.6),
    ("all customers", 0.6),
    ("data loss", 0.6),
    ("everyone", 0.5),
    ("everybody", 0.5),
    ("many users", 0.5),
    ("customers", 0.5),
    ("revenue", 0.5),
    ("checkout", 0.45),
    ("enterprise", 0.4),
    ("production", 0.4),
    ("payment", 0.4),
    ("payments", 0.4),
    ("billing", 0.35),
    ("organization", 0.35),
    ("all", 0.3),
    ("every", 0.3),
    ("users", 0.3),
    ("affected", 0.3),
    ("invoice", 0.3),
    ("subscription", 0.3),
    ("company", 0.3),
    ("retention", 0.3),
    ("sales", 0.3),
    ("our team", 0.3),
    ("workspace", 0.25),
    ("onboarding", 0.25),
    ("team", 0.2),
    ("admin", 0.2),
];

pub(crate) const BUG_KEYWORDS: &[&str] = &[
    "crash",
    "crashes",
    "crashed",
    "crashing",
    "error",
    "errors",
    "broken",
    "fail",
    "fails",
    "failed",
    "failing",
    "bug",
    "bugs",
    "buggy",
    "glitch",
    "freeze",
    "freezes",
    "not working",
];

pub(crate) const FEATURE_REQUEST_KEYWORDS: &[&str] = &[
    "wish",
    "would love",
    "suggest",
    "suggestion",
    "add",
    "please add",
    "feature request",
    "would be great",
    "would be nice",
];

pub(crate) const BILLING_KEYWORDS: &[&str] = &[
    "payment",
    "payments",
    "invoice",
    "invoices",
    "subscription",
    "subscriptions",
    "charge",
    "charged",
    "charges",
    "billing",
    "billed",
    "pricing",
    "refund",
    "overcharged",
];
