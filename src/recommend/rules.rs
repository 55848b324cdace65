//! Keyword rules and confidence tiers used when the disease database has
//! nothing to say about a label.

/// Confidence tier of a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    High,
    Moderate,
    Low,
}

impl Severity {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.85 {
            Severity::High
        } else if confidence >= 0.60 {
            Severity::Moderate
        } else {
            Severity::Low
        }
    }

    /// Sentence prepended to rule and fallback advice.
    pub fn prefix(self) -> &'static str {
        match self {
            Severity::High => "High confidence — treat immediately. ",
            Severity::Moderate => "Moderate confidence — verify and treat. ",
            Severity::Low => "Low confidence — re-check with a clearer image. ",
        }
    }
}

/// One entry of the rule chain: any keyword found in the lower-cased label
/// selects the advice.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub keywords: &'static [&'static str],
    pub advice: &'static str,
    /// Whether the severity prefix goes in front of the advice.
    pub with_severity: bool,
}

impl Rule {
    pub fn matches(&self, lowered_label: &str) -> bool {
        self.keywords.iter().any(|k| lowered_label.contains(k))
    }

    pub fn render(&self, severity: Severity) -> String {
        if self.with_severity {
            format!("{}{}", severity.prefix(), self.advice)
        } else {
            self.advice.to_string()
        }
    }
}

pub const HEALTHY_ADVICE: &str = "Plant appears healthy. Maintain balanced irrigation and nutrients.";

pub const FALLBACK_ADVICE: &str =
    "Perform sanitation, isolate infected plants, and consult local guidelines.";

/// Evaluated top to bottom; first match wins.
pub const RULES: &[Rule] = &[
    Rule {
        keywords: &["blight"],
        advice: "Remove affected leaves, improve airflow, and apply a recommended fungicide (e.g., copper-based).",
        with_severity: true,
    },
    Rule {
        keywords: &["rust"],
        advice: "Use sulfur spray, remove infected foliage, and ensure good spacing.",
        with_severity: true,
    },
    Rule {
        keywords: &["mildew"],
        advice: "Apply neem oil or potassium bicarbonate and reduce humidity.",
        with_severity: true,
    },
    Rule {
        keywords: &["scab", "spot"],
        advice: "Apply fungicide, improve sanitation, and avoid overhead watering.",
        with_severity: true,
    },
    Rule {
        keywords: &["healthy"],
        advice: HEALTHY_ADVICE,
        with_severity: false,
    },
];

/// Run the rule chain, falling back to generic advice.
pub fn apply(rules: &[Rule], label: &str, confidence: f64) -> String {
    let lowered = label.to_lowercase();
    let severity = Severity::from_confidence(confidence);

    match rules.iter().find(|r| r.matches(&lowered)) {
        Some(rule) => rule.render(severity),
        None => format!("{}{}", severity.prefix(), FALLBACK_ADVICE),
    }
}
