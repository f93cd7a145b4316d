use std::{fmt, sync::LazyLock};

use itertools::Itertools;
use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    HighSpeed,
    Intercity,
    Regional,
    Unknown,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Category::HighSpeed => "high-speed",
            Category::Intercity => "intercity",
            Category::Regional => "regional",
            Category::Unknown => "unknown",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrainKind {
    /// Canonical code, `None` when nothing in the rule table matched.
    pub code: Option<&'static str>,
    pub label: &'static str,
    pub category: Category,
}

struct Rule {
    aliases: &'static [&'static str],
    code: &'static str,
    label: &'static str,
    category: Category,
}

// Order matters only for readability, aliases never overlap.
const RULES: &[Rule] = &[
    Rule {
        aliases: &["FR", "FRECCIAROSSA"],
        code: "FR",
        label: "Frecciarossa",
        category: Category::HighSpeed,
    },
    Rule {
        aliases: &["FA", "FRECCIARGENTO"],
        code: "FA",
        label: "Frecciargento",
        category: Category::HighSpeed,
    },
    Rule {
        aliases: &["FB", "FRECCIABIANCA"],
        code: "FB",
        label: "Frecciabianca",
        category: Category::Intercity,
    },
    Rule {
        aliases: &["ICN", "INTERCITY NOTTE"],
        code: "ICN",
        label: "Intercity Notte",
        category: Category::Intercity,
    },
    Rule {
        aliases: &["IC", "INTERCITY"],
        code: "IC",
        label: "Intercity",
        category: Category::Intercity,
    },
    Rule {
        aliases: &["REG", "REGIONALE"],
        code: "REG",
        label: "Regionale",
        category: Category::Regional,
    },
    Rule {
        aliases: &["R"],
        code: "R",
        label: "Regionale",
        category: Category::Regional,
    },
];

static PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([A-Z]{1,4})").unwrap());
static WORDS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([A-Z]+(?: [A-Z]+)*)").unwrap());

impl TrainKind {
    pub fn unknown() -> Self {
        Self {
            code: None,
            label: "Treno",
            category: Category::Unknown,
        }
    }

    /// Classifies a free-text category such as `"FR 9544"` or `"regionale"`.
    ///
    /// The leading letters are tried first so numbered variants resolve
    /// without being listed, then the leading words (`"FRECCIAROSSA 9544"`),
    /// then the whole normalized text.
    pub fn classify(raw: &str) -> Self {
        let normalized = raw.split_whitespace().join(" ").to_uppercase();
        let leading = |pattern: &Regex| {
            pattern
                .captures(&normalized)
                .and_then(|captures| captures.get(1))
                .map(|m| m.as_str())
        };

        leading(&PREFIX)
            .and_then(lookup)
            .or_else(|| leading(&WORDS).and_then(lookup))
            .or_else(|| lookup(&normalized))
            .unwrap_or_else(Self::unknown)
    }

    pub fn is_known(&self) -> bool {
        self.code.is_some()
    }
}

fn lookup(candidate: &str) -> Option<TrainKind> {
    RULES
        .iter()
        .find(|rule| rule.aliases.contains(&candidate))
        .map(|rule| TrainKind {
            code: Some(rule.code),
            label: rule.label,
            category: rule.category,
        })
}

impl fmt::Display for TrainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} ({})", code, self.category),
            None => f.write_str(self.label),
        }
    }
}
