//! Field micro-grammar
//!
//! Classifies the text a coach types into a load/reps/sets/RPE field into
//! exactly one syntactic case. Nothing here looks at references or computes
//! derived values; that is the resolver's job.
//!
//! Cases, in the order they are tried (first match wins):
//! - `?` unknown marker
//! - `(100kg)` / `(70%)` bracketed suggestion
//! - `5/8`, `100kg/103kg`, `70%/80%` range
//! - `-10kg`, `+5%`, `W1-10%` signed relative
//! - `70%` percentage of reference
//! - `100kg`, `6.5` plain literal
//! - `MAX-2` reps below a max-reps reference (reps only)

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::models::Channel;

// ---------------------------------------------------------------------------
/// Per-channel configuration table
// ---------------------------------------------------------------------------

/// How a signed number is applied to its reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `reference + delta`
    Add,
    /// `reference * factor`
    Scale,
}

#[derive(Debug, Clone, Copy)]
pub struct ChannelConfig {
    pub channel: Channel,
    /// Unit suffixes accepted besides `%` (matched case-insensitively)
    pub units: &'static [&'static str],
    /// Operator used for a signed number written without unit or `%`
    pub bare_signed: Operator,
    /// Whether `MAX-<n>` is meaningful on this channel
    pub allows_max_relative: bool,
    /// Decimals kept on values produced by applying an operation
    pub precision: i32,
}

pub const CHANNEL_CONFIGS: [ChannelConfig; 4] = [
    ChannelConfig {
        channel: Channel::Load,
        units: &["kg", "kgs", "lb", "lbs"],
        bare_signed: Operator::Add,
        allows_max_relative: false,
        precision: 2,
    },
    ChannelConfig {
        channel: Channel::Reps,
        units: &["s", "sec"],
        bare_signed: Operator::Add,
        allows_max_relative: true,
        precision: 0,
    },
    ChannelConfig {
        channel: Channel::Sets,
        units: &[],
        bare_signed: Operator::Add,
        allows_max_relative: false,
        precision: 0,
    },
    ChannelConfig {
        channel: Channel::Rpe,
        units: &[],
        bare_signed: Operator::Add,
        allows_max_relative: false,
        precision: 1,
    },
];

pub fn channel_config(channel: Channel) -> &'static ChannelConfig {
    match channel {
        Channel::Load => &CHANNEL_CONFIGS[0],
        Channel::Reps => &CHANNEL_CONFIGS[1],
        Channel::Sets => &CHANNEL_CONFIGS[2],
        Channel::Rpe => &CHANNEL_CONFIGS[3],
    }
}

impl ChannelConfig {
    /// None when the suffix is outside this channel's vocabulary
    fn unit_kind(&self, unit: Option<&str>) -> Option<Notation> {
        match unit {
            None => Some(Notation::Bare),
            Some("%") => Some(Notation::Percent),
            Some(u) if self.units.iter().any(|known| known.eq_ignore_ascii_case(u)) => {
                Some(Notation::Unit)
            }
            Some(_) => None,
        }
    }
}

/// Spelling-independent unit name (`kgs` is `kg`, `sec` is `s`)
fn canonical_unit(unit: &str) -> String {
    match unit.to_ascii_lowercase().as_str() {
        "kgs" => "kg".to_string(),
        "lbs" => "lb".to_string(),
        "sec" => "s".to_string(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
/// Syntactic cases
// ---------------------------------------------------------------------------

/// How the number in a case was written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notation {
    Bare,
    Percent,
    Unit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldSyntax {
    /// `?`
    Unknown,
    /// `(<n>)` or `(<n>%)`
    Bracketed { value: f64, notation: Notation },
    /// `<a>/<b>`; ends are ordered so that `min <= max`
    Range { min: f64, max: f64, notation: Notation },
    /// `[W<n>]±<n>[unit|%]`; `delta` carries the sign
    Relative {
        week_scope: Option<u32>,
        delta: f64,
        notation: Notation,
    },
    /// `<n>%`
    PercentOfReference { percent: f64 },
    /// `<n>[unit]`
    Literal { value: f64 },
    /// `MAX-<n>`
    MaxRelative { minus: f64 },
}

impl FieldSyntax {
    /// Cases whose number only exists relative to a reference
    pub fn needs_reference(&self) -> bool {
        match self {
            FieldSyntax::Relative { .. }
            | FieldSyntax::PercentOfReference { .. }
            | FieldSyntax::MaxRelative { .. } => true,
            FieldSyntax::Unknown
            | FieldSyntax::Bracketed { .. }
            | FieldSyntax::Range { .. }
            | FieldSyntax::Literal { .. } => false,
        }
    }

    /// Single canonical relation to the reference, when the case has one.
    /// Bracketed and range cases are read from their literal numbers and have none.
    pub fn operation(&self, config: &ChannelConfig) -> Option<Operation> {
        match self {
            FieldSyntax::Relative {
                delta, notation, ..
            } => {
                let operator = match notation {
                    Notation::Percent => Operator::Scale,
                    Notation::Unit => Operator::Add,
                    Notation::Bare => config.bare_signed,
                };
                Some(match operator {
                    Operator::Add => Operation::add(*delta),
                    Operator::Scale => Operation::scale(1.0 + delta / 100.0),
                })
            }
            FieldSyntax::PercentOfReference { percent } => Some(Operation::scale(percent / 100.0)),
            FieldSyntax::MaxRelative { minus } => Some(Operation::add(-minus)),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
/// Operations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Operation {
    pub operator: Operator,
    pub operand: f64,
}

impl Operation {
    pub fn add(delta: f64) -> Self {
        Self {
            operator: Operator::Add,
            operand: delta,
        }
    }

    pub fn scale(factor: f64) -> Self {
        Self {
            operator: Operator::Scale,
            operand: round_to(factor, 6),
        }
    }

    pub fn apply(&self, reference: f64) -> f64 {
        match self.operator {
            Operator::Add => reference + self.operand,
            Operator::Scale => reference * self.operand,
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.operator {
            Operator::Add if self.operand < 0.0 => write!(f, "-{}", -self.operand),
            Operator::Add => write!(f, "+{}", self.operand),
            Operator::Scale => write!(f, "*{}", self.operand),
        }
    }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Parse a grammar number, accepting `,` as decimal separator
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().replace(',', ".").parse::<f64>().ok()
}

// ---------------------------------------------------------------------------
/// Matchers
// ---------------------------------------------------------------------------

static UNKNOWN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\?$").expect("valid unknown marker regex"));
static BRACKETED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\(\s*(\d+(?:[.,]\d+)?)\s*(%|[a-z]+)?\s*\)$").expect("valid bracketed regex")
});
static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d+(?:[.,]\d+)?)\s*(%|[a-z]+)?\s*/\s*(\d+(?:[.,]\d+)?)\s*(%|[a-z]+)?$")
        .expect("valid range regex")
});
static RELATIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:w(\d+)\s*)?([+-])\s*(\d+(?:[.,]\d+)?)\s*(%|[a-z]+)?$")
        .expect("valid relative regex")
});
static PERCENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:[.,]\d+)?)\s*%$").expect("valid percent regex"));
static LITERAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d+(?:[.,]\d+)?)\s*([a-z]+)?$").expect("valid literal regex")
});
static MAX_RELATIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^max\s*-\s*(\d+(?:[.,]\d+)?)$").expect("valid max relative regex")
});

type Extractor = fn(&Captures<'_>, &ChannelConfig) -> Option<FieldSyntax>;

/// Predicate (regex) + extractor pair
struct Matcher {
    name: &'static str,
    regex: &'static LazyLock<Regex>,
    extract: Extractor,
}

static MATCHERS: [Matcher; 7] = [
    Matcher {
        name: "unknown",
        regex: &UNKNOWN_RE,
        extract: extract_unknown,
    },
    Matcher {
        name: "bracketed",
        regex: &BRACKETED_RE,
        extract: extract_bracketed,
    },
    Matcher {
        name: "range",
        regex: &RANGE_RE,
        extract: extract_range,
    },
    Matcher {
        name: "relative",
        regex: &RELATIVE_RE,
        extract: extract_relative,
    },
    Matcher {
        name: "percent_of_reference",
        regex: &PERCENT_RE,
        extract: extract_percent,
    },
    Matcher {
        name: "literal",
        regex: &LITERAL_RE,
        extract: extract_literal,
    },
    Matcher {
        name: "max_relative",
        regex: &MAX_RELATIVE_RE,
        extract: extract_max_relative,
    },
];

fn number_at(caps: &Captures<'_>, idx: usize) -> Option<f64> {
    caps.get(idx).and_then(|m| parse_number(m.as_str()))
}

fn unit_at<'c>(caps: &'c Captures<'_>, idx: usize) -> Option<&'c str> {
    caps.get(idx).map(|m| m.as_str())
}

fn extract_unknown(_caps: &Captures<'_>, _config: &ChannelConfig) -> Option<FieldSyntax> {
    Some(FieldSyntax::Unknown)
}

fn extract_bracketed(caps: &Captures<'_>, config: &ChannelConfig) -> Option<FieldSyntax> {
    Some(FieldSyntax::Bracketed {
        value: number_at(caps, 1)?,
        notation: config.unit_kind(unit_at(caps, 2))?,
    })
}

fn extract_range(caps: &Captures<'_>, config: &ChannelConfig) -> Option<FieldSyntax> {
    let a = number_at(caps, 1)?;
    let b = number_at(caps, 3)?;
    let left = config.unit_kind(unit_at(caps, 2))?;
    let right = config.unit_kind(unit_at(caps, 4))?;

    // Both ends must be in the same unit system: `100kg/220lb` is not a range
    if let (Some(l), Some(r)) = (unit_at(caps, 2), unit_at(caps, 4)) {
        if left == Notation::Unit && canonical_unit(l) != canonical_unit(r) {
            return None;
        }
    }

    // `70/80%` reads as a percentage range; `70%/80kg` is not a range at all
    let notation = match (left, right) {
        (l, r) if l == r => l,
        (Notation::Percent, Notation::Bare) | (Notation::Bare, Notation::Percent) => {
            Notation::Percent
        }
        (Notation::Unit, Notation::Bare) | (Notation::Bare, Notation::Unit) => Notation::Unit,
        _ => return None,
    };

    Some(FieldSyntax::Range {
        min: a.min(b),
        max: a.max(b),
        notation,
    })
}

fn extract_relative(caps: &Captures<'_>, config: &ChannelConfig) -> Option<FieldSyntax> {
    let week_scope = match caps.get(1) {
        Some(m) => Some(m.as_str().parse::<u32>().ok()?),
        None => None,
    };
    let magnitude = number_at(caps, 3)?;
    let delta = if caps.get(2).map(|m| m.as_str()) == Some("-") {
        -magnitude
    } else {
        magnitude
    };
    Some(FieldSyntax::Relative {
        week_scope,
        delta,
        notation: config.unit_kind(unit_at(caps, 4))?,
    })
}

fn extract_percent(caps: &Captures<'_>, _config: &ChannelConfig) -> Option<FieldSyntax> {
    Some(FieldSyntax::PercentOfReference {
        percent: number_at(caps, 1)?,
    })
}

fn extract_literal(caps: &Captures<'_>, config: &ChannelConfig) -> Option<FieldSyntax> {
    config.unit_kind(unit_at(caps, 2))?;
    Some(FieldSyntax::Literal {
        value: number_at(caps, 1)?,
    })
}

fn extract_max_relative(caps: &Captures<'_>, config: &ChannelConfig) -> Option<FieldSyntax> {
    if !config.allows_max_relative {
        return None;
    }
    Some(FieldSyntax::MaxRelative {
        minus: number_at(caps, 1)?,
    })
}

/// Classify a raw field string for a channel.
///
/// Returns None for empty input and for free text that matches no case; both
/// mean "no prescription" rather than an error.
pub fn classify(channel: Channel, raw: &str) -> Option<FieldSyntax> {
    let input = raw.trim();
    if input.is_empty() {
        return None;
    }

    let config = channel_config(channel);
    for matcher in MATCHERS.iter() {
        let Some(caps) = matcher.regex.captures(input) else {
            continue;
        };
        if let Some(syntax) = (matcher.extract)(&caps, config) {
            tracing::debug!(%channel, input, case = matcher.name, "classified field");
            return Some(syntax);
        }
    }

    tracing::debug!(%channel, input, "field is free text");
    None
}
