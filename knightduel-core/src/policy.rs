//! Policy assigned to a knight: one heuristic or the meta combiner

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::board::Square;
use crate::error::Error;
use crate::heuristics::{Heuristic, SelectionContext};
use crate::meta::{MetaHeuristic, MetaWeights};
use crate::moves::Turn;

/// Serialised as a heuristic name, or `{ "meta": { ... } }` for the
/// combiner so custom members and weights survive a round trip. The bare
/// name `"meta"` still reads as the default combiner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PolicyRepr", into = "PolicyRepr")]
pub enum Policy {
    Heuristic(Heuristic),
    Meta(MetaHeuristic),
}

impl Policy {
    pub fn select(&self, turn: &Turn, ctx: &mut SelectionContext) -> Option<Square> {
        match self {
            Policy::Heuristic(h) => h.select(turn, ctx),
            Policy::Meta(m) => m.choose(turn, ctx),
        }
    }

    pub fn name(&self) -> String {
        match self {
            Policy::Heuristic(h) => h.name(),
            Policy::Meta(_) => "meta".to_string(),
        }
    }

    /// Replace the meta weights; plain heuristics are unchanged
    pub fn with_meta_weights(self, weights: MetaWeights) -> Self {
        match self {
            Policy::Meta(m) => Policy::Meta(m.with_weights(weights)),
            other => other,
        }
    }
}

impl Default for Policy {
    fn default() -> Self {
        Policy::Heuristic(Heuristic::Random)
    }
}

impl From<Heuristic> for Policy {
    fn from(h: Heuristic) -> Self {
        Policy::Heuristic(h)
    }
}

impl From<MetaHeuristic> for Policy {
    fn from(m: MetaHeuristic) -> Self {
        Policy::Meta(m)
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for Policy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s.trim().to_ascii_lowercase().as_str() {
            "meta" | "meta-heuristic" | "metaheuristic" => Ok(Policy::Meta(MetaHeuristic::default())),
            _ => s.parse::<Heuristic>().map(Policy::Heuristic),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PolicyRepr {
    Name(String),
    Meta { meta: MetaHeuristic },
}

impl TryFrom<PolicyRepr> for Policy {
    type Error = Error;

    fn try_from(repr: PolicyRepr) -> Result<Self, Error> {
        match repr {
            PolicyRepr::Name(s) => s.parse(),
            PolicyRepr::Meta { meta } => Ok(Policy::Meta(meta)),
        }
    }
}

impl From<Policy> for PolicyRepr {
    fn from(p: Policy) -> PolicyRepr {
        match p {
            Policy::Heuristic(h) => PolicyRepr::Name(h.name()),
            Policy::Meta(meta) => PolicyRepr::Meta { meta },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_policy() {
        assert_eq!("meta".parse::<Policy>().unwrap(), Policy::Meta(MetaHeuristic::default()));
        assert_eq!(
            "warnsdorff".parse::<Policy>().unwrap(),
            Policy::Heuristic(Heuristic::Warnsdorff)
        );
        assert!("nonsense".parse::<Policy>().is_err());
    }

    #[test]
    fn test_meta_weights_only_touch_meta() {
        let w = MetaWeights {
            parity: 9.0,
            ..MetaWeights::default()
        };
        let meta = Policy::Meta(MetaHeuristic::default()).with_meta_weights(w);
        match meta {
            Policy::Meta(m) => assert_eq!(m.weights.parity, 9.0),
            _ => panic!("expected meta"),
        }
        let plain = Policy::from(Heuristic::Blocking).with_meta_weights(w);
        assert_eq!(plain, Policy::Heuristic(Heuristic::Blocking));
    }

    #[test]
    fn test_policy_serde() {
        let json = serde_json::to_string(&Policy::from(Heuristic::Mirror)).unwrap();
        assert_eq!(json, "\"mirror\"");
        let p: Policy = serde_json::from_str("\"meta\"").unwrap();
        assert_eq!(p, Policy::Meta(MetaHeuristic::default()));
    }

    #[test]
    fn test_custom_meta_survives_round_trip() {
        let custom = Policy::Meta(MetaHeuristic::new(
            vec![Heuristic::Random],
            MetaWeights {
                parity: 9.0,
                ..MetaWeights::default()
            },
        ));
        let json = serde_json::to_string(&custom).unwrap();
        assert!(json.starts_with("{\"meta\":"), "{}", json);
        let back: Policy = serde_json::from_str(&json).unwrap();
        assert_eq!(back, custom);
    }

    #[test]
    fn test_meta_object_with_partial_fields() {
        let p: Policy = serde_json::from_str(r#"{"meta": {"members": ["random"]}}"#).unwrap();
        assert_eq!(p, Policy::Meta(MetaHeuristic::new(vec![Heuristic::Random], MetaWeights::default())));
        assert!(serde_json::from_str::<Policy>("\"nonsense\"").is_err());
    }
}
