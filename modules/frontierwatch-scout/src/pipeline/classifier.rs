//! Rule-based incident classification.
//!
//! Pure functions: the same incident text and rule set always give the same
//! type and region.

use frontierwatch_common::config::KeywordConfig;
use frontierwatch_common::{CanonicalIncident, IncidentType, Region};

/// Keyword lists per incident type, lowercased. Order within a list does not
/// matter; order between lists is the priority Terror > Encounter > Attack.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    terror: Vec<String>,
    encounter: Vec<String>,
    attack: Vec<String>,
}

impl RuleSet {
    /// Blank keywords are dropped; they would match every incident.
    pub fn new(terror: &[String], encounter: &[String], attack: &[String]) -> Self {
        fn clean(words: &[String]) -> Vec<String> {
            words
                .iter()
                .map(|w| w.to_lowercase())
                .filter(|w| !w.trim().is_empty())
                .collect()
        }
        Self {
            terror: clean(terror),
            encounter: clean(encounter),
            attack: clean(attack),
        }
    }

    pub fn from_config(keywords: &KeywordConfig) -> Self {
        Self::new(&keywords.terror, &keywords.encounter, &keywords.attack)
    }

    fn ordered(&self) -> [(IncidentType, &[String]); 3] {
        [
            (IncidentType::Terror, self.terror.as_slice()),
            (IncidentType::Encounter, self.encounter.as_slice()),
            (IncidentType::Attack, self.attack.as_slice()),
        ]
    }

    /// First list with a substring hit wins. `text` must already be lowercase.
    pub fn incident_type(&self, text: &str) -> IncidentType {
        self.ordered()
            .into_iter()
            .find(|(_, words)| words.iter().any(|w| text.contains(w.as_str())))
            .map(|(kind, _)| kind)
            .unwrap_or(IncidentType::Other)
    }
}

/// Region from the incident text; an adapter-assigned region is the fallback
/// when the text names no known place.
pub fn region_for(incident: &CanonicalIncident) -> Region {
    match Region::detect(&incident.content) {
        Region::Other => incident
            .reported_region
            .as_deref()
            .and_then(|r| r.parse::<Region>().ok())
            .unwrap_or(Region::Other),
        detected => detected,
    }
}

/// Assign type and region to a single incident.
pub fn classify(mut incident: CanonicalIncident, rules: &RuleSet) -> CanonicalIncident {
    // `content` is the four free-text fields in fixed order.
    let text = incident.content.to_lowercase();
    incident.incident_type = rules.incident_type(&text);
    incident.region = region_for(&incident);
    incident
}

pub fn classify_all(incidents: Vec<CanonicalIncident>, rules: &RuleSet) -> Vec<CanonicalIncident> {
    incidents
        .into_iter()
        .map(|incident| classify(incident, rules))
        .collect()
}
