use std::collections::BTreeMap;
use std::path::PathBuf;

use frontierwatch_common::{CanonicalIncident, IncidentType, Region};

use crate::notifier::DeliveryStatus;

/// Stats from a pipeline run.
#[derive(Debug, Default)]
pub struct RunStats {
    pub collected: usize,
    pub by_source: BTreeMap<String, usize>,
    pub unique: usize,
    pub duplicates_dropped: usize,
    pub classified: usize,
    pub by_type: BTreeMap<IncidentType, usize>,
    pub by_region: BTreeMap<Region, usize>,
    pub geocode_attempted: usize,
    pub geocoded: usize,
    pub artifacts: Vec<PathBuf>,
    pub notification: Option<DeliveryStatus>,
}

impl RunStats {
    /// Fill in the per-type, per-region and geocoding counters from the final
    /// incident set.
    pub fn tally(&mut self, incidents: &[CanonicalIncident]) {
        self.classified = incidents.len();
        self.by_type.clear();
        self.by_region.clear();
        for incident in incidents {
            *self.by_type.entry(incident.incident_type).or_default() += 1;
            *self.by_region.entry(incident.region).or_default() += 1;
        }
        self.geocode_attempted = incidents.iter().filter(|i| i.location.is_some()).count();
        self.geocoded = incidents.iter().filter(|i| i.coordinates.is_some()).count();
    }
}

impl std::fmt::Display for RunStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== FrontierWatch Run Complete ===")?;
        writeln!(f, "Records collected:  {}", self.collected)?;
        for (source, count) in &self.by_source {
            writeln!(f, "  {source:<16} {count}")?;
        }
        writeln!(f, "Unique incidents:   {}", self.unique)?;
        writeln!(f, "Duplicates dropped: {}", self.duplicates_dropped)?;
        writeln!(f, "Classified:         {}", self.classified)?;

        writeln!(f, "\nBy type:")?;
        for kind in IncidentType::ALL {
            let n = self.by_type.get(&kind).copied().unwrap_or(0);
            writeln!(f, "  {:<10} {n}", kind.as_str())?;
        }
        writeln!(f, "\nBy region:")?;
        for region in Region::ALL {
            let n = self.by_region.get(&region).copied().unwrap_or(0);
            writeln!(f, "  {:<16} {n}", region.as_str())?;
        }

        writeln!(
            f,
            "\nGeocoded:           {}/{}",
            self.geocoded, self.geocode_attempted
        )?;
        if !self.artifacts.is_empty() {
            writeln!(f, "Artifacts:")?;
            for path in &self.artifacts {
                writeln!(f, "  {}", path.display())?;
            }
        }
        match &self.notification {
            Some(status) => writeln!(f, "Notification:       {status}")?,
            None => writeln!(f, "Notification:       not attempted")?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontierwatch_common::{GeoPoint, RawRecord};

    #[test]
    fn tally_counts_types_regions_and_geocodes() {
        let mut a = CanonicalIncident::from_raw(RawRecord::default().with_title("a"));
        a.incident_type = IncidentType::Terror;
        a.region = Region::JammuKashmir;
        a.location = Some("Srinagar".into());
        a.coordinates = Some(GeoPoint { lat: 1.0, lng: 2.0 });
        let mut b = CanonicalIncident::from_raw(RawRecord::default().with_title("b"));
        b.location = Some("Imphal".into());

        let mut stats = RunStats::default();
        stats.tally(&[a, b]);

        assert_eq!(stats.classified, 2);
        assert_eq!(stats.by_type.get(&IncidentType::Terror), Some(&1));
        assert_eq!(stats.by_type.get(&IncidentType::Other), Some(&1));
        assert_eq!(stats.by_region.get(&Region::JammuKashmir), Some(&1));
        assert_eq!(stats.geocode_attempted, 2);
        assert_eq!(stats.geocoded, 1);
    }

    #[test]
    fn display_lists_every_type() {
        let text = RunStats::default().to_string();
        for kind in IncidentType::ALL {
            assert!(text.contains(kind.as_str()));
        }
        assert!(text.contains("not attempted"));
    }
}
