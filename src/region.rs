//! Regions select the assets, buses and table rows that belong to a geographical area.
//!
//! Network identifiers don't carry a region column. Instead, the location is embedded in the name
//! (e.g. `"DE1 0 gas boiler"`), so a region has to be matched against identifiers using one of the
//! modes in [`RegionMatch`].
use crate::id::{IDCollection, define_id_type};
use anyhow::{Result, ensure};
use indexmap::IndexSet;
use serde::Deserialize;

define_id_type! {RegionID}

/// How a region is matched against network identifiers
#[derive(PartialEq, Eq, Debug, Clone, Copy, Default, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RegionMatch {
    /// The identifier's location code must equal the region exactly
    #[default]
    Location,
    /// The region must appear anywhere in the identifier.
    ///
    /// This is prone to collisions: `"DE"` also matches `"FR1 0 H2 DEMO"`.
    Substring,
}

/// A region together with the rule used to match identifiers against it
#[derive(PartialEq, Debug, Clone)]
pub struct RegionFilter {
    /// The region to select
    pub id: RegionID,
    /// How identifiers are matched
    pub mode: RegionMatch,
}

impl RegionFilter {
    /// Create a new [`RegionFilter`]
    pub fn new(id: RegionID, mode: RegionMatch) -> Self {
        Self { id, mode }
    }

    /// Whether an identifier (asset name, bus name or table index) belongs to this region.
    ///
    /// If `location` is provided it is used instead of the location code derived from `name`.
    pub fn matches(&self, name: &str, location: Option<&str>) -> bool {
        match self.mode {
            RegionMatch::Location => {
                let code = location.map_or_else(|| location_code(name), location_code);
                code == self.id.as_str()
            }
            RegionMatch::Substring => location.unwrap_or(name).contains(self.id.as_str()),
        }
    }
}

/// Get the location code for an identifier.
///
/// This is the first whitespace-separated token with any trailing digits removed, so both
/// `"DE1 0 gas boiler"` and `"DE1 0"` have the location code `"DE"`.
pub fn location_code(name: &str) -> &str {
    let token = name.split_whitespace().next().unwrap_or("");
    token.trim_end_matches(|c: char| c.is_ascii_digit())
}

/// Parse a string of regions separated by semicolons into a vector of [`RegionID`]s.
///
/// The string can be either "all" (case-insensitive), a single region, or a semicolon-separated
/// list of regions (e.g. "DE;FR" or "DE; FR")
pub fn parse_region_str(s: &str, region_ids: &IndexSet<RegionID>) -> Result<Vec<RegionID>> {
    let s = s.trim();
    ensure!(!s.is_empty(), "No regions provided");

    if s.eq_ignore_ascii_case("all") {
        return Ok(region_ids.iter().cloned().collect());
    }

    s.split(';').map(|r| region_ids.get_id(r.trim())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use rstest::rstest;

    #[rstest]
    #[case("DE1 0 gas boiler", "DE")]
    #[case("DE1 0", "DE")]
    #[case("DE", "DE")]
    #[case("FR12 3 onwind", "FR")]
    #[case("co2 atmosphere", "co")]
    #[case("", "")]
    fn test_location_code(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(location_code(name), expected);
    }

    #[rstest]
    #[case(RegionMatch::Location, "DE1 0 gas boiler", true)]
    #[case(RegionMatch::Substring, "DE1 0 gas boiler", true)]
    #[case(RegionMatch::Location, "DEU1 0 gas boiler", false)]
    #[case(RegionMatch::Location, "FR1 0 gas boiler", false)]
    fn test_region_matches(#[case] mode: RegionMatch, #[case] name: &str, #[case] expected: bool) {
        let region = RegionFilter::new("DE".into(), mode);
        assert_eq!(region.matches(name, None), expected);
    }

    /// Substring matching picks up unrelated identifiers which happen to contain the region code.
    /// This is the reason `location` is the default mode.
    #[test]
    fn test_substring_match_collision() {
        let name = "FR1 0 H2 DEMO plant";
        assert!(RegionFilter::new("DE".into(), RegionMatch::Substring).matches(name, None));
        assert!(!RegionFilter::new("DE".into(), RegionMatch::Location).matches(name, None));
    }

    #[test]
    fn test_region_matches_explicit_location() {
        let region = RegionFilter::new("DE".into(), RegionMatch::Location);
        assert!(region.matches("EU gas", Some("DE")));
        assert!(!region.matches("DE1 0 gas", Some("FR")));
    }

    #[test]
    fn test_parse_region_str() {
        let ids: IndexSet<RegionID> = ["DE".into(), "FR".into()].into_iter().collect();
        assert_eq!(
            parse_region_str("all", &ids).unwrap(),
            vec!["DE".into(), "FR".into()]
        );
        assert_eq!(parse_region_str(" FR ", &ids).unwrap(), vec!["FR".into()]);
        assert_eq!(
            parse_region_str("FR; DE", &ids).unwrap(),
            vec!["FR".into(), "DE".into()]
        );
        assert_error!(parse_region_str("", &ids), "No regions provided");
        assert_error!(parse_region_str("PL", &ids), "Unknown ID PL found");
    }
}
