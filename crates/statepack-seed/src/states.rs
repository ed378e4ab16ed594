//! US state codes covered by the bundled seed.

/// A jurisdiction code and its display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateInfo {
    pub code: &'static str,
    pub name: &'static str,
}

const fn state(code: &'static str, name: &'static str) -> StateInfo {
    StateInfo { code, name }
}

/// The 50 states plus the District of Columbia.
pub const STATES: &[StateInfo] = &[
    state("AL", "Alabama"),
    state("AK", "Alaska"),
    state("AZ", "Arizona"),
    state("AR", "Arkansas"),
    state("CA", "California"),
    state("CO", "Colorado"),
    state("CT", "Connecticut"),
    state("DE", "Delaware"),
    state("FL", "Florida"),
    state("GA", "Georgia"),
    state("HI", "Hawaii"),
    state("ID", "Idaho"),
    state("IL", "Illinois"),
    state("IN", "Indiana"),
    state("IA", "Iowa"),
    state("KS", "Kansas"),
    state("KY", "Kentucky"),
    state("LA", "Louisiana"),
    state("ME", "Maine"),
    state("MD", "Maryland"),
    state("MA", "Massachusetts"),
    state("MI", "Michigan"),
    state("MN", "Minnesota"),
    state("MS", "Mississippi"),
    state("MO", "Missouri"),
    state("MT", "Montana"),
    state("NE", "Nebraska"),
    state("NV", "Nevada"),
    state("NH", "New Hampshire"),
    state("NJ", "New Jersey"),
    state("NM", "New Mexico"),
    state("NY", "New York"),
    state("NC", "North Carolina"),
    state("ND", "North Dakota"),
    state("OH", "Ohio"),
    state("OK", "Oklahoma"),
    state("OR", "Oregon"),
    state("PA", "Pennsylvania"),
    state("RI", "Rhode Island"),
    state("SC", "South Carolina"),
    state("SD", "South Dakota"),
    state("TN", "Tennessee"),
    state("TX", "Texas"),
    state("UT", "Utah"),
    state("VT", "Vermont"),
    state("VA", "Virginia"),
    state("WA", "Washington"),
    state("WV", "West Virginia"),
    state("WI", "Wisconsin"),
    state("WY", "Wyoming"),
    state("DC", "District of Columbia"),
];

/// Look up a state by code, ignoring case and surrounding whitespace.
pub fn state_by_code(code: &str) -> Option<&'static StateInfo> {
    let code = code.trim();
    STATES.iter().find(|s| s.code.eq_ignore_ascii_case(code))
}

/// Look up a state by its full name, ignoring case.
pub fn state_by_name(name: &str) -> Option<&'static StateInfo> {
    let name = name.trim();
    STATES.iter().find(|s| s.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_table_is_complete_and_unique() {
        assert_eq!(STATES.len(), 51);
        let codes: HashSet<_> = STATES.iter().map(|s| s.code).collect();
        assert_eq!(codes.len(), 51);
        assert!(codes.contains("DC"));
        assert!(codes.contains("UT"));
    }

    #[test]
    fn test_lookups() {
        assert_eq!(state_by_code(" ga ").map(|s| s.name), Some("Georgia"));
        assert_eq!(state_by_name("new york").map(|s| s.code), Some("NY"));
        assert_eq!(state_by_code("ZZ"), None);
    }
}
