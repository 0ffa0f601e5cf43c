use std::fmt;

/// The externally visible team identifier, `<PREFIX>-NNN` with a zero-padded
/// (minimum 3 digits) sequence number. Only ever constructed from a known
/// prefix and a sequence number allocated by `SequenceAllocator`, or parsed
/// back out of a persisted string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TeamId(String);

impl TeamId {
    pub fn new(
        prefix: &str,
        number: i64,
    ) -> Self {
        Self(format!("{prefix}-{number:03}"))
    }

    pub fn parse(
        raw: &str,
        prefix: &str,
    ) -> Result<Self, String> {
        let suffix = raw
            .strip_prefix(prefix)
            .and_then(|s| s.strip_prefix('-'))
            .ok_or_else(|| format!("{raw:?} does not start with {prefix:?}-"))?;
        suffix
            .parse::<i64>()
            .map_err(|_| format!("{raw:?} has a non-numeric suffix"))?;
        Ok(Self(raw.to_string()))
    }

    /// The numeric suffix, used by startup reconciliation to compute
    /// `max(parsedNumber(team.teamId))`.
    pub fn numeric_suffix(&self) -> Option<i64> {
        self.0.rsplit_once('-').and_then(|(_, n)| n.parse().ok())
    }
}

impl fmt::Display for TeamId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for TeamId {
    fn as_ref(&self) -> &str { &self.0 }
}

impl From<TeamId> for String {
    fn from(value: TeamId) -> Self { value.0 }
}

#[cfg(test)]
mod tests {
    use super::TeamId;

    #[test]
    fn pads_to_three_digits() {
        assert_eq!(TeamId::new("ICCT", 1).to_string(), "ICCT-001");
        assert_eq!(TeamId::new("ICCT", 42).to_string(), "ICCT-042");
    }

    #[test]
    fn does_not_truncate_beyond_three_digits() {
        assert_eq!(TeamId::new("ICCT", 1234).to_string(), "ICCT-1234");
    }

    #[test]
    fn numeric_suffix_round_trips() {
        let id = TeamId::new("ICCT", 7);
        assert_eq!(id.numeric_suffix(), Some(7));
    }

    #[test]
    fn parse_rejects_wrong_prefix() {
        assert!(TeamId::parse("OTHR-001", "ICCT").is_err());
    }

    #[test]
    fn parse_rejects_non_numeric_suffix() {
        assert!(TeamId::parse("ICCT-abc", "ICCT").is_err());
    }
}
