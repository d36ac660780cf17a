use serde::Deserialize;

/// Engine configuration. Deserialized from whatever config source the
/// embedding application uses; all fields default to the permissive setting.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    require_full_ballot: bool,
}

impl Config {
    pub fn new(require_full_ballot: bool) -> Self {
        Self {
            require_full_ballot,
        }
    }

    /// Whether a ballot must carry a selection for every open position.
    /// When false (the default), partial ballots are accepted and a blank
    /// position counts as an abstention.
    pub fn require_full_ballot(&self) -> bool {
        self.require_full_ballot
    }
}
