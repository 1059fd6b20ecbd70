// Pack-wide safety state
use serde::{Deserialize, Serialize};

/// Severity of the pack, ordered from least to most severe.
///
/// The same scale is used for a single measurement's tier and for the
/// state currently in effect for the whole pack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SystemState {
    #[default]
    Normal,
    Warning,
    Critical,
    Fault,
}

impl SystemState {
    #[cfg(test)]
    pub const ALL: [SystemState; 4] = [
        SystemState::Normal,
        SystemState::Warning,
        SystemState::Critical,
        SystemState::Fault,
    ];

    /// Critical and Fault are never left automatically.
    pub fn is_latched(self) -> bool {
        matches!(self, SystemState::Critical | SystemState::Fault)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(SystemState::Normal < SystemState::Warning);
        assert!(SystemState::Warning < SystemState::Critical);
        assert!(SystemState::Critical < SystemState::Fault);
        assert_eq!(SystemState::default(), SystemState::Normal);
    }

    #[test]
    fn test_latched_states() {
        let latched: Vec<_> = SystemState::ALL.into_iter().filter(|s| s.is_latched()).collect();
        assert_eq!(latched, vec![SystemState::Critical, SystemState::Fault]);
    }
}
