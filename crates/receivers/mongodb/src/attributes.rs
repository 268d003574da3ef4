/// Lock resources reported under `serverStatus.locks` since 3.0.
#[derive(
    Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, strum::IntoStaticStr, strum::EnumIter,
)]
pub enum LockNamespace {
    #[strum(serialize = "Collection")]
    Collection,
    #[strum(serialize = "Global")]
    Global,
    #[strum(serialize = "Database")]
    Database,
    #[strum(serialize = "Metadata")]
    Metadata,
    #[strum(serialize = "MMAPV1Journal")]
    MMAPV1Journal,
    #[strum(serialize = "oplog")]
    Oplog,
}

impl LockNamespace {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

#[derive(
    Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, strum::IntoStaticStr, strum::EnumIter,
)]
pub enum LockDimension {
    #[strum(serialize = "acquireCount")]
    AcquireCount,
    #[strum(serialize = "acquireWaitCount")]
    AcquireWaitCount,
    #[strum(serialize = "timeAcquiringMicros")]
    TimeAcquiringMicros,
    #[strum(serialize = "deadlockCount")]
    DeadlockCount,
}

impl LockDimension {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

#[derive(
    Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, strum::IntoStaticStr, strum::EnumIter,
)]
pub enum LockMode {
    #[strum(serialize = "r")]
    IntentShared,
    #[strum(serialize = "w")]
    IntentExclusive,
    #[strum(serialize = "R")]
    Shared,
    #[strum(serialize = "W")]
    Exclusive,
}

impl LockMode {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Replica set member state labels as reported by `replSetGetStatus`.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, strum::EnumString)]
pub enum MemberState {
    #[strum(serialize = "PRIMARY")]
    Primary,
    #[strum(serialize = "SECONDARY")]
    Secondary,
    #[strum(default)]
    Other(String),
}

impl MemberState {
    pub fn from_label(label: &str) -> Self {
        label
            .parse()
            .unwrap_or_else(|_| Self::Other(label.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn lock_cross_product_covers_every_combination() {
        let combinations = LockNamespace::iter().count()
            * LockDimension::iter().count()
            * LockMode::iter().count();
        assert_eq!(combinations, 6 * 4 * 4);
        assert_eq!(LockNamespace::Oplog.as_str(), "oplog");
        assert_eq!(LockMode::Shared.as_str(), "R");
    }

    #[test]
    fn member_state_labels() {
        assert_eq!(MemberState::from_label("PRIMARY"), MemberState::Primary);
        assert_eq!(MemberState::from_label("SECONDARY"), MemberState::Secondary);
        assert_eq!(
            MemberState::from_label("ARBITER"),
            MemberState::Other("ARBITER".to_string())
        );
    }

    #[test]
    fn unknown_member_states_keep_their_label() {
        let state = MemberState::from_label("RECOVERING");
        let copy = state.clone();
        assert_eq!(copy, state);
        assert_ne!(state, MemberState::Secondary);
        let MemberState::Other(label) = state else {
            panic!("expected an unknown state");
        };
        assert_eq!(label, "RECOVERING");
    }
}
