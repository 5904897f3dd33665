//! Raid action events counted by the anti-raid window.

/// Kind of event appended to the raid action log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaidActionKind {
    /// A member joined and was admitted.
    Join,
    /// A join crossed the threshold and a ban was attempted.
    Ban,
    /// An administrator wiped the server with `/nuke`.
    Nuke,
}

impl RaidActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Join => "JOIN",
            Self::Ban => "BAN",
            Self::Nuke => "NUKE",
        }
    }
}
