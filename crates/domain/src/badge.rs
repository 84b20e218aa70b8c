use std::slice::Iter;

use chrono::{DateTime, Utc};

use crate::{CreateError, ReadError, WorkoutSession};

#[allow(async_fn_in_trait)]
pub trait BadgeRepository {
    async fn read_unlocked_badges(&self) -> Result<Vec<UnlockedBadge>, ReadError>;
    /// Appends to the unlocked-badges collection. Callers are responsible
    /// for not unlocking the same badge twice.
    async fn create_unlocked_badge(
        &self,
        badge: UnlockedBadge,
    ) -> Result<UnlockedBadge, CreateError>;
}

#[allow(async_fn_in_trait)]
pub trait BadgeService {
    async fn get_unlocked_badges(&self) -> Result<Vec<UnlockedBadge>, ReadError>;
    async fn is_badge_unlocked(&self, id: BadgeID) -> Result<bool, ReadError>;
    /// `true` iff the badge was newly unlocked by this call.
    async fn unlock_badge(&self, id: BadgeID) -> Result<bool, CreateError>;
    /// Evaluates every unlock condition against the stored history and the
    /// just-completed session, returning the badges unlocked by this call.
    async fn check_and_unlock_badges(
        &self,
        current: &WorkoutSession,
    ) -> Result<Vec<BadgeID>, CreateError>;
    /// Progress towards a session-count badge; `None` for strength and
    /// plyometric badges, which have no progress metric.
    async fn get_badge_progress(&self, id: BadgeID) -> Result<Option<BadgeProgress>, ReadError>;
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum BadgeID {
    FirstSession,
    FiveSessions,
    TenSessions,
    TwentyFiveSessions,
    FiftySessions,
    HundredSessions,
    LegCurl50Kg,
    LegCurl75Kg,
    LegCurl100Kg,
    LegRaise50Kg,
    LegRaise75Kg,
    LegRaise100Kg,
    CalfRaise75Kg,
    CalfRaise100Kg,
    CalfRaise150Kg,
    HipThrust100Kg,
    HipThrust150Kg,
    HipThrust200Kg,
    BoxJump30In,
    BoxJump40In,
    BoxJump50In,
}

impl BadgeID {
    pub fn iter() -> Iter<'static, BadgeID> {
        static BADGES: [BadgeID; 21] = [
            BadgeID::FirstSession,
            BadgeID::FiveSessions,
            BadgeID::TenSessions,
            BadgeID::TwentyFiveSessions,
            BadgeID::FiftySessions,
            BadgeID::HundredSessions,
            BadgeID::LegCurl50Kg,
            BadgeID::LegCurl75Kg,
            BadgeID::LegCurl100Kg,
            BadgeID::LegRaise50Kg,
            BadgeID::LegRaise75Kg,
            BadgeID::LegRaise100Kg,
            BadgeID::CalfRaise75Kg,
            BadgeID::CalfRaise100Kg,
            BadgeID::CalfRaise150Kg,
            BadgeID::HipThrust100Kg,
            BadgeID::HipThrust150Kg,
            BadgeID::HipThrust200Kg,
            BadgeID::BoxJump30In,
            BadgeID::BoxJump40In,
            BadgeID::BoxJump50In,
        ];
        BADGES.iter()
    }

    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            BadgeID::FirstSession => "first_session",
            BadgeID::FiveSessions => "five_sessions",
            BadgeID::TenSessions => "ten_sessions",
            BadgeID::TwentyFiveSessions => "twenty_five_sessions",
            BadgeID::FiftySessions => "fifty_sessions",
            BadgeID::HundredSessions => "hundred_sessions",
            BadgeID::LegCurl50Kg => "leg_curl_50kg",
            BadgeID::LegCurl75Kg => "leg_curl_75kg",
            BadgeID::LegCurl100Kg => "leg_curl_100kg",
            BadgeID::LegRaise50Kg => "leg_raise_50kg",
            BadgeID::LegRaise75Kg => "leg_raise_75kg",
            BadgeID::LegRaise100Kg => "leg_raise_100kg",
            BadgeID::CalfRaise75Kg => "calf_raise_75kg",
            BadgeID::CalfRaise100Kg => "calf_raise_100kg",
            BadgeID::CalfRaise150Kg => "calf_raise_150kg",
            BadgeID::HipThrust100Kg => "hip_thrust_100kg",
            BadgeID::HipThrust150Kg => "hip_thrust_150kg",
            BadgeID::HipThrust200Kg => "hip_thrust_200kg",
            BadgeID::BoxJump30In => "box_jump_30in",
            BadgeID::BoxJump40In => "box_jump_40in",
            BadgeID::BoxJump50In => "box_jump_50in",
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            BadgeID::FirstSession => "First Step",
            BadgeID::FiveSessions => "Getting Started",
            BadgeID::TenSessions => "Dedicated",
            BadgeID::TwentyFiveSessions => "Committed",
            BadgeID::FiftySessions => "Unstoppable",
            BadgeID::HundredSessions => "Legend",
            BadgeID::LegCurl50Kg => "Leg Curl Starter",
            BadgeID::LegCurl75Kg => "Leg Curl Intermediate",
            BadgeID::LegCurl100Kg => "Leg Curl Master",
            BadgeID::LegRaise50Kg => "Leg Raise Starter",
            BadgeID::LegRaise75Kg => "Leg Raise Intermediate",
            BadgeID::LegRaise100Kg => "Leg Raise Master",
            BadgeID::CalfRaise75Kg => "Calf Raise Starter",
            BadgeID::CalfRaise100Kg => "Calf Raise Intermediate",
            BadgeID::CalfRaise150Kg => "Calf Raise Master",
            BadgeID::HipThrust100Kg => "Hip Thrust Starter",
            BadgeID::HipThrust150Kg => "Hip Thrust Intermediate",
            BadgeID::HipThrust200Kg => "Hip Thrust Master",
            BadgeID::BoxJump30In => "Box Jump Starter",
            BadgeID::BoxJump40In => "Box Jump Intermediate",
            BadgeID::BoxJump50In => "Box Jump Master",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            BadgeID::FirstSession => "Complete your first training session",
            BadgeID::FiveSessions => "Complete 5 training sessions",
            BadgeID::TenSessions => "Complete 10 training sessions",
            BadgeID::TwentyFiveSessions => "Complete 25 training sessions",
            BadgeID::FiftySessions => "Complete 50 training sessions",
            BadgeID::HundredSessions => "Complete 100 training sessions",
            BadgeID::LegCurl50Kg => "Lift 50kg on seated leg curls",
            BadgeID::LegCurl75Kg => "Lift 75kg on seated leg curls",
            BadgeID::LegCurl100Kg => "Lift 100kg on seated leg curls",
            BadgeID::LegRaise50Kg => "Lift 50kg on seated leg raises",
            BadgeID::LegRaise75Kg => "Lift 75kg on seated leg raises",
            BadgeID::LegRaise100Kg => "Lift 100kg on seated leg raises",
            BadgeID::CalfRaise75Kg => "Lift 75kg on weighted calf raises",
            BadgeID::CalfRaise100Kg => "Lift 100kg on weighted calf raises",
            BadgeID::CalfRaise150Kg => "Lift 150kg on weighted calf raises",
            BadgeID::HipThrust100Kg => "Lift 100kg on weighted hip thrusts",
            BadgeID::HipThrust150Kg => "Lift 150kg on weighted hip thrusts",
            BadgeID::HipThrust200Kg => "Lift 200kg on weighted hip thrusts",
            BadgeID::BoxJump30In => "Jump 30 inches onto the box",
            BadgeID::BoxJump40In => "Jump 40 inches onto the box",
            BadgeID::BoxJump50In => "Jump 50 inches onto the box",
        }
    }

    #[must_use]
    pub fn icon(self) -> &'static str {
        match self.category() {
            BadgeCategory::Sessions => match self {
                BadgeID::FirstSession => "🏀",
                BadgeID::FiveSessions => "💪",
                BadgeID::TenSessions => "🔥",
                BadgeID::TwentyFiveSessions => "⭐",
                BadgeID::FiftySessions => "🚀",
                _ => "👑",
            },
            BadgeCategory::Strength => match self {
                BadgeID::CalfRaise75Kg | BadgeID::CalfRaise100Kg | BadgeID::CalfRaise150Kg => "🐄",
                BadgeID::HipThrust100Kg | BadgeID::HipThrust150Kg | BadgeID::HipThrust200Kg => {
                    "🍑"
                }
                _ => "🦵",
            },
            BadgeCategory::Plyometric => "📦",
        }
    }

    #[must_use]
    pub fn category(self) -> BadgeCategory {
        match self {
            BadgeID::FirstSession
            | BadgeID::FiveSessions
            | BadgeID::TenSessions
            | BadgeID::TwentyFiveSessions
            | BadgeID::FiftySessions
            | BadgeID::HundredSessions => BadgeCategory::Sessions,
            BadgeID::LegCurl50Kg
            | BadgeID::LegCurl75Kg
            | BadgeID::LegCurl100Kg
            | BadgeID::LegRaise50Kg
            | BadgeID::LegRaise75Kg
            | BadgeID::LegRaise100Kg
            | BadgeID::CalfRaise75Kg
            | BadgeID::CalfRaise100Kg
            | BadgeID::CalfRaise150Kg
            | BadgeID::HipThrust100Kg
            | BadgeID::HipThrust150Kg
            | BadgeID::HipThrust200Kg => BadgeCategory::Strength,
            BadgeID::BoxJump30In | BadgeID::BoxJump40In | BadgeID::BoxJump50In => {
                BadgeCategory::Plyometric
            }
        }
    }

    /// Session count at which this badge unlocks, for session-count badges.
    #[must_use]
    pub fn session_target(self) -> Option<u32> {
        match self {
            BadgeID::FirstSession => Some(1),
            BadgeID::FiveSessions => Some(5),
            BadgeID::TenSessions => Some(10),
            BadgeID::TwentyFiveSessions => Some(25),
            BadgeID::FiftySessions => Some(50),
            BadgeID::HundredSessions => Some(100),
            _ => None,
        }
    }
}

impl TryFrom<&str> for BadgeID {
    type Error = BadgeIDError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        BadgeID::iter()
            .find(|id| id.id() == value)
            .copied()
            .ok_or_else(|| BadgeIDError::Unknown(value.to_string()))
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum BadgeIDError {
    #[error("Unknown badge id: {0}")]
    Unknown(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeCategory {
    Sessions,
    Strength,
    Plyometric,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnlockedBadge {
    pub id: BadgeID,
    pub unlocked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BadgeProgress {
    pub badge_id: BadgeID,
    pub current: u32,
    pub target: u32,
    pub percentage: f64,
}

/// Three-tier unlock thresholds for one recognized strength movement,
/// matched by substring against logged exercise names, highest tier first.
pub struct StrengthStandard {
    pub movement: &'static str,
    pub tiers: [(f64, BadgeID); 3],
}

pub const STRENGTH_STANDARDS: [StrengthStandard; 4] = [
    StrengthStandard {
        movement: "Leg Curl",
        tiers: [
            (100.0, BadgeID::LegCurl100Kg),
            (75.0, BadgeID::LegCurl75Kg),
            (50.0, BadgeID::LegCurl50Kg),
        ],
    },
    StrengthStandard {
        movement: "Leg Raise",
        tiers: [
            (100.0, BadgeID::LegRaise100Kg),
            (75.0, BadgeID::LegRaise75Kg),
            (50.0, BadgeID::LegRaise50Kg),
        ],
    },
    StrengthStandard {
        movement: "Calf Raise",
        tiers: [
            (150.0, BadgeID::CalfRaise150Kg),
            (100.0, BadgeID::CalfRaise100Kg),
            (75.0, BadgeID::CalfRaise75Kg),
        ],
    },
    StrengthStandard {
        movement: "Hip Thrust",
        tiers: [
            (200.0, BadgeID::HipThrust200Kg),
            (150.0, BadgeID::HipThrust150Kg),
            (100.0, BadgeID::HipThrust100Kg),
        ],
    },
];

pub const BOX_JUMP_TIERS: [(f64, BadgeID); 3] = [
    (50.0, BadgeID::BoxJump50In),
    (40.0, BadgeID::BoxJump40In),
    (30.0, BadgeID::BoxJump30In),
];

/// Session-count badge unlocking at exactly this count. The check fires
/// only at the moment the count first reaches the threshold; a skipped
/// check at that count means the badge stays locked for good.
#[must_use]
pub fn session_count_badge(session_count: usize) -> Option<BadgeID> {
    match session_count {
        1 => Some(BadgeID::FirstSession),
        5 => Some(BadgeID::FiveSessions),
        10 => Some(BadgeID::TenSessions),
        25 => Some(BadgeID::TwentyFiveSessions),
        50 => Some(BadgeID::FiftySessions),
        100 => Some(BadgeID::HundredSessions),
        _ => None,
    }
}

/// Walks the tiers from highest to lowest and returns the first whose
/// threshold is met and whose badge is still locked. Tiers are mutually
/// exclusive per check: at most one badge fires, and a tier that is met
/// but already unlocked stops nothing below it from being considered.
#[must_use]
pub fn qualifying_tier(
    value: f64,
    tiers: &[(f64, BadgeID)],
    is_unlocked: impl Fn(BadgeID) -> bool,
) -> Option<BadgeID> {
    tiers
        .iter()
        .find(|(threshold, id)| value >= *threshold && !is_unlocked(*id))
        .map(|(_, id)| *id)
}

#[must_use]
pub fn badge_progress(badge_id: BadgeID, session_count: usize) -> Option<BadgeProgress> {
    let target = badge_id.session_target()?;
    let current = u32::try_from(session_count).unwrap_or(u32::MAX).min(target);
    Some(BadgeProgress {
        badge_id,
        current,
        target,
        percentage: f64::from(current) / f64::from(target) * 100.0,
    })
}
