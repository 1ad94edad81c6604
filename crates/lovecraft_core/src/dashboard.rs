//! crates/lovecraft_core/src/dashboard.rs
//!
//! Aggregate numbers and badges for a user's dashboard, computed over surprises
//! that were already fetched.

use crate::domain::Surprise;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashboardStats {
    pub total_surprises: u64,
    pub total_views: u64,
    pub total_completed_views: u64,
    /// Completed views over views, rounded. Zero when nothing was viewed yet.
    pub completion_rate_percent: u64,
}

impl DashboardStats {
    pub fn from_surprises(surprises: &[Surprise]) -> Self {
        let total_views = surprises.iter().fold(0u64, |acc, s| acc.saturating_add(s.views));
        let total_completed_views = surprises
            .iter()
            .fold(0u64, |acc, s| acc.saturating_add(s.completed_views));
        let completion_rate_percent = if total_views == 0 {
            0
        } else {
            let scaled = u128::from(total_completed_views) * 100 + u128::from(total_views / 2);
            u64::try_from(scaled / u128::from(total_views)).unwrap_or(u64::MAX)
        };

        Self {
            total_surprises: surprises.len() as u64,
            total_views,
            total_completed_views,
            completion_rate_percent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Badge {
    FirstSurprise,
    Storyteller,
    Popular,
    Heartbreaker,
}

impl Badge {
    pub const ALL: [Badge; 4] = [
        Badge::FirstSurprise,
        Badge::Storyteller,
        Badge::Popular,
        Badge::Heartbreaker,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Badge::FirstSurprise => "first_surprise",
            Badge::Storyteller => "storyteller",
            Badge::Popular => "popular",
            Badge::Heartbreaker => "heartbreaker",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Badge::FirstSurprise => "Created a first surprise",
            Badge::Storyteller => "Created five surprises",
            Badge::Popular => "Surprises opened ten times",
            Badge::Heartbreaker => "A recipient read a message to the end",
        }
    }

    fn is_unlocked(self, stats: &DashboardStats) -> bool {
        match self {
            Badge::FirstSurprise => stats.total_surprises >= 1,
            Badge::Storyteller => stats.total_surprises >= 5,
            Badge::Popular => stats.total_views >= 10,
            Badge::Heartbreaker => stats.total_completed_views >= 1,
        }
    }

    /// Badges earned so far, in catalog order.
    pub fn unlocked(stats: &DashboardStats) -> Vec<Badge> {
        Self::ALL
            .into_iter()
            .filter(|badge| badge.is_unlocked(stats))
            .collect()
    }
}
