//! Campaign and waitlist models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

uuid_id! {
    /// Campaign identifier.
    CampaignId
}

/// Campaign lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CampaignStatus {
    #[default]
    Draft,
    Active,
    Paused,
    Archived,
}

impl std::fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "Draft"),
            Self::Active => write!(f, "Active"),
            Self::Paused => write!(f, "Paused"),
            Self::Archived => write!(f, "Archived"),
        }
    }
}

/// A waitlist campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub name: String,
    /// Public URL slug.
    pub slug: String,
    pub status: CampaignStatus,
    /// Number of waitlist signups.
    pub signups: u64,
    pub created_at: DateTime<Utc>,
}

impl Campaign {
    /// Whether the campaign accepts signups.
    pub fn is_open(&self) -> bool {
        self.status == CampaignStatus::Active
    }
}

/// Request to create a campaign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCampaign {
    pub name: String,
    pub slug: String,
}

impl NewCampaign {
    /// Slugs are lower-case ASCII letters, digits and dashes.
    pub fn validate(&self) -> crate::Result<()> {
        if self.name.trim().is_empty() {
            return Err(crate::Error::invalid_input("campaign name must not be empty"));
        }
        let valid_slug = !self.slug.is_empty()
            && !self.slug.starts_with('-')
            && !self.slug.ends_with('-')
            && self
                .slug
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !valid_slug {
            return Err(crate::Error::invalid_input(format!(
                "invalid campaign slug '{}'",
                self.slug
            )));
        }
        Ok(())
    }
}

/// One person on a campaign's waitlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitlistEntry {
    pub id: Uuid,
    pub email: String,
    /// 1-based place in line.
    pub position: u32,
    /// Signups referred by this entry.
    pub referrals: u32,
    pub joined_at: DateTime<Utc>,
}
