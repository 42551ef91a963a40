//! Campaign resources.

use super::Resources;
use crate::api::payloads::{CampaignPayload, ListPayload, WaitlistEntryPayload};
use crate::api::{ApiRequest, DataConverter};
use crate::models::{Campaign, CampaignId, NewCampaign, WaitlistEntry};
use crate::request::RequestController;

const CAMPAIGNS_PATH: &str = "/api/v1/campaigns";

fn campaign_path(id: CampaignId) -> String {
    format!("{CAMPAIGNS_PATH}/{id}")
}

impl Resources {
    /// All campaigns owned by the account.
    pub fn campaigns(&self) -> RequestController<(), Vec<Campaign>> {
        self.controller(
            "campaigns",
            |_| Ok(ApiRequest::get(CAMPAIGNS_PATH)),
            |campaigns: ListPayload<CampaignPayload>| {
                campaigns
                    .into_vec()
                    .into_iter()
                    .map(DataConverter::convert_campaign)
                    .collect()
            },
        )
    }

    /// One campaign by id.
    pub fn campaign(&self) -> RequestController<CampaignId, Campaign> {
        self.controller(
            "campaign",
            |id: CampaignId| Ok(ApiRequest::get(campaign_path(id))),
            DataConverter::convert_campaign,
        )
    }

    /// Create a campaign after checking its name and slug.
    pub fn create_campaign(&self) -> RequestController<NewCampaign, Campaign> {
        self.controller(
            "create-campaign",
            |campaign: NewCampaign| {
                campaign.validate()?;
                ApiRequest::post(
                    CAMPAIGNS_PATH,
                    &DataConverter::create_campaign_request(&campaign),
                )
            },
            DataConverter::convert_campaign,
        )
    }

    /// Waitlist of one campaign, in position order.
    pub fn waitlist(&self) -> RequestController<CampaignId, Vec<WaitlistEntry>> {
        self.controller(
            "waitlist",
            |id: CampaignId| Ok(ApiRequest::get(format!("{}/waitlist", campaign_path(id)))),
            |entries: ListPayload<WaitlistEntryPayload>| {
                let mut entries: Vec<_> = entries
                    .into_vec()
                    .into_iter()
                    .map(DataConverter::convert_waitlist_entry)
                    .collect();
                entries.sort_by_key(|e| e.position);
                entries
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockBackend;
    use crate::error::Error;
    use crate::models::CampaignStatus;
    use crate::request::{ControllerOptions, ReloadPolicy, RequestStatus};
    use pretty_assertions::assert_eq;
    use reqwest::Method;
    use serde_json::json;
    use std::sync::Arc;
    use uuid::Uuid;

    const LAUNCH: &str = "6f1c2a9e-3b4d-4e5f-8a7b-9c0d1e2f3a4b";

    fn campaign_json(name: &str, status: &str, waitlist_count: u64) -> serde_json::Value {
        json!({
            "id": LAUNCH,
            "name": name,
            "slug": "launch",
            "status": status,
            "waitlist_count": waitlist_count,
            "created_at": "2026-01-05T12:00:00Z"
        })
    }

    fn resources(backend: MockBackend) -> Resources {
        Resources::new(Arc::new(backend), ControllerOptions::default())
    }

    #[tokio::test]
    async fn test_campaigns_accepts_wrapped_list() {
        let mut backend = MockBackend::new();
        backend
            .expect_call()
            .withf(|req, _| req.method == Method::GET && req.path == CAMPAIGNS_PATH)
            .returning(|_, _| Ok(json!({"data": [campaign_json("Launch", "active", 12)]})));

        let controller = resources(backend).campaigns();
        controller.execute(());
        let campaigns = controller.settled().await.into_data().unwrap();

        assert_eq!(campaigns.len(), 1);
        assert_eq!(campaigns[0].name, "Launch");
        assert_eq!(campaigns[0].status, CampaignStatus::Active);
        assert_eq!(campaigns[0].signups, 12);
        assert!(campaigns[0].is_open());
    }

    #[tokio::test]
    async fn test_campaign_by_id() {
        let id: CampaignId = LAUNCH.parse().unwrap();
        let mut backend = MockBackend::new();
        backend
            .expect_call()
            .withf(|req, _| req.path == format!("/api/v1/campaigns/{LAUNCH}"))
            .times(1)
            .returning(|_, _| Ok(campaign_json("Launch", "paused", 3)));

        let controller = resources(backend).campaign();
        controller.execute(id);
        let campaign = controller.settled().await.into_data().unwrap();

        assert_eq!(campaign.id, id);
        assert_eq!(campaign.status, CampaignStatus::Paused);
    }

    #[tokio::test]
    async fn test_create_campaign_rejects_bad_slug() {
        let mut backend = MockBackend::new();
        backend.expect_call().never();

        let controller = resources(backend).create_campaign();
        controller.execute(NewCampaign {
            name: "Launch".into(),
            slug: "Not A Slug".into(),
        });
        let state = controller.settled().await;

        assert_eq!(state.status(), RequestStatus::Failed);
        assert!(state.should_show_error());
        assert_eq!(
            state.error().unwrap().to_string(),
            "Invalid input: invalid campaign slug 'Not A Slug'"
        );
    }

    #[tokio::test]
    async fn test_create_campaign_trims_name() {
        let mut backend = MockBackend::new();
        backend
            .expect_call()
            .withf(|req, _| {
                req.method == Method::POST
                    && req.body == Some(json!({"name": "Launch", "slug": "launch"}))
            })
            .times(1)
            .returning(|_, _| Ok(campaign_json("Launch", "draft", 0)));

        let controller = resources(backend).create_campaign();
        controller.execute(NewCampaign {
            name: "  Launch ".into(),
            slug: "launch".into(),
        });
        let campaign = controller.settled().await.into_data().unwrap();

        assert_eq!(campaign.status, CampaignStatus::Draft);
        assert!(!campaign.is_open());
    }

    #[tokio::test]
    async fn test_waitlist_sorted_by_position() {
        let mut backend = MockBackend::new();
        backend
            .expect_call()
            .withf(|req, _| req.path == format!("/api/v1/campaigns/{LAUNCH}/waitlist"))
            .returning(|_, _| {
                Ok(json!([
                    {"id": Uuid::nil(), "email": "b@example.com", "position": 2,
                     "created_at": "2026-01-06T00:00:00Z"},
                    {"id": Uuid::nil(), "email": "a@example.com", "position": 1,
                     "referral_count": 4, "created_at": "2026-01-05T00:00:00Z"}
                ]))
            });

        let controller = resources(backend).waitlist();
        controller.execute(LAUNCH.parse().unwrap());
        let entries = controller.settled().await.into_data().unwrap();

        let emails: Vec<_> = entries.iter().map(|e| e.email.as_str()).collect();
        assert_eq!(emails, vec!["a@example.com", "b@example.com"]);
        assert_eq!(entries[0].referrals, 4);
        assert_eq!(entries[1].referrals, 0);
    }

    #[tokio::test]
    async fn test_refresh_keeps_list_on_failure_with_stale_while_revalidate() {
        let mut backend = MockBackend::new();
        let mut seq = mockall::Sequence::new();
        backend
            .expect_call()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(json!([campaign_json("Launch", "active", 1)])));
        backend
            .expect_call()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(Error::api(503, "Service Unavailable")));

        let resources = resources(backend).with_options(
            ControllerOptions::default().with_reload(ReloadPolicy::StaleWhileRevalidate),
        );
        let controller = resources.campaigns();

        controller.execute(());
        controller.settled().await;
        controller.execute(());
        let state = controller.settled().await;

        assert_eq!(state.status(), RequestStatus::Failed);
        assert_eq!(state.data().map(Vec::len), Some(1));
        assert!(state.error().unwrap().is_recoverable());
    }
}
