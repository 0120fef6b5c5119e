//! Paged queries against the sandbox server

use std::sync::Arc;

use adwords_client::config::ApiConfig;
use adwords_client::protocol::ops::data::fields;
use adwords_client::protocol::ops::{
    AdGroup, AdGroupBids, AdGroupStatus, BidLandscapePoint, CriterionBidLandscape, Money,
    Predicate, Selector, SortOrder,
};
use adwords_client::protocol::ErrorCode;
use adwords_client::sandbox::{DemoSeed, SandboxServer};
use adwords_client::service::{MockTransport, ServiceError, ServiceFactory};

const LANDSCAPE_KEY: &str = "DataService.getCriterionBidLandscape";
const AD_GROUP_GET_KEY: &str = "AdGroupService.get";

fn setup() -> (SandboxServer, DemoSeed, ServiceFactory) {
    let server = SandboxServer::new();
    let seed = server.seed_demo();
    let config = ApiConfig {
        developer_token: "test-token".to_string(),
        ..ApiConfig::default()
    };
    let factory = ServiceFactory::new(config, Arc::new(MockTransport::with_server(server.clone())));
    (server, seed, factory)
}

fn landscape_selector(seed: &DemoSeed, page_size: u32) -> Selector {
    Selector::builder()
        .fields([fields::AD_GROUP_ID, fields::CRITERION_ID, fields::BID, fields::LOCAL_CLICKS])
        .predicate(Predicate::equals(fields::AD_GROUP_ID, seed.ad_group_id))
        .predicate(Predicate::equals(fields::CRITERION_ID, seed.criterion_id))
        .page_size(page_size)
        .build()
}

fn point(step: i64) -> BidLandscapePoint {
    BidLandscapePoint {
        bid: Money::from_micros(step * 100_000),
        clicks: step,
        cost: Money::from_micros(step * 200_000),
        impressions: step * 10,
    }
}

#[test]
fn test_landscape_pages_advance_by_points() {
    let (server, seed, factory) = setup();
    let service = factory.data_service().unwrap();

    let mut pages = service.bid_landscapes(landscape_selector(&seed, 5));
    let mut offsets = Vec::new();
    let mut sizes = Vec::new();
    loop {
        let offset = pages.offset();
        match pages.next() {
            Some(page) => {
                offsets.push(offset);
                sizes.push(page.unwrap().entries.iter().map(|l| l.landscape_points.len()).sum::<usize>());
            }
            None => break,
        }
    }

    assert_eq!(offsets, vec![0, 5, 10]);
    assert_eq!(sizes, vec![5, 5, 2]);
    assert_eq!(pages.calls(), 3);
    assert_eq!(pages.offset(), 12);
    assert_eq!(server.call_count(LANDSCAPE_KEY), 3);
}

#[test]
fn test_exact_multiple_needs_one_empty_page() {
    let (server, seed, factory) = setup();
    let service = factory.data_service().unwrap();

    let pages: Vec<_> = service
        .bid_landscapes(landscape_selector(&seed, 4))
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(pages.len(), 4);
    assert!(pages[3].entries.is_empty());
    assert_eq!(server.call_count(LANDSCAPE_KEY), 4);
}

#[test]
fn test_uneven_landscapes_page_by_sub_items() {
    let (server, seed, factory) = setup();
    // A second criterion whose landscape has three points
    server.seed_landscape(CriterionBidLandscape {
        ad_group_id: seed.ad_group_id,
        criterion_id: 7777,
        start_date: "20100101".to_string(),
        end_date: "20100108".to_string(),
        landscape_points: (1..=3).map(point).collect(),
    });
    let service = factory.data_service().unwrap();

    let selector = Selector::builder()
        .predicate(Predicate::equals(fields::AD_GROUP_ID, seed.ad_group_id))
        .page_size(10)
        .build();
    let pages: Vec<_> = service
        .bid_landscapes(selector)
        .collect::<Result<_, _>>()
        .unwrap();

    // 12 + 3 points: pages of 10 and 5
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].entries.len(), 1);
    assert_eq!(pages[1].entries.len(), 2);
    assert_eq!(pages[1].entries[1].criterion_id, 7777);
    assert_eq!(server.call_count(LANDSCAPE_KEY), 2);
}

#[test]
fn test_no_matching_landscape_stops_after_one_call() {
    let (server, _seed, factory) = setup();
    let service = factory.data_service().unwrap();

    let selector = Selector::builder()
        .predicate(Predicate::equals(fields::CRITERION_ID, 31337))
        .page_size(5)
        .build();
    let pages: Vec<_> = service.bid_landscapes(selector).collect();

    assert_eq!(pages.len(), 1);
    assert!(pages[0].as_ref().unwrap().entries.is_empty());
    assert_eq!(server.call_count(LANDSCAPE_KEY), 1);
}

#[test]
fn test_ad_group_entries_in_name_order() {
    let (server, seed, factory) = setup();
    let service = factory.ad_group_service().unwrap();

    let selector = Selector::builder()
        .fields(["Id", "Name"])
        .predicate(Predicate::equals("CampaignId", seed.campaign_id))
        .order_by("Name", SortOrder::Ascending)
        .page_size(2)
        .build();

    let names: Vec<String> = service
        .pages(selector)
        .entries()
        .map(|group| group.unwrap().name)
        .collect();

    assert_eq!(names, vec!["Jupiter Tours", "Mars Cruise", "Venus Flyby"]);
    assert_eq!(server.call_count(AD_GROUP_GET_KEY), 2);
}

#[test]
fn test_status_predicate_filters_entries() {
    let (_server, seed, factory) = setup();
    let service = factory.ad_group_service().unwrap();

    let selector = Selector::builder()
        .predicate(Predicate::equals("CampaignId", seed.campaign_id))
        .predicate(Predicate::is_in("Status", ["PAUSED"]))
        .page_size(10)
        .build();

    let groups: Vec<AdGroup> = service
        .pages(selector)
        .entries()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].name, "Venus Flyby");
    assert_eq!(groups[0].status, AdGroupStatus::Paused);
}

#[test]
fn test_remote_error_ends_iteration() {
    let (server, seed, factory) = setup();
    let service = factory.ad_group_service().unwrap();

    let selector = Selector::builder()
        .predicate(Predicate::equals("Budget", seed.campaign_id))
        .page_size(10)
        .build();
    let results: Vec<_> = service.pages(selector).collect();

    assert_eq!(results.len(), 1);
    match &results[0] {
        Err(ServiceError::Api { error, .. }) => assert_eq!(error.code, ErrorCode::InvalidRequest),
        other => panic!("expected API error, got {other:?}"),
    }
    assert_eq!(server.call_count(AD_GROUP_GET_KEY), 1);
}

#[test]
fn test_new_ad_groups_show_up_in_listing() {
    let (_server, seed, factory) = setup();
    let service = factory.ad_group_service().unwrap();

    let created = service
        .mutate(vec![adwords_client::protocol::ops::Operation::add(AdGroup {
            id: None,
            campaign_id: seed.campaign_id,
            name: "Saturn Rings".to_string(),
            status: AdGroupStatus::Enabled,
            bids: AdGroupBids::default(),
        })])
        .unwrap();
    assert!(created.value[0].id.is_some());

    let selector = Selector::builder()
        .predicate(Predicate::equals("CampaignId", seed.campaign_id))
        .page_size(2)
        .build();
    let count = service.pages(selector).entries().count();
    assert_eq!(count, 4);
}
