//! Service factory and typed service clients over the sandbox transport

use std::sync::Arc;
use std::time::Duration;

use adwords_client::config::ApiConfig;
use adwords_client::protocol::ops::{
    AdGroup, AdGroupBids, AdGroupCriterion, AdGroupStatus, Criterion, Keyword, KeywordMatchType,
    Operation, Predicate, Selector,
};
use adwords_client::protocol::ErrorCode;
use adwords_client::sandbox::{FailureConfig, SandboxServer};
use adwords_client::service::{
    FactoryError, MockTransport, ServiceError, ServiceFactory, TransportError, ALL_SERVICES,
};

fn api_config() -> ApiConfig {
    ApiConfig {
        server: "https://sandbox.example.com".to_string(),
        developer_token: "test-token".to_string(),
        client_customer_id: Some("123-456-7890".to_string()),
        ..ApiConfig::default()
    }
}

fn factory_with(server: &SandboxServer, config: ApiConfig) -> ServiceFactory {
    ServiceFactory::new(config, Arc::new(MockTransport::with_server(server.clone())))
}

fn new_group(campaign_id: i64, name: &str) -> AdGroup {
    AdGroup {
        id: None,
        campaign_id,
        name: name.to_string(),
        status: AdGroupStatus::Enabled,
        bids: AdGroupBids::default(),
    }
}

#[test]
fn test_every_service_has_a_versioned_endpoint() {
    let server = SandboxServer::new();
    let factory = factory_with(&server, api_config());

    for signature in ALL_SERVICES {
        let client = factory.create_service(signature).unwrap();
        assert_eq!(
            client.endpoint(),
            format!(
                "https://sandbox.example.com/api/adwords/{}/{}/{}",
                signature.group, signature.version, signature.name
            )
        );
        assert_eq!(client.header().client_customer_id.as_deref(), Some("123-456-7890"));
    }
}

#[test]
fn test_missing_token_is_refused_before_any_call() {
    let server = SandboxServer::new();
    let config = ApiConfig {
        developer_token: "   ".to_string(),
        ..api_config()
    };
    let factory = factory_with(&server, config);

    assert!(matches!(
        factory.data_service(),
        Err(FactoryError::MissingDeveloperToken)
    ));
    assert!(server.calls().is_empty());
}

#[test]
fn test_relative_server_is_refused() {
    let server = SandboxServer::new();
    let config = ApiConfig {
        server: "sandbox.example.com".to_string(),
        ..api_config()
    };

    assert!(matches!(
        factory_with(&server, config).ad_group_service(),
        Err(FactoryError::InvalidServer { .. })
    ));
}

#[test]
fn test_response_header_is_recorded() {
    let server = SandboxServer::new();
    let seed = server.seed_demo();
    let service = factory_with(&server, api_config()).ad_group_service().unwrap();
    assert!(service.client().last_response_header().is_none());

    let page = service
        .get(
            &Selector::builder()
                .predicate(Predicate::equals("CampaignId", seed.campaign_id))
                .page_size(10)
                .build(),
        )
        .unwrap();
    assert_eq!(page.entries.len(), 3);

    let header = service.client().last_response_header().unwrap();
    assert!(header.request_id.starts_with("sbx-"));
    assert_eq!(header.operations, Some(3));
}

#[test]
fn test_validate_only_never_commits() {
    let server = SandboxServer::new();
    let seed = server.seed_demo();
    let config = ApiConfig {
        validate_only: true,
        ..api_config()
    };
    let service = factory_with(&server, config).ad_group_service().unwrap();

    let result = service
        .mutate(vec![Operation::add(new_group(seed.campaign_id, "Pluto Probe"))])
        .unwrap();
    assert_eq!(result.value.len(), 1);
    assert_eq!(server.ad_groups().len(), 3);
}

#[test]
fn test_mutate_is_all_or_nothing() {
    let server = SandboxServer::new();
    let seed = server.seed_demo();
    let service = factory_with(&server, api_config()).ad_group_service().unwrap();

    let mut unknown = new_group(seed.campaign_id, "Ghost");
    unknown.id = Some(987_654);

    let err = service
        .mutate(vec![
            Operation::add(new_group(seed.campaign_id, "Pluto Probe")),
            Operation::set(unknown),
        ])
        .unwrap_err();

    assert!(err.is_rejection());
    assert_eq!(server.ad_groups().len(), 3);
}

#[test]
fn test_criterion_add_then_filter() {
    let server = SandboxServer::new();
    let seed = server.seed_demo();
    let service = factory_with(&server, api_config())
        .ad_group_criterion_service()
        .unwrap();

    let added = service
        .mutate(vec![Operation::add(AdGroupCriterion {
            ad_group_id: seed.ad_group_id,
            criterion_id: None,
            criterion: Criterion::Keyword(Keyword {
                text: "space elevator".to_string(),
                match_type: KeywordMatchType::Phrase,
            }),
            max_cpc: None,
        })])
        .unwrap();
    let criterion_id = added.value[0].criterion_id.unwrap();

    let page = service
        .get(
            &Selector::builder()
                .predicate(Predicate::equals("AdGroupId", seed.ad_group_id))
                .predicate(Predicate::equals("MatchType", "PHRASE"))
                .page_size(10)
                .build(),
        )
        .unwrap();
    assert_eq!(page.entries.len(), 1);
    assert_eq!(page.entries[0].criterion_id, Some(criterion_id));
}

#[test]
fn test_transient_api_error_is_not_a_rejection() {
    let server = SandboxServer::new();
    server.inject_error("AdGroupService.get", ErrorCode::RateExceeded, "slow down");
    let service = factory_with(&server, api_config()).ad_group_service().unwrap();

    let err = service.get(&Selector::builder().build()).unwrap_err();
    match &err {
        ServiceError::Api { service, method, error } => {
            assert_eq!(service, "AdGroupService");
            assert_eq!(method, "get");
            assert_eq!(error.code, ErrorCode::RateExceeded);
        }
        other => panic!("expected API error, got {other:?}"),
    }
    assert!(!err.is_rejection());
}

#[test]
fn test_dropped_connection_surfaces_as_transport_error() {
    let server = SandboxServer::new();
    server.inject_failure(
        "DataService.getCriterionBidLandscape",
        FailureConfig::dropped().with_delay(Duration::from_millis(5)),
    );
    let service = factory_with(&server, api_config()).data_service().unwrap();

    let err = service
        .get_criterion_bid_landscape(&Selector::builder().build())
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Transport(TransportError::ConnectionDropped)
    ));
}
