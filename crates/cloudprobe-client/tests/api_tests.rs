//! Client, waiter and teardown tests against a mock platform

use std::time::Duration;

use chrono::{TimeZone, Utc};
use cloudprobe_client::{
    BmhStateSource, ClientError, Fixture, FixtureLedger, InstancePhase, InstanceSpec,
    KubeBmhSource, NewCloudAccount, NewCredit, NewInstance, NewResourceMetadata, PlatformClient,
    ProductFilter, VnetSpec, wait_for_instance_deleted, wait_for_instance_phase,
    wait_for_ssh_key_deleted,
};
use cloudprobe_core::{
    AccountType, ComputeDefaults, CoreError, Poller, ProbeConfig, WaitConfig, WaitSettings,
};
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ACCOUNT: &str = "123456789012";
const INSTANCE: &str = "8c0e1b1e-1f53-4d1c-a5c8-2d3e4f5a6b7c";

fn client_for(server: &MockServer) -> PlatformClient {
    let config = ProbeConfig {
        global_url: server.uri(),
        regional_url: server.uri(),
        ..Default::default()
    };
    PlatformClient::new(&config, Some("test-token".to_string())).unwrap()
}

fn fast_poller() -> Poller {
    Poller::new(Duration::from_millis(10), Duration::from_secs(5)).unwrap()
}

fn instance_json(phase: &str) -> Value {
    json!({
        "metadata": {
            "cloudAccountId": ACCOUNT,
            "name": "automation-instance-x1y2z3w4",
            "resourceId": INSTANCE
        },
        "spec": { "instanceType": "vm-spr-sml" },
        "status": { "phase": phase, "message": "" }
    })
}

fn instance_path() -> String {
    format!("/v1/cloudaccounts/{ACCOUNT}/instances/id/{INSTANCE}")
}

mod requests {
    use super::*;

    #[tokio::test]
    async fn test_create_cloud_account_sends_token_and_body() {
        let server = MockServer::start().await;
        let account = NewCloudAccount::random("tester@example.com", AccountType::Premium);

        Mock::given(method("POST"))
            .and(path("/v1/cloudaccounts"))
            .and(header("authorization", "Bearer test-token"))
            .and(body_json(json!({
                "name": account.name,
                "owner": "tester@example.com",
                "tid": account.tid,
                "oid": account.oid,
                "type": "ACCOUNT_TYPE_PREMIUM"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": ACCOUNT })))
            .expect(1)
            .mount(&server)
            .await;

        let id = client_for(&server).create_cloud_account(&account).await.unwrap();
        assert_eq!(id, ACCOUNT);
    }

    #[tokio::test]
    async fn test_get_instance_decodes_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(instance_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(instance_json("Provisioning")))
            .mount(&server)
            .await;

        let instance = client_for(&server)
            .get_instance(ACCOUNT, INSTANCE)
            .await
            .unwrap();
        assert_eq!(instance.status.phase, InstancePhase::Provisioning);
        assert_eq!(instance.metadata.cloud_account_id, ACCOUNT);
    }

    #[tokio::test]
    async fn test_not_found_and_error_statuses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/cloudaccounts/name/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/cloudaccounts/name/broken"))
            .respond_with(ResponseTemplate::new(500).set_body_string("database unavailable"))
            .mount(&server)
            .await;

        let client = client_for(&server);

        let err = client.get_cloud_account_by_name("missing").await.unwrap_err();
        assert!(err.is_not_found());

        let err = client.get_cloud_account_by_name("broken").await.unwrap_err();
        match err {
            ClientError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "database unavailable");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_undecodable_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/cloudaccounts/id/42"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).get_cloud_account("42").await.unwrap_err();
        assert!(matches!(err, ClientError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_get_coupon_by_code() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/cloudcredits/coupons"))
            .and(query_param("code", "ABCD-EFGH"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "coupons": [{
                    "code": "ABCD-EFGH",
                    "amount": 100.0,
                    "creator": "idc_billing@intel.com",
                    "numUses": 2,
                    "numRedeemed": 1,
                    "isStandard": true
                }]
            })))
            .mount(&server)
            .await;

        let coupon = client_for(&server).get_coupon("ABCD-EFGH").await.unwrap();
        assert_eq!(coupon.num_redeemed, 1);
        assert!(!coupon.is_disabled());
    }

    #[tokio::test]
    async fn test_get_products_posts_filter() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/products"))
            .and(body_json(json!({ "accountType": "ACCOUNT_TYPE_INTEL" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "products": [{
                    "name": "bm-spr",
                    "rates": [{ "accountType": "ACCOUNT_TYPE_INTEL", "rate": "0.5" }]
                }]
            })))
            .mount(&server)
            .await;

        let filter = ProductFilter {
            account_type: Some(AccountType::Intel),
            ..Default::default()
        };
        let products = client_for(&server).get_products(&filter).await.unwrap();

        assert_eq!(products.len(), 1);
        let rate = products[0].rate_for(AccountType::Intel).unwrap();
        assert_eq!(rate.amount(), Some(0.5));
    }

    #[tokio::test]
    async fn test_create_ssh_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/v1/cloudaccounts/{ACCOUNT}/sshpublickeys")))
            .and(body_json(json!({
                "metadata": { "name": "key-1" },
                "spec": { "sshPublicKey": "ssh-ed25519 AAAAC3Nza tester@example.com" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "metadata": {
                    "cloudAccountId": ACCOUNT,
                    "name": "key-1",
                    "resourceId": "5f6a7b8c"
                },
                "spec": { "sshPublicKey": "ssh-ed25519 AAAAC3Nza tester@example.com" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let key = client_for(&server)
            .create_ssh_key(ACCOUNT, "key-1", "ssh-ed25519 AAAAC3Nza tester@example.com")
            .await
            .unwrap();
        assert_eq!(key.metadata.resource_id, "5f6a7b8c");
        assert_eq!(key.spec.ssh_public_key, "ssh-ed25519 AAAAC3Nza tester@example.com");
    }

    #[tokio::test]
    async fn test_create_vnet_is_a_put() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(format!("/v1/cloudaccounts/{ACCOUNT}/vnets")))
            .and(body_json(json!({
                "metadata": { "name": "us-dev-1a-default" },
                "spec": {
                    "region": "us-dev-1",
                    "availabilityZone": "us-dev-1a",
                    "prefixLength": 24
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "metadata": { "cloudAccountId": ACCOUNT, "name": "us-dev-1a-default" },
                "spec": { "region": "us-dev-1", "availabilityZone": "us-dev-1a", "prefixLength": 24 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let spec = VnetSpec::from_defaults(&ComputeDefaults::default());
        let vnet = client_for(&server)
            .create_vnet(ACCOUNT, "us-dev-1a-default", spec.clone())
            .await
            .unwrap();
        assert_eq!(vnet.spec, spec);
    }

    #[tokio::test]
    async fn test_create_instance_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/v1/cloudaccounts/{ACCOUNT}/instances")))
            .and(body_json(json!({
                "metadata": { "name": "automation-instance-x1y2z3w4" },
                "spec": {
                    "availabilityZone": "us-dev-1a",
                    "instanceType": "vm-spr-sml",
                    "machineImage": "ubuntu-2204-jammy-v20230122",
                    "runStrategy": "RerunOnFailure",
                    "sshPublicKeyNames": ["key-1"],
                    "interfaces": [{ "vNet": "us-dev-1a-default" }]
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(instance_json("Provisioning")))
            .expect(1)
            .mount(&server)
            .await;

        let request = NewInstance {
            metadata: NewResourceMetadata::named("automation-instance-x1y2z3w4"),
            spec: InstanceSpec::from_defaults(
                &ComputeDefaults::default(),
                vec!["key-1".to_string()],
                "us-dev-1a-default",
            ),
        };
        let instance = client_for(&server)
            .create_instance(ACCOUNT, &request)
            .await
            .unwrap();
        assert_eq!(instance.metadata.resource_id, INSTANCE);
    }

    #[tokio::test]
    async fn test_get_instance_by_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!(
                "/v1/cloudaccounts/{ACCOUNT}/instances/name/automation-instance-x1y2z3w4"
            )))
            .respond_with(ResponseTemplate::new(200).set_body_json(instance_json("Ready")))
            .expect(1)
            .mount(&server)
            .await;

        let instance = client_for(&server)
            .get_instance_by_name(ACCOUNT, "automation-instance-x1y2z3w4")
            .await
            .unwrap();
        assert_eq!(instance.status.phase, InstancePhase::Ready);
        assert_eq!(instance.metadata.resource_id, INSTANCE);
    }

    #[tokio::test]
    async fn test_redeem_coupon() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/cloudcredits/coupons/redeem"))
            .and(body_json(json!({ "code": "ABCD-EFGH", "cloudAccountId": ACCOUNT })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .redeem_coupon("ABCD-EFGH", ACCOUNT)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_credits() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/cloudcredits/credit"))
            .and(body_json(json!({
                "cloudAccountId": ACCOUNT,
                "originalAmount": 25.0,
                "reason": "initial",
                "expiration": "2030-01-01T00:00:00Z"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/cloudcredits/credit"))
            .and(query_param("cloudAccountId", ACCOUNT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "credits": [{
                    "cloudAccountId": ACCOUNT,
                    "couponCode": "ABCD-EFGH",
                    "originalAmount": 25.0,
                    "remainingAmount": 20.0
                }],
                "totalRemainingAmount": 20.0,
                "totalUsedAmount": 5.0,
                "totalUnAppliedAmount": 0.0
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/cloudcredits/credit/unapplied"))
            .and(query_param("cloudAccountId", ACCOUNT))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "remainingAmount": 20.0 })),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        client
            .create_credit(&NewCredit {
                cloud_account_id: ACCOUNT.to_string(),
                original_amount: 25.0,
                reason: "initial".to_string(),
                expiration: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
            })
            .await
            .unwrap();

        let summary = client.get_credits(ACCOUNT).await.unwrap();
        assert_eq!(summary.credits.len(), 1);
        assert_eq!(summary.credits[0].coupon_code, "ABCD-EFGH");
        assert_eq!(summary.credits[0].remaining_amount, 20.0);
        assert_eq!(summary.total_used_amount, 5.0);

        let unapplied = client.get_unapplied_credits(ACCOUNT).await.unwrap();
        assert_eq!(unapplied.remaining_amount, 20.0);
    }
}

mod waits {
    use super::*;

    #[tokio::test]
    async fn test_instance_deleted_after_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(instance_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(instance_json("Terminating")))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(instance_path()))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server);
        wait_for_instance_deleted(&client, &fast_poller(), ACCOUNT, INSTANCE)
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 3);
    }

    #[tokio::test]
    async fn test_ssh_key_deleted_after_not_found() {
        let server = MockServer::start().await;
        let key_path = format!("/v1/cloudaccounts/{ACCOUNT}/sshpublickeys/name/key-1");
        Mock::given(method("GET"))
            .and(path(key_path.clone()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "metadata": { "cloudAccountId": ACCOUNT, "name": "key-1" }
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(key_path))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server);
        wait_for_ssh_key_deleted(&client, &fast_poller(), ACCOUNT, "key-1")
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
    }

    #[tokio::test]
    async fn test_instance_phase_recovers_from_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(instance_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(instance_json("Failed")))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(instance_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(instance_json("Ready")))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let instance = wait_for_instance_phase(
            &client,
            &fast_poller(),
            ACCOUNT,
            INSTANCE,
            InstancePhase::Ready,
            Duration::from_secs(60),
        )
        .await
        .unwrap();

        assert_eq!(instance.status.phase, InstancePhase::Ready);
    }

    #[tokio::test]
    async fn test_instance_phase_aborts_after_failed_window() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(instance_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(instance_json("Failed")))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = wait_for_instance_phase(
            &client,
            &fast_poller(),
            ACCOUNT,
            INSTANCE,
            InstancePhase::Ready,
            Duration::from_millis(50),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ClientError::Core(CoreError::PollAborted { .. })));
        assert!(!err.is_timeout());
    }

    #[tokio::test]
    async fn test_instance_phase_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(instance_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(instance_json("Provisioning")))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let poller = Poller::new(Duration::from_millis(10), Duration::from_millis(60)).unwrap();
        let err = wait_for_instance_phase(
            &client,
            &poller,
            ACCOUNT,
            INSTANCE,
            InstancePhase::Ready,
            Duration::from_secs(240),
        )
        .await
        .unwrap_err();

        assert!(err.is_timeout());
    }
}

mod teardown {
    use super::*;

    fn fast_waits() -> WaitConfig {
        WaitConfig {
            instance_deleted: WaitSettings::new(Duration::from_millis(10), Duration::from_secs(2)),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_teardown_reverse_order_and_continues_past_failures() {
        let server = MockServer::start().await;
        let ca = format!("/v1/cloudaccounts/{ACCOUNT}");

        Mock::given(method("POST"))
            .and(path("/v1/cloudcredits/coupons/disable"))
            .and(body_json(json!({ "code": "ABCD-EFGH" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(instance_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(instance_path()))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(format!("{ca}/sshpublickeys/name/key-1")))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(format!("{ca}/vnets/name/us-dev-1a-default")))
            .respond_with(ResponseTemplate::new(500).set_body_string("vnet in use"))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(format!("/v1/cloudaccounts/id/{ACCOUNT}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let mut ledger = FixtureLedger::new();
        ledger.record(Fixture::CloudAccount {
            id: ACCOUNT.to_string(),
        });
        ledger.record(Fixture::Vnet {
            account: ACCOUNT.to_string(),
            name: "us-dev-1a-default".to_string(),
        });
        ledger.record(Fixture::SshKey {
            account: ACCOUNT.to_string(),
            name: "key-1".to_string(),
        });
        ledger.record(Fixture::Instance {
            account: ACCOUNT.to_string(),
            id: INSTANCE.to_string(),
        });
        ledger.record(Fixture::Coupon {
            code: "ABCD-EFGH".to_string(),
        });

        let report = ledger.teardown(&client_for(&server), &fast_waits()).await;

        assert!(ledger.is_empty());
        assert!(!report.is_clean());
        assert_eq!(report.removed.len(), 4);
        assert_eq!(report.failed.len(), 1);
        assert!(matches!(report.failed[0].0, Fixture::Vnet { .. }));

        let calls: Vec<String> = server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .map(|r| format!("{} {}", r.method, r.url.path()))
            .collect();

        assert_eq!(
            calls,
            vec![
                "POST /v1/cloudcredits/coupons/disable".to_string(),
                format!("DELETE {}", instance_path()),
                format!("GET {}", instance_path()),
                format!("DELETE {ca}/sshpublickeys/name/key-1"),
                format!("DELETE {ca}/vnets/name/us-dev-1a-default"),
                format!("DELETE /v1/cloudaccounts/id/{ACCOUNT}"),
            ]
        );
    }
}


mod bmh {
    use super::*;

    const HOSTS: &str = "/apis/metal3.io/v1alpha1/namespaces/metal3-1/baremetalhosts";

    fn kube_source(server: &MockServer) -> KubeBmhSource {
        let config = kube::Config::new(server.uri().parse().unwrap());
        KubeBmhSource::new(kube::Client::try_from(config).unwrap())
    }

    fn host_json(name: &str, consumer: Option<&str>, state: &str) -> Value {
        let mut spec = json!({ "online": true });
        if let Some(consumer) = consumer {
            spec["consumerRef"] = json!({ "kind": "VirtualMachine", "name": consumer });
        }
        json!({
            "apiVersion": "metal3.io/v1alpha1",
            "kind": "BareMetalHost",
            "metadata": { "name": name, "namespace": "metal3-1" },
            "spec": spec,
            "status": { "provisioning": { "state": state } }
        })
    }

    #[tokio::test]
    async fn test_find_by_consumer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(HOSTS))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "apiVersion": "metal3.io/v1alpha1",
                "kind": "BareMetalHostList",
                "metadata": { "resourceVersion": "1" },
                "items": [
                    host_json("pdx05-c01-bspr001", None, "available"),
                    host_json("pdx05-c01-bspr002", Some(INSTANCE), "provisioned")
                ]
            })))
            .mount(&server)
            .await;

        let source = kube_source(&server);

        let found = source.find_by_consumer("metal3-1", INSTANCE).await.unwrap();
        assert_eq!(found.as_deref(), Some("pdx05-c01-bspr002"));

        let missing = source.find_by_consumer("metal3-1", "someone-else").await.unwrap();
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn test_provisioning_state_of_missing_host() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{HOSTS}/pdx05-c01-bspr002")))
            .respond_with(ResponseTemplate::new(200).set_body_json(host_json(
                "pdx05-c01-bspr002",
                Some(INSTANCE),
                "provisioned",
            )))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{HOSTS}/ghost")))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "kind": "Status",
                "apiVersion": "v1",
                "metadata": {},
                "status": "Failure",
                "message": "baremetalhosts.metal3.io \"ghost\" not found",
                "reason": "NotFound",
                "code": 404
            })))
            .mount(&server)
            .await;

        let source = kube_source(&server);

        let state = source
            .provisioning_state("metal3-1", "pdx05-c01-bspr002")
            .await
            .unwrap();
        assert_eq!(state.as_deref(), Some("provisioned"));

        let state = source.provisioning_state("metal3-1", "ghost").await.unwrap();
        assert_eq!(state, None);
    }
}
