mod mock;

use ami_refresh_agents::nodegroups::apply_launch_template_version;
use ami_refresh_agents::response::{parse_event, run_stage};
use ami_refresh_agents::services::{UpdateErrorRecord, UpdateRecord};
use ami_refresh_types::NodeGroupTarget;
use chrono::{TimeZone, Utc};
use mock::{Call, Failure, MockAws};
use serde_json::json;

fn target() -> NodeGroupTarget {
    parse_event(
        r#"{
            "launchTemplate": {"id": "lt-1", "name": "workers", "version": "1"},
            "clusterName": "A",
            "nodegroupName": "ng-1",
            "version": "2"
        }"#,
    )
    .unwrap()
}

fn update_record() -> UpdateRecord {
    UpdateRecord {
        id: Some("7f2c1a3e-update".to_string()),
        status: Some("InProgress".to_string()),
        update_type: Some("VersionUpdate".to_string()),
        params: vec![
            (
                Some("LaunchTemplateId".to_string()),
                Some("lt-1".to_string()),
            ),
            (
                Some("LaunchTemplateVersion".to_string()),
                Some("2".to_string()),
            ),
        ],
        created_at: Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()),
        errors: Vec::new(),
    }
}

#[tokio::test]
async fn updates_to_the_resolved_version() {
    let mock = MockAws {
        update_record: update_record(),
        ..MockAws::default()
    };
    let report = apply_launch_template_version(&mock, &target())
        .await
        .unwrap();
    assert_eq!(
        mock.calls(),
        vec![Call::UpdateNodegroupVersion {
            cluster_name: "A".to_string(),
            nodegroup_name: "ng-1".to_string(),
            launch_template_id: "lt-1".to_string(),
            version: "2".to_string(),
        }]
    );
    assert_eq!(
        serde_json::to_value(&report).unwrap(),
        json!({
            "update": {
                "id": "7f2c1a3e-update",
                "status": "InProgress",
                "type": "VersionUpdate",
                "params": [
                    {"type": "LaunchTemplateId", "value": "lt-1"},
                    {"type": "LaunchTemplateVersion", "value": "2"}
                ],
                "createdAt": "2024-01-02T03:04:05.000000+00:00",
                "errors": []
            }
        })
    );
}

#[tokio::test]
async fn update_errors_are_carried() {
    let mut record = update_record();
    record.status = Some("Failed".to_string());
    record.errors = vec![UpdateErrorRecord {
        error_code: Some("AccessDenied".to_string()),
        error_message: Some("Access denied to the launch template".to_string()),
        resource_ids: vec!["lt-1".to_string()],
    }];
    let mock = MockAws {
        update_record: record,
        ..MockAws::default()
    };
    let report = apply_launch_template_version(&mock, &target())
        .await
        .unwrap();
    assert_eq!(
        serde_json::to_value(&report.update.errors).unwrap(),
        json!([{
            "errorCode": "AccessDenied",
            "errorMessage": "Access denied to the launch template",
            "resourceIds": ["lt-1"]
        }])
    );
}

#[tokio::test]
async fn rejection_is_reported_with_its_code() {
    let mock = MockAws::default().fail(
        "UpdateNodegroupVersion",
        Failure::Rejected {
            code: "ResourceInUseException".to_string(),
            message: "Nodegroup ng-1 is currently being updated".to_string(),
        },
    );
    let target = target();
    let response = run_stage(
        "node group update",
        apply_launch_template_version(&mock, &target),
    )
    .await;
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({
            "status": "error",
            "error_code": "ResourceInUseException",
            "message": "Nodegroup ng-1 is currently being updated"
        })
    );
}

#[tokio::test]
async fn transport_failure_is_generic() {
    let mock = MockAws::default().fail("UpdateNodegroupVersion", Failure::Transport);
    let target = target();
    let response = run_stage(
        "node group update",
        apply_launch_template_version(&mock, &target),
    )
    .await;
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({"status": "error", "message": "An AWS SDK error occurred."})
    );
}
