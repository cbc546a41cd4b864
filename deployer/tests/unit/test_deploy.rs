//! End-to-end runs against the in-memory fleet

use std::future::ready;
use std::path::Path;

use fleet_models::CoreDeviceStatus::{Healthy, InProgress, Unhealthy};
use ggdeploy::app::options::{DeployOptions, PollOverrides, SynthOptions};
use ggdeploy::app::run::{deploy, report_outcome, synth};
use ggdeploy::storage::layout::OutputLayout;
use ggdeploy::storage::params::TargetName;
use stack_template::Template;
use tempfile::TempDir;
use tokio_test::assert_ok;

use crate::fake_fleet::{device, recipe, FakeFleet, CANARY_ARN, MAIN_ARN};

fn write_fixture(dir: &Path) {
    let params = serde_json::json!({
        "deploymentGroups": {
            "main": { "targetArn": MAIN_ARN, "deploymentName": "iot-gg-main" },
            "canary": { "targetArn": CANARY_ARN, "deploymentName": "iot-gg-canary" }
        },
        "publicComponents": [
            { "componentName": "aws.greengrass.LogManager", "componentVersion": "2.3.7" }
        ],
        "customComponents": [
            { "componentName": "com.example.Foo", "componentVersion": "2.0.0" }
        ],
        "polling": { "maxIterations": 3, "intervalSecs": 0 },
        "repositoryName": "iot-gg-cicd-workshop-repo",
        "repositoryBranchName": "main",
        "pipelineName": "iot-gg-cicd-workshop",
        "onPremiseInstanceTags": { "Name": ["build-host"] }
    });
    std::fs::write(dir.join("deploy_params.json"), params.to_string()).unwrap();

    std::fs::create_dir_all(dir.join("recipes")).unwrap();
    std::fs::write(
        dir.join("recipes/com.example.Foo-2.0.0.json"),
        recipe("com.example.Foo", "2.0.0"),
    )
    .unwrap();
}

fn deploy_options(dir: &TempDir, target: TargetName) -> DeployOptions {
    DeployOptions {
        target,
        params_file: dir.path().join("deploy_params.json"),
        layout: OutputLayout::new(dir.path().join("out")),
        poll_overrides: PollOverrides::default(),
    }
}

#[tokio::test]
async fn test_successful_deploy_writes_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());

    let fleet = FakeFleet::new()
        .with_deployment(CANARY_ARN, "iot-gg-canary", &[("aws.greengrass.Nucleus", "2.12.0")])
        .with_listings(vec![
            vec![device("canary-1", InProgress)],
            vec![device("canary-1", Healthy)],
        ]);

    let options = deploy_options(&dir, TargetName::Canary);
    let report = assert_ok!(deploy(&fleet, &options, |_| ready(())).await);
    assert!(report.is_empty());
    assert!(report_outcome(&report));

    let created = fleet.created();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].target_arn, CANARY_ARN);
    assert!(created[0].client_token.is_some());
    assert_eq!(
        created[0].components.keys().cloned().collect::<Vec<_>>(),
        vec![
            "aws.greengrass.LogManager".to_string(),
            "aws.greengrass.Nucleus".to_string(),
            "com.example.Foo".to_string(),
        ]
    );
    assert_eq!(fleet.published().len(), 1);

    let failures = std::fs::read_to_string(dir.path().join("out/deployment_failures.json")).unwrap();
    assert_eq!(serde_json::from_str::<Vec<String>>(&failures).unwrap(), Vec::<String>::new());

    let status: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("out/deployment_status.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(status["deploymentId"], "deployment-1");
    assert_eq!(status["deploymentName"], "iot-gg-canary");
}

#[tokio::test]
async fn test_failed_and_stuck_devices_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());

    let fleet = FakeFleet::new().with_listings(vec![vec![
        device("main-1", Unhealthy),
        device("main-2", InProgress),
    ]]);

    let report = deploy(&fleet, &deploy_options(&dir, TargetName::Main), |_| ready(()))
        .await
        .unwrap();

    assert_eq!(
        report.to_wire(),
        vec!["main-1".to_string(), "main-2".to_string(), "TIMEOUT".to_string()]
    );
    assert_eq!(fleet.device_polls(), 3);
    assert!(!report_outcome(&report));

    let failures = std::fs::read_to_string(dir.path().join("out/deployment_failures.json")).unwrap();
    assert_eq!(
        serde_json::from_str::<Vec<String>>(&failures).unwrap(),
        vec!["main-1", "main-2", "TIMEOUT"]
    );
}

#[tokio::test]
async fn test_poll_overrides_take_precedence() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());

    let fleet = FakeFleet::new().with_listings(vec![vec![device("main-1", InProgress)]]);
    let mut options = deploy_options(&dir, TargetName::Main);
    options.poll_overrides.max_iterations = Some(5);

    let report = deploy(&fleet, &options, |_| ready(())).await.unwrap();
    assert!(report.has_timeout());
    assert_eq!(fleet.device_polls(), 5);
}

#[tokio::test]
async fn test_missing_recipe_fails_before_any_call() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());
    std::fs::remove_file(dir.path().join("recipes/com.example.Foo-2.0.0.json")).unwrap();

    let fleet = FakeFleet::new();
    let err = deploy(&fleet, &deploy_options(&dir, TargetName::Canary), |_| ready(()))
        .await
        .unwrap_err();

    assert!(err.is_config());
    assert!(fleet.created().is_empty());
    assert!(fleet.published().is_empty());
    assert_eq!(fleet.device_polls(), 0);
}

#[tokio::test]
async fn test_missing_params_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let fleet = FakeFleet::new();

    let err = deploy(&fleet, &deploy_options(&dir, TargetName::Canary), |_| ready(()))
        .await
        .unwrap_err();
    assert!(err.is_config());
}

#[tokio::test]
async fn test_rejected_deployment_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());

    let fleet = FakeFleet::new().rejecting_deployments("Component version not found");
    let err = deploy(&fleet, &deploy_options(&dir, TargetName::Canary), |_| ready(()))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Component version not found"));
    assert_eq!(fleet.device_polls(), 0);
    assert!(!dir.path().join("out/deployment_failures.json").exists());
}

#[tokio::test]
async fn test_synth_writes_template() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());

    let options = SynthOptions {
        params_file: dir.path().join("deploy_params.json"),
        out_dir: dir.path().join("cdk.out"),
        region: "eu-west-1".to_string(),
    };
    let path = synth(&options).await.unwrap();
    assert_eq!(path, dir.path().join("cdk.out/greengrass-pipeline.template.json"));

    let template: Template =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert!(template.resource("Pipeline").is_some());
    assert_eq!(template.resources_of_type("AWS::CodeBuild::Project").count(), 2);
}
