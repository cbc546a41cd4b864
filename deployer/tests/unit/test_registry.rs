//! Component registry tests

use std::collections::BTreeMap;

use base64::prelude::*;
use ggdeploy::deploy::registry::{component_version_exists, publish_component, PreparedComponent};
use ggdeploy::storage::params::CustomComponent;
use tokio_test::{assert_err, assert_ok};

use crate::fake_fleet::{recipe, FakeFleet};

fn prepared(name: &str, version: &str) -> PreparedComponent {
    PreparedComponent {
        spec: CustomComponent {
            component_name: name.to_string(),
            component_version: version.to_string(),
            recipe_file: None,
            tags: BTreeMap::from([("team".to_string(), "edge".to_string())]),
        },
        recipe: recipe(name, version).into_bytes(),
    }
}

#[tokio::test]
async fn test_exact_version_match() {
    let fleet = FakeFleet::new().with_component("Foo", &["1.0.0", "1.1.0"]);

    assert!(component_version_exists(&fleet, "Foo", "1.1.0").await.unwrap());
    assert!(!component_version_exists(&fleet, "Foo", "1.1").await.unwrap());
    assert!(!component_version_exists(&fleet, "Bar", "1.0.0").await.unwrap());
}

#[tokio::test]
async fn test_only_the_listed_lineage_is_searched() {
    // Two listing entries share a name; versions under the second one are
    // never consulted.
    let fleet = FakeFleet::new()
        .with_component("Foo", &["1.0.0"])
        .with_component("Foo", &["3.0.0"]);

    assert!(!component_version_exists(&fleet, "Foo", "3.0.0").await.unwrap());
}

#[tokio::test]
async fn test_publish_sends_encoded_recipe_and_tags() {
    let fleet = FakeFleet::new();
    let component = prepared("Foo", "2.0");

    let response = assert_ok!(publish_component(&fleet, &component).await);
    assert_eq!(response.component_name, "Foo");
    assert_eq!(response.component_version, "2.0");

    let published = fleet.published();
    assert_eq!(published.len(), 1);
    assert_eq!(
        BASE64_STANDARD.decode(&published[0].inline_recipe).unwrap(),
        component.recipe
    );
    assert_eq!(published[0].tags["team"], "edge");
    assert!(published[0].client_token.is_some());

    assert!(component_version_exists(&fleet, "Foo", "2.0").await.unwrap());
}

#[tokio::test]
async fn test_publish_error_is_returned() {
    let fleet = FakeFleet::new().failing_publish(&[("Foo", "boom")]);
    assert_err!(publish_component(&fleet, &prepared("Foo", "2.0")).await);
}
