//! Core device API client

use fleet_models::{CoreDevice, ListCoreDevicesResponse};

use crate::errors::FleetError;
use crate::http::client::{api_path, HttpClient};

impl HttpClient {
    /// List the core devices of a thing group, following every page
    pub async fn list_core_devices(&self, thing_group_arn: &str) -> Result<Vec<CoreDevice>, FleetError> {
        let path = api_path(&["greengrass", "v2", "coreDevices"]);
        let mut devices = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let mut query = vec![("thingGroupArn".to_string(), thing_group_arn.to_string())];
            if let Some(token) = next_token.take() {
                query.push(("nextToken".to_string(), token));
            }

            let page: ListCoreDevicesResponse = self.get(&path, &query).await?;
            devices.extend(page.core_devices);

            match page.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => return Ok(devices),
            }
        }
    }
}
