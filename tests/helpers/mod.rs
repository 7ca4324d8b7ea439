#![allow(dead_code)]

pub mod db;
pub mod mock_prospector;

pub use db::TestDb;
pub use mock_prospector::{prospect, MockProspector, RecordedCall, VALID_AUTHORIZATION};

use prospector_bridge::settings::Settings;
use prospector_bridge::storage::Credentials;

pub fn valid_credentials() -> Credentials {
    Credentials {
        client_id: "cid".to_string(),
        client_secret: "secret".to_string(),
    }
}

pub fn invalid_credentials() -> Credentials {
    Credentials {
        client_id: "cid".to_string(),
        client_secret: "wrong".to_string(),
    }
}

/// Settings pointing the client at `mock`.
pub fn settings_for(mock: &MockProspector) -> Settings {
    let mut settings = Settings::default();
    settings.prospector.base_url = mock.base_url().to_string();
    settings.server.public_base_url = Some("https://crm.example.com".to_string());
    settings.server.dashboard_path = "/web#action=42".to_string();
    settings.crm.company_id = Some(1);
    settings
}
