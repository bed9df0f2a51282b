//! Alertmanager webhook payload
use serde::{Deserialize, Serialize};

pub const FIRING: &str = "firing";

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct AlertBatch {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub alerts: Vec<Alert>,
    #[serde(default, rename = "externalURL")]
    pub external_url: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct Alert {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub labels: Labels,
    #[serde(default)]
    pub annotations: Annotations,
    #[serde(default, rename = "startsAt")]
    pub starts_at: String,
}

impl Alert {
    pub fn is_firing(&self) -> bool {
        self.status == FIRING
    }

    pub fn name(&self) -> &str {
        &self.labels.alertname
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct Labels {
    #[serde(default)]
    pub alertname: String,
    #[serde(default)]
    pub instance: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct Annotations {
    #[serde(default)]
    pub description: String,
}
