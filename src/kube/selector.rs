use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_SELECTOR: &str = "nullplatform=true";

/// Label filters narrowing which pods are aggregated
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSelector {
    #[serde(default)]
    pub application_id: Option<String>,
    #[serde(default)]
    pub scope_id: Option<String>,
    #[serde(default)]
    pub deployment_id: Option<String>,
}

impl SourceSelector {
    /// Render as a Kubernetes label selector appended to `base`
    pub fn label_selector(&self, base: &str) -> String {
        let labels = [
            ("application_id", &self.application_id),
            ("scope_id", &self.scope_id),
            ("deployment_id", &self.deployment_id),
        ];

        let mut selector = base.to_string();
        for (key, value) in labels {
            let Some(value) = value.as_deref().filter(|v| !v.is_empty()) else {
                continue;
            };
            if !selector.is_empty() {
                selector.push(',');
            }
            selector.push_str(key);
            selector.push('=');
            selector.push_str(value);
        }
        selector
    }
}
