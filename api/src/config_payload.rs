use serde::Deserialize;

/// Body of `/api/config` and `/api/test-connection`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPayload {
    pub ai_provider: Option<String>,
    pub api_key: Option<String>,
}

impl ConfigPayload {
    pub fn provider(&self) -> Option<&str> {
        non_blank(self.ai_provider.as_deref())
    }

    pub fn key(&self) -> Option<&str> {
        non_blank(self.api_key.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}
