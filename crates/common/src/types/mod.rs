use serde::{Deserialize, Serialize};

/// Liveness payload for `GET /health`.
#[derive(Serialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// `{"count": n}` payload returned by the count endpoints.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountBody {
    pub count: u64,
}

/// `{"exists": bool}` payload returned by the exists endpoints.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExistsBody {
    pub exists: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TotalValueBody {
    pub total_value: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TotalQuantityBody {
    pub total_quantity: i64,
}
