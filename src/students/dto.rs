use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct StudentRequest {
    pub name: String,
    pub age: i64,
    pub marks: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}
