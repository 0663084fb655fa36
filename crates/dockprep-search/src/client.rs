//! Search API client.
//!
//! Endpoint: https://search.rcsb.org/rcsbsearch/v2/query
//!
//! Returns the result set in service order. Ranking and pagination are the
//! service's business; callers must not rely on position beyond sampling.

use dockprep_common::sandbox::SandboxClient as Client;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::query::{Query, ReturnType};

const SEARCH_API_URL: &str = "https://search.rcsb.org/rcsbsearch/v2/query";

/// One hit in a search result set.
#[derive(Debug, Deserialize)]
struct SearchHit {
    identifier: String,
    #[serde(default)]
    score: f64,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    result_type: String,
    total_count: u64,
    #[serde(default)]
    result_set: Vec<SearchHit>,
}

/// Client for the RCSB PDB Search API.
pub struct SearchClient {
    client: Client,
}

impl SearchClient {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self { client: Client::new()? })
    }

    /// Submit a query under the given projection and return the identifiers
    /// in service order. A zero-hit search answers 204 No Content, which
    /// maps to an empty list; any other non-success status is an error.
    #[instrument(skip(self, query))]
    pub async fn search(
        &self,
        query: &Query,
        return_type: ReturnType,
    ) -> anyhow::Result<Vec<String>> {
        anyhow::ensure!(!query.is_empty(), "refusing to submit an empty query");

        let body = query.to_request(return_type);
        let resp = self
            .client
            .post(SEARCH_API_URL)?
            .json(&body)
            .send()
            .await?;

        if resp.status() == StatusCode::NO_CONTENT {
            debug!(return_type = return_type.wire(), "search matched nothing");
            return Ok(Vec::new());
        }

        let parsed: SearchResponse = resp.error_for_status()?.json().await?;
        debug!(
            result_type = %parsed.result_type,
            total_count = parsed.total_count,
            returned = parsed.result_set.len(),
            "search completed"
        );

        Ok(parsed.result_set.into_iter().map(|hit| hit.identifier).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Predicate;

    #[test]
    fn test_response_parses_result_set() {
        let json = r#"{
            "query_id": "6c7e8f0e",
            "result_type": "mol_definition",
            "total_count": 3,
            "result_set": [
                {"identifier": "0CA", "score": 1.0},
                {"identifier": "0CB", "score": 1.0},
                {"identifier": "0G6", "score": 0.9}
            ]
        }"#;
        let parsed: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.total_count, 3);
        assert_eq!(parsed.result_set.len(), 3);
        assert_eq!(parsed.result_set[0].identifier, "0CA");
        assert!(parsed.result_set[2].score < 1.0);
    }

    #[test]
    fn test_response_tolerates_missing_result_set() {
        let json = r#"{"result_type": "entry", "total_count": 0}"#;
        let parsed: SearchResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.result_set.is_empty());
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let client = SearchClient::new().unwrap();
        let err = client.search(&Query::new(), ReturnType::Entry).await;
        assert!(err.is_err());
    }

    // Hits the live Search API; run with `cargo test -- --ignored`.
    #[tokio::test]
    #[ignore]
    async fn test_live_trypsin_survey() {
        let client = SearchClient::new().unwrap();
        let query = Query::new()
            .and(Predicate::ec_lineage("3.4.21.4"))
            .and(Predicate::ligand_weight_min(300.0))
            .and(Predicate::ligand_weight_max(800.0));

        let entries = client.search(&query, ReturnType::Entry).await.unwrap();
        let ligands = client.search(&query, ReturnType::MolDefinition).await.unwrap();

        assert!(!entries.is_empty());
        assert!(!ligands.is_empty());
        assert!(entries.iter().all(|id| id.len() == 4));
        assert!(ligands.iter().all(|id| id.len() <= 3));
    }
}
