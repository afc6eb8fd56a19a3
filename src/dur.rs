//! # Drug-Safety Registry Client
//!
//! Async client for the Korean DUR (Drug Utilization Review) open-data
//! registry. For each medication name it queries every safety endpoint
//! (contraindications, elderly cautions, duplicate-efficacy groups, and so
//! on) and collects whatever records exist; individual endpoint failures
//! degrade to missing data rather than failing the lookup.

use crate::errors::{error_logging, AppError, AppResult};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// One registry endpoint and the info-type key its records are filed under.
#[derive(Debug, Clone, Copy)]
pub struct DurEndpoint {
    /// Path segment appended to the registry base URL
    pub path: &'static str,
    /// Key used in [`SafetyInfo`] for this endpoint's records
    pub info_type: &'static str,
}

/// Every DUR safety endpoint, queried in this order.
pub const DUR_ENDPOINTS: &[DurEndpoint] = &[
    DurEndpoint {
        path: "/getDurPrdlstInfoList03",
        info_type: "DurPrdlstInfo",
    },
    DurEndpoint {
        path: "/getUsjntTabooInfoList03",
        info_type: "UsjntTabooInfo",
    },
    DurEndpoint {
        path: "/getOdsnAtentInfoList03",
        info_type: "OdsnAtentInfo",
    },
    DurEndpoint {
        path: "/getSpcifyAgrdeTabooInfoList03",
        info_type: "SpcifyAgrdeTabooInfo",
    },
    DurEndpoint {
        path: "/getCpctyAtentInfoList03",
        info_type: "CpctyAtentInfo",
    },
    DurEndpoint {
        path: "/getMdctnPdAtentInfoList03",
        info_type: "MdctnPdAtentInfo",
    },
    DurEndpoint {
        path: "/getEfcyDplctInfoList03",
        info_type: "EfcyDplctInfo",
    },
    DurEndpoint {
        path: "/getSeobangjeongPartitnAtentInfoList03",
        info_type: "SeobangjeongPartitnAtentInfo",
    },
    DurEndpoint {
        path: "/getPwnmTabooInfoList03",
        info_type: "PwnmTabooInfo",
    },
];

/// Safety records grouped by info type. Record fields vary per endpoint, so
/// each record stays a flat string map.
pub type SafetyInfo = HashMap<String, Vec<HashMap<String, String>>>;

lazy_static! {
    static ref PARENTHETICAL: Regex =
        Regex::new(r"\([^)]*\)").expect("parenthetical pattern should be valid");
    static ref EDGE_JUNK: Regex =
        Regex::new(r"^[^\w가-힣]+|[^\w가-힣]+$").expect("edge junk pattern should be valid");
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("whitespace pattern should be valid");
    static ref TRAILING_SUFFIX: Regex = Regex::new(r"(정|캡슐|주사액|시럽|겔|크림|액|패치)$")
        .expect("suffix pattern should be valid");
    static ref DOSAGE: Regex =
        Regex::new(r"\d+\.\d+mg|\d+mg").expect("dosage pattern should be valid");
}

/// Derive the registry search term from a standardized medication name.
///
/// Registry records are filed without dosage form or strength, so "크래밍
/// 정(크라운)" searches as "크래밍": parentheticals, edge punctuation,
/// internal whitespace, dosage strength, and the trailing dosage-form suffix
/// are all stripped, in that order. Strength goes before the suffix so a
/// name like "노바스크정90mg" exposes its 정 for suffix removal.
pub fn derive_search_name(drug_name: &str) -> String {
    let name = PARENTHETICAL.replace_all(drug_name, "");
    let name = EDGE_JUNK.replace_all(name.trim(), "");
    let name = WHITESPACE.replace_all(&name, "");
    let name = DOSAGE.replace_all(&name, "");
    TRAILING_SUFFIX.replace(&name, "").to_string()
}

/// Client for the DUR open-data registry.
pub struct DurClient {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl DurClient {
    pub fn new(base_url: String, service_key: String, timeout_secs: u64) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url,
            service_key,
        })
    }

    /// Query every safety endpoint for one medication.
    ///
    /// Endpoints that error, return a non-success result code, or hold no
    /// records simply contribute nothing to the map.
    pub async fn fetch_safety_info(&self, drug_name: &str) -> SafetyInfo {
        let search_name = derive_search_name(drug_name);
        debug!("Safety lookup: '{}' searched as '{}'", drug_name, search_name);

        let mut safety_info = SafetyInfo::new();
        for endpoint in DUR_ENDPOINTS {
            match self.query_endpoint(endpoint, &search_name).await {
                Ok(records) if !records.is_empty() => {
                    trace!(
                        "{} returned {} records for '{}'",
                        endpoint.info_type,
                        records.len(),
                        search_name
                    );
                    safety_info.insert(endpoint.info_type.to_string(), records);
                }
                Ok(_) => {}
                Err(err) => {
                    error_logging::log_registry_error(
                        &err,
                        "fetch_safety_info",
                        Some(endpoint.path),
                        Some(search_name.as_str()),
                    );
                    warn!("{} lookup failed for '{}': {}", endpoint.info_type, search_name, err);
                }
            }
        }
        safety_info
    }

    async fn query_endpoint(
        &self,
        endpoint: &DurEndpoint,
        search_name: &str,
    ) -> AppResult<Vec<HashMap<String, String>>> {
        let url = format!("{}{}", self.base_url, endpoint.path);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("serviceKey", self.service_key.as_str()),
                ("type", "json"),
                ("pageNo", "1"),
                ("numOfRows", "10"),
                ("itemName", search_name),
            ])
            .send()
            .await
            .map_err(|e| AppError::Network(format!("registry request failed: {e}")))?
            .error_for_status()
            .map_err(|e| AppError::Network(format!("registry returned error status: {e}")))?;

        // Registry responses are not strictly JSON on some error paths;
        // treat unparseable bodies as empty results.
        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(_) => return Ok(Vec::new()),
        };
        Ok(parse_registry_envelope(&body))
    }
}

/// Pull item records out of a registry response envelope.
///
/// The envelope is `{"header": {"resultCode": ...}, "body": {"items": ...}}`
/// where `items` may be an array of records, a single record object, or an
/// object wrapping either under an `item` key. Anything else yields no
/// records.
pub fn parse_registry_envelope(body: &Value) -> Vec<HashMap<String, String>> {
    let result_code = body
        .pointer("/header/resultCode")
        .and_then(Value::as_str)
        .unwrap_or("");
    if result_code != "00" {
        return Vec::new();
    }

    let mut items = match body.pointer("/body/items") {
        Some(items) => items,
        None => return Vec::new(),
    };
    if let Some(inner) = items.get("item") {
        items = inner;
    }

    let records: Vec<&Value> = match items {
        Value::Array(list) => list.iter().collect(),
        Value::Object(_) => vec![items],
        _ => Vec::new(),
    };

    records
        .into_iter()
        .filter_map(Value::as_object)
        .map(|record| {
            record
                .iter()
                .map(|(key, value)| {
                    let text = match value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (key.clone(), text)
                })
                .collect()
        })
        .collect()
}
