//! Records returned by the remote classification service
//!
//! The service answers with XML documents rooted at `<classify>`. A title
//! search lists candidate works under `works/work`; a lookup by work
//! identifier returns a single `work` plus the recommended classification
//! under `recommendations/ddc/mostPopular`.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// One candidate work from a title search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SearchResult {
    pub title: String,
    pub author: String,
    /// Publication year as reported by the service
    pub year: String,
    /// Work identifier, usable with `PUT /books?id=`
    pub id: String,
}

/// Bibliographic data and preferred classification for one work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ClassificationRecord {
    pub title: String,
    pub author: String,
    pub id: String,
    pub classification: String,
}

// --- XML document shapes ---

#[derive(Debug, Deserialize)]
struct ResponseStatus {
    #[serde(rename = "@code", default)]
    code: String,
}

#[derive(Debug, Deserialize)]
struct WorkEntry {
    #[serde(rename = "@title", default)]
    title: String,
    #[serde(rename = "@author", default)]
    author: String,
    #[serde(rename = "@hyr", default)]
    year: String,
    #[serde(rename = "@owi", default)]
    owi: String,
}

#[derive(Debug, Default, Deserialize)]
struct WorkList {
    #[serde(rename = "work", default)]
    works: Vec<WorkEntry>,
}

#[derive(Debug, Deserialize)]
struct SearchDocument {
    response: Option<ResponseStatus>,
    works: Option<WorkList>,
}

#[derive(Debug, Deserialize)]
struct MostPopular {
    #[serde(rename = "@sfa", default)]
    sfa: String,
}

#[derive(Debug, Default, Deserialize)]
struct Ddc {
    #[serde(rename = "mostPopular", default)]
    most_popular: Vec<MostPopular>,
}

#[derive(Debug, Default, Deserialize)]
struct Recommendations {
    ddc: Option<Ddc>,
}

#[derive(Debug, Deserialize)]
struct WorkDocument {
    response: Option<ResponseStatus>,
    work: Option<WorkEntry>,
    recommendations: Option<Recommendations>,
}

/// Map the service's own status codes onto application errors
fn check_response_code(status: Option<&ResponseStatus>, what: &str) -> AppResult<()> {
    match status.map(|s| s.code.as_str()) {
        Some("100") => Err(AppError::BadRequest(format!("No input for {}", what))),
        Some("101") => Err(AppError::BadRequest(format!("Invalid input for {}", what))),
        Some("102") => Err(AppError::NotFound(format!("No work found for {}", what))),
        Some("200") => Err(AppError::Classify(format!(
            "Classification service failed on {}",
            what
        ))),
        _ => Ok(()),
    }
}

/// Decode a title search document into candidate works.
/// A document without a `works` element yields no results.
pub fn parse_search_document(xml: &str) -> AppResult<Vec<SearchResult>> {
    let doc: SearchDocument = quick_xml::de::from_str(xml)
        .map_err(|e| AppError::Classify(format!("Malformed search response: {}", e)))?;

    // "not found" for a search simply means nothing matched
    match check_response_code(doc.response.as_ref(), "search") {
        Err(AppError::NotFound(_)) => return Ok(Vec::new()),
        other => other?,
    }

    Ok(doc
        .works
        .unwrap_or_default()
        .works
        .into_iter()
        .map(|w| SearchResult {
            title: w.title,
            author: w.author,
            year: w.year,
            id: w.owi,
        })
        .collect())
}

/// Decode a single-work document. `requested_id` is used when the document
/// does not echo the identifier back.
pub fn parse_work_document(xml: &str, requested_id: &str) -> AppResult<ClassificationRecord> {
    let doc: WorkDocument = quick_xml::de::from_str(xml)
        .map_err(|e| AppError::Classify(format!("Malformed work response: {}", e)))?;

    let what = format!("work {}", requested_id);
    check_response_code(doc.response.as_ref(), &what)?;

    let work = doc
        .work
        .ok_or_else(|| AppError::NotFound(format!("No work found for {}", what)))?;

    let classification = doc
        .recommendations
        .and_then(|r| r.ddc)
        .and_then(|ddc| ddc.most_popular.into_iter().next())
        .map(|mp| mp.sfa)
        .unwrap_or_default();

    Ok(ClassificationRecord {
        title: work.title,
        author: work.author,
        id: if work.owi.is_empty() {
            requested_id.to_string()
        } else {
            work.owi
        },
        classification,
    })
}
