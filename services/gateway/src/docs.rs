//! EIS document-storage operations.
//!
//! Four archive-formation requests against the storage endpoint. Every
//! request wraps its parameters in an index header (request id, creation
//! timestamp, PROD/TEST mode) and, except for the signature request, a
//! `selectionParams` block ordered by the static schema table.
//!
//! The 44-FZ and 223-FZ registries share operations but not field names;
//! [`FzType`] switches `documentType44`/`documentType223` and
//! `nsiCode44`/`nsiCode223` accordingly.

use chrono::{NaiveDate, SecondsFormat, Utc};
use codec::OrderedNode;
use gateway_config::EndpointConfig;
use serde_json::{json, Map, Value};
use url::Url;
use uuid::Uuid;

use crate::client::{CallOptions, SoapClient};
use crate::error::{GatewayError, GatewayResult};

/// Procurement-law registry the request addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FzType {
    /// 44-FZ (state procurement)
    #[default]
    Fz44,
    /// 223-FZ (procurement by state-owned companies)
    Fz223,
}

impl FzType {
    fn suffix(self) -> &'static str {
        match self {
            FzType::Fz44 => "44",
            FzType::Fz223 => "223",
        }
    }
}

/// NSI catalog extraction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NsiKind {
    /// Full catalog
    All,
    /// Incremental changes only
    Inc,
}

impl NsiKind {
    fn as_str(self) -> &'static str {
        match self {
            NsiKind::All => "all",
            NsiKind::Inc => "inc",
        }
    }
}

/// Selection parameters for [`DocsStorageClient::get_docs_by_org_region`].
#[derive(Debug, Clone)]
pub struct OrgRegionQuery {
    /// Registry whose field names the request uses
    pub fz_type: FzType,
    /// Customer region code
    pub org_region: String,
    /// Registry subsystem code
    pub subsystem_type: String,
    /// Document type within the subsystem
    pub document_type: String,
    /// Publication date the archives are formed for
    pub exact_date: NaiveDate,
    /// Optional registry-number narrowing
    pub reestr_number: Option<String>,
}

/// One NSI catalog archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NsiArchive {
    /// Archive URL, rewritten to the configured endpoint host
    pub url: String,
    /// Catalog archive name
    pub name: String,
}

/// Signature archive formed for one document archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocSignatures {
    /// The document archive the signatures belong to
    pub archive_url: String,
    /// Archive bundling the documents with their signatures
    pub archive_with_signatures_url: String,
}

/// Client for the EIS document-storage endpoint.
#[derive(Debug, Clone)]
pub struct DocsStorageClient {
    client: SoapClient,
    test_mode: bool,
}

impl DocsStorageClient {
    /// Client over the configured storage endpoint.
    pub fn new(config: &EndpointConfig, test_mode: bool) -> Self {
        Self {
            client: SoapClient::new(config.endpoint.clone(), config.timeout()),
            test_mode,
        }
    }

    /// Request archive formation for all documents under one registry
    /// number. An empty result is promoted to [`GatewayError::NotFound`].
    pub async fn get_docs_by_reestr_number(
        &self,
        subsystem_type: &str,
        reestr_number: &str,
    ) -> GatewayResult<Vec<String>> {
        let selection = json!({
            "subsystemType": subsystem_type,
            "reestrNumber": reestr_number,
        });
        let data = self
            .execute("getDocsByReestrNumber", &selection)
            .await?
            .ok_or(GatewayError::NotFound { what: "documents" })?;
        Ok(string_list(data.get("archiveUrl")))
    }

    /// Request archive formation by customer region, document type and
    /// publication date. Empty results promote to `NotFound`.
    pub async fn get_docs_by_org_region(
        &self,
        query: &OrgRegionQuery,
    ) -> GatewayResult<Vec<String>> {
        let selection = org_region_selection(query);
        let data = self
            .execute("getDocsByOrgRegion", &selection)
            .await?
            .ok_or(GatewayError::NotFound { what: "documents" })?;
        Ok(string_list(data.get("archiveUrl")))
    }

    /// Request NSI catalog archive formation. Archive URLs are rewritten
    /// to the configured endpoint host before they reach the caller.
    pub async fn get_nsi(
        &self,
        fz_type: FzType,
        nsi_code: &str,
        nsi_kind: NsiKind,
    ) -> GatewayResult<Vec<NsiArchive>> {
        let selection = nsi_selection(fz_type, nsi_code, nsi_kind);
        let data = self
            .execute("getNsi", &selection)
            .await?
            .ok_or(GatewayError::NotFound { what: "catalogs" })?;

        let mut archives = Vec::new();
        for item in object_list(data.get("nsiArchiveInfo")) {
            let (Some(url), Some(name)) = (
                item.get("archiveUrl").and_then(Value::as_str),
                item.get("archiveName").and_then(Value::as_str),
            ) else {
                continue;
            };
            archives.push(NsiArchive {
                url: rewrite_archive_url(url, self.client.endpoint())?,
                name: name.to_string(),
            });
        }
        Ok(archives)
    }

    /// Request signature archives for already-formed document archives.
    /// Unlike the selection operations, `archiveUrl` sits at the request
    /// top level, repeated per input URL.
    pub async fn get_doc_signatures_by_url(
        &self,
        archive_urls: &[String],
    ) -> GatewayResult<Vec<DocSignatures>> {
        let mut params = OrderedNode::new();
        params.insert_node("index", index_node(self.test_mode));
        params.insert_leaf("archiveUrl", json!(archive_urls));

        let outcome = self
            .client
            .call("getDocSignaturesByUrl", &params, data_info_options())
            .await?;
        let data = outcome.into_data()?.ok_or(GatewayError::EmptyResponse)?;

        Ok(object_list(data.get("docSignaturesInfo"))
            .into_iter()
            .filter_map(|item| {
                Some(DocSignatures {
                    archive_url: item.get("archiveUrl")?.as_str()?.to_string(),
                    archive_with_signatures_url: item
                        .get("archiveWithSignaturesUrl")?
                        .as_str()?
                        .to_string(),
                })
            })
            .collect())
    }

    async fn execute(&self, operation: &str, selection: &Value) -> GatewayResult<Option<Value>> {
        let ordered = codec::order_parameters(operation, selection)?;
        let mut params = OrderedNode::new();
        params.insert_node("index", index_node(self.test_mode));
        params.insert_node("selectionParams", ordered);
        self.client
            .call(operation, &params, data_info_options())
            .await?
            .into_data()
    }
}

/// The storage responses nest their payload under `dataInfo`.
fn data_info_options() -> CallOptions {
    CallOptions {
        payload_key: Some("dataInfo"),
        ..CallOptions::default()
    }
}

/// The index header every storage request starts with: fresh request id,
/// creation timestamp, and the PROD/TEST mode flag.
fn index_node(test_mode: bool) -> OrderedNode {
    let mut index = OrderedNode::new();
    index.insert_leaf("id", json!(Uuid::new_v4().to_string()));
    index.insert_leaf(
        "createDateTime",
        json!(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    index.insert_leaf("mode", json!(if test_mode { "TEST" } else { "PROD" }));
    index
}

/// Selection block for the org-region request, with the registry-specific
/// `documentType` field name.
fn org_region_selection(query: &OrgRegionQuery) -> Value {
    let mut selection = Map::new();
    selection.insert("orgRegion".to_string(), json!(query.org_region));
    selection.insert("subsystemType".to_string(), json!(query.subsystem_type));
    selection.insert(
        format!("documentType{}", query.fz_type.suffix()),
        json!(query.document_type),
    );
    selection.insert(
        "periodInfo".to_string(),
        json!({ "exactDate": query.exact_date.format("%Y-%m-%d").to_string() }),
    );
    if let Some(reestr_number) = &query.reestr_number {
        selection.insert("reestrNumber".to_string(), json!(reestr_number));
    }
    Value::Object(selection)
}

fn nsi_selection(fz_type: FzType, nsi_code: &str, nsi_kind: NsiKind) -> Value {
    let mut selection = Map::new();
    selection.insert(format!("nsiCode{}", fz_type.suffix()), json!(nsi_code));
    selection.insert("nsiKind".to_string(), json!(nsi_kind.as_str()));
    Value::Object(selection)
}

/// Replace the scheme and host of an archive URL with the configured
/// endpoint's, keeping path and query. The storage returns internal
/// hostnames unreachable from outside its network segment.
pub fn rewrite_archive_url(archive_url: &str, endpoint: &str) -> GatewayResult<String> {
    let invalid = |message: String| GatewayError::InvalidUrl {
        url: archive_url.to_string(),
        message,
    };
    let mut original = Url::parse(archive_url).map_err(|err| invalid(err.to_string()))?;
    let target = Url::parse(endpoint).map_err(|err| invalid(err.to_string()))?;
    original
        .set_scheme(target.scheme())
        .map_err(|_| invalid(format!("cannot switch scheme to {}", target.scheme())))?;
    original
        .set_host(target.host_str())
        .map_err(|err| invalid(err.to_string()))?;
    original
        .set_port(target.port())
        .map_err(|_| invalid("cannot set port".to_string()))?;
    Ok(original.to_string())
}

/// A scalar-or-array leaf as a list of strings.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(one)) => vec![one.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

/// A lone element or repeated-element array as a list of values.
pub(crate) fn object_list(value: Option<&Value>) -> Vec<&Value> {
    match value {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(one) => vec![one],
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_header_fields_in_schema_order() {
        let index = index_node(true);
        let paths: Vec<String> = index.leaf_paths().into_iter().map(|(p, _)| p).collect();
        assert_eq!(paths, vec!["id", "createDateTime", "mode"]);
        assert_eq!(index.leaf_paths()[2].1, json!("TEST"));
        assert_eq!(index_node(false).leaf_paths()[2].1, json!("PROD"));
    }

    #[test]
    fn index_id_is_fresh_per_request() {
        let a = index_node(false);
        let b = index_node(false);
        assert_ne!(a.leaf_paths()[0].1, b.leaf_paths()[0].1);
    }

    #[test]
    fn org_region_selection_switches_document_type_field() {
        let mut query = OrgRegionQuery {
            fz_type: FzType::Fz44,
            org_region: "77".into(),
            subsystem_type: "RGK".into(),
            document_type: "contract".into(),
            exact_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            reestr_number: None,
        };
        let selection = org_region_selection(&query);
        assert_eq!(selection.get("documentType44"), Some(&json!("contract")));
        assert!(selection.get("documentType223").is_none());
        assert!(selection.get("reestrNumber").is_none());

        query.fz_type = FzType::Fz223;
        query.reestr_number = Some("12345678".into());
        let selection = org_region_selection(&query);
        assert_eq!(selection.get("documentType223"), Some(&json!("contract")));
        assert_eq!(selection.get("reestrNumber"), Some(&json!("12345678")));
    }

    #[test]
    fn org_region_selection_orders_per_schema() {
        let query = OrgRegionQuery {
            fz_type: FzType::Fz44,
            org_region: "77".into(),
            subsystem_type: "RGK".into(),
            document_type: "contract".into(),
            exact_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            reestr_number: Some("12345678".into()),
        };
        let ordered =
            codec::order_parameters("getDocsByOrgRegion", &org_region_selection(&query)).unwrap();
        let paths: Vec<String> = ordered.leaf_paths().into_iter().map(|(p, _)| p).collect();
        assert_eq!(
            paths,
            vec![
                "orgRegion",
                "subsystemType",
                "documentType44",
                "periodInfo.exactDate",
                "reestrNumber",
            ]
        );
    }

    #[test]
    fn nsi_selection_switches_code_field() {
        let selection = nsi_selection(FzType::Fz223, "2", NsiKind::Inc);
        assert_eq!(selection.get("nsiCode223"), Some(&json!("2")));
        assert!(selection.get("nsiCode44").is_none());
        assert_eq!(selection.get("nsiKind"), Some(&json!("inc")));
    }

    #[test]
    fn archive_url_host_and_scheme_are_rewritten() {
        let rewritten = rewrite_archive_url(
            "http://internal-storage:8081/archives/doc.zip?ticket=1",
            "https://eis.example:9443/eis-integration/services/getDocsLE",
        )
        .unwrap();
        assert_eq!(
            rewritten,
            "https://eis.example:9443/archives/doc.zip?ticket=1"
        );
    }

    #[test]
    fn endpoint_without_explicit_port_clears_the_port() {
        let rewritten = rewrite_archive_url(
            "http://internal-storage:8081/archives/doc.zip",
            "http://eis.example/services",
        )
        .unwrap();
        assert_eq!(rewritten, "http://eis.example/archives/doc.zip");
    }

    #[test]
    fn unparsable_archive_url_is_reported() {
        let err = rewrite_archive_url("not a url", "http://eis.example").unwrap_err();
        assert!(matches!(err, GatewayError::InvalidUrl { .. }));
    }

    #[test]
    fn scalar_and_array_leaves_both_become_lists() {
        assert_eq!(string_list(Some(&json!("http://a"))), vec!["http://a"]);
        assert_eq!(
            string_list(Some(&json!(["http://a", "http://b"]))),
            vec!["http://a", "http://b"]
        );
        assert!(string_list(None).is_empty());

        assert_eq!(object_list(Some(&json!({ "k": 1 }))).len(), 1);
        assert_eq!(object_list(Some(&json!([{ "k": 1 }, { "k": 2 }]))).len(), 2);
    }
}
