//! Typed HTTP client for the Arachne server.
//!
//! Index endpoints answer with plain JSON documents; mutating operations
//! answer with the positional status array, surfaced here as a parsed
//! [`Envelope`]. Transport failures (connection refused, non-2xx status,
//! body that isn't JSON) are reported as errors carrying the URL; callers
//! never see a partial document.

use arachne_api::{
    CaseRecord, CompRecord, DiffRecord, Envelope, FileRecord, HistoryRow, HistoryVar, ParmRecord,
    ServerMeta,
};
use eyre::{Result, WrapErr};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// Join two case IDs into a comparison ID, e.g. `case00/case01`. A
/// comparison of a single case against its own start has no second case.
pub fn comp_id(case1: &str, case2: Option<&str>) -> String {
    match case2 {
        Some(case2) => format!("{case1}/{case2}"),
        None => case1.to_string(),
    }
}

/// Client for one Arachne server.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base: String,
}

impl Client {
    /// Create a client for the server at `server_url`.
    pub fn new(server_url: &str) -> Self {
        Client {
            http: reqwest::Client::new(),
            base: server_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        debug!(%url, "GET");
        self.http
            .get(&url)
            .send()
            .await
            .wrap_err_with(|| format!("Failed to reach {url}"))?
            .error_for_status()
            .wrap_err_with(|| format!("Server rejected {url}"))?
            .json()
            .await
            .wrap_err_with(|| format!("Failed to decode response from {url}"))
    }

    /// Send an operation request and parse the status array it answers
    /// with. `query` carries the operation's parameters.
    pub async fn request(&self, path: &str, query: &[(&str, &str)]) -> Result<Envelope> {
        let url = self.url(path);
        debug!(%url, ?query, "request");
        let value: Value = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .wrap_err_with(|| format!("Failed to reach {url}"))?
            .error_for_status()
            .wrap_err_with(|| format!("Server rejected {url}"))?
            .json()
            .await
            .wrap_err_with(|| format!("Failed to decode response from {url}"))?;

        let envelope = Envelope::parse(value)
            .wrap_err_with(|| format!("Malformed status response from {url}"))?;
        Ok(envelope)
    }

    //------------------------------------------------------------------
    // Server and index retrieval

    /// Server metadata; also the liveness probe.
    pub async fn meta(&self) -> Result<ServerMeta> {
        self.get_json("/meta.json").await
    }

    pub async fn cases(&self) -> Result<Vec<CaseRecord>> {
        self.get_json("/scenario/index.json").await
    }

    pub async fn files(&self) -> Result<Vec<FileRecord>> {
        self.get_json("/scenario/files.json").await
    }

    pub async fn comps(&self) -> Result<Vec<CompRecord>> {
        self.get_json("/comparison/index.json").await
    }

    //------------------------------------------------------------------
    // Per-case retrieval

    pub async fn case_meta(&self, case: &str) -> Result<CaseRecord> {
        self.get_json(&format!("/scenario/{case}/index.json")).await
    }

    /// The case's full model parameter hierarchy.
    pub async fn parmdb(&self, case: &str) -> Result<Vec<ParmRecord>> {
        self.get_json(&format!("/scenario/{case}/parmdb.json")).await
    }

    pub async fn history_meta(&self, case: &str) -> Result<Vec<HistoryVar>> {
        self.get_json(&format!("/scenario/{case}/history/meta.json"))
            .await
    }

    /// One history variable's time series over `[t1, t2]`, narrowed to the
    /// key-column values in `keys`. The server answers with a status array
    /// whose payload is the row list.
    pub async fn history(
        &self,
        case: &str,
        varname: &str,
        keys: &[(&str, &str)],
        t1: u64,
        t2: u64,
    ) -> Result<Vec<HistoryRow>> {
        let t1 = t1.to_string();
        let t2 = t2.to_string();
        let mut query: Vec<(&str, &str)> = keys.to_vec();
        query.push(("t1", &t1));
        query.push(("t2", &t2));

        let envelope = self
            .request(
                &format!("/scenario/{case}/history/{varname}/index.json"),
                &query,
            )
            .await?;
        expect_payload(envelope, "history rows")
    }

    //------------------------------------------------------------------
    // Comparison retrieval

    /// Significant output differences for one comparison.
    pub async fn outputs(&self, comp: &str) -> Result<Vec<DiffRecord>> {
        self.get_json(&format!("/comparison/{comp}/outputs.json"))
            .await
    }

    /// Raw chain data for one output variable: the flat record list that
    /// `arachne_core::Chain::build` expands into a tree. The server answers
    /// with a status array whose payload is the record list.
    pub async fn chain_data(&self, comp: &str, varname: &str) -> Result<Vec<DiffRecord>> {
        let envelope = self
            .request("/comparison/chain.json", &[("comp", comp), ("varname", varname)])
            .await?;
        expect_payload(envelope, "chain data")
    }

    /// Ask the server to compute (or return) the comparison of two cases.
    pub async fn request_comparison(
        &self,
        case1: &str,
        case2: Option<&str>,
    ) -> Result<CompRecord> {
        let mut query = vec![("case1", case1)];
        if let Some(case2) = case2 {
            query.push(("case2", case2));
        }
        let envelope = self.request("/comparison/request.json", &query).await?;
        expect_payload(envelope, "comparison record")
    }

    //------------------------------------------------------------------
    // Scenario operations

    pub async fn new_case(
        &self,
        replacing: Option<&str>,
        longname: Option<&str>,
    ) -> Result<Envelope> {
        let mut query = Vec::new();
        if let Some(case) = replacing {
            query.push(("case", case));
        }
        if let Some(longname) = longname {
            query.push(("longname", longname));
        }
        self.request("/scenario/new.json", &query).await
    }

    pub async fn clone_case(
        &self,
        source: &str,
        target: Option<&str>,
        longname: Option<&str>,
    ) -> Result<Envelope> {
        let mut query = vec![("source", source)];
        if let Some(target) = target {
            query.push(("target", target));
        }
        if let Some(longname) = longname {
            query.push(("longname", longname));
        }
        self.request("/scenario/clone.json", &query).await
    }

    pub async fn import_case(
        &self,
        filename: &str,
        replacing: Option<&str>,
        longname: Option<&str>,
    ) -> Result<Envelope> {
        let mut query = vec![("filename", filename)];
        if let Some(case) = replacing {
            query.push(("case", case));
        }
        if let Some(longname) = longname {
            query.push(("longname", longname));
        }
        self.request("/scenario/import.json", &query).await
    }

    pub async fn export_case(&self, case: &str, filename: &str) -> Result<Envelope> {
        self.request(
            "/scenario/export.json",
            &[("case", case), ("filename", filename)],
        )
        .await
    }

    pub async fn remove_case(&self, case: &str) -> Result<Envelope> {
        self.request("/scenario/remove.json", &[("case", case)]).await
    }

    pub async fn lock(&self, case: &str) -> Result<Envelope> {
        self.request(&format!("/scenario/{case}/lock.json"), &[]).await
    }

    pub async fn unlock(&self, case: &str) -> Result<Envelope> {
        self.request(&format!("/scenario/{case}/unlock.json"), &[]).await
    }

    /// Advance simulation time by the given number of weeks. The case goes
    /// RUNNING; follow it with `poll::wait_while_busy`.
    pub async fn advance(&self, case: &str, weeks: u64) -> Result<Envelope> {
        let weeks = weeks.to_string();
        self.request(
            &format!("/scenario/{case}/advance.json"),
            &[("weeks", &weeks)],
        )
        .await
    }

    //------------------------------------------------------------------
    // Model parameter operations

    pub async fn set_parm(&self, case: &str, parm: &str, value: &str) -> Result<Envelope> {
        self.request(
            &format!("/scenario/{case}/order.json"),
            &[("order_", "PARM:SET"), ("parm", parm), ("value", value)],
        )
        .await
    }

    pub async fn reset_parms(&self, case: &str) -> Result<Envelope> {
        self.request(
            &format!("/scenario/{case}/order.json"),
            &[("order_", "PARM:RESET")],
        )
        .await
    }
}

/// First payload element of an OK envelope, decoded; any other outcome is
/// an error.
fn expect_payload<T: DeserializeOwned>(envelope: Envelope, what: &str) -> Result<T> {
    match envelope {
        Envelope::Ok(mut result) => {
            if result.is_empty() {
                eyre::bail!("Server sent OK without the expected {what}");
            }
            serde_json::from_value(result.remove(0))
                .wrap_err_with(|| format!("Failed to decode {what}"))
        }
        other => Err(eyre::eyre!("{}", other.message())),
    }
}
