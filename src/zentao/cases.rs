//! Case listing and detail fetching
//!
//! A listing returns shallow case references; every referenced case then
//! costs one detail request to get its steps, so N cases take N+1 requests.
//! Remote failures end up as an empty list (logged), except a failed login,
//! which is reported as [`Error::LoginFailed`].

use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use crate::common::config::Config;
use crate::common::{Error, Result};

use super::client::ZentaoClient;
use super::types::{CaseDetail, CaseList, CaseRecord, TaskRuns, TestCase, TestStep};

const PAGE_SIZE: &str = "10000";

/// Which cases to load; the first set field in module > suite > task > product order wins
#[derive(Debug, Clone, Default)]
pub struct CaseSelector {
    pub product: Option<String>,
    pub module: Option<String>,
    pub suite: Option<String>,
    pub task: Option<String>,
}

impl CaseSelector {
    fn pick(value: &Option<String>) -> Option<&str> {
        value.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }
}

/// Fetches cases from the server on behalf of one logged-in account
pub struct CaseFetcher {
    client: ZentaoClient,
    account: String,
    password: String,
    logged_in: bool,
    login_failed: bool,
}

impl CaseFetcher {
    pub fn new(client: ZentaoClient, account: &str, password: &str) -> Self {
        Self {
            client,
            account: account.to_string(),
            password: password.to_string(),
            logged_in: false,
            login_failed: false,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            ZentaoClient::from_config(config),
            &config.account,
            &config.password,
        )
    }

    /// Whether a login attempt was rejected
    pub fn login_failed(&self) -> bool {
        self.login_failed
    }

    /// Log in once; later calls reuse the session
    pub async fn login(&mut self) -> Result<()> {
        if self.logged_in {
            return Ok(());
        }
        if let Err(e) = self.client.login(&self.account, &self.password).await {
            self.login_failed = true;
            return Err(e);
        }
        info!("logged in to {}", self.client.base_url());
        self.logged_in = true;
        Ok(())
    }

    /// Log in and load cases for the selector
    pub async fn load_test_cases(&mut self, selector: &CaseSelector) -> Result<Vec<TestCase>> {
        self.login().await?;

        let product = CaseSelector::pick(&selector.product);
        if let Some(module) = CaseSelector::pick(&selector.module) {
            Ok(self.list_by_module(product.unwrap_or("0"), module).await)
        } else if let Some(suite) = CaseSelector::pick(&selector.suite) {
            Ok(self.list_by_suite(suite).await)
        } else if let Some(task) = CaseSelector::pick(&selector.task) {
            Ok(self.list_by_task(task).await)
        } else if let Some(product) = product {
            Ok(self.list_by_product(product).await)
        } else {
            Err(Error::Config(
                "Specify one of --product, --module, --suite or --task".to_string(),
            ))
        }
    }

    /// All cases of a product, whatever their module
    pub async fn list_by_product(&self, product_id: &str) -> Vec<TestCase> {
        self.list_by_module(product_id, "all").await
    }

    pub async fn list_by_module(&self, product_id: &str, module_id: &str) -> Vec<TestCase> {
        let params = [
            ("productID", product_id),
            ("branch", ""),
            ("browseType", "byModule"),
            ("param", module_id),
            ("orderBy", "id_asc"),
            ("recTotal", "0"),
            ("recPerPage", PAGE_SIZE),
            ("pageID", "1"),
        ];
        match self.fetch::<CaseList>("testcase", "browse", &params).await {
            Some(list) => self.expand_cases(list).await,
            None => Vec::new(),
        }
    }

    pub async fn list_by_suite(&self, suite_id: &str) -> Vec<TestCase> {
        let params = [
            ("suiteID", suite_id),
            ("orderBy", "id_asc"),
            ("recTotal", "0"),
            ("recPerPage", PAGE_SIZE),
            ("pageID", "1"),
        ];
        match self.fetch::<CaseList>("testsuite", "view", &params).await {
            Some(list) => self.expand_cases(list).await,
            None => Vec::new(),
        }
    }

    pub async fn list_by_task(&self, task_id: &str) -> Vec<TestCase> {
        let params = [
            ("taskID", task_id),
            ("browseType", "all"),
            ("param", "0"),
            ("orderBy", "id_asc"),
            ("recTotal", "0"),
            ("recPerPage", PAGE_SIZE),
            ("pageID", "1"),
        ];
        let Some(task) = self.fetch::<TaskRuns>("testtask", "cases", &params).await else {
            return Vec::new();
        };

        let mut cases = Vec::with_capacity(task.runs.len());
        for run in super::types::de::sort_by_numeric_key(task.runs) {
            let steps = self.case_steps(&run.case).await;
            cases.push(TestCase {
                id: run.case,
                product: run.product,
                module: run.module,
                title: run.title,
                steps,
            });
        }
        cases
    }

    /// Fetch one case with its steps; `None` when the server gave nothing usable
    pub async fn fetch_case_detail(&self, case_id: &str) -> Option<CaseRecord> {
        let params = [
            ("caseID", case_id),
            ("version", "0"),
            ("from", "testcase"),
            ("taskID", "0"),
        ];
        self.fetch::<CaseDetail>("testcase", "view", &params)
            .await
            .map(|detail| detail.case)
    }

    /// Case ids of a remote suite, in listing order
    pub async fn case_ids_by_suite(&mut self, suite_id: &str) -> Vec<i64> {
        if let Err(e) = self.login().await {
            warn!("{}", e);
            return Vec::new();
        }
        ids_of(&self.list_by_suite(suite_id).await)
    }

    /// Case ids of a remote task, in listing order
    pub async fn case_ids_by_task(&mut self, task_id: &str) -> Vec<i64> {
        if let Err(e) = self.login().await {
            warn!("{}", e);
            return Vec::new();
        }
        ids_of(&self.list_by_task(task_id).await)
    }

    /// Push a case's title and steps back to the server
    pub async fn commit_case(&mut self, case_id: i64, title: &str, steps: &[TestStep]) -> Result<()> {
        self.login().await?;

        let id = case_id.to_string();
        let url = self
            .client
            .api_url("testcase", "edit", &[("caseID", id.as_str()), ("comment", "0")])?;
        let params = commit_params(title, steps);

        self.client.post_form(&url, &params, true).await?;
        info!("committed case {}", case_id);
        Ok(())
    }

    async fn expand_cases(&self, list: CaseList) -> Vec<TestCase> {
        let mut cases = Vec::with_capacity(list.cases.len());
        for record in super::types::de::sort_by_numeric_key(list.cases) {
            let steps = self.case_steps(&record.id).await;
            cases.push(TestCase {
                id: record.id,
                product: record.product,
                module: record.module,
                title: record.title,
                steps,
            });
        }
        cases
    }

    async fn case_steps(&self, case_id: &str) -> Vec<TestStep> {
        self.fetch_case_detail(case_id)
            .await
            .map(|record| record.ordered_steps())
            .unwrap_or_default()
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        module: &str,
        method: &str,
        params: &[(&str, &str)],
    ) -> Option<T> {
        let url = match self.client.api_url(module, method, params) {
            Ok(url) => url,
            Err(e) => {
                warn!("{}", e);
                return None;
            }
        };

        let body = match self.client.get(&url).await {
            Ok(body) => body,
            Err(e) => {
                warn!("{}", e);
                return None;
            }
        };

        match serde_json::from_str(&body) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("{}", Error::decode(&url, e));
                debug!(%body, "undecodable payload");
                None
            }
        }
    }
}

fn ids_of(cases: &[TestCase]) -> Vec<i64> {
    let mut ids = Vec::with_capacity(cases.len());
    for id in cases.iter().filter_map(TestCase::numeric_id) {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

/// Edit form: `title`, and `steps`/`stepType`/`expects` keyed by 1-based step number
pub fn commit_params(title: &str, steps: &[TestStep]) -> Value {
    let mut descs = Map::new();
    let mut types = Map::new();
    let mut expects = Map::new();

    for (i, step) in steps.iter().enumerate() {
        let key = (i + 1).to_string();
        descs.insert(key.clone(), Value::String(step.desc.clone()));
        types.insert(key.clone(), Value::String(step.kind().to_string()));
        expects.insert(key, Value::String(step.expect.clone()));
    }

    json!({
        "title": title,
        "steps": descs,
        "stepType": types,
        "expects": expects,
    })
}
