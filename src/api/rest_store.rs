//! Implements the `Store` trait against a PostgREST-style table API.

use crate::api::{Credentials, Store};
use crate::model::Transaction;
use crate::Result;
use anyhow::{bail, Context};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::trace;
use url::Url;

const TABLE_PATH: &str = "rest/v1/transactions";

/// The columns sent in a bulk upsert. Rows that omit `id` get the column default, i.e. a new id.
const UPSERT_COLUMNS: &str = "id,user_id,date,amount,description,category,type,paid";

/// Talks to `{api_url}/rest/v1/transactions` with the project API key and the user's access token.
/// Row level security on the remote side limits every request to the user's own rows.
pub(super) struct RestStore {
    client: reqwest::Client,
    endpoint: Url,
    credentials: Credentials,
}

impl RestStore {
    pub(super) fn new(api_url: &str, credentials: Credentials) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint: endpoint(api_url)?,
            credentials,
        })
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        trace!("{method} {url}");
        self.client
            .request(method, url)
            .header("apikey", self.credentials.api_key())
            .bearer_auth(self.credentials.access_token())
    }

    fn by_id(&self, id: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("id", &format!("eq.{id}"));
        url
    }
}

/// Resolves the table endpoint below `api_url`, keeping any path the URL already has.
fn endpoint(api_url: &str) -> Result<Url> {
    let mut base =
        Url::parse(api_url).with_context(|| format!("Invalid API URL '{api_url}'"))?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(TABLE_PATH)
        .with_context(|| format!("Unable to build the table URL from '{api_url}'"))
}

fn fetch_url(endpoint: &Url, owner: &str) -> Url {
    let mut url = endpoint.clone();
    url.query_pairs_mut()
        .append_pair("select", "*")
        .append_pair("user_id", &format!("eq.{owner}"))
        .append_pair("order", "date.desc");
    url
}

fn upsert_url(endpoint: &Url) -> Url {
    let mut url = endpoint.clone();
    url.query_pairs_mut()
        .append_pair("on_conflict", "id")
        .append_pair("columns", UPSERT_COLUMNS);
    url
}

/// Returns the response if it is a success, otherwise an error carrying the status and body.
async fn check(response: Response, what: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read response body".to_string());
    bail!("{what} failed with status {status}: {body}")
}

async fn parse<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
    check(response, what)
        .await?
        .json()
        .await
        .with_context(|| format!("Unable to parse the response to {what}"))
}

/// The single row a `return=representation` write sends back.
fn single(mut rows: Vec<Transaction>, id: Option<&str>) -> Result<Transaction> {
    match rows.pop() {
        Some(row) if rows.is_empty() => Ok(row),
        Some(_) => bail!("Expected one row in the response, got {}", rows.len() + 1),
        None => match id {
            Some(id) => bail!("No transaction with id '{id}'"),
            None => bail!("The store returned no row"),
        },
    }
}

#[async_trait::async_trait]
impl Store for RestStore {
    fn owner(&self) -> &str {
        self.credentials.user_id()
    }

    async fn fetch(&mut self) -> Result<Vec<Transaction>> {
        let url = fetch_url(&self.endpoint, self.owner());
        let response = self
            .request(Method::GET, url)
            .send()
            .await
            .context("Failed to send the fetch request")?;
        parse(response, "fetch").await
    }

    async fn insert(&mut self, transaction: &Transaction) -> Result<Transaction> {
        let mut body = transaction.clone().with_owner(self.owner());
        body.id = None;
        let response = self
            .request(Method::POST, self.endpoint.clone())
            .header("Prefer", "return=representation")
            .json(&body)
            .send()
            .await
            .context("Failed to send the insert request")?;
        single(parse(response, "insert").await?, None)
    }

    async fn update(&mut self, transaction: &Transaction) -> Result<Transaction> {
        let id = transaction
            .id()
            .context("Cannot update a transaction that has no id")?;
        let body = transaction.clone().with_owner(self.owner());
        let response = self
            .request(Method::PATCH, self.by_id(id))
            .header("Prefer", "return=representation")
            .json(&body)
            .send()
            .await
            .context("Failed to send the update request")?;
        single(parse(response, "update").await?, Some(id))
    }

    async fn delete(&mut self, id: &str) -> Result<()> {
        let response = self
            .request(Method::DELETE, self.by_id(id))
            .header("Prefer", "return=representation")
            .send()
            .await
            .context("Failed to send the delete request")?;
        single(parse(response, "delete").await?, Some(id)).map(|_| ())
    }

    async fn upsert(&mut self, records: &[Transaction]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        let owner = self.owner().to_string();
        let body: Vec<Transaction> = records
            .iter()
            .map(|t| t.clone().with_owner(owner.as_str()))
            .collect();
        let response = self
            .request(Method::POST, upsert_url(&self.endpoint))
            .header("Prefer", "resolution=merge-duplicates,missing=default")
            .json(&body)
            .send()
            .await
            .context("Failed to send the upsert request")?;
        check(response, "upsert").await?;
        Ok(records.len())
    }
}
