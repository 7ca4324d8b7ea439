//! HTTP client for the Prospector API.
//!
//! Authenticated endpoints live under `/api/insight/*` and use HTTP basic
//! auth with the stored credential pair. `/api/information/*` and the
//! sign-on endpoint are public.

use crate::converter::ApiFilter;
use crate::errors::BridgeError;
use crate::prospect::{Prospect, RecordDefaults};
use crate::settings::Settings;
use crate::storage::{CrmStore, Credentials};
use reqwest::redirect::Policy;
use reqwest::{RequestBuilder, StatusCode};
use serde_json::Value;
use std::sync::Arc;

/// Fixed result window of the prospects endpoint. There is no paging past it.
pub const RESULT_SKIP: usize = 0;
pub const RESULT_TAKE: usize = 2500;

/// Outcome of the lead organisation-number lookup, which must never fail the
/// request but should not hide a broken query either.
#[derive(Debug)]
pub enum OrgNumberLookup {
    Found(Vec<String>),
    Empty,
    Failed(BridgeError),
}

impl OrgNumberLookup {
    pub fn into_values(self) -> Vec<String> {
        match self {
            OrgNumberLookup::Found(values) => values,
            OrgNumberLookup::Empty | OrgNumberLookup::Failed(_) => Vec::new(),
        }
    }
}

#[derive(Clone)]
pub struct ProspectorClient {
    base_url: String,
    http: reqwest::Client,
    http_no_redirect: reqwest::Client,
    store: Arc<dyn CrmStore>,
    defaults: RecordDefaults,
    credentials: Option<Credentials>,
}

impl ProspectorClient {
    /// Build a client without credentials. Call [`connect`](Self::connect)
    /// per request to pick up the stored pair.
    pub fn new(settings: &Settings, store: Arc<dyn CrmStore>) -> Result<Self, BridgeError> {
        let http = reqwest::Client::builder().build()?;
        let http_no_redirect = reqwest::Client::builder()
            .redirect(Policy::none())
            .build()?;

        Ok(Self {
            base_url: settings.prospector.base_url.trim_end_matches('/').to_string(),
            http,
            http_no_redirect,
            store,
            defaults: RecordDefaults::from(&settings.crm),
            credentials: None,
        })
    }

    /// A copy of this client carrying the currently stored credential pair.
    pub async fn connect(&self) -> Result<Self, BridgeError> {
        let mut client = self.clone();
        client.credentials = self.store.active_credentials().await?;
        Ok(client)
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, request: RequestBuilder) -> Result<RequestBuilder, BridgeError> {
        let creds = self.credentials.as_ref().ok_or(BridgeError::NotSignedIn)?;
        Ok(request.basic_auth(&creds.client_id, Some(&creds.client_secret)))
    }

    async fn send_json(request: RequestBuilder) -> Result<Value, BridgeError> {
        let response = request.send().await?;
        Ok(response.json::<Value>().await?)
    }

    /// Start the Prospector sign-on flow. The returned document carries the
    /// `signInUrl` the browser should be sent to; Prospector later calls
    /// `redirect_url` with the issued client id and secret.
    pub async fn begin_sign_on(
        &self,
        redirect_url: &str,
        db: &str,
        username: &str,
    ) -> Result<Value, BridgeError> {
        let form = [("redirecturl", redirect_url), ("db", db), ("username", username)];
        let request = self
            .http
            .post(self.url("/mox/odooauth/auth/beginsignon"))
            .form(&form);
        Self::send_json(request).await
    }

    pub async fn get_search_filters(&self) -> Result<Value, BridgeError> {
        let request = self.authed(self.http.get(self.url("/api/insight/filters")))?;
        Self::send_json(request).await
    }

    pub async fn get_landing_page_info(&self) -> Result<Value, BridgeError> {
        Self::send_json(self.http.get(self.url("/api/information/landingpage"))).await
    }

    pub async fn get_ai_search_info(&self) -> Result<Value, BridgeError> {
        Self::send_json(self.http.get(self.url("/api/information/aiSearch"))).await
    }

    pub async fn get_ai_prompt_filters(&self, prompt: &str) -> Result<Value, BridgeError> {
        let url = format!(
            "{}?prompt={}",
            self.url("/api/insight/AIFilters"),
            urlencoding::encode(prompt)
        );
        let request = self.authed(self.http.get(url))?;
        Self::send_json(request).await
    }

    pub async fn preview_filter_results(&self, filters: &[ApiFilter]) -> Result<Value, BridgeError> {
        let request = self.authed(self.http.post(self.url("/api/insight/filters")).json(filters))?;
        Self::send_json(request).await
    }

    pub async fn get_filter_results(&self, filters: &[ApiFilter]) -> Result<Value, BridgeError> {
        let url = format!(
            "{}?skip={}&take={}",
            self.url("/api/insight/prospects"),
            RESULT_SKIP,
            RESULT_TAKE
        );
        let request = self.authed(self.http.post(url).json(filters))?;
        Self::send_json(request).await
    }

    /// `false` without touching the network when no pair is stored.
    pub async fn validate_access_token(&self) -> Result<bool, BridgeError> {
        if self.credentials.is_none() {
            return Ok(false);
        }
        let request = self.authed(
            self.http_no_redirect
                .get(self.url("/api/insight/validatelogin")),
        )?;
        let response = request.send().await?;
        Ok(response.status() == StatusCode::OK)
    }

    pub async fn my_account_details(&self) -> Result<Value, BridgeError> {
        let request = self.authed(self.http_no_redirect.get(self.url("/api/insight/account")))?;
        Self::send_json(request).await
    }

    /// Report the batch size to Prospector, then create one lead per
    /// customer in order. A failing insert stops the batch; leads created
    /// before it are kept.
    pub async fn create_leads(
        &self,
        customers: &[Prospect],
        company_id: Option<i64>,
    ) -> Result<bool, BridgeError> {
        let request = self.authed(
            self.http
                .post(self.url("/api/insight/leads"))
                .json(&customers.len()),
        )?;
        let response = request.send().await?;
        tracing::debug!(status = %response.status(), count = customers.len(), "Reported lead batch");

        for (created, customer) in customers.iter().enumerate() {
            if let Err(e) = self
                .store
                .create_lead(customer.to_lead(company_id, &self.defaults))
                .await
            {
                tracing::error!(created, total = customers.len(), "Lead batch aborted: {}", e);
                return Err(e);
            }
        }
        tracing::info!(count = customers.len(), "Created leads from prospects");
        Ok(true)
    }

    /// Same as [`create_leads`](Self::create_leads) for contacts, without
    /// notifying Prospector.
    pub async fn create_customers(
        &self,
        customers: &[Prospect],
        company_id: Option<i64>,
    ) -> Result<bool, BridgeError> {
        for (created, customer) in customers.iter().enumerate() {
            if let Err(e) = self
                .store
                .create_contact(customer.to_contact(company_id, &self.defaults))
                .await
            {
                tracing::error!(created, total = customers.len(), "Contact batch aborted: {}", e);
                return Err(e);
            }
        }
        tracing::info!(count = customers.len(), "Created contacts from prospects");
        Ok(true)
    }

    pub async fn customer_exists(&self, vat_number: &str) -> Result<bool, BridgeError> {
        Ok(self.store.find_contact_by_vat(vat_number).await?.is_some())
    }

    pub async fn get_all_organisation_numbers(&self) -> Result<Vec<String>, BridgeError> {
        self.store.contact_organisation_numbers().await
    }

    pub async fn get_all_lead_organisation_numbers(&self) -> OrgNumberLookup {
        tracing::info!("Searching for leads with organisation numbers");
        match self.store.lead_organisation_numbers().await {
            Ok(numbers) if numbers.is_empty() => {
                tracing::info!("Found 0 leads with organisation numbers");
                OrgNumberLookup::Empty
            }
            Ok(numbers) => {
                tracing::info!("Found {} leads with organisation numbers", numbers.len());
                tracing::debug!(?numbers, "Retrieved organisation numbers");
                OrgNumberLookup::Found(numbers)
            }
            Err(e) => {
                tracing::error!("Error looking up lead organisation numbers: {}", e);
                OrgNumberLookup::Failed(e)
            }
        }
    }
}
