//! HTTP client for the CRM REST API.
//!
//! Implements the `CrmSource` seam over the hosted CRM: cursor-paginated
//! contact listing, offset-paginated invoice listing, contact detail and
//! custom-field catalog lookups, and the OAuth refresh exchange.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};

use leadmirror_core::credentials::CrmCredentials;
use leadmirror_core::remote::{
    contact_cursor_seed, Advance, CustomFieldCatalog, FetchOutcome, Page, PageQuery, PagingConfig,
    RemoteContact, RemoteInvoice,
};
use leadmirror_core::sync::CrmSource;

use crate::error::{CrmApiError, Result};
use crate::wire::{
    ApiErrorResponse, ContactDetailResponse, ContactListResponse, CustomFieldsResponse,
    InvoiceDetailResponse, InvoiceListResponse, TokenResponse,
};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_LOG_BODY_CHARS: usize = 512;

const DEFAULT_BASE_URL: &str = "https://services.leadconnectorhq.com";
/// Pinned CRM API revision, sent as the `Version` header.
const API_VERSION: &str = "2021-07-28";

/// OAuth application credentials for the refresh-token exchange.
#[derive(Debug, Clone)]
pub struct OauthConfig {
    pub client_id: String,
    pub client_secret: String,
}

/// Client for the hosted CRM REST API.
#[derive(Debug, Clone)]
pub struct CrmClient {
    client: reqwest::Client,
    base_url: String,
    oauth: Option<OauthConfig>,
}

impl CrmClient {
    /// Create a client against the production API.
    pub fn new(oauth: Option<OauthConfig>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, oauth)
    }

    /// Create a client against a custom base URL.
    pub fn with_base_url(base_url: &str, oauth: Option<OauthConfig>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            oauth,
        }
    }

    /// Create headers for an API request.
    fn headers(&self, token: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert("Version", HeaderValue::from_static(API_VERSION));

        let auth_value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| CrmApiError::auth("Invalid access token format"))?;
        headers.insert(AUTHORIZATION, auth_value);

        Ok(headers)
    }

    fn log_response(status: reqwest::StatusCode, body: &str) {
        if status.is_success() {
            debug!("API response status: {}", status);
            return;
        }

        let mut preview = body.chars().take(MAX_LOG_BODY_CHARS).collect::<String>();
        if body.chars().count() > MAX_LOG_BODY_CHARS {
            preview.push_str("...");
        }
        debug!("API response error ({}): {}", status, preview);
    }

    /// Parse a JSON response body.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        Self::log_response(status, &body);

        if !status.is_success() {
            if let Ok(error) = serde_json::from_str::<ApiErrorResponse>(&body) {
                return Err(CrmApiError::api(status.as_u16(), error.display()));
            }
            return Err(CrmApiError::api(
                status.as_u16(),
                format!("Request failed: {}", body),
            ));
        }

        serde_json::from_str(&body).map_err(|e| {
            log::error!(
                "Failed to deserialize response. Body: {}, Error: {}",
                body,
                e
            );
            CrmApiError::api(status.as_u16(), format!("Failed to parse response: {}", e))
        })
    }

    /// GET /contacts/, one cursor-paginated page.
    async fn contacts_page(
        &self,
        token: &str,
        location_id: &str,
        query: &PageQuery,
    ) -> Result<Page<RemoteContact>> {
        let url = format!("{}/contacts/", self.base_url);
        let mut params: Vec<(&str, String)> = vec![
            ("locationId", location_id.to_string()),
            ("limit", query.limit.to_string()),
        ];
        if let Some(id) = &query.start_after_id {
            params.push(("startAfterId", id.clone()));
        }
        if let Some(ts) = query.start_after {
            params.push(("startAfter", ts.to_string()));
        }

        let response = self
            .client
            .get(&url)
            .headers(self.headers(token)?)
            .query(&params)
            .send()
            .await?;
        let body: ContactListResponse = Self::parse_response(response).await?;
        Ok(Page {
            records: body.contacts,
            total: body.meta.total,
        })
    }

    /// GET /invoices/, one offset-paginated page.
    async fn invoices_page(
        &self,
        token: &str,
        location_id: &str,
        query: &PageQuery,
    ) -> Result<Page<RemoteInvoice>> {
        let url = format!("{}/invoices/", self.base_url);
        let params: Vec<(&str, String)> = vec![
            ("altId", location_id.to_string()),
            ("altType", "location".to_string()),
            ("limit", query.limit.to_string()),
            ("offset", query.offset.to_string()),
        ];

        let response = self
            .client
            .get(&url)
            .headers(self.headers(token)?)
            .query(&params)
            .send()
            .await?;
        let body: InvoiceListResponse = Self::parse_response(response).await?;
        Ok(Page {
            records: body.invoices,
            total: body.total,
        })
    }
}

#[async_trait]
impl CrmSource for CrmClient {
    async fn fetch_all_contacts(
        &self,
        access_token: &str,
        location_id: &str,
        paging: &PagingConfig,
    ) -> leadmirror_core::Result<FetchOutcome<RemoteContact>> {
        leadmirror_core::remote::fetch_all_pages(
            paging,
            Advance::Cursor(contact_cursor_seed),
            |query| async move {
                self.contacts_page(access_token, location_id, &query)
                    .await
                    .map_err(leadmirror_core::Error::from)
            },
        )
        .await
    }

    async fn fetch_contact_detail(
        &self,
        access_token: &str,
        contact_id: &str,
    ) -> leadmirror_core::Result<RemoteContact> {
        let url = format!("{}/contacts/{}", self.base_url, contact_id);
        let response = self
            .client
            .get(&url)
            .headers(self.headers(access_token)?)
            .send()
            .await
            .map_err(CrmApiError::from)?;
        let body: ContactDetailResponse = Self::parse_response(response).await?;
        Ok(body.contact)
    }

    async fn fetch_custom_field_catalog(
        &self,
        access_token: &str,
        location_id: &str,
    ) -> leadmirror_core::Result<CustomFieldCatalog> {
        let url = format!("{}/locations/{}/customFields", self.base_url, location_id);
        let response = self
            .client
            .get(&url)
            .headers(self.headers(access_token)?)
            .query(&[("model", "contact")])
            .send()
            .await
            .map_err(CrmApiError::from)?;
        let body: CustomFieldsResponse = Self::parse_response(response).await?;
        Ok(body.into_catalog())
    }

    async fn fetch_all_invoices(
        &self,
        access_token: &str,
        location_id: &str,
        paging: &PagingConfig,
    ) -> leadmirror_core::Result<FetchOutcome<RemoteInvoice>> {
        leadmirror_core::remote::fetch_all_pages(paging, Advance::Offset, |query| async move {
            self.invoices_page(access_token, location_id, &query)
                .await
                .map_err(leadmirror_core::Error::from)
        })
        .await
    }

    async fn fetch_invoice_detail(
        &self,
        access_token: &str,
        location_id: &str,
        invoice_id: &str,
    ) -> leadmirror_core::Result<RemoteInvoice> {
        let url = format!("{}/invoices/{}", self.base_url, invoice_id);
        let response = self
            .client
            .get(&url)
            .headers(self.headers(access_token)?)
            .query(&[("altId", location_id), ("altType", "location")])
            .send()
            .await
            .map_err(CrmApiError::from)?;
        let body: InvoiceDetailResponse = Self::parse_response(response).await?;
        Ok(body.into_invoice())
    }

    async fn refresh_credentials(
        &self,
        refresh_token: &str,
    ) -> leadmirror_core::Result<CrmCredentials> {
        let oauth = self.oauth.as_ref().ok_or_else(|| {
            CrmApiError::invalid_request("OAuth client configuration is not set")
        })?;

        let url = format!("{}/oauth/token", self.base_url);
        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", oauth.client_id.as_str()),
            ("client_secret", oauth.client_secret.as_str()),
            ("refresh_token", refresh_token),
        ];

        let response = self
            .client
            .post(&url)
            .header(ACCEPT, "application/json")
            .form(&form)
            .send()
            .await
            .map_err(CrmApiError::from)?;
        let body: TokenResponse = Self::parse_response(response).await?;

        let access_token = body
            .access_token
            .ok_or_else(|| CrmApiError::auth("token response carried no access_token"))?;
        let refresh_token = body
            .refresh_token
            .ok_or_else(|| CrmApiError::auth("token response carried no refresh_token"))?;

        Ok(CrmCredentials {
            location_id: body.location_id.unwrap_or_default(),
            user_id: body.user_id,
            company_id: body.company_id,
            access_token,
            refresh_token,
            expires_in: body.expires_in,
            scope: body.scope,
            user_type: body.user_type,
            updated_at: None,
        })
    }
}
