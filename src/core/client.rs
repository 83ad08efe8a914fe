use crate::domain::model::{ApiResponse, AuthMode, HttpMethod};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method};

/// 對後端 API 的薄包裝：組 URL、附加授權標頭、送出一次請求
pub struct ApiClient {
    client: Client,
    base_url: String,
    admin_username: String,
    admin_password: String,
}

impl ApiClient {
    pub fn new<C: ConfigProvider>(config: &C) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout_seconds() {
            builder = builder.timeout(std::time::Duration::from_secs(timeout));
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url().trim_end_matches('/').to_string(),
            admin_username: config.admin_username().to_string(),
            admin_password: config.admin_password().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn admin_username(&self) -> &str {
        &self.admin_username
    }

    pub fn admin_password(&self) -> &str {
        &self.admin_password
    }

    pub fn url_for(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// `admin/login` 回傳的 token 也是這個值
    pub fn basic_credentials(&self) -> String {
        BASE64.encode(format!("{}:{}", self.admin_username, self.admin_password))
    }

    pub fn auth_header(&self, mode: AuthMode, token: Option<&str>) -> Option<String> {
        match mode {
            AuthMode::None => None,
            AuthMode::Bearer => token.map(|t| format!("Bearer {}", t)),
            AuthMode::Basic => Some(format!(
                "Basic {}",
                token.map(str::to_string).unwrap_or_else(|| self.basic_credentials())
            )),
            AuthMode::RawBasic => Some(format!(
                "Basic {}:{}",
                self.admin_username, self.admin_password
            )),
        }
    }

    pub async fn send(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&serde_json::Value>,
        authorization: Option<&str>,
    ) -> Result<ApiResponse> {
        let url = self.url_for(endpoint);
        tracing::debug!("➡️ {} {}", method, url);

        let mut request = self
            .client
            .request(to_reqwest_method(method), &url)
            .header(CONTENT_TYPE, "application/json");

        if let Some(value) = authorization {
            request = request.header(AUTHORIZATION, value);
        }

        // 沒有 body 的 POST 不送任何內容，後端拒收 `null`
        if let Some(body) = body.filter(|_| method.carries_body()) {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        tracing::debug!("⬅️ {} {} -> {} ({} bytes)", method, url, status, text.len());
        Ok(ApiResponse::new(status, text))
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}
