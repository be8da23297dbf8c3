//! Response envelopes shared by every backend endpoint.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// The `{ data, success, message? }` wrapper around every backend response.
///
/// `data` is only meaningful when `success` is true. A failed request is
/// still a value of this type, never an `Err`, so callers branch on
/// [`ApiResponse::success`] instead of handling errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// A successful envelope carrying `data`.
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            success: true,
            message: None,
        }
    }

    /// A failed envelope with a diagnostic message and no data.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            data: None,
            success: false,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// The message to show for a failed response.
    pub fn message_or_default(&self) -> &str {
        self.message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or("Request failed")
    }

    /// Split into the payload of a successful response or the failure message.
    pub fn into_data(self) -> Result<Option<T>, String> {
        if self.success {
            Ok(self.data)
        } else {
            Err(self.message_or_default().to_string())
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            data: self.data.map(f),
            success: self.success,
            message: self.message,
        }
    }
}

/// A single page of a paged list endpoint.
///
/// Pages are 1-indexed and never hold more than `limit` items; bodies that
/// break either rule are rejected while parsing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl<T> Paginated<T> {
    /// Number of pages needed to show `total` items.
    pub fn page_count(&self) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.limit))
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.page_count()
    }
}

#[derive(Deserialize)]
struct RawPage<T> {
    data: Vec<T>,
    total: u64,
    page: u32,
    limit: u32,
}

impl<T> TryFrom<RawPage<T>> for Paginated<T> {
    type Error = String;

    fn try_from(raw: RawPage<T>) -> Result<Self, Self::Error> {
        if raw.page == 0 {
            return Err("page numbers start at 1".to_string());
        }
        if raw.data.len() > raw.limit as usize {
            return Err(format!(
                "page holds {} items but the limit is {}",
                raw.data.len(),
                raw.limit
            ));
        }
        Ok(Self {
            data: raw.data,
            total: raw.total,
            page: raw.page,
            limit: raw.limit,
        })
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Paginated<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawPage::<T>::deserialize(deserializer)?;
        Paginated::try_from(raw).map_err(de::Error::custom)
    }
}

/// Body of a paged endpoint: either wrapped in the standard envelope or the
/// bare page itself.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum PageBody<T> {
    Wrapped(ApiResponse<Paginated<T>>),
    Bare(Paginated<T>),
}

impl<T> From<PageBody<T>> for ApiResponse<Paginated<T>> {
    fn from(body: PageBody<T>) -> Self {
        match body {
            PageBody::Wrapped(envelope) => envelope,
            PageBody::Bare(page) => ApiResponse::ok(page),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_envelope_has_no_data() {
        let resp: ApiResponse<Vec<u32>> = ApiResponse::failure("backend down");
        assert!(!resp.is_success());
        assert!(resp.data.is_none());
        assert_eq!(resp.into_data(), Err("backend down".to_string()));
    }

    #[test]
    fn missing_message_falls_back() {
        let resp: ApiResponse<u32> =
            serde_json::from_str(r#"{"data":null,"success":false}"#).unwrap();
        assert_eq!(resp.message_or_default(), "Request failed");
    }

    #[test]
    fn data_is_optional_on_success() {
        let resp: ApiResponse<serde_json::Value> =
            serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert_eq!(resp.into_data(), Ok(None));
    }

    #[test]
    fn failed_page_envelope_parses_without_data() {
        let body: PageBody<u32> =
            serde_json::from_str(r#"{"success":false,"message":"no such page"}"#).unwrap();
        let resp = ApiResponse::from(body);
        assert!(resp.data.is_none());
        assert_eq!(resp.into_data(), Err("no such page".to_string()));
    }

    #[test]
    fn page_rejects_more_items_than_limit() {
        let json = r#"{"data":[1,2,3],"total":3,"page":1,"limit":2}"#;
        let err = serde_json::from_str::<Paginated<u32>>(json).unwrap_err();
        assert!(err.to_string().contains("limit is 2"));
    }

    #[test]
    fn page_rejects_zero_page() {
        let json = r#"{"data":[],"total":0,"page":0,"limit":10}"#;
        assert!(serde_json::from_str::<Paginated<u32>>(json).is_err());
    }

    #[test]
    fn page_body_accepts_bare_and_wrapped() {
        let bare = r#"{"data":[1,2],"total":45,"page":2,"limit":10}"#;
        let body: PageBody<u32> = serde_json::from_str(bare).unwrap();
        let resp = ApiResponse::from(body);
        assert!(resp.success);
        assert_eq!(resp.data.unwrap().total, 45);

        let wrapped = r#"{"success":true,"data":{"data":[1],"total":1,"page":1,"limit":10}}"#;
        let body: PageBody<u32> = serde_json::from_str(wrapped).unwrap();
        let resp = ApiResponse::from(body);
        assert_eq!(resp.data.unwrap().data, vec![1]);
    }

    #[test]
    fn page_count_rounds_up() {
        let page = Paginated {
            data: vec![0u8; 10],
            total: 45,
            page: 2,
            limit: 10,
        };
        assert_eq!(page.page_count(), 5);
        assert!(page.has_next());
    }
}
