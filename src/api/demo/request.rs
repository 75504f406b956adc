use axum::{
    Extension, Json,
    extract::ConnectInfo,
    http::{HeaderMap, Method, Uri, header},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use tower_sessions::cookie::Cookie;

use crate::api::{ApiError, ApiResponse, JsonBody, PathParam, QueryParams};

const ITEM_NAMES: [&str; 3] = ["First", "Second", "Third"];

#[derive(Debug, Serialize)]
pub struct RequestInfo {
    pub request_method: String,
    pub request_url: String,
    pub client_host: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub cookies: BTreeMap<String, String>,
    pub query_params: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct ItemPage {
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_item_limit")]
    pub limit: usize,
}

const fn default_item_limit() -> usize {
    10
}

#[derive(Debug, Serialize)]
pub struct ItemName {
    pub item_name: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ItemFilter {
    pub q: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub tax: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct PricedItem {
    #[serde(flatten)]
    pub item: Item,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_with_tax: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ItemLookup {
    pub item_id: i32,
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ItemUpdate {
    pub item_id: i32,
    #[serde(flatten)]
    pub item: Item,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
}

/// Cookies from every `Cookie` header; unparsable pairs are skipped.
fn parse_cookies(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .map(|c| (c.name().to_string(), c.value().to_string()))
        .collect()
}

/// GET /demo/info
pub async fn info(
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    connect_info: Option<Extension<ConnectInfo<SocketAddr>>>,
    QueryParams(query_params): QueryParams<BTreeMap<String, String>>,
) -> Json<ApiResponse<RequestInfo>> {
    let mut header_map: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in &headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        header_map
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }

    Json(ApiResponse::success(RequestInfo {
        request_method: method.to_string(),
        request_url: uri.to_string(),
        client_host: connect_info.map(|Extension(ConnectInfo(addr))| addr.ip().to_string()),
        headers: header_map,
        cookies: parse_cookies(&headers),
        query_params,
    }))
}

/// GET /demo/cookie
pub async fn cookie(headers: HeaderMap) -> Json<ApiResponse<BTreeMap<&'static str, Option<String>>>> {
    let ads_id = parse_cookies(&headers).remove("ads_id");
    Json(ApiResponse::success(BTreeMap::from([("ads_id", ads_id)])))
}

/// GET /demo/header
pub async fn user_agent(
    headers: HeaderMap,
) -> Json<ApiResponse<BTreeMap<&'static str, Option<String>>>> {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    Json(ApiResponse::success(BTreeMap::from([(
        "User-Agent",
        user_agent,
    )])))
}

/// GET /demo/header/list
/// Every `x-token` header value, in arrival order.
pub async fn token_list(
    headers: HeaderMap,
) -> Json<ApiResponse<BTreeMap<&'static str, Option<Vec<String>>>>> {
    let tokens: Vec<String> = headers
        .get_all("x-token")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect();

    let tokens = (!tokens.is_empty()).then_some(tokens);
    Json(ApiResponse::success(BTreeMap::from([(
        "X-Token values",
        tokens,
    )])))
}

/// GET /demo/items
pub async fn list_items(QueryParams(page): QueryParams<ItemPage>) -> Json<ApiResponse<Vec<ItemName>>> {
    let items = ITEM_NAMES
        .iter()
        .skip(page.skip)
        .take(page.limit)
        .map(|&item_name| ItemName { item_name })
        .collect();

    Json(ApiResponse::success(items))
}

fn validate_item_id(item_id: i32) -> Result<i32, ApiError> {
    if !(1..=1000).contains(&item_id) {
        return Err(ApiError::validation(
            "item_id must be between 1 and 1000",
        ));
    }
    Ok(item_id)
}

fn validate_q(q: Option<String>) -> Result<Option<String>, ApiError> {
    if let Some(q) = &q
        && !(3..=50).contains(&q.chars().count())
    {
        return Err(ApiError::validation(
            "q must be between 3 and 50 characters",
        ));
    }
    Ok(q)
}

/// GET /demo/items/{item_id}
pub async fn get_item(
    PathParam(item_id): PathParam<i32>,
    QueryParams(filter): QueryParams<ItemFilter>,
) -> Result<Json<ApiResponse<ItemLookup>>, ApiError> {
    Ok(Json(ApiResponse::success(ItemLookup {
        item_id: validate_item_id(item_id)?,
        q: validate_q(filter.q)?,
    })))
}

/// POST /demo/items
pub async fn create_item(JsonBody(item): JsonBody<Item>) -> Json<ApiResponse<PricedItem>> {
    let price_with_tax = item
        .tax
        .filter(|tax| tax.abs() > f64::EPSILON)
        .map(|tax| item.price + tax);

    Json(ApiResponse::success(PricedItem {
        item,
        price_with_tax,
    }))
}

/// PUT /demo/items/{item_id}
pub async fn update_item(
    PathParam(item_id): PathParam<i32>,
    QueryParams(filter): QueryParams<ItemFilter>,
    JsonBody(item): JsonBody<Item>,
) -> Json<ApiResponse<ItemUpdate>> {
    let q = filter.q.filter(|q| !q.is_empty());
    Json(ApiResponse::success(ItemUpdate { item_id, item, q }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_parse_cookies_across_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("ads_id=abc; theme=dark"));
        headers.append(header::COOKIE, HeaderValue::from_static("lang=ko"));

        let cookies = parse_cookies(&headers);
        assert_eq!(cookies.get("ads_id").map(String::as_str), Some("abc"));
        assert_eq!(cookies.get("theme").map(String::as_str), Some("dark"));
        assert_eq!(cookies.get("lang").map(String::as_str), Some("ko"));
    }

    #[test]
    fn test_item_checks() {
        assert!(validate_item_id(1).is_ok());
        assert!(validate_item_id(1000).is_ok());
        assert!(validate_item_id(0).is_err());
        assert!(validate_item_id(1001).is_err());

        assert!(validate_q(None).unwrap().is_none());
        assert!(validate_q(Some("ab".to_string())).is_err());
        assert!(validate_q(Some("abc".to_string())).is_ok());
    }
}
