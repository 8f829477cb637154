// src/core/scanner/geo_scanner.rs

use crate::core::models::GeoRecord;
use async_trait::async_trait;
use serde::Deserialize;
use std::net::IpAddr;
use tracing::{debug, info, warn};

const IP_API_FIELDS: &str = "status,message,country,regionName,city,isp,org,as,lat,lon,query";

/// IP → location and network operator.
#[async_trait]
pub trait GeoClient: Send + Sync {
    async fn geolocate(&self, ip: IpAddr) -> Option<GeoRecord>;
}

/// Client for ip-api compatible JSON endpoints.
pub struct IpApiClient {
    client: reqwest::Client,
    base_url: String,
}

/// Raw body as returned by ip-api.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    country: Option<String>,
    region_name: Option<String>,
    city: Option<String>,
    isp: Option<String>,
    org: Option<String>,
    #[serde(rename = "as")]
    asn: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl IpApiClient {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl GeoClient for IpApiClient {
    async fn geolocate(&self, ip: IpAddr) -> Option<GeoRecord> {
        let url = format!("{}/json/{}", self.base_url, ip);
        debug!(url = %url, "Requesting geolocation.");

        let response = match self.client.get(&url).query(&[("fields", IP_API_FIELDS)]).send().await {
            Ok(res) if res.status().is_success() => res,
            Ok(res) => {
                warn!(url = %url, status = %res.status(), "Geolocation returned a non-success status.");
                return None;
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Geolocation request failed.");
                return None;
            }
        };

        match response.json::<IpApiResponse>().await {
            Ok(body) => {
                let record = into_geo_record(body);
                if let Some(geo) = &record {
                    info!(%ip, country = ?geo.country, operator = ?geo.operator, "Geolocation retrieved.");
                }
                record
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Geolocation body could not be parsed.");
                None
            }
        }
    }
}

/// A body whose status is anything but "success" counts as a failure.
fn into_geo_record(body: IpApiResponse) -> Option<GeoRecord> {
    if body.status != "success" {
        warn!(status = %body.status, message = ?body.message, "Geolocation lookup was rejected.");
        return None;
    }
    Some(GeoRecord {
        country: body.country,
        region: body.region_name,
        city: body.city,
        operator: body.isp,
        organization: body.org,
        asn: body.asn,
        latitude: body.lat,
        longitude: body.lon,
    })
}
