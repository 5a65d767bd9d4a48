use std::collections::HashMap;

use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use serenity::async_trait;
use tracing::{debug, warn};

use crate::bot::{commands::commands::BotResult, state::def::BotError};

#[derive(Debug, Clone, Deserialize)]
pub struct Coin {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub image: CoinImage,
    pub market_cap_rank: Option<u32>,
    pub market_data: CoinMarketData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoinImage {
    pub thumb: Option<String>,
    pub small: Option<String>,
    pub large: Option<String>,
}

/// Per-currency maps keyed by lowercase currency code.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoinMarketData {
    #[serde(default)]
    pub current_price: HashMap<String, f64>,
    #[serde(default)]
    pub market_cap: HashMap<String, f64>,
    #[serde(default)]
    pub price_change_percentage_1h_in_currency: HashMap<String, f64>,
    #[serde(default)]
    pub price_change_percentage_24h_in_currency: HashMap<String, f64>,
    #[serde(default)]
    pub price_change_percentage_7d_in_currency: HashMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalMarketData {
    /// Unix millis for each point.
    pub timestamps: Vec<i64>,
    pub prices: Vec<f64>,
    pub from: String,
    pub to: String,
}

impl HistoricalMarketData {
    /// Builds the series from `[unix millis, price]` pairs.
    pub fn from_points(points: &[(i64, f64)]) -> Self {
        let timestamps: Vec<i64> = points.iter().map(|(ms, _)| *ms).collect();
        let prices = points.iter().map(|(_, price)| *price).collect();

        HistoricalMarketData {
            from: timestamps.first().map(|ms| get_date_str(*ms)).unwrap_or_default(),
            to: timestamps.last().map(|ms| get_date_str(*ms)).unwrap_or_default(),
            timestamps,
            prices,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MarketChartResponse {
    prices: Vec<(f64, f64)>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    coins: Vec<SearchCoin>,
}

#[derive(Debug, Deserialize)]
struct SearchCoin {
    id: String,
    symbol: String,
}

pub fn get_date_str(unix_millis: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(unix_millis) {
        Some(date) => date.format("%b %-d, %Y").to_string(),
        None => String::new(),
    }
}

#[async_trait]
pub trait MarketApi: Send + Sync {
    /// Snapshot of a coin by id. Unknown ids fall back to a symbol search.
    async fn get_coin(&self, id: &str) -> BotResult<Coin>;
    async fn get_historical_market_data(&self, id: &str, currency: &str, days: u32) -> BotResult<HistoricalMarketData>;
}

pub struct CoinGecko {
    client: Client,
    base_url: String,
}

impl CoinGecko {
    pub fn new(base_url: impl Into<String>) -> Self {
        CoinGecko {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> BotResult<Option<T>> {
        let url = format!("{}{}", self.base_url, path);
        let res = self.client.get(&url).query(query).send().await?;

        if res.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let res = res.error_for_status()?;
        let body = res.text().await?;

        Ok(Some(serde_json::from_str(&body)?))
    }

    async fn fetch_coin(&self, id: &str) -> BotResult<Option<Coin>> {
        self.get_json(
            &format!("/coins/{id}"),
            &[
                ("localization", "false"),
                ("tickers", "false"),
                ("community_data", "false"),
                ("developer_data", "false"),
            ],
        )
        .await
    }

    async fn search_coin_id(&self, query: &str) -> BotResult<Option<String>> {
        let Some(found) = self.get_json::<SearchResponse>("/search", &[("query", query)]).await? else {
            return Ok(None);
        };

        let exact = found.coins.iter().find(|c| c.symbol.eq_ignore_ascii_case(query));
        Ok(exact.or(found.coins.first()).map(|c| c.id.clone()))
    }
}

#[async_trait]
impl MarketApi for CoinGecko {
    async fn get_coin(&self, id: &str) -> BotResult<Coin> {
        if let Some(coin) = self.fetch_coin(id).await? {
            return Ok(coin);
        }

        debug!("Coin {id} not found, searching");
        let Some(found) = self.search_coin_id(id).await? else {
            return Err(BotError::NotFound(id.to_string()));
        };

        self.fetch_coin(&found).await?.ok_or_else(|| {
            warn!("Search returned {found} for {id} but the coin could not be fetched");
            BotError::NotFound(id.to_string())
        })
    }

    async fn get_historical_market_data(&self, id: &str, currency: &str, days: u32) -> BotResult<HistoricalMarketData> {
        let days = days.to_string();
        let chart: MarketChartResponse = self
            .get_json(&format!("/coins/{id}/market_chart"), &[("vs_currency", currency), ("days", days.as_str())])
            .await?
            .ok_or_else(|| BotError::NotFound(id.to_string()))?;

        let points: Vec<(i64, f64)> = chart.prices.iter().map(|(ms, price)| (*ms as i64, *price)).collect();
        Ok(HistoricalMarketData::from_points(&points))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_dates_from_millis() {
        assert_eq!(get_date_str(1_650_000_000_000), "Apr 15, 2022");
        assert_eq!(get_date_str(0), "Jan 1, 1970");
    }

    #[test]
    fn series_range_comes_from_first_and_last_points() {
        let data = HistoricalMarketData::from_points(&[(0, 1.0), (86_400_000, 2.0), (172_800_000, 1.5)]);
        assert_eq!(data.prices, vec![1.0, 2.0, 1.5]);
        assert_eq!(data.from, "Jan 1, 1970");
        assert_eq!(data.to, "Jan 3, 1970");
        assert_eq!(data.timestamps, vec![0, 86_400_000, 172_800_000]);
    }

    #[test]
    fn empty_series_has_blank_range() {
        let data = HistoricalMarketData::from_points(&[]);
        assert!(data.prices.is_empty());
        assert_eq!(data.from, "");
    }

    #[test]
    fn coin_snapshot_deserializes_with_missing_maps() {
        let raw = r#"{
            "id": "fantom",
            "symbol": "ftm",
            "name": "Fantom",
            "image": {"thumb": "t", "small": "s", "large": "l"},
            "market_cap_rank": 55,
            "market_data": {
                "current_price": {"usd": 0.45},
                "market_cap": {"usd": 1200000000}
            }
        }"#;
        let coin: Coin = serde_json::from_str(raw).unwrap();
        assert_eq!(coin.market_cap_rank, Some(55));
        assert_eq!(coin.image.small.as_deref(), Some("s"));
        assert!(coin.market_data.price_change_percentage_1h_in_currency.is_empty());
        assert_eq!(coin.market_data.market_cap["usd"], 1_200_000_000.0);
    }
}
