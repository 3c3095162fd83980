use std::sync::Arc;

use askama::Template;
use axum::{
    Json,
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::{
    core::{HistoricalPrice, MonthlySavings},
    dashboard::{ConsumptionChart, Dashboard, PriceChart, Service, Stats},
    fmt::{day_and_month, energy, kroner, rate},
    prelude::*,
    quantity::{Zero, cost::Cost, energy::KilowattHours},
};

pub fn router(service: Arc<Service>) -> Router {
    Router::new()
        .route("/", get(get_page))
        .route("/api/dashboard", get(get_dashboard))
        .route("/health", get(get_health))
        .with_state(service)
}

#[derive(Deserialize)]
struct HomeQuery {
    #[serde(rename = "homeId")]
    home_id: Option<String>,
}

impl HomeQuery {
    fn home_id(&self) -> Option<&str> {
        self.home_id.as_deref().filter(|home_id| !home_id.is_empty())
    }
}

#[instrument(skip_all)]
async fn get_page(
    State(service): State<Arc<Service>>,
    Query(query): Query<HomeQuery>,
) -> Result<Html<String>, WebError> {
    let dashboard = service.build(query.home_id(), Local::now()).await?;
    let html = Page::try_new(&dashboard)?.render().context("failed to render the page")?;
    Ok(Html(html))
}

#[instrument(skip_all)]
async fn get_dashboard(
    State(service): State<Arc<Service>>,
    Query(query): Query<HomeQuery>,
) -> Result<Json<Dashboard>, WebError> {
    Ok(Json(service.build(query.home_id(), Local::now()).await?))
}

#[expect(clippy::unused_async)]
async fn get_health() -> &'static str {
    "OK"
}

/// Upstream failure, rendered as `502 Bad Gateway` with the error chain.
pub struct WebError(Error);

impl<E: Into<Error>> From<E> for WebError {
    fn from(error: E) -> Self {
        Self(error.into())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        error!("failed to build the dashboard: {:#}", self.0);
        (StatusCode::BAD_GATEWAY, format!("{:#}", self.0)).into_response()
    }
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct Page<'a> {
    dashboard: &'a Dashboard,
    current_price: String,
    cost_cards: Vec<Card>,
    savings_cards: Vec<Card>,
    price_stats: Option<StatsView>,
    consumption_stats: Option<StatsView>,
    historical_price_stats: Option<StatsView>,
    monthly_savings_total: String,

    /// Chart.js series, embedded into the script.
    charts: String,
}

struct Card {
    title: String,
    value: String,
    detail: Option<String>,
    is_highlighted: bool,
    is_negative: bool,
}

impl Card {
    fn cost(title: &str, cost: Cost, consumption: KilowattHours) -> Self {
        Self {
            title: title.to_owned(),
            value: kroner(cost),
            detail: Some(energy(consumption)),
            is_highlighted: false,
            is_negative: false,
        }
    }

    fn savings(title: String, savings: Cost) -> Self {
        Self {
            title,
            value: kroner(savings),
            detail: None,
            is_highlighted: false,
            is_negative: savings.round() < Cost::ZERO,
        }
    }

    const fn highlighted(mut self) -> Self {
        self.is_highlighted = true;
        self
    }
}

struct StatsView {
    average: String,
    min: String,
    max: String,
}

impl StatsView {
    fn new<V: Copy>(stats: Stats<V>, format: impl Fn(V) -> String) -> Self {
        Self { average: format(stats.average), min: format(stats.min), max: format(stats.max) }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Charts<'a> {
    price: &'a PriceChart,
    consumption: &'a ConsumptionChart,
    historical_prices: &'a [HistoricalPrice],
    monthly_savings: &'a [MonthlySavings],
}

impl<'a> Page<'a> {
    fn try_new(dashboard: &'a Dashboard) -> Result<Self> {
        let aggregation = &dashboard.aggregation;
        let (cost, consumption, savings) =
            (aggregation.cost, aggregation.consumption_overview, aggregation.savings);
        let charts = serde_json::to_string(&Charts {
            price: &dashboard.price_chart,
            consumption: &dashboard.consumption_chart,
            historical_prices: &aggregation.historical_prices,
            monthly_savings: &aggregation.monthly_savings,
        })?
        .replace('<', "\\u003c");
        Ok(Self {
            dashboard,
            current_price: dashboard.current_price.map_or_else(|| "–".to_owned(), rate),
            cost_cards: vec![
                Card::cost("Kostnad i dag", cost.today, consumption.today),
                Card::cost("Hittil i måneden", cost.this_month, consumption.this_month),
                Card::cost("Prognose måned", cost.forecast, consumption.forecast),
            ],
            savings_cards: vec![
                Card::savings("I dag".to_owned(), savings.today),
                Card::savings("Denne måneden".to_owned(), savings.this_month),
                Card::savings("Forrige måned".to_owned(), savings.last_month),
                Card::savings(
                    format!("Siden {}", day_and_month(dashboard.anchor)),
                    savings.since_anchor,
                )
                .highlighted(),
            ],
            price_stats: dashboard.price_chart.stats.map(|stats| StatsView::new(stats, rate)),
            consumption_stats: dashboard
                .consumption_chart
                .stats
                .map(|stats| StatsView::new(stats, energy)),
            historical_price_stats: dashboard
                .historical_price_stats
                .map(|stats| StatsView::new(stats, rate)),
            monthly_savings_total: kroner(dashboard.monthly_savings_total),
            charts,
        })
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Client;
    use tokio::net::TcpListener;

    use super::*;
    use crate::{dashboard::fixtures::service, weather::Location};

    struct TestServer {
        port: u16,
        client: Client,
    }

    impl TestServer {
        async fn start() -> Result<Self> {
            let listener = TcpListener::bind("127.0.0.1:0").await?;
            let port = listener.local_addr()?.port();
            let app = router(Arc::new(service(Location::defaults())));
            tokio::spawn(async move { axum::serve(listener, app).await });
            Ok(Self { port, client: Client::new() })
        }

        async fn get(&self, path: &str) -> Result<reqwest::Response> {
            Ok(self.client.get(format!("http://127.0.0.1:{}{path}", self.port)).send().await?)
        }
    }

    #[tokio::test]
    async fn test_health() -> Result {
        let response = TestServer::start().await?.get("/health").await?;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        assert_eq!(response.text().await?, "OK");
        Ok(())
    }

    #[tokio::test]
    async fn test_dashboard_json() -> Result {
        let response = TestServer::start().await?.get("/api/dashboard?homeId=home-2").await?;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let dashboard = response.json::<serde_json::Value>().await?;
        assert_eq!(dashboard["homeId"], "home-2");
        assert_eq!(dashboard["homes"][1]["isSelected"], true);
        assert!(dashboard["cost"]["forecast"].is_number());
        assert!(dashboard["savings"]["sinceAnchor"].is_number());
        assert!(dashboard["monthlySavings"].is_array());
        assert_eq!(dashboard["priceChart"]["points"].as_array().map(Vec::len), Some(24));
        Ok(())
    }

    #[tokio::test]
    async fn test_page() -> Result {
        let response = TestServer::start().await?.get("/?homeId=").await?;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let html = response.text().await?;
        assert!(html.contains("Strømpris"));
        assert!(html.contains("Kostnad i dag"));
        assert!(html.contains("Siden 1. oktober"));
        assert!(html.contains("Vinneslia, Drammen"));
        assert!(html.contains("Morgendagens priser publiseres ca. kl. 13:00."));
        Ok(())
    }

    #[tokio::test]
    async fn test_upstream_failure() -> Result {
        let response = TestServer::start().await?.get("/api/dashboard?homeId=unknown").await?;
        assert_eq!(response.status(), reqwest::StatusCode::BAD_GATEWAY);
        assert!(response.text().await?.contains("home not found"));
        Ok(())
    }
}
