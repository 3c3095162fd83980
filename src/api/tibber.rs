use chrono::{DateTime, Local};
use itertools::Itertools;
use reqwest::{
    Client,
    Url,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_with::serde_as;

use crate::{
    api::client,
    core::ConsumptionRecord,
    prelude::*,
    quantity::rate::KilowattHourRate,
};

pub const DEFAULT_URL: &str = "https://api.tibber.com/v1-beta/gql";

pub struct Api {
    client: Client,
    url: Url,
}

impl Api {
    pub fn try_new(access_token: &str, url: Url) -> Result<Self> {
        let mut authorization = HeaderValue::from_str(&format!("Bearer {access_token}"))
            .context("invalid Tibber access token")?;
        authorization.set_sensitive(true);
        let client =
            client::builder().default_headers(HeaderMap::from_iter([(AUTHORIZATION, authorization)])).build()?;
        Ok(Self { client, url })
    }

    #[instrument(skip_all)]
    pub async fn get_first_home_id(&self) -> Result<String> {
        info!("fetching the homes…");
        let viewer = self.query::<ViewerData<HomeIds>>(&Request::HOME_IDS).await?.viewer;
        let home = viewer.homes.into_iter().next().context("no homes found")?;
        debug!(home_id = home.id.as_str(), "picked the first home");
        Ok(home.id)
    }

    /// Fetch the prices and the consumption of the home, or of the first home when not specified.
    #[instrument(skip_all, fields(home_id = ?home_id))]
    pub async fn get_snapshot(&self, home_id: Option<&str>) -> Result<Snapshot> {
        let home_id = match home_id {
            Some(home_id) => home_id.to_owned(),
            None => self.get_first_home_id().await?,
        };
        info!(%home_id, "fetching the snapshot…");
        let viewer = self
            .query::<ViewerData<SnapshotViewer>>(&Request::snapshot(&home_id))
            .await?
            .viewer;
        let home = viewer.home.context("home not found")?;
        let snapshot = Snapshot {
            homes: viewer.homes,
            prices: home
                .current_subscription
                .and_then(|subscription| subscription.price_info)
                .unwrap_or_default(),
            daily: home.daily.map(|connection| connection.nodes).unwrap_or_default(),
            hourly: home.hourly.map(|connection| connection.nodes).unwrap_or_default(),
            home_id,
        };
        validate(&snapshot.daily).context("invalid daily consumption")?;
        validate(&snapshot.hourly).context("invalid hourly consumption")?;
        info!(
            n_homes = snapshot.homes.len(),
            n_daily = snapshot.daily.len(),
            n_hourly = snapshot.hourly.len(),
            n_today = snapshot.prices.today.len(),
            n_tomorrow = snapshot.prices.tomorrow.len(),
            "fetched",
        );
        Ok(snapshot)
    }

    async fn query<D: DeserializeOwned>(&self, request: &Request) -> Result<D> {
        self.client
            .post(self.url.clone())
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json::<Response<D>>()
            .await
            .context("failed to deserialize the Tibber response")?
            .into_data()
    }
}

/// Everything the dashboard needs from the energy provider.
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub homes: Vec<Home>,

    /// Selected home.
    pub home_id: String,

    pub prices: PriceInfo,

    /// Chronological, roughly the last 100 days.
    pub daily: Vec<ConsumptionRecord>,

    /// Chronological, roughly the trailing 24 hours.
    pub hourly: Vec<ConsumptionRecord>,
}

#[must_use]
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Home {
    pub id: String,

    #[serde(rename = "appNickname")]
    pub nickname: Option<String>,

    pub address: Option<Address>,
}

impl Home {
    /// Human-readable name: nickname, else street address, else identifier.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.nickname
            .as_deref()
            .filter(|nickname| !nickname.is_empty())
            .or_else(|| self.address.as_ref().and_then(|address| address.address1.as_deref()))
            .unwrap_or(&self.id)
    }
}

#[must_use]
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub address1: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
}

#[must_use]
#[serde_as]
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize)]
pub struct PriceInfo {
    pub current: Option<Price>,

    #[serde(default)]
    #[serde_as(as = "serde_with::DefaultOnNull")]
    pub today: Vec<Price>,

    #[serde(default)]
    #[serde_as(as = "serde_with::DefaultOnNull")]
    pub tomorrow: Vec<Price>,
}

#[must_use]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    /// Energy and taxes, VAT included.
    pub total: KilowattHourRate,

    pub energy: KilowattHourRate,
    pub tax: KilowattHourRate,
    pub starts_at: DateTime<Local>,
}

/// Reject the records whose consumption is negative or not finite.
fn validate(records: &[ConsumptionRecord]) -> Result {
    for record in records {
        let consumption = record.consumption.0;
        ensure!(
            consumption.is_finite() && consumption >= 0.0,
            "consumption at {} is {consumption}",
            record.from,
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct Request {
    query: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<Variables>,
}

impl Request {
    const HOME_IDS: Self = Self { query: "{ viewer { homes { id } } }", variables: None };

    const SNAPSHOT_QUERY: &'static str = "query Snapshot($homeId: ID!) { viewer { \
        homes { id appNickname address { address1 postalCode city } } \
        home(id: $homeId) { \
            id \
            currentSubscription { priceInfo { \
                current { total energy tax startsAt } \
                today { total energy tax startsAt } \
                tomorrow { total energy tax startsAt } \
            } } \
            daily: consumption(resolution: DAILY, last: 100) { nodes { from to cost unitPrice unitPriceVAT consumption consumptionUnit } } \
            hourly: consumption(resolution: HOURLY, last: 24) { nodes { from to cost unitPrice unitPriceVAT consumption consumptionUnit } } \
        } \
    } }";

    fn snapshot(home_id: &str) -> Self {
        Self {
            query: Self::SNAPSHOT_QUERY,
            variables: Some(Variables { home_id: home_id.to_owned() }),
        }
    }
}

#[derive(Serialize)]
struct Variables {
    #[serde(rename = "homeId")]
    home_id: String,
}

#[serde_as]
#[derive(Deserialize)]
struct Response<D> {
    data: Option<D>,

    #[serde(default)]
    #[serde_as(as = "serde_with::DefaultOnNull")]
    errors: Vec<GraphQlError>,
}

impl<D> Response<D> {
    fn into_data(self) -> Result<D> {
        if !self.errors.is_empty() {
            bail!(
                "Tibber responded with errors: {}",
                self.errors.iter().map(|error| error.message.as_str()).join("; "),
            );
        }
        self.data.context("Tibber responded without data")
    }
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
struct ViewerData<V> {
    viewer: V,
}

#[derive(Deserialize)]
struct HomeIds {
    homes: Vec<HomeId>,
}

#[derive(Deserialize)]
struct HomeId {
    id: String,
}

#[derive(Deserialize)]
struct SnapshotViewer {
    homes: Vec<Home>,
    home: Option<HomeData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HomeData {
    current_subscription: Option<Subscription>,
    daily: Option<Connection>,
    hourly: Option<Connection>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Subscription {
    price_info: Option<PriceInfo>,
}

#[derive(Deserialize)]
struct Connection {
    nodes: Vec<ConsumptionRecord>,
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::Timelike;

    use super::*;
    use crate::core::record::fixtures::{daily, local};

    #[test]
    fn test_deserialize_snapshot_ok() -> Result {
        // language=json
        const RESPONSE: &str = r#"{
            "data": {
                "viewer": {
                    "homes": [
                        {
                            "id": "96a14971-525a-4420-aae9-e5aedaa129ff",
                            "appNickname": "Hytta",
                            "address": { "address1": "Barlaugkleiva 1", "postalCode": "3830", "city": "Ulefoss" }
                        },
                        { "id": "68e6938b-91a6-4199-a0d4-f24c22be87bb", "appNickname": null, "address": null }
                    ],
                    "home": {
                        "id": "96a14971-525a-4420-aae9-e5aedaa129ff",
                        "currentSubscription": {
                            "priceInfo": {
                                "current": { "total": 1.2103, "energy": 0.9058, "tax": 0.3045, "startsAt": "2025-11-10T15:00:00.000+01:00" },
                                "today": [
                                    { "total": 0.9541, "energy": 0.6958, "tax": 0.2583, "startsAt": "2025-11-10T00:00:00.000+01:00" },
                                    { "total": 0.9112, "energy": 0.6615, "tax": 0.2497, "startsAt": "2025-11-10T01:00:00.000+01:00" }
                                ],
                                "tomorrow": null
                            }
                        },
                        "daily": {
                            "nodes": [
                                {
                                    "from": "2025-11-09T00:00:00.000+01:00",
                                    "to": "2025-11-10T00:00:00.000+01:00",
                                    "cost": 35.1872,
                                    "unitPrice": 0.8797,
                                    "unitPriceVAT": 0.1759,
                                    "consumption": 40.0,
                                    "consumptionUnit": "kWh"
                                }
                            ]
                        },
                        "hourly": { "nodes": [] }
                    }
                }
            }
        }"#;
        let viewer =
            serde_json::from_str::<Response<ViewerData<SnapshotViewer>>>(RESPONSE)?.into_data()?.viewer;
        assert_eq!(viewer.homes.len(), 2);
        assert_eq!(viewer.homes[0].display_name(), "Hytta");
        assert_eq!(viewer.homes[1].display_name(), "68e6938b-91a6-4199-a0d4-f24c22be87bb");

        let home = viewer.home.unwrap();
        let prices = home.current_subscription.unwrap().price_info.unwrap();
        assert_abs_diff_eq!(prices.current.unwrap().total.0, 1.2103);
        assert_eq!(prices.today.len(), 2);
        assert_eq!(prices.today[1].starts_at.with_timezone(&chrono::Utc).hour(), 0);
        assert!(prices.tomorrow.is_empty());

        let daily = home.daily.unwrap().nodes;
        assert_eq!(daily.len(), 1);
        assert_abs_diff_eq!(daily[0].consumption.0, 40.0);
        assert!(home.hourly.unwrap().nodes.is_empty());
        Ok(())
    }

    #[test]
    fn test_deserialize_errors() -> Result {
        // language=json
        const RESPONSE: &str = r#"{
            "data": null,
            "errors": [
                { "message": "Could not find home", "path": ["viewer", "home"] },
                { "message": "Try again later" }
            ]
        }"#;
        let error = serde_json::from_str::<Response<ViewerData<HomeIds>>>(RESPONSE)?
            .into_data()
            .err()
            .context("the response must fail")?;
        assert_eq!(
            error.to_string(),
            "Tibber responded with errors: Could not find home; Try again later",
        );
        Ok(())
    }

    #[test]
    fn test_deserialize_no_homes() -> Result {
        // language=json
        const RESPONSE: &str = r#"{ "data": { "viewer": { "homes": [] } } }"#;
        let viewer = serde_json::from_str::<Response<ViewerData<HomeIds>>>(RESPONSE)?.into_data()?.viewer;
        assert!(viewer.homes.is_empty());
        Ok(())
    }

    #[test]
    fn test_deserialize_missing_consumption_fails() {
        // language=json
        const RESPONSE: &str = r#"{
            "data": {
                "viewer": {
                    "homes": [],
                    "home": {
                        "currentSubscription": null,
                        "daily": {
                            "nodes": [
                                {
                                    "from": "2025-11-09T00:00:00.000+01:00",
                                    "to": "2025-11-10T00:00:00.000+01:00",
                                    "cost": null,
                                    "unitPrice": 0.8797,
                                    "unitPriceVAT": 0.1759,
                                    "consumption": null,
                                    "consumptionUnit": "kWh"
                                }
                            ]
                        },
                        "hourly": null
                    }
                }
            }
        }"#;
        assert!(serde_json::from_str::<Response<ViewerData<SnapshotViewer>>>(RESPONSE).is_err());
    }

    #[test]
    fn test_validate() {
        assert!(validate(&[daily(local(2025, 11, 9, 0), 0.0, 1.0)]).is_ok());
        assert!(validate(&[daily(local(2025, 11, 9, 0), -0.1, 1.0)]).is_err());
        assert!(validate(&[daily(local(2025, 11, 9, 0), f64::NAN, 1.0)]).is_err());
    }

    #[test]
    fn test_request_serialization() -> Result {
        let request = serde_json::to_value(Request::snapshot("42"))?;
        assert_eq!(request["variables"]["homeId"], "42");
        assert!(serde_json::to_value(Request::HOME_IDS)?.get("variables").is_none());
        Ok(())
    }

    #[tokio::test]
    #[ignore = "makes the API request"]
    async fn test_get_snapshot_ok() -> Result {
        let access_token = std::env::var("TIBBER_API_TOKEN")?;
        let snapshot =
            Api::try_new(&access_token, Url::parse(DEFAULT_URL)?)?.get_snapshot(None).await?;
        assert!(!snapshot.homes.is_empty());
        assert!(snapshot.hourly.len() <= 24);
        assert!(snapshot.daily.is_sorted_by_key(|record| record.from));
        Ok(())
    }
}
