//! Feed service: builds search parameters and maps result documents.

use alerthub_types::error::SearchError;
use alerthub_types::feed::{
    CommunityAlert, DuplicateCandidate, Event, IncidentContext, NewsArticle, SafePlace,
    WeatherReport,
};
use alerthub_types::geo::Coordinates;
use futures_util::future::join_all;
use serde_json::Value;

use super::classify;
use super::{SearchParams, SearchProvider};
use crate::geo::distance_miles;

/// Categories searched for safe places, issued concurrently.
pub const SAFE_PLACE_CATEGORIES: [&str; 4] = [
    "Emergency shelters",
    "Police stations",
    "Fire stations",
    "Disaster relief centers",
];

const INCIDENT_QUERY: &str = "Austin crash OR Austin flood OR Austin fire OR Austin shooting OR Austin accident OR Austin emergency";

pub struct FeedService<P: SearchProvider> {
    provider: P,
    default_location: String,
}

impl<P: SearchProvider> FeedService<P> {
    pub fn new(provider: P, default_location: impl Into<String>) -> Self {
        Self {
            provider,
            default_location: default_location.into(),
        }
    }

    pub fn default_location(&self) -> &str {
        &self.default_location
    }

    /// General news for a free-text query.
    pub async fn news(&self, query: &str) -> Result<Vec<NewsArticle>, SearchError> {
        let query = required(query, "q")?;
        let doc = self
            .search(self.params("google_news", query, None).with("num", "10"))
            .await?;
        Ok(news_articles(&doc))
    }

    pub async fn neighborhood_news(&self, name: &str) -> Result<Vec<NewsArticle>, SearchError> {
        let name = required(name, "name")?;
        let query = format!("{name} Austin news");
        let doc = self
            .search(self.params("google_news", &query, None).with("num", "15"))
            .await?;
        Ok(news_articles(&doc))
    }

    /// Events happening this week.
    pub async fn events(&self) -> Result<Vec<Event>, SearchError> {
        let doc = self
            .search(
                self.params("google_events", "Events in Austin, TX", None)
                    .with("htichips", "date:week"),
            )
            .await?;
        Ok(events(&doc))
    }

    /// Volunteer opportunities this month.
    pub async fn volunteer_events(&self) -> Result<Vec<Event>, SearchError> {
        let doc = self
            .search(
                self.params("google_events", "Volunteer opportunities in Austin", None)
                    .with("htichips", "date:month"),
            )
            .await?;
        Ok(events(&doc))
    }

    /// Current conditions from the answer box, `None` if the provider has none.
    pub async fn weather(&self, location: Option<&str>) -> Result<Option<WeatherReport>, SearchError> {
        let location = self.location_or_default(location);
        let query = format!("{location} weather");
        let doc = self
            .search(self.params("google", &query, None).with("num", "1"))
            .await?;
        Ok(weather(&doc))
    }

    /// Shelters, police, fire stations and relief centers near a point,
    /// nearest first.
    ///
    /// A failing category is skipped; the call fails only if every category
    /// failed.
    pub async fn safe_places(&self, at: Coordinates) -> Result<Vec<SafePlace>, SearchError> {
        at.validate().map_err(SearchError::InvalidRequest)?;

        let ll = format!("@{},{},14z", at.latitude, at.longitude);
        let requests: Vec<SearchParams> = SAFE_PLACE_CATEGORIES
            .iter()
            .map(|term| {
                let mut params = self.params("google_maps", term, None);
                params.remove("location");
                params.with("ll", &ll)
            })
            .collect();

        let responses = join_all(requests.iter().map(|p| self.provider.search(p))).await;

        let mut places = Vec::new();
        let mut first_error = None;
        let mut succeeded = 0usize;
        for (term, response) in SAFE_PLACE_CATEGORIES.iter().zip(responses) {
            match response {
                Ok(doc) => {
                    succeeded += 1;
                    places.extend(safe_places(&doc, &at));
                }
                Err(e) => {
                    tracing::warn!(category = %term, error = %e, "safe place search failed");
                    first_error.get_or_insert(e);
                }
            }
        }
        if succeeded == 0 {
            if let Some(e) = first_error {
                return Err(e);
            }
        }

        sort_by_distance(&mut places);
        Ok(places)
    }

    /// News, web results and related questions for an incident type.
    pub async fn incident_context(
        &self,
        incident_type: &str,
        location: Option<&str>,
    ) -> Result<IncidentContext, SearchError> {
        let incident_type = required(incident_type, "incident_type")?;
        let location = self.location_or_default(location);
        let query = format!("{incident_type} {location} safety issue");
        let doc = self
            .search(self.params("google", &query, Some(location.as_str())).with("num", "10"))
            .await?;
        Ok(IncidentContext {
            news: array(&doc, "news_results").iter().take(3).cloned().collect(),
            web_results: array(&doc, "organic_results").iter().take(5).cloned().collect(),
            related_concerns: array(&doc, "related_questions").to_vec(),
        })
    }

    /// Published items that look like the incident being reported.
    pub async fn duplicates(
        &self,
        description: &str,
        location: Option<&str>,
    ) -> Result<Vec<DuplicateCandidate>, SearchError> {
        let description = required(description, "description")?;
        let location = self.location_or_default(location);
        let doc = self
            .search(self.params("google", description, Some(location.as_str())).with("num", "10"))
            .await?;
        Ok(classify::find_duplicates(
            description,
            array(&doc, "organic_results"),
        ))
    }

    /// Recent Austin incidents classified by alert level.
    pub async fn community_alerts(&self) -> Result<Vec<CommunityAlert>, SearchError> {
        let doc = self
            .search(self.params("google", INCIDENT_QUERY, None).with("num", "10"))
            .await?;
        Ok(classify::community_alerts(array(&doc, "organic_results")))
    }

    async fn search(&self, params: SearchParams) -> Result<Value, SearchError> {
        tracing::debug!(
            engine = params.get("engine").map(String::as_str).unwrap_or_default(),
            q = params.get("q").map(String::as_str).unwrap_or_default(),
            "search"
        );
        self.provider.search(&params).await
    }

    fn params(&self, engine: &str, query: &str, location: Option<&str>) -> SearchParams {
        SearchParams::from([
            ("engine".to_string(), engine.to_string()),
            ("q".to_string(), query.to_string()),
            (
                "location".to_string(),
                location.unwrap_or(&self.default_location).to_string(),
            ),
            ("hl".to_string(), "en".to_string()),
            ("gl".to_string(), "us".to_string()),
        ])
    }

    fn location_or_default(&self, location: Option<&str>) -> String {
        location
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(&self.default_location)
            .to_string()
    }
}

trait With {
    fn with(self, key: &str, value: &str) -> Self;
}

impl With for SearchParams {
    fn with(mut self, key: &str, value: &str) -> Self {
        self.insert(key.to_string(), value.to_string());
        self
    }
}

fn required<'a>(value: &'a str, name: &str) -> Result<&'a str, SearchError> {
    let value = value.trim();
    if value.is_empty() {
        Err(SearchError::InvalidRequest(format!("{name} is required")))
    } else {
        Ok(value)
    }
}

fn array<'a>(doc: &'a Value, key: &str) -> &'a [Value] {
    doc.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// String field, rendering numbers as text, else `default`.
fn text_or(item: &Value, key: &str, default: &str) -> String {
    match item.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => default.to_string(),
    }
}

fn news_articles(doc: &Value) -> Vec<NewsArticle> {
    array(doc, "news_results")
        .iter()
        .map(|a| NewsArticle {
            title: text_or(a, "title", ""),
            link: text_or(a, "link", ""),
            snippet: text_or(a, "snippet", ""),
            thumbnail: text_or(a, "thumbnail", ""),
        })
        .collect()
}

fn events(doc: &Value) -> Vec<Event> {
    array(doc, "events_results")
        .iter()
        .map(|e| Event {
            title: text_or(e, "title", "No Title"),
            date: e
                .get("date")
                .map(|d| text_or(d, "when", "Date Not Available"))
                .unwrap_or_else(|| "Date Not Available".to_string()),
            address: array(e, "address")
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", "),
            description: text_or(e, "description", "No Description"),
            link: text_or(e, "link", ""),
            thumbnail: text_or(e, "thumbnail", ""),
        })
        .collect()
}

fn weather(doc: &Value) -> Option<WeatherReport> {
    let answer = doc
        .get("answer_box")
        .filter(|a| a.as_object().is_some_and(|o| !o.is_empty()))?;
    Some(WeatherReport {
        temperature: text_or(answer, "temperature", "Unknown"),
        unit: text_or(answer, "units", "°F"),
        description: text_or(answer, "weather", "Unknown"),
        precipitation: text_or(answer, "precipitation", "Unknown"),
        humidity: text_or(answer, "humidity", "Unknown"),
        wind: text_or(answer, "wind", "Unknown"),
    })
}

fn safe_places(doc: &Value, origin: &Coordinates) -> Vec<SafePlace> {
    array(doc, "local_results")
        .iter()
        .map(|item| {
            let name = text_or(item, "title", "Unknown");
            let place_id = text_or(item, "place_id", "");
            let gps = item.get("gps_coordinates");
            let distance = gps
                .and_then(|g| Some((g.get("latitude")?.as_f64()?, g.get("longitude")?.as_f64()?)))
                .map(|(lat, lon)| distance_miles(origin, &Coordinates::new(lat, lon)));

            let link = match item.get("link").and_then(Value::as_str) {
                Some(link) if !link.is_empty() => link.to_string(),
                _ if !place_id.is_empty() => {
                    format!("https://www.google.com/maps/place/?q=place_id:{place_id}")
                }
                _ => "Link not available".to_string(),
            };
            let directions_link = format!(
                "https://www.google.com/maps/dir/?api=1&destination={}&destination_place_id={place_id}",
                name.replace(' ', "+")
            );

            SafePlace {
                address: text_or(item, "address", "Unknown Address"),
                rating: item
                    .get("rating")
                    .cloned()
                    .unwrap_or_else(|| Value::String("No Rating".to_string())),
                link,
                directions_link,
                distance_miles: distance,
                name,
            }
        })
        .collect()
}

/// Nearest first; places without a distance keep their order at the end.
fn sort_by_distance(places: &mut [SafePlace]) {
    places.sort_by(|a, b| match (a.distance_miles, b.distance_miles) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}
