//! Fusion API models shared by every client operation.
//!
//! Field names mirror the upstream wire format exactly (`display_address`,
//! `review_count`, `zip_code`, `is_closed`, `time_created`, ...); do not
//! rename them without checking the API's response shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use yelp_core::query::QueryString;
use yelp_core::{Error, Result};

/// Parameters accepted by the business search endpoint.
///
/// Every field is optional. A search is only valid when it names a location:
/// either the free-form `location` string, or the full `latitude`/`longitude`
/// pair. `open_now` and `open_at` are mutually exclusive.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SearchParams {
    /// Free-text search term ("food", "delis", ...).
    pub term: Option<String>,
    /// Free-form location string ("Austin, TX").
    pub location: Option<String>,
    /// Latitude of the search center.
    pub latitude: Option<f64>,
    /// Longitude of the search center.
    pub longitude: Option<f64>,
    /// Search radius in meters.
    pub radius: Option<u32>,
    /// Comma-separated category aliases to filter on.
    pub categories: Option<String>,
    /// Locale hint (language/region).
    pub locale: Option<String>,
    /// Maximum number of results.
    pub limit: Option<u32>,
    /// Offset into the result list.
    pub offset: Option<u32>,
    /// Sort key for the results.
    pub sort_by: Option<String>,
    /// Price tiers to filter on.
    pub price: Option<String>,
    /// Only return businesses open at request time.
    pub open_now: Option<bool>,
    /// Only return businesses open at this Unix timestamp.
    pub open_at: Option<i64>,
    /// Comma-separated attribute filters.
    pub attributes: Option<String>,
}

impl SearchParams {
    /// Create an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the term to query for.
    #[must_use]
    pub fn with_term(mut self, term: impl Into<String>) -> Self {
        self.term = Some(term.into());
        self
    }

    /// Set the location to focus on.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the latitude to query for.
    #[must_use]
    pub fn with_latitude(mut self, latitude: f64) -> Self {
        self.latitude = Some(latitude);
        self
    }

    /// Set the longitude to query for.
    #[must_use]
    pub fn with_longitude(mut self, longitude: f64) -> Self {
        self.longitude = Some(longitude);
        self
    }

    /// Set how wide the search radius should be.
    ///
    /// The max is 40000 meters, about 25 miles.
    #[must_use]
    pub fn with_radius(mut self, radius: u32) -> Self {
        self.radius = Some(radius);
        self
    }

    /// Set the categories to filter on, as a comma-separated alias list.
    #[must_use]
    pub fn with_categories(mut self, categories: impl Into<String>) -> Self {
        self.categories = Some(categories.into());
        self
    }

    /// Set the locale.
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Set the limit of returned businesses.
    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the offset starting point in the list of businesses.
    #[must_use]
    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Set how the return values should be sorted.
    ///
    /// Options: `best_match`, `rating`, `review_count`, `distance`.
    #[must_use]
    pub fn with_sort_by(mut self, sort_by: impl Into<String>) -> Self {
        self.sort_by = Some(sort_by.into());
        self
    }

    /// Set the price tiers to filter on.
    ///
    /// `1` = $ through `4` = $$$$; combinations like `"1,2,3"` select
    /// several tiers at once.
    #[must_use]
    pub fn with_price(mut self, price: impl Into<String>) -> Self {
        self.price = Some(price.into());
        self
    }

    /// Only show businesses that are open right now.
    ///
    /// Mutually exclusive with [`with_open_at`](Self::with_open_at).
    #[must_use]
    pub fn with_open_now(mut self, open_now: bool) -> Self {
        self.open_now = Some(open_now);
        self
    }

    /// Only show businesses open at the given Unix timestamp.
    ///
    /// Mutually exclusive with [`with_open_now`](Self::with_open_now).
    #[must_use]
    pub fn with_open_at(mut self, open_at: i64) -> Self {
        self.open_at = Some(open_at);
        self
    }

    /// Set additional attributes to filter on, comma-separated.
    ///
    /// Options include `hot_and_new`, `request_a_quote`, `reservation`,
    /// `waitlist_reservation`, `cashback`, `deals`,
    /// `gender_neutral_restrooms`, and `open_to_all`.
    #[must_use]
    pub fn with_attributes(mut self, attributes: impl Into<String>) -> Self {
        self.attributes = Some(attributes.into());
        self
    }

    /// Render the set fields as a raw query string.
    ///
    /// Clauses appear in a fixed order: location/latitude-longitude, `term`,
    /// `radius`, `categories`, `locale`, `limit`, `offset`, `sort_by`,
    /// `price`, the open filter, `attributes`. The result carries no leading
    /// `?`. Fails when no location is named or when both open filters are
    /// set; no request is constructed in either case.
    pub fn query_string(&self) -> Result<String> {
        let mut query = QueryString::new();
        self.push_location(&mut query)?;
        query.push_opt("term", self.term.as_deref());
        query.push_opt("radius", self.radius);
        query.push_opt("categories", self.categories.as_deref());
        query.push_opt("locale", self.locale.as_deref());
        query.push_opt("limit", self.limit);
        query.push_opt("offset", self.offset);
        query.push_opt("sort_by", self.sort_by.as_deref());
        query.push_opt("price", self.price.as_deref());
        self.push_open_filter(&mut query)?;
        query.push_opt("attributes", self.attributes.as_deref());
        Ok(query.render())
    }

    // Both clauses are appended when the caller supplied location AND the
    // coordinate pair; upstream tolerates the combination.
    fn push_location(&self, query: &mut QueryString) -> Result<()> {
        let coords = self.latitude.zip(self.longitude);
        if self.location.is_none() && coords.is_none() {
            return Err(Error::MissingLocation);
        }
        query.push_opt("location", self.location.as_deref());
        if let Some((latitude, longitude)) = coords {
            query.push("latitude", format!("{latitude:.6}"));
            query.push("longitude", format!("{longitude:.6}"));
        }
        Ok(())
    }

    fn push_open_filter(&self, query: &mut QueryString) -> Result<()> {
        if self.open_now.is_some() && self.open_at.is_some() {
            return Err(Error::ConflictingOpenFilters);
        }
        query.push_opt("open_now", self.open_now);
        query.push_opt("open_at", self.open_at);
        Ok(())
    }
}

/// Category tag attached to a business.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    /// Machine-readable category alias.
    pub alias: String,
    /// Display title.
    pub title: String,
}

/// Latitude and longitude of a business.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

/// Street address information for a business.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    /// Street address, line 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address1: Option<String>,
    /// Street address, line 2.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    /// Street address, line 3.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address3: Option<String>,
    /// City name.
    #[serde(default)]
    pub city: String,
    /// Two-letter country code.
    #[serde(default)]
    pub country: String,
    /// Ready-to-display address lines.
    #[serde(default)]
    pub display_address: Vec<String>,
    /// State or province code.
    #[serde(default)]
    pub state: String,
    /// Postal code.
    #[serde(default)]
    pub zip_code: String,
    /// Nearby cross streets, when known.
    #[serde(default)]
    pub cross_streets: String,
}

/// Signal that a business has been assigned a new canonical identifier.
///
/// Populated from HTTP 301 response bodies; the caller should reissue the
/// request with [`new_business_id`](Self::new_business_id).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MigrationError {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable description.
    pub description: String,
    /// Replacement business identifier.
    pub new_business_id: String,
}

/// Data about a business, as returned by the search routes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Business {
    /// Category tags.
    #[serde(default)]
    pub categories: Vec<Category>,
    /// Business coordinates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    /// User-friendly phone number for display.
    #[serde(default)]
    pub display_phone: String,
    /// Distance in meters from the search center; only present on search
    /// results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    /// Unique business identifier.
    pub id: String,
    /// URL-friendly identifier.
    #[serde(default)]
    pub alias: String,
    /// Photo URL.
    #[serde(default)]
    pub image_url: String,
    /// Whether the business has been permanently closed.
    #[serde(default)]
    pub is_closed: bool,
    /// Address information.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Business name.
    pub name: String,
    /// Price tier, one of `$` through `$$$$`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    /// Rating, 1 to 5 in half-star steps.
    #[serde(default)]
    pub rating: f64,
    /// Number of reviews.
    #[serde(default)]
    pub review_count: u32,
    /// Canonical Yelp page URL.
    #[serde(default)]
    pub url: String,
    /// Supported transaction types (pickup, delivery, ...).
    #[serde(default)]
    pub transactions: Vec<String>,
}

/// Open hours for one day-period of the week.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpenPeriod {
    /// Whether the period spans midnight.
    #[serde(default)]
    pub is_overnight: bool,
    /// Closing time on a 24-hour clock (`"2200"`).
    pub end: String,
    /// Day of the week, 0 = Monday.
    pub day: u8,
    /// Opening time on a 24-hour clock (`"1000"`).
    pub start: String,
}

/// Weekly hours data for a business.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Hours {
    /// Hours schema; currently always `REGULAR`.
    #[serde(default)]
    pub hours_type: String,
    /// Open periods across the week.
    #[serde(default)]
    pub open: Vec<OpenPeriod>,
    /// Whether the business is open at response time.
    #[serde(default)]
    pub is_open_now: bool,
}

/// Data returned from a business details request.
///
/// Extends [`Business`] by pure field composition; the shared fields are
/// flattened into the same JSON object on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BusinessDetails {
    /// Fields shared with search results.
    #[serde(flatten)]
    pub business: Business,
    /// Raw phone number.
    #[serde(default)]
    pub phone: String,
    /// Photo URLs.
    #[serde(default)]
    pub photos: Vec<String>,
    /// Structured weekly hours.
    #[serde(default)]
    pub hours: Vec<Hours>,
    /// Whether the listing has been claimed by the owner.
    #[serde(default)]
    pub is_claimed: bool,
    /// Provider-defined attribute map; shape is not fixed by this library.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<serde_json::Map<String, serde_json::Value>>,
    /// Populated only when the business moved to a new identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<MigrationError>,
}

/// The data returned from the business search routes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResults {
    /// Total number of matching businesses upstream (not the page size).
    #[serde(default)]
    pub total: u32,
    /// Matching businesses for this page.
    #[serde(default)]
    pub businesses: Vec<Business>,
    /// Open-ended description of the searched area.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<serde_json::Value>,
}

/// Author information attached to a review.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewUser {
    /// User identifier.
    pub id: String,
    /// Profile page URL.
    #[serde(default)]
    pub profile_url: String,
    /// Avatar URL; null for users without one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Display name.
    pub name: String,
}

/// A single review of a business.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    /// Review identifier.
    pub id: String,
    /// Integer star rating, 1 to 5.
    pub rating: i32,
    /// Review author.
    pub user: ReviewUser,
    /// Review excerpt text.
    #[serde(default)]
    pub text: String,
    /// Creation timestamp; the wire format is `YYYY-MM-DD HH:MM:SS`.
    #[serde(default, with = "review_time", skip_serializing_if = "Option::is_none")]
    pub time_created: Option<DateTime<Utc>>,
    /// Permalink to the full review.
    #[serde(default)]
    pub url: String,
}

/// The data returned from a business reviews request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewResults {
    /// Total number of reviews upstream.
    #[serde(default)]
    pub total: u32,
    /// Languages reviews are available in.
    #[serde(default)]
    pub possible_languages: Vec<String>,
    /// Review excerpts for this page.
    #[serde(default)]
    pub reviews: Vec<Review>,
    /// Populated only from an HTTP 301 response; resend the request with the
    /// carried `new_business_id` to follow the migration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<MigrationError>,
}

/// Serde adapter for the review timestamp wire format.
mod review_time {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&ts.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        value
            .map(|raw| {
                NaiveDateTime::parse_from_str(&raw, FORMAT)
                    .map(|naive| naive.and_utc())
                    .map_err(serde::de::Error::custom)
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn query_string_requires_location() {
        let err = SearchParams::new().query_string().unwrap_err();
        assert_eq!(err, Error::MissingLocation);

        let err = SearchParams::new()
            .with_term("food")
            .query_string()
            .unwrap_err();
        assert_eq!(err, Error::MissingLocation);
    }

    #[test]
    fn query_string_rejects_lone_latitude() {
        let err = SearchParams::new()
            .with_latitude(30.0)
            .query_string()
            .unwrap_err();
        assert_eq!(err, Error::MissingLocation);
    }

    #[test]
    fn query_string_rejects_conflicting_open_filters() {
        let err = SearchParams::new()
            .with_location("Austin, TX")
            .with_open_now(true)
            .with_open_at(1_546_300_800)
            .query_string()
            .unwrap_err();
        assert_eq!(err, Error::ConflictingOpenFilters);
    }

    #[test]
    fn query_string_escapes_location_and_term() {
        let query = SearchParams::new()
            .with_location("Austin, TX")
            .with_term("food")
            .query_string()
            .unwrap();
        assert_eq!(query, "location=Austin%2C+TX&term=food");
    }

    #[test]
    fn query_string_formats_coordinates() {
        let query = SearchParams::new()
            .with_latitude(30.0)
            .with_longitude(-97.0)
            .query_string()
            .unwrap();
        assert_eq!(query, "latitude=30.000000&longitude=-97.000000");
        assert!(!query.contains("location="));
    }

    #[test]
    fn query_string_emits_location_and_coordinates_together() {
        let query = SearchParams::new()
            .with_location("Austin, TX")
            .with_latitude(30.0)
            .with_longitude(-97.0)
            .query_string()
            .unwrap();
        assert_eq!(
            query,
            "location=Austin%2C+TX&latitude=30.000000&longitude=-97.000000"
        );
    }

    #[test]
    fn query_string_orders_all_clauses() {
        let query = SearchParams::new()
            .with_location("Austin, TX")
            .with_term("ice cream")
            .with_radius(1000)
            .with_categories("icecream,gelato")
            .with_locale("en_US")
            .with_limit(10)
            .with_offset(0)
            .with_sort_by("rating")
            .with_price("1,2")
            .with_open_now(true)
            .with_attributes("hot_and_new")
            .query_string()
            .unwrap();
        assert_eq!(
            query,
            "location=Austin%2C+TX&term=ice+cream&radius=1000&categories=icecream%2Cgelato\
             &locale=en_US&limit=10&offset=0&sort_by=rating&price=1%2C2&open_now=true\
             &attributes=hot_and_new"
        );
    }

    #[test]
    fn query_string_keeps_zero_values() {
        // offset=0 is a legitimate value, distinct from unset.
        let query = SearchParams::new()
            .with_location("Austin, TX")
            .with_offset(0)
            .query_string()
            .unwrap();
        assert_eq!(query, "location=Austin%2C+TX&offset=0");
    }

    #[test]
    fn query_string_emits_open_at_alone() {
        let query = SearchParams::new()
            .with_location("Austin, TX")
            .with_open_at(1_546_300_800)
            .query_string()
            .unwrap();
        assert_eq!(query, "location=Austin%2C+TX&open_at=1546300800");
    }

    #[test]
    fn business_deserialize_basic() {
        let json = json!({
            "id": "north-india-restaurant-san-francisco",
            "alias": "north-india-restaurant-san-francisco",
            "name": "North India Restaurant",
            "image_url": "https://example.com/photo.jpg",
            "is_closed": false,
            "review_count": 615,
            "categories": [{"alias": "indpak", "title": "Indian"}],
            "rating": 4.0,
            "coordinates": {"latitude": 37.787789124691, "longitude": -122.399305736113},
            "transactions": ["delivery"],
            "price": "$$",
            "location": {
                "address1": "123 Second St",
                "city": "San Francisco",
                "zip_code": "94105",
                "country": "US",
                "state": "CA",
                "display_address": ["123 Second St", "San Francisco, CA 94105"]
            },
            "display_phone": "(415) 348-1111",
            "distance": 1604.23
        });

        let business: Business = serde_json::from_value(json).unwrap();
        assert_eq!(business.name, "North India Restaurant");
        assert_eq!(business.review_count, 615);
        assert_eq!(business.price.as_deref(), Some("$$"));
        assert_eq!(business.categories[0].alias, "indpak");
        let location = business.location.unwrap();
        assert_eq!(location.zip_code, "94105");
        assert_eq!(location.display_address.len(), 2);
    }

    #[test]
    fn business_details_flattens_shared_fields() {
        let json = json!({
            "id": "gary-danko-san-francisco",
            "name": "Gary Danko",
            "phone": "+14157492060",
            "is_claimed": true,
            "photos": ["https://example.com/a.jpg"],
            "hours": [{
                "hours_type": "REGULAR",
                "is_open_now": true,
                "open": [
                    {"is_overnight": false, "start": "1730", "end": "2200", "day": 0}
                ]
            }],
            "attributes": {"gender_neutral_restrooms": true}
        });

        let details: BusinessDetails = serde_json::from_value(json).unwrap();
        assert_eq!(details.business.id, "gary-danko-san-francisco");
        assert_eq!(details.phone, "+14157492060");
        assert!(details.is_claimed);
        assert_eq!(details.hours[0].open[0].end, "2200");
        assert!(details
            .attributes
            .as_ref()
            .unwrap()
            .contains_key("gender_neutral_restrooms"));
        assert!(details.error.is_none());
    }

    #[test]
    fn review_time_parses_wire_format() {
        let json = json!({
            "id": "xAG4O7l-t1ubbwVAlPnDKg",
            "rating": 5,
            "user": {
                "id": "W8UK02IDdRS2GL_66fuq6w",
                "profile_url": "https://www.yelp.com/user_details?userid=W8UK02IDdRS2GL_66fuq6w",
                "image_url": null,
                "name": "Ella A."
            },
            "text": "Went back again to this place...",
            "time_created": "2016-08-29 00:41:13",
            "url": "https://www.yelp.com/biz/gary-danko"
        });

        let review: Review = serde_json::from_value(json).unwrap();
        let expected = Utc.with_ymd_and_hms(2016, 8, 29, 0, 41, 13).unwrap();
        assert_eq!(review.time_created, Some(expected));
        assert!(review.user.image_url.is_none());
    }

    #[test]
    fn review_results_carry_migration_error() {
        let json = json!({
            "error": {
                "code": "BUSINESS_MIGRATED",
                "description": "This business has moved.",
                "new_business_id": "new-id-123"
            }
        });

        let results: ReviewResults = serde_json::from_value(json).unwrap();
        assert_eq!(results.total, 0);
        assert!(results.reviews.is_empty());
        let error = results.error.unwrap();
        assert_eq!(error.new_business_id, "new-id-123");
    }
}
