use chrono::{DateTime, Utc};

use super::{user, Error, Snowflake};

pub type Id = Snowflake;

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

/// A note dropped on the map. `user_id` and `username` are copied from the
/// owner when the pin is created and never change afterwards.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pin {
    pub id: Id,
    pub user_id: user::Id,
    pub username: String,
    pub title: String,
    pub description: String,
    pub rating: i64,
    pub lat: f64,
    pub long: f64,
    pub created_at: DateTime<Utc>,
}

/// What a client sends to create a pin. The owner comes from the session.
#[derive(Debug, serde::Deserialize)]
pub struct NewPin {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_rating")]
    pub rating: i64,
    pub lat: f64,
    pub long: f64,
}

fn default_rating() -> i64 {
    MIN_RATING
}

impl NewPin {
    pub fn validate(self) -> Result<NewPin, Error> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(Error::InvalidInput("title must not be empty"));
        }
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(Error::InvalidInput("rating must be between 1 and 5"));
        }
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(Error::InvalidInput("latitude must be between -90 and 90"));
        }
        if !self.long.is_finite() || !(-180.0..=180.0).contains(&self.long) {
            return Err(Error::InvalidInput(
                "longitude must be between -180 and 180",
            ));
        }

        Ok(NewPin { title, ..self })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn park() -> NewPin {
        NewPin {
            title: "Park".to_string(),
            description: "Nice view".to_string(),
            rating: 5,
            lat: 37.8,
            long: -150.4,
        }
    }

    #[test]
    fn accepts_valid_pin() {
        let pin = park().validate().unwrap();
        assert_eq!(pin.title, "Park");
        assert_eq!(pin.rating, 5);
    }

    #[test]
    fn rating_defaults_to_one() {
        let pin: NewPin =
            serde_json::from_str(r#"{"title": "Cafe", "lat": 1.0, "long": 2.0}"#).unwrap();
        assert_eq!(pin.rating, 1);
        assert_eq!(pin.description, "");
    }

    #[test]
    fn rejects_blank_title() {
        let pin = NewPin {
            title: "   ".to_string(),
            ..park()
        };
        assert!(matches!(pin.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn rejects_out_of_range_rating() {
        for rating in [0, 6, -3] {
            let pin = NewPin { rating, ..park() };
            assert!(matches!(pin.validate(), Err(Error::InvalidInput(_))));
        }
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        let cases = [(90.5, 0.0), (-91.0, 0.0), (0.0, 180.1), (0.0, -181.0), (f64::NAN, 0.0)];
        for (lat, long) in cases {
            let pin = NewPin { lat, long, ..park() };
            assert!(matches!(pin.validate(), Err(Error::InvalidInput(_))));
        }
    }

    #[test]
    fn accepts_boundaries() {
        let pin = NewPin {
            lat: -90.0,
            long: 180.0,
            ..park()
        };
        assert!(pin.validate().is_ok());
    }
}
