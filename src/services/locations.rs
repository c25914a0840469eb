use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::Coordinate;
use crate::services::geocoding::{GeocodeError, Geocoder};
use crate::services::store::{EventStore, InMemoryStore};

/// Something the user typed or clicked on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlaceQuery {
    Point(Coordinate),
    Name(String),
}

/// Resolves places and home cities to coordinates
///
/// Lookup order for a city: the store's city table, the in-process cache,
/// then the geocoding provider. Successful lookups are written back to the
/// store so later snapshots see them.
pub struct LocationResolver {
    geocoder: Arc<dyn Geocoder>,
    cache: moka::future::Cache<String, Coordinate>,
}

impl LocationResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>, cache_size: u64, ttl_secs: u64) -> Self {
        let cache = moka::future::CacheBuilder::new(cache_size)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { geocoder, cache }
    }

    /// Resolve a place name or pass a map point straight through
    pub async fn resolve_place(&self, query: &PlaceQuery) -> Result<Coordinate, GeocodeError> {
        match query {
            PlaceQuery::Point(coordinate) => Ok(*coordinate),
            PlaceQuery::Name(name) => self.resolve_name(name).await,
        }
    }

    async fn resolve_name(&self, name: &str) -> Result<Coordinate, GeocodeError> {
        if let Some(coordinate) = self.cache.get(name).await {
            tracing::trace!("Location cache hit: {}", name);
            return Ok(coordinate);
        }

        let coordinate = self.geocoder.resolve(name).await?;
        self.cache.insert(name.to_string(), coordinate).await;
        Ok(coordinate)
    }

    /// Make sure the user has a home coordinate, resolving their city if needed
    ///
    /// Returns `None` when the user is unknown, has no city, or the lookup
    /// fails. A failed lookup means "unknown location", never an error.
    pub async fn ensure_home_coordinate(
        &self,
        store: &RwLock<InMemoryStore>,
        user_id: &str,
    ) -> Option<Coordinate> {
        let (city, known) = {
            let guard = store.read().unwrap_or_else(PoisonError::into_inner);
            let user = guard.get_user(user_id)?;
            if let Some(home) = user.home_coordinate {
                return Some(home);
            }
            let city = user.city.clone()?;
            let known = guard.get_home_coordinate(&city);
            (city, known)
        };

        let coordinate = match known {
            Some(coordinate) => coordinate,
            None => match self.resolve_name(&city).await {
                Ok(coordinate) => coordinate,
                Err(e) => {
                    tracing::warn!("Could not resolve city '{}' for {}: {}", city, user_id, e);
                    return None;
                }
            },
        };

        let mut guard = store.write().unwrap_or_else(PoisonError::into_inner);
        guard.add_city_coordinates(&city, coordinate);
        if let Err(e) = guard.set_home_coordinate(user_id, coordinate) {
            tracing::warn!("Failed to store home coordinate for {}: {}", user_id, e);
        }

        Some(coordinate)
    }
}
