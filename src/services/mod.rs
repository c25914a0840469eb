// Service exports
pub mod credentials;
pub mod geocoding;
pub mod locations;
pub mod store;

pub use geocoding::{DisabledGeocoder, GeocodeError, Geocoder, GoogleGeocoder};
pub use locations::{LocationResolver, PlaceQuery};
pub use store::{EventStore, InMemoryStore, NewEvent, NewUser, StoreError, UserUpdate, ROSTER_HEADER};
