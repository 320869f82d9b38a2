pub mod params;
pub mod schema;
