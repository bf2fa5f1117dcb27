pub mod cache;
pub mod catalog;
pub mod forecast;
pub mod open_meteo;
pub mod recommend;
pub mod scoring;
pub mod weights;
