pub mod auth;
pub mod committees;
pub mod hotels;
pub mod images;
pub mod media;
pub mod quotes;
pub mod schedules;
pub mod schools;
pub mod secretariates;
