pub mod annotations;
pub mod heart_rate;
pub mod hourly;
