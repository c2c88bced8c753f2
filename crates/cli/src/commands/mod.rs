pub mod dispatch;
pub mod doctor;
pub mod onboard;
pub mod schema;
pub mod serve;
pub mod setup;
