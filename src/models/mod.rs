pub mod ladies_day;
pub mod review;
pub mod sauna;
pub mod user;

pub use ladies_day::*;
pub use review::*;
pub use sauna::*;
pub use user::*;
