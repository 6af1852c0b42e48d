mod accumulator;
mod outcome;
mod page;
mod params;
mod request;

pub use accumulator::{ResultAccumulator, SeriesKey};
pub use outcome::Outcome;
pub use page::{Page, Record};
pub use params::{FetchParams, WindowCheck};
pub use request::{CorrelationToken, RequestName};
