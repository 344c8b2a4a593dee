pub mod caching;
pub mod tradermade;

pub use caching::{CachingRateSource, SettingsRateSource};
pub use tradermade::TraderMadeProvider;
