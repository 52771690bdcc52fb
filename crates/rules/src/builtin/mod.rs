//! Built-in rule types.

mod drop_serie;
mod old_serie;
mod rename_measurement;

pub use drop_serie::{DropSerieConfig, DropSerieRule};
pub use old_serie::{OldSerieConfig, OldSerieRule};
pub use rename_measurement::{RenameMeasurementConfig, RenameMeasurementRule};

use crate::config::Config;
use crate::registry::RuleRegistry;

fn new_config<C: Config + Default + 'static>() -> Box<dyn Config> {
    Box::<C>::default()
}

/// Register every built-in rule type.
pub fn register_all(registry: &mut RuleRegistry) {
    registry.register(RenameMeasurementConfig::NAME, new_config::<RenameMeasurementConfig>);
    registry.register(OldSerieConfig::NAME, new_config::<OldSerieConfig>);
    registry.register(DropSerieConfig::NAME, new_config::<DropSerieConfig>);
}
