//! Properties of the `LoaderComponent`.

use common::config::ApiConfig;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct LoaderProps {
    /// Endpoint presets and tunables. The selected preset is only the
    /// initial one: the user can switch at runtime.
    #[prop_or_default]
    pub config: ApiConfig,
}
