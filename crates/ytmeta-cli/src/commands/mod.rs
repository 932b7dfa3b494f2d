pub mod batch;
pub mod config;
pub mod fetch;

use crate::args::FetchOptions;
use ytmeta_core::Config;

/// Fold command-line overrides into the loaded configuration.
pub(crate) fn apply_options(config: &mut Config, options: &FetchOptions) {
    if !options.languages.is_empty() {
        config.captions.languages = options.languages.clone();
    }
    if let Some(ref mirror) = options.mirror {
        config.fetch.invidious_url = Some(mirror.clone());
    }
    if options.persist {
        config.store.auto_persist = true;
    }
}
