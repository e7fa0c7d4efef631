use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::AppEnv;

const DEFAULT_DIRECTIVES: &str = "identity_service=debug,tower_http=debug";
const PROD_DIRECTIVES: &str = "identity_service=info,tower_http=info";

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the per-environment level. `local` logs human-readable text,
/// `dev` and `prod` log JSON lines.
pub fn init(env: AppEnv) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(env).into());

    let registry = tracing_subscriber::registry().with(filter);

    match env {
        AppEnv::Local => registry.with(tracing_subscriber::fmt::layer()).init(),
        AppEnv::Dev | AppEnv::Prod => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(false))
            .init(),
    }
}

fn default_filter(env: AppEnv) -> &'static str {
    match env {
        AppEnv::Prod => PROD_DIRECTIVES,
        AppEnv::Local | AppEnv::Dev => DEFAULT_DIRECTIVES,
    }
}
