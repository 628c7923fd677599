use acctest::env::{multi_env_search, BILLING_ACCOUNT_ENV_VARS, ORG_ENV_VARS};
use acctest::{ConfigSource, MapSource, ProcessEnv};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Render the discovered workload fixture with values from the environment
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Seed for a reproducible random suffix
    #[arg(long)]
    seed: Option<u64>,
    /// Use this suffix instead of a random one
    #[arg(long)]
    suffix: Option<String>,
    /// Organization id (defaults to GOOGLE_ORG)
    #[arg(long)]
    org_id: Option<String>,
    /// Billing account (defaults to GOOGLE_BILLING_ACCOUNT)
    #[arg(long)]
    billing_account: Option<String>,
}

/// Flags take precedence over `env`
fn merged_source(args: &Args, env: &dyn ConfigSource) -> MapSource {
    let mut source = MapSource::new();
    for (flag, vars) in [
        (&args.org_id, ORG_ENV_VARS),
        (&args.billing_account, BILLING_ACCOUNT_ENV_VARS),
    ] {
        if let Some(value) = flag.clone().or_else(|| multi_env_search(env, vars)) {
            source = source.with(vars[0], value);
        }
    }
    source
}

fn render(args: &Args, env: &dyn ConfigSource) -> acctest::Result<String> {
    let source = merged_source(args, env);
    apphub::render_basic(&source, args.seed, args.suffix.as_deref())
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let rendered = render(&args, &ProcessEnv).inspect_err(|e| {
        tracing::error!(error = %e, "failed to render fixture");
    })?;
    println!("{}", rendered);

    Ok(())
}
