use anyhow::Context;
use clap::Parser;
use icall_resolve::cli::Args;
use icall_resolve::{driver, frontend};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.stderr {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }

    let module = frontend::load_module(&args.module)
        .with_context(|| format!("failed to load {}", args.module.display()))?;

    let report = driver::analyze(&module);
    print!("{report}");

    Ok(())
}
