use clap::Parser;
use userdesk::{Config, cli::Cli, run};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();

    if config.general.worker_threads > 0 {
        builder.worker_threads(config.general.worker_threads);
    }
    if config.general.blocking_threads > 0 {
        builder.max_blocking_threads(config.general.blocking_threads);
    }

    let runtime = builder.build()?;
    runtime.block_on(run(cli, config))
}
