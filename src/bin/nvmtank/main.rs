use anyhow::Result;
use env_logger::{Builder, Env};
use log::error;

use nvmtank::NvmError;

mod cli;
mod util;
mod cmd_get;
mod cmd_set;
mod cmd_status;
mod cmd_scrub;
mod cmd_dump;

fn init_logger() {
    // Уровень берём из RUST_LOG, иначе дефолт: info.
    // Пример: RUST_LOG=debug ./nvmtank ...
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn main() {
    init_logger();

    if let Err(e) = run() {
        error!("{:#}", e);
        // Ошибки движка: стабильный код (10 + kind), прочие: 1.
        let code = e
            .downcast_ref::<NvmError>()
            .map(|n| 10 + n.code() as i32)
            .unwrap_or(1);
        std::process::exit(code);
    }
}

fn run() -> Result<()> {
    let cli = cli::Cli::parse_args();
    match cli.cmd {
        cli::Cmd::Get { dev, id, out } => cmd_get::exec(dev.tank_config(), id, out),

        cli::Cmd::Set { dev, id, value } => cmd_set::exec(dev.tank_config(), id, value),

        cli::Cmd::Status { dev, json } => cmd_status::exec(dev.tank_config(), json),

        cli::Cmd::Scrub { dev, json } => cmd_scrub::exec(dev.tank_config(), json),

        cli::Cmd::Dump { dev, page } => cmd_dump::exec(dev.tank_config(), page),
    }
}
