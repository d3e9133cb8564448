use clap::Parser;

use ceeify_drv::{level_filter, Cli, Config, JsonProfiler, NoopProfiler, Profiler, Session, StageError};

fn main() {
    let cli = Cli::parse();
    simple_logger::SimpleLogger::new()
        .with_level(level_filter(&cli))
        .init()
        .expect("logger already initialized");

    let profile_path = cli.profile.clone();
    let mut session = Session::new(Config::from(&cli));

    let exit_code = match &profile_path {
        Some(path) => {
            let profiler = JsonProfiler::new();
            let result = session.run(&profiler);
            if let Err(e) = profiler.write_report(path) {
                log::warn!("failed to write profile report to {}: {e}", path.display());
            }
            report(result)
        }
        None => report(session.run(&NoopProfiler)),
    };

    std::process::exit(exit_code);
}

fn report(result: anyhow::Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            match err.downcast_ref::<StageError>() {
                Some(stage_err) => {
                    eprintln!("{}", stage_err.render());
                    stage_err.exit_code()
                }
                None => {
                    eprintln!("error: {err:#}");
                    1
                }
            }
        }
    }
}
