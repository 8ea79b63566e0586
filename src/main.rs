use atop::{
    boot,
    cli::{self, actions, RunMode},
};

fn main() {
    let matches = cli::parse_args();
    let mode = RunMode::from_matches(&matches);

    let res = cli::load_config(&matches).and_then(|config| {
        boot::init_logger(&config, mode == RunMode::Dashboard);
        actions::run(mode, &config)
    });

    if let Err(err) = res {
        eprintln!("ERROR: {err:#}");
        std::process::exit(1);
    }
}
