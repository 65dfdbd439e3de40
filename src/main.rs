use std::io;
use std::process::ExitCode;
use std::time::SystemTime;

use psh::config::{Config, ConfigLoader};
use psh::environment::Environment;
use psh::executor::ForkExecutor;
use psh::repl::Shell;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let env = Environment::new();
    let config = match ConfigLoader::load(ConfigLoader::default_path(&env).as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("psh: config error: {}", e);
            Config::default()
        }
    };

    let mut shell = Shell::new(config, env, ForkExecutor::new());
    match shell.run(io::stdin().lock(), io::stdout(), SystemTime::now()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("psh: {}", e);
            ExitCode::FAILURE
        }
    }
}
