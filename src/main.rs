use anyhow::{bail, Context, Result as AResult};
use dnstest::{
    cli::AppArgs,
    config::{find_config_file, prompt_config, Config, CONFIG_FILE_NAME},
    driver::Driver,
    engine::{Checker, Mode},
    resolver::UdpResolver,
};
use log::warn;
use std::{
    fs::File,
    io::{self, BufReader},
    path::PathBuf,
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    if let Err(e) = run() {
        eprintln!("ERROR: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> AResult<()> {
    let args = AppArgs::parse()?;

    if args.example_config {
        print!("{}", Config::example().to_ini_string());
        return Ok(());
    }

    let config_path = args.config_file.clone().or_else(find_config_file);

    if args.prompt_config {
        let path = config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
        if path.exists() {
            bail!(
                "{} already exists, refusing to overwrite it",
                path.display()
            );
        }
        let stdin = io::stdin();
        let config = prompt_config(&Config::default(), &mut stdin.lock(), &mut io::stdout())?;
        std::fs::write(&path, config.to_ini_string())
            .with_context(|| format!("couldn't write {}", path.display()))?;
        println!("Config written to {}", path.display());
        return Ok(());
    }

    let Some(config_path) = config_path else {
        eprintln!(
            "ERROR: no config file found. Create ./{CONFIG_FILE_NAME} or ~/.{CONFIG_FILE_NAME}, \
             or pass one with -c. Try --example-config or --promptconfig."
        );
        std::process::exit(1);
    };
    let mut config = Config::load(&config_path)?;
    if args.ignore_ttl {
        config.ignore_ttl = true;
    }
    if let Some(sleep) = args.sleep {
        println!("Note - will sleep {} seconds between lines", sleep.as_secs_f64());
        config.sleep = sleep;
    }

    if args.config_print {
        println!("# {}", config_path.display());
        print!("{}", config.to_ini_string());
        return Ok(());
    }

    config.validate()?;
    let mode = if args.verify { Mode::Verify } else { Mode::Check };
    let driver = Driver::new(Checker::new(&config, UdpResolver::default()), mode);
    let mut stdout = io::stdout().lock();
    match &args.test_file {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("couldn't open input file {}", path.display()))?;
            driver.run(BufReader::new(file), &mut stdout)?;
        }
        None => {
            warn!("reading changes from stdin; use -f to read them from a file");
            driver.run(io::stdin().lock(), &mut stdout)?;
        }
    }
    Ok(())
}
