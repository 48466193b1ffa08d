use std::sync::Arc;

use reltime::{Config, ConfigError, Element, FormatTime as _, TimePoint};

const USAGE: &str = "usage: reltime [--watch] <config.lua> <datetime>...";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    simple_env_load::load_env_from([".dev.env", ".secrets.env"]);
    alto_logger::init_term_logger().expect("single initalization of logger");

    let mut args = std::env::args().skip(1).peekable();
    let watch = args.next_if(|arg| arg == "--watch").is_some();
    let Some(config_path) = args.next() else {
        eprintln!("{USAGE}");
        std::process::exit(2)
    };
    let datetimes = args.collect::<Vec<_>>();
    if datetimes.is_empty() {
        eprintln!("{USAGE}");
        std::process::exit(2)
    }

    let formatter = match Config::load(&config_path).and_then(|config| config.formatter()) {
        Ok(formatter) => formatter,
        Err(ConfigError::Invalid(errors)) => {
            log::warn!("invalid configuration file:");
            for error in errors {
                for line in error.lines() {
                    log::warn!("  {line}");
                }
            }

            log::info!(
                "help:\n  \
                 you can load secrets from the environment with:\n  \
                 get_env(key) -> String"
            );

            std::process::exit(1)
        }
        Err(err) => return Err(err.into()),
    };

    if !watch {
        let now = TimePoint::now();
        for datetime in &datetimes {
            match formatter.format_attribute(Some(datetime), now) {
                Some(out) => println!(
                    "{}\t{}\t{}",
                    out.text,
                    out.tooltip,
                    out.next.as_readable_time()
                ),
                None => println!("invalid"),
            }
        }
        return Ok(());
    }

    let formatter = Arc::new(formatter);
    let mut elements = vec![];
    for datetime in &datetimes {
        if let Err(err) = TimePoint::parse(datetime) {
            log::warn!("not watching {datetime:?}: {err}");
            println!("{datetime}\tinvalid");
            continue;
        }
        let element = Element::connect(Arc::clone(&formatter), datetime.as_str());
        elements.push((datetime, element));
    }

    if elements.is_empty() {
        std::process::exit(1)
    }

    loop {
        let selector = elements
            .iter()
            .enumerate()
            .fold(flume::Selector::new(), |selector, (i, (_, element))| {
                selector.recv(element.updates(), move |update| update.map(|u| (i, u)))
            });

        match selector.wait() {
            Ok((i, update)) => {
                println!("{}\t{}\t{}", elements[i].0, update.text, update.tooltip)
            }
            Err(..) => break,
        }
    }

    Ok(())
}
