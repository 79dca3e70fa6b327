use std::{cell::Cell, error::Error};

use clap::{Parser, Subcommand};
use log::info;
use roosty_alarms::{
    clock::{Clock, SystemClock},
    commands::{self, AlarmInput},
    config::Config,
    ical, Alarm, AlarmManager,
};
use serde::Serialize;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// write the default config
    Init {
        #[clap(long, short)]
        force: bool,
    },
    /// add an alarm, time is `HH:MM[:SS]` (today) or `YYYY-MM-DD HH:MM[:SS]`
    Add {
        time: String,
        label: String,
        #[clap(default_value = "0", allow_hyphen_values = true)]
        priority: String,
    },
    /// print every alarm as toml, next one first
    List,
    /// show the next alarm
    Next,
    /// delete the next alarm
    Remove,
    /// replace the next alarm
    Edit {
        time: String,
        label: String,
        #[clap(default_value = "0", allow_hyphen_values = true)]
        priority: String,
    },
    /// ring alarms as they come due
    Watch,
}

#[derive(Serialize)]
struct Listing {
    alarms: Vec<Alarm>,
}

fn main() -> Result<(), Box<dyn Error>> {
    // initilize the logger
    simple_file_logger::init_logger!("roosty_alarms").expect("couldn't initialize logger");

    let args = Args::parse();
    let config_path = Config::config_path()?;
    if let Command::Init { force } = args.command {
        if force || !Config::is_config_present() {
            Config::new().save(config_path.clone())?;
            println!("wrote config to {}", config_path.display());
        } else {
            println!("config already exists at {}", config_path.display());
        }
        return Ok(());
    }

    let config = Config::load_or_default(config_path)?;
    let mut manager = AlarmManager::with_capacity(config.queue_capacity);
    ical::load_file(&mut manager, &config.alarms_file, config.on_bad_record)?;
    let today = SystemClock.now().date();

    match args.command {
        Command::Init { .. } => unreachable!("handled above"),
        Command::Add {
            time,
            label,
            priority,
        } => {
            commands::add(
                &mut manager,
                AlarmInput::parse(&time, &label, &priority, today)?,
            );
        }
        Command::List => {
            print!(
                "{}",
                toml::to_string(&Listing {
                    alarms: manager.get_all_alarms(),
                })?
            );
            return Ok(());
        }
        Command::Next => {
            match manager.get_next_alarm() {
                Ok(alarm) => println!("{alarm} (priority {})", alarm.priority),
                Err(_) => println!("no alarms"),
            }
            return Ok(());
        }
        Command::Remove => {
            let alarm = commands::delete_next(&mut manager)?;
            println!("removed {alarm}");
        }
        Command::Edit {
            time,
            label,
            priority,
        } => {
            let old = commands::edit_next(
                &mut manager,
                AlarmInput::parse(&time, &label, &priority, today)?,
            )?;
            println!("replaced {old}");
        }
        Command::Watch => {
            if manager.is_queue_empty() {
                println!("no alarms");
                return Ok(());
            }
            info!("watching {} alarms", manager.len());
            print!("{manager}");
            let done = Cell::new(false);
            let mut error = None;
            config.poller().run(
                &mut manager,
                &SystemClock,
                |manager, alarm| {
                    println!("Alarm: {} is going off!", alarm.label);
                    // keep the file in sync so a fired alarm doesn't come back on restart
                    if let Err(e) =
                        ical::save_file(manager, &config.alarms_file, config.save_options())
                    {
                        error = Some(e);
                        done.set(true);
                    } else {
                        done.set(manager.is_queue_empty());
                    }
                },
                || !done.get(),
            );
            return error.map_or(Ok(()), |e| Err(e.into()));
        }
    }
    ical::save_file(&manager, &config.alarms_file, config.save_options())?;
    Ok(())
}
