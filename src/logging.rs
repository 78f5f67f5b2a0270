use std::path::{Path, PathBuf};

use log::LevelFilter;
use log4rs::{
    append::{
        console::ConsoleAppender,
        rolling_file::{
            policy::compound::{roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger, CompoundPolicy},
            RollingFileAppender,
        },
    },
    config::{Appender, Config, Logger, Root},
    encode::pattern::PatternEncoder,
};

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} | {({l}):5.5} | {M} - {m}{n}";
const ROLL_SIZE: u64 = 5 * 1024 * 1024;
const ROLL_KEEP: u32 = 3;

/// Where and how loudly Mealbot logs. Read from `MEALBOT_LOG` (a level name)
/// and `MEALBOT_LOG_DIR`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: LevelFilter,
    pub dir: PathBuf,
}

impl LogSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            level: parse_level(lookup("MEALBOT_LOG").as_deref()),
            dir: lookup("MEALBOT_LOG_DIR")
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("logs")),
        }
    }

    pub fn log_file(&self) -> PathBuf {
        self.dir.join("mealbot.log")
    }
}

/// Unknown or missing level names mean `Debug`.
pub fn parse_level(value: Option<&str>) -> LevelFilter {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(LevelFilter::Debug)
}

/// Console plus a size-rolled `mealbot.log` (`mealbot.1.log` .. `mealbot.3.log`).
pub fn build_config(settings: &LogSettings) -> Result<Config, Box<dyn std::error::Error>> {
    std::fs::create_dir_all(&settings.dir)?;

    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build();

    let file = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build(settings.log_file(), Box::new(roll_policy(&settings.dir)?))?;

    // provider HTTP internals are noisy below info
    let quiet = settings.level.min(LevelFilter::Info);
    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .appender(Appender::builder().build("file", Box::new(file)))
        .logger(Logger::builder().build("actix_server", quiet))
        .logger(Logger::builder().build("reqwest", quiet))
        .logger(Logger::builder().build("hyper", quiet))
        .build(Root::builder().appender("stdout").appender("file").build(settings.level))?;
    Ok(config)
}

fn roll_policy(dir: &Path) -> Result<CompoundPolicy, Box<dyn std::error::Error>> {
    let pattern = dir.join("mealbot.{}.log");
    let roller = FixedWindowRoller::builder().build(&pattern.to_string_lossy(), ROLL_KEEP)?;
    Ok(CompoundPolicy::new(Box::new(SizeTrigger::new(ROLL_SIZE)), Box::new(roller)))
}

pub fn setup_logging() -> Result<(), Box<dyn std::error::Error>> {
    let settings = LogSettings::from_env();
    log4rs::init_config(build_config(&settings)?)?;
    log::info!("Logging at {} to {}", settings.level, settings.log_file().display());
    Ok(())
}
