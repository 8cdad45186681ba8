use crate::config::Config;
use log::LevelFilter;
use simplelog::{self, ConfigBuilder};

/// Dependency modules whose output is suppressed below TRACE. SQL statements from the
/// booking and notification queries are still visible at TRACE for debugging races.
const NOISY_DEPENDENCIES: &[&str] = &["sqlx", "sea_orm", "tower", "tracing", "hyper", "axum"];

/// Resolved logger settings, kept separate from initialisation so they can be tested.
#[derive(Debug, PartialEq)]
struct LogSettings {
    level: simplelog::LevelFilter,
    ignored_modules: Vec<&'static str>,
}

impl LogSettings {
    fn from_level(level: LevelFilter) -> Self {
        let ignored_modules = if level == LevelFilter::Trace {
            Vec::new()
        } else {
            NOISY_DEPENDENCIES.to_vec()
        };

        Self {
            level: to_simplelog_level(level),
            ignored_modules,
        }
    }

    fn build(&self) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder.set_time_format_rfc3339();
        for module in &self.ignored_modules {
            builder.add_filter_ignore_str(module);
        }
        builder.build()
    }
}

fn to_simplelog_level(level: LevelFilter) -> simplelog::LevelFilter {
    match level {
        LevelFilter::Off => simplelog::LevelFilter::Off,
        LevelFilter::Error => simplelog::LevelFilter::Error,
        LevelFilter::Warn => simplelog::LevelFilter::Warn,
        LevelFilter::Info => simplelog::LevelFilter::Info,
        LevelFilter::Debug => simplelog::LevelFilter::Debug,
        LevelFilter::Trace => simplelog::LevelFilter::Trace,
    }
}

pub struct Logger {}

impl Logger {
    /// Installs the global terminal logger at the level configured in `config`.
    pub fn init_logger(config: &Config) {
        let settings = LogSettings::from_level(config.log_level_filter);

        simplelog::TermLogger::init(
            settings.level,
            settings.build(),
            simplelog::TerminalMode::Mixed,
            simplelog::ColorChoice::Auto,
        )
        .expect("Failed to start simplelog");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_level_keeps_dependency_output() {
        let settings = LogSettings::from_level(LevelFilter::Trace);
        assert_eq!(settings.level, simplelog::LevelFilter::Trace);
        assert!(settings.ignored_modules.is_empty());
    }

    #[test]
    fn non_trace_levels_ignore_noisy_dependencies() {
        for level in [
            LevelFilter::Off,
            LevelFilter::Error,
            LevelFilter::Warn,
            LevelFilter::Info,
            LevelFilter::Debug,
        ] {
            let settings = LogSettings::from_level(level);
            assert!(settings.ignored_modules.contains(&"sea_orm"), "{level}");
            assert!(settings.ignored_modules.contains(&"sqlx"), "{level}");
        }
    }

    #[test]
    fn level_conversion_preserves_ordering() {
        assert_eq!(
            to_simplelog_level(LevelFilter::Warn),
            simplelog::LevelFilter::Warn
        );
        assert_eq!(
            to_simplelog_level(LevelFilter::Debug),
            simplelog::LevelFilter::Debug
        );
    }

    #[test]
    fn building_filtered_config_does_not_panic() {
        let _config = LogSettings::from_level(LevelFilter::Info).build();
    }
}
