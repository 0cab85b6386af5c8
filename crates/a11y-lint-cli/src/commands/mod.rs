//! Subcommand implementations.

pub mod init;
pub mod list_checks;
pub mod output;
pub mod scan;

/// Exit status when any unit has a failing audit.
pub const EXIT_FAILURES: i32 = 1;

/// Exit status for configuration errors.
pub const EXIT_CONFIG_ERROR: i32 = 2;

/// Prints a configuration error and exits with [`EXIT_CONFIG_ERROR`].
pub fn exit_config_error(report: &miette::Report) -> ! {
    eprintln!("{report:?}");
    std::process::exit(EXIT_CONFIG_ERROR)
}
