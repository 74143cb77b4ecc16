mod checks;
mod core;
mod exec;
mod runner;
mod transcript;

use clap::Parser;

use crate::core::config::RunConfig;
use crate::core::error::{AuditError, ExitCode, print_error};

/// Audit host security posture and persist the findings transcript
#[derive(Parser)]
#[command(name = "secaudit")]
#[command(version, about, long_about = None)]
#[command(styles = get_styles())]
struct Cli {
  /// List registered checks and exit
  #[arg(long)]
  list_checks: bool,
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn main() {
  let cli = Cli::parse();

  if cli.list_checks {
    for check in checks::DEFAULT_CHECKS {
      println!("{}: {}", check.label, check.locator);
    }
    return;
  }

  let config = RunConfig::from_env();
  match runner::run(&config) {
    Ok(totals) => std::process::exit(totals.exit_code().as_i32()),
    Err(err) => handle_error(err),
  }
}

fn handle_error(err: AuditError) -> ! {
  print_error(&err);
  std::process::exit(ExitCode::Fatal.as_i32());
}
