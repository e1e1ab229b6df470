use cherry_pick_pro::backend::demo_repositories;
use cherry_pick_pro::cli::args::Args;
use cherry_pick_pro::cli::output::{render_log, render_repository, SessionSnapshot};
use cherry_pick_pro::config::Config;
use cherry_pick_pro::infrastructure::{setup_logging, LoggingConfig};
use cherry_pick_pro::models::RepoRole;
use cherry_pick_pro::Session;
use clap::Parser;
use std::time::Instant;
use tracing::Level;

fn print_repositories(session: &Session) {
    if let Some(source) = session.source() {
        println!("{}", render_repository(source, RepoRole::Source, Some(session.selection())));
    }
    if let Some(target) = session.target() {
        println!("{}", render_repository(target, RepoRole::Target, None));
    }
}

async fn handle_health(session: &mut Session, config: &Config) -> anyhow::Result<()> {
    if session.refresh_health().await {
        println!("🟢 Backend online: {}", config.backend_url);
    } else {
        println!("🔴 Backend offline: {}", config.backend_url);
    }
    Ok(())
}

async fn handle_scan(session: &mut Session, config: &Config) -> anyhow::Result<()> {
    let start_time = Instant::now();
    if let Some(report) = session.analyze().await {
        if config.debug {
            println!("分析耗时: {:.2?} (tier: {})", start_time.elapsed(), report.tier);
        }
    }
    Ok(())
}

async fn handle_pick(session: &mut Session, args: &Args) -> anyhow::Result<bool> {
    if args.pick_all {
        session.select_all();
    } else {
        for id in args.pick_ids() {
            if !session.toggle(&id) {
                eprintln!("⚠️  Commit {} is unknown or not available for cherry-pick, skipped", id);
            }
        }
    }

    if session.selection().is_empty() {
        println!("Nothing to cherry-pick.");
        return Ok(true);
    }

    match session.execute().await {
        Some(report) => Ok(report.success),
        None => Ok(true),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut config = Config::load(args.config.as_deref());

    config.update_from_args(&args);
    config.validate()?;

    let level: Level = args
        .log_level
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid log level: {}", args.log_level))?;
    setup_logging(LoggingConfig::for_level(level, config.debug))?;

    let mut session = Session::new(&config);

    // 只做健康检查
    if args.health {
        return handle_health(&mut session, &config).await;
    }

    if args.demo {
        session.set_repositories(demo_repositories());
    } else {
        session.load().await?;
    }

    if args.scan {
        handle_scan(&mut session, &config).await?;
    }

    let mut success = true;
    if args.wants_execution() {
        success = handle_pick(&mut session, &args).await?;
    }

    if args.json {
        let snapshot = SessionSnapshot {
            backend_online: session.backend_online(),
            source: session.source(),
            target: session.target(),
            selected: session.selection().ids(),
            log: session.log(),
        };
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_repositories(&session);
        if !session.log().is_empty() {
            println!("📝 Execution log:");
            print!("{}", render_log(session.log()));
        }
    }

    if !success {
        std::process::exit(1);
    }
    Ok(())
}
