use crate::cli::Cli;
use crate::output::{print_json, print_table};
use anyhow::Context;
use serde::Serialize;
use std::path::PathBuf;
use tankplay_core::env::{self, EW_LOG};
use tankplay_core::launch::{format_timestamp, LaunchPlan, LaunchRecord, Launcher, PlayerOutcome};
use tankplay_core::offset::{compute_offset, OffsetSource};
use tankplay_core::paths;
use tankplay_core::player::PlayerCommand;
use tankplay_core::settings::{Settings, WarnLevel};
use tankplay_core::Stream;

#[derive(Serialize)]
struct PlanReport<'a> {
    event: &'a str,
    seismic_config: &'a PathBuf,
    geodetic_config: &'a PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    offset_source: Option<OffsetSource>,
    plan: LaunchPlan,
}

#[derive(Serialize)]
struct PlayerReport {
    stream: Stream,
    started_at: Option<String>,
    exit_code: Option<i32>,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct RunReport<'a> {
    #[serde(flatten)]
    plan: PlanReport<'a>,
    start_log: PathBuf,
    players: &'a [PlayerReport],
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    // Checked before anything else can fail: the CLI maps this error to exit 2.
    let sourced_params = env::require_sourced(|k| std::env::var(k).ok())?;
    let settings = load_settings(&cli)?;
    let ew = settings.ew_environment(
        &sourced_params,
        std::env::var_os(EW_LOG)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from),
    );

    let seismic_cfg = paths::tankplayer_config(&ew.params, Stream::Seismic);
    let geodetic_cfg = paths::tankplayer_config(&ew.params, Stream::Geodetic);

    let (offset, offset_source) = match cli.offset_time {
        Some(o) => (o, None),
        None => {
            let source = compute_offset(&settings.tanksniff(), &seismic_cfg, &geodetic_cfg, &ew)
                .context("failed to compute seismic/geodetic offset")?;
            (source.offset, Some(source))
        }
    };

    if !cli.json {
        println!(
            "Doing {} with offset {}s and files {} and {}",
            cli.event_name,
            offset,
            seismic_cfg.display(),
            geodetic_cfg.display()
        );
    }

    let plan = LaunchPlan::from_offset(offset)?;
    let report = PlanReport {
        event: &cli.event_name,
        seismic_config: &seismic_cfg,
        geodetic_config: &geodetic_cfg,
        offset_source,
        plan,
    };

    if cli.dry_run {
        if cli.json {
            print_json(&report)?;
        } else {
            println!(
                "Would start {} first, then {} after {:.3}s",
                plan.first,
                plan.second,
                plan.delay.as_secs_f64()
            );
        }
        return Ok(());
    }

    let player = PlayerCommand::new(settings.tankplayer(), ew.clone());
    let (s_cfg, g_cfg) = (seismic_cfg.clone(), geodetic_cfg.clone());
    let launch = Launcher::new()
        .launch(&plan, move |stream| {
            let cfg = match stream {
                Stream::Seismic => &s_cfg,
                Stream::Geodetic => &g_cfg,
            };
            player.run(cfg)
        })
        .context("failed to start tankplayer threads")?;

    let start_log = paths::start_log_path(&settings.log_dir());
    let log_result = launch.write_start_log(&start_log);
    let records = launch.records.clone();
    if let Err(e) = &log_result {
        tracing::error!(path = %start_log.display(), error = %e, "could not write start log");
    }

    let outcomes = launch.wait();
    let players = player_reports(&records, &outcomes);

    if cli.json {
        print_json(&RunReport {
            plan: report,
            start_log: start_log.clone(),
            players: &players,
        })?;
    } else {
        let rows = players
            .iter()
            .map(|p| {
                vec![
                    p.stream.to_string(),
                    p.started_at.clone().unwrap_or_else(|| "-".to_string()),
                    status_text(p),
                ]
            })
            .collect();
        print_table(&["STREAM", "STARTED", "STATUS"], rows);
    }

    log_result.with_context(|| format!("failed to write {}", start_log.display()))?;

    let failed: Vec<String> = players
        .iter()
        .filter(|p| !p.success)
        .map(|p| format!("{} ({})", p.stream, status_text(p)))
        .collect();
    if !failed.is_empty() {
        anyhow::bail!("tankplayer failed: {}", failed.join(", "));
    }
    Ok(())
}

fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let mut settings = Settings::load_or_default(cli.config.as_deref()).with_context(|| {
        match &cli.config {
            Some(p) => format!("failed to load settings from {}", p.display()),
            None => "failed to load settings".to_string(),
        }
    })?;

    if let Some(dir) = &cli.log_dir {
        settings.log_dir = Some(dir.clone());
    }
    if let Some(bin) = &cli.tankplayer {
        settings.tools.tankplayer = bin.clone();
    }
    if let Some(bin) = &cli.tanksniff {
        settings.tools.tanksniff = bin.clone();
    }

    let mut errors = Vec::new();
    for w in settings.validate() {
        match w.level {
            WarnLevel::Warning => tracing::warn!("{}", w.message),
            WarnLevel::Error => errors.push(w.message),
        }
    }
    if !errors.is_empty() {
        anyhow::bail!("invalid settings: {}", errors.join("; "));
    }
    Ok(settings)
}

fn player_reports(records: &[LaunchRecord], outcomes: &[PlayerOutcome]) -> Vec<PlayerReport> {
    Stream::ALL
        .iter()
        .map(|&stream| {
            let started_at = records
                .iter()
                .find(|r| r.stream == stream)
                .map(|r| format_timestamp(&r.started_at));
            let outcome = outcomes.iter().find(|o| o.stream == stream);
            let (exit_code, error) = match outcome.map(|o| &o.status) {
                Some(Ok(status)) => (status.code(), None),
                Some(Err(e)) => (None, Some(e.to_string())),
                None => (None, Some("not started".to_string())),
            };
            PlayerReport {
                stream,
                started_at,
                exit_code,
                success: outcome.is_some_and(PlayerOutcome::success),
                error,
            }
        })
        .collect()
}

fn status_text(p: &PlayerReport) -> String {
    match (&p.error, p.exit_code) {
        (Some(e), _) => e.clone(),
        (None, _) if p.success => "ok".to_string(),
        (None, Some(code)) => format!("exit {code}"),
        (None, None) => "killed by signal".to_string(),
    }
}
