use std::fs;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pvsim::cli::{Args, GroupChoice, Period};
use pvsim::report::{format_energy, ReportSink, TextReport};
use pvsim::{
    Group, Panel, PeriodTotals, RunControl, Simulation, SunTable, WeatherTable, WeekRun,
    AGGREGATE_STEP_MINUTES,
};

// ===================== MAIN =====================

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let panels = load_panels(&args.panels)?;
    info!("loaded {} panels from {}", panels.len(), args.panels.display());

    let sun = SunTable::load(&args.sun_data)?;
    let mut weather = WeatherTable::load_daily(&args.weather)?;
    if let Some(hourly) = &args.hourly_weather {
        weather.merge_hourly(hourly)?;
    }

    let groups = match args.group {
        GroupChoice::One => vec![Group::One],
        GroupChoice::Two => vec![Group::Two],
        GroupChoice::Both => vec![Group::One, Group::Two],
    };

    let (start, end) = args.date_range();
    println!("Simulating {start} to {end}");

    let mut summaries = Vec::new();
    for group in groups {
        let sim = Simulation::new(&panels, group, &sun, &weather, args.utc_offset);
        if sim.panel_count() == 0 {
            println!("Group {group}: no panels, skipped");
            continue;
        }

        let mut print_progress = |done: usize, total: usize| {
            if done == total || done % 30 == 0 {
                eprintln!("  {done}/{total} days");
            }
        };
        let mut ctl = RunControl { progress: Some(&mut print_progress), cancel: None };

        let totals = match args.period {
            Period::Week if args.end.is_none() => {
                let run = sim.run_week(start, &mut ctl)?;
                write_week_records(&args.out_dir, group, &run)?;
                run.totals
            }
            _ => sim.run_period(start, end, AGGREGATE_STEP_MINUTES, &mut ctl)?,
        };

        write_group_report(&args.out_dir, group, &totals, args.production_only)?;

        println!(
            "Group {group}: production {}, consumption {}, net {}",
            format_energy(totals.production_wh),
            format_energy(totals.consumption_wh),
            format_energy(totals.net_wh())
        );
        summaries.push((group, totals));
    }

    if let [(g1, t1), (g2, t2)] = summaries.as_slice() {
        let (winner, loser) = if t1.net_wh() >= t2.net_wh() { (g1, g2) } else { (g2, g1) };
        println!(
            "Group {winner} outperforms group {loser} by {}",
            format_energy((t1.net_wh() - t2.net_wh()).abs())
        );
    }

    Ok(())
}

// ===================== HELPERS =====================

fn load_panels(path: &PathBuf) -> Result<Vec<Panel>, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("cannot read panel list {}: {e}", path.display()))?;
    let panels: Vec<Panel> = serde_json::from_str(&text)?;

    let mut invalid = false;
    for panel in &panels {
        let bad_fields = panel.validate();
        if !bad_fields.is_empty() {
            eprintln!("panel '{}' has invalid fields: {}", panel.name, bad_fields.join(", "));
            invalid = true;
        }
    }
    if invalid {
        return Err("panel list failed validation".into());
    }
    Ok(panels)
}

fn write_group_report(
    out_dir: &PathBuf,
    group: Group,
    totals: &PeriodTotals,
    production_only: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = out_dir.join(format!("group{group}_output.txt"));
    let file = fs::File::create(&path)
        .map_err(|e| format!("cannot create {}: {e}", path.display()))?;
    let mut report = TextReport::new(BufWriter::new(file)).production_only(production_only);
    report.write_totals(group, totals)?;
    println!("  wrote {}", path.display());
    Ok(())
}

fn write_week_records(
    out_dir: &PathBuf,
    group: Group,
    run: &WeekRun,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = out_dir.join(format!("group{group}_timesteps.txt"));
    let file = fs::File::create(&path)
        .map_err(|e| format!("cannot create {}: {e}", path.display()))?;
    let mut w = BufWriter::new(file);

    writeln!(w, "time;elevation_deg;azimuth_deg;cloudiness_pct;static_w;tracking_w")?;
    for r in &run.records {
        writeln!(
            w,
            "{};{:.2};{:.2};{:.1};{:.2};{:.2}",
            r.time.format("%Y-%m-%d %H:%M:%S"),
            r.elevation_deg,
            r.azimuth_deg,
            r.cloudiness_pct,
            r.static_power_w,
            r.tracking_power_w
        )?;
    }
    w.flush()?;
    println!("  wrote {}", path.display());
    Ok(())
}
