use crate::infra::{parse_override, InMemoryKraRepository};
use clap::Args;
use kra_engine::config::AppConfig;
use kra_engine::error::AppError;
use kra_engine::scoring::{
    format_amount, AchievementOverrides, Kra, KraId, KraSheetImporter, MeasurementType,
    PerformanceService, ReviewPeriod, RoleId, SimulationEngine, SimulationResult,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct SimulateArgs {
    /// CSV sheet with id,title,measurement_type,target,achieved,weightage,period columns
    #[arg(long)]
    pub(crate) kras: PathBuf,
    /// Role whose threshold profile should classify the result
    #[arg(long)]
    pub(crate) role: Option<String>,
    /// Hypothetical achieved value, as KRA_ID=VALUE (repeatable)
    #[arg(long, value_parser = parse_override)]
    pub(crate) set: Vec<(KraId, f64)>,
    /// Print the result as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Extra what-if value applied after the scripted scenarios, as KRA_ID=VALUE
    #[arg(long, value_parser = parse_override)]
    pub(crate) set: Vec<(KraId, f64)>,
}

pub(crate) fn run_simulation(args: SimulateArgs) -> Result<(), AppError> {
    let SimulateArgs {
        kras,
        role,
        set,
        json,
    } = args;

    let config = AppConfig::load()?;
    let engine = config.engine.build_engine()?;
    let sheet = KraSheetImporter::from_path(&kras)?;
    let overrides: AchievementOverrides = set.into_iter().collect();

    let result = match role {
        Some(role) => engine.simulate_for_role(&RoleId::new(role), &sheet, &overrides)?,
        None => engine.simulate(&sheet, &overrides)?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("KRA simulation for {}", kras.display());
        render_simulation(&result);
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let role = RoleId::new("field_officer");
    let service = PerformanceService::new(
        Arc::new(InMemoryKraRepository::default()),
        SimulationEngine::default(),
    );

    println!("KRA performance demo");
    let set = service.configure_role(role.clone(), demo_kras())?;
    println!(
        "- Configured {} KRAs for {} (total weightage {}%)",
        set.len(),
        set.role(),
        set.total_weightage()
    );
    for kra in set.kras() {
        println!(
            "  - {:<20} target {:>6.1} ({}, {}) w{:>3}",
            kra.title,
            kra.target,
            kra.measurement_type.label(),
            kra.period.label(),
            kra.weightage
        );
    }

    let actual = service.simulate_role(&role, &AchievementOverrides::new())?;
    println!("\nActual month-end position");
    render_simulation(&actual);

    let scenarios: [(&str, &[(&str, f64)]); 2] = [
        ("Close the SHG gap", &[("shg", 25.0)]),
        ("SHG gap plus visit target", &[("shg", 25.0), ("visits", 95.0)]),
    ];
    for (name, values) in scenarios {
        let overrides: AchievementOverrides = values
            .iter()
            .map(|(id, value)| (KraId::new(*id), *value))
            .collect();
        let result = service.simulate_role(&role, &overrides)?;
        println!("\nWhat-if: {name}");
        render_simulation(&result);
    }

    if !args.set.is_empty() {
        let overrides: AchievementOverrides = args.set.into_iter().collect();
        let result = service.simulate_role(&role, &overrides)?;
        println!("\nWhat-if: command line values");
        render_simulation(&result);
    }

    let reset = service.simulate_role(&role, &AchievementOverrides::new())?;
    println!("\nReset to actual: {}", reset.summary());

    Ok(())
}

fn demo_kras() -> Vec<Kra> {
    vec![
        Kra::new("shg", "SHG Creation", 25.0, 40).with_achieved(23.0),
        Kra::new("fd", "FD Acquisition", 15.0, 30).with_achieved(16.0),
        Kra::new("visits", "Customer Visits", 95.0, 20)
            .with_achieved(92.0)
            .with_measurement(MeasurementType::Percentage),
        Kra::new("attendance", "Attendance", 98.0, 10)
            .with_achieved(99.0)
            .with_measurement(MeasurementType::Percentage)
            .with_period(ReviewPeriod::Daily),
    ]
}

pub(crate) fn render_simulation(result: &SimulationResult) {
    for line in &result.per_kra {
        let marker = if line.simulated { " *" } else { "" };
        println!(
            "  - {:<20} {:>8.1} / {:<8.1} {:>6.1}% [{}] w{:>3} -> {:>5.1}{}",
            line.title,
            line.achieved,
            line.target,
            line.achievement_pct,
            line.zone,
            line.weightage,
            line.contribution,
            marker
        );
    }

    let incentive = &result.incentive;
    println!("  {}", result.summary());
    for bonus in &incentive.fired_bonuses {
        println!(
            "    + {} ({} at {:.1}% >= {:.0}%): {}",
            bonus.rule,
            bonus.kra_title,
            bonus.achievement_pct,
            bonus.threshold,
            format_amount(bonus.amount)
        );
    }
    if let Some(next) = &incentive.next_tier {
        println!(
            "    next tier {} in {} point(s) pays base {}",
            next.label,
            next.points_needed,
            format_amount(next.base_amount)
        );
    }
}
