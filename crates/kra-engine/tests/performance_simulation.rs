use std::io::Cursor;

use kra_engine::scoring::{
    classify, validate_kra_set, AchievementOverrides, IncentivePlan, IncentiveTier, Kra, KraId,
    KraSheetImporter, RoleId, RoleThresholdProfile, SimulationEngine, ThresholdBands,
    ThresholdResolver, Zone,
};

const MONTH_END_SHEET: &str = "\
id,title,measurement_type,target,achieved,weightage,period
shg,SHG Creation,numeric,25,23,40,monthly
fd,FD Acquisition,numeric,15,16,30,monthly
visits,Customer Visits,percentage,95,92%,20,monthly
attendance,Attendance,percentage,98,99%,10,daily
";

fn field_officer() -> RoleId {
    RoleId::new("field_officer")
}

#[test]
fn imported_sheet_flows_through_validation_and_simulation() {
    let kras = KraSheetImporter::from_reader(Cursor::new(MONTH_END_SHEET)).expect("sheet parses");
    let set = validate_kra_set(field_officer(), kras).expect("weightage sums to 100");

    let engine = SimulationEngine::default();
    let actual = engine.actual(&set).expect("actual scoring");

    assert_eq!(actual.aggregate_score, 96);
    assert_eq!(actual.aggregate_zone, Zone::Green);
    assert_eq!(actual.incentive.base_incentive, 2000);
    assert_eq!(actual.incentive.tier_label, "90%");
    assert_eq!(actual.incentive.bonus_total, 2000);
    assert_eq!(actual.incentive.total_incentive, 4000);
}

#[test]
fn what_if_never_touches_the_stored_set() {
    let kras = KraSheetImporter::from_reader(Cursor::new(MONTH_END_SHEET)).expect("sheet parses");
    let set = validate_kra_set(field_officer(), kras).expect("valid set");
    let before = set.clone();

    let mut overrides = AchievementOverrides::new();
    overrides.insert(KraId::new("fd"), 5.0);
    let what_if = SimulationEngine::default()
        .simulate_set(&set, &overrides)
        .expect("simulation");

    assert!(what_if.aggregate_score < 96);
    assert_eq!(set, before);
}

#[test]
fn custom_plan_and_role_profile() {
    let resolver = ThresholdResolver::new(ThresholdBands::from_boundaries(60.0, 80.0))
        .expect("valid default")
        .with_profile(RoleThresholdProfile::new(
            RoleId::new("senior_officer"),
            ThresholdBands::from_boundaries(80.0, 97.0),
        ))
        .expect("valid profile");
    let plan = IncentivePlan::new(
        vec![
            IncentiveTier::new(95, 3000).labelled("Platinum"),
            IncentiveTier::new(85, 1200).labelled("Silver"),
        ],
        Vec::new(),
    )
    .expect("valid plan");
    let engine = SimulationEngine::new(resolver, plan);
    let kras = KraSheetImporter::from_reader(Cursor::new(MONTH_END_SHEET)).expect("sheet parses");

    let junior = engine
        .simulate_for_role(&field_officer(), &kras, &AchievementOverrides::new())
        .expect("junior");
    let senior = engine
        .simulate_for_role(&RoleId::new("senior_officer"), &kras, &AchievementOverrides::new())
        .expect("senior");

    assert_eq!(junior.aggregate_zone, Zone::Green);
    assert_eq!(senior.aggregate_zone, Zone::Amber);
    assert_eq!(senior.incentive.tier_label, "Platinum");
    assert_eq!(senior.incentive.total_incentive, 3000);
}

#[test]
fn classify_treats_boundaries_as_inclusive_minimums() {
    let bands = ThresholdBands::default();

    assert_eq!(classify(69.999, &bands), Zone::Red);
    assert_eq!(classify(70.0, &bands), Zone::Amber);
    assert_eq!(classify(90.0, &bands), Zone::Green);
    assert_eq!(classify(240.0, &bands), Zone::Green);
}

#[test]
fn decimal_targets_landing_on_a_boundary_keep_their_zone_and_bonus() {
    let kras = vec![
        Kra::new("shg", "SHG Creation", 33.2, 50).with_achieved(29.88),
        Kra::new("visits", "Customer Visits", 33.2, 50).with_achieved(23.24),
    ];

    let result = SimulationEngine::default()
        .simulate(&kras, &AchievementOverrides::new())
        .expect("simulation");

    let shg = result.achievement(&KraId::new("shg")).expect("shg line");
    let visits = result.achievement(&KraId::new("visits")).expect("visits line");
    assert_eq!(shg.zone, Zone::Green);
    assert_eq!(visits.zone, Zone::Amber);
    assert_eq!(result.aggregate_score, 80);
    assert_eq!(result.incentive.base_incentive, 1000);
    assert_eq!(result.incentive.bonus_total, 2000);
    assert_eq!(result.incentive.total_incentive, 3000);
}
