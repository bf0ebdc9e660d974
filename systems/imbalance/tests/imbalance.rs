use elemental_farm_core::{
    CellId, Command, Element, ElementBalance, ElementImpact, Event, PlantCatalog, PlantType,
    SoilProfile,
};
use elemental_farm_system_imbalance::{Config, ImbalanceDetector, Verdict};
use elemental_farm_world::{self as world, query, Rules, World};

fn single_cell_world(catalog: PlantCatalog) -> World {
    let mut world = World::with_rules(Rules {
        catalog,
        ..Rules::default()
    });
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureFarm {
            columns: 1,
            rows: 1,
            soils: vec![SoilProfile::Balanced],
        },
        &mut events,
    );
    world
}

fn run(world: &mut World, detector: &mut ImbalanceDetector, command: Command) -> Option<Verdict> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    let ledger = query::ledger(world);
    detector.handle(&events, ledger.global(), ledger.initial_total())
}

#[test]
fn no_op_crop_never_reaches_threshold() {
    let catalog = PlantCatalog::default()
        .with_impact(PlantType::Carrot, ElementImpact::new(ElementBalance::ZERO, ElementBalance::ZERO));
    let mut world = single_cell_world(catalog);
    let mut detector = ImbalanceDetector::new(Config::new(15, false));
    let cell = CellId::new(0);

    for _ in 0..50 {
        let planted = run(
            &mut world,
            &mut detector,
            Command::PlantCrop {
                cell,
                plant: PlantType::Carrot,
            },
        );
        assert_eq!(planted, Some(Verdict::Settled));
        let harvested = run(&mut world, &mut detector, Command::HarvestCrop { cell });
        assert_eq!(harvested, Some(Verdict::Settled));
    }
    assert_eq!(query::global_balance(&world), ElementBalance::new(5, 5, 5, 5));
}

#[test]
fn fire_returns_cross_threshold_on_fourth_harvest() {
    let catalog = PlantCatalog::default().with_impact(
        PlantType::Tomato,
        ElementImpact::new(ElementBalance::ZERO, ElementBalance::new(4, 0, 0, 0)),
    );
    let mut world = single_cell_world(catalog);
    let mut detector = ImbalanceDetector::new(Config::new(15, false));
    let cell = CellId::new(0);

    let mut verdicts = Vec::new();
    for _ in 0..6 {
        let _ = run(
            &mut world,
            &mut detector,
            Command::PlantCrop {
                cell,
                plant: PlantType::Tomato,
            },
        );
        verdicts.push(run(&mut world, &mut detector, Command::HarvestCrop { cell }));
    }

    let dominant = Some(Verdict::Dominant(Element::Fire));
    assert_eq!(
        verdicts,
        vec![
            Some(Verdict::Settled),
            Some(Verdict::Settled),
            Some(Verdict::Settled),
            dominant,
            dominant,
            dominant,
        ]
    );
    assert_eq!(query::ledger(&world).initial_total(), 20);
}

#[test]
fn rejected_actions_do_not_trigger_evaluation() {
    let mut world = single_cell_world(PlantCatalog::default());
    let mut detector = ImbalanceDetector::new(Config::new(15, false));

    let verdict = run(
        &mut world,
        &mut detector,
        Command::HarvestCrop {
            cell: CellId::new(0),
        },
    );
    assert_eq!(verdict, None);
    assert_eq!(detector.last_verdict(), None);
}

#[test]
fn onboarding_catches_up_on_dormant_imbalance() {
    let catalog = PlantCatalog::default().with_impact(
        PlantType::Pumpkin,
        ElementImpact::new(ElementBalance::ZERO, ElementBalance::new(0, 16, 0, 0)),
    );
    let mut world = single_cell_world(catalog);
    let mut detector = ImbalanceDetector::new(Config::default());
    let cell = CellId::new(0);

    let _ = run(
        &mut world,
        &mut detector,
        Command::PlantCrop {
            cell,
            plant: PlantType::Pumpkin,
        },
    );
    let while_dormant = run(&mut world, &mut detector, Command::HarvestCrop { cell });
    assert_eq!(while_dormant, None, "dormant detector stays quiet");

    let mut events = Vec::new();
    world::apply(&mut world, Command::FinishOnboarding, &mut events);
    assert_eq!(events, vec![Event::OnboardingFinished]);
    let ledger = query::ledger(&world);
    let verdict = detector.handle(&events, ledger.global(), ledger.initial_total());
    assert_eq!(verdict, Some(Verdict::Dominant(Element::Water)));
}
