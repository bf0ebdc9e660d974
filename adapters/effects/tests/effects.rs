use std::time::Duration;

use elemental_farm_core::{Element, Event, TransitionDirection, WeatherState};
use elemental_farm_effects::standard_drivers;
use elemental_farm_system_weather::{Config, WeatherController};

const FRAME: Duration = Duration::from_millis(100);

struct Stage {
    controller: WeatherController,
    now: Duration,
}

impl Stage {
    fn new() -> Self {
        let drivers = standard_drivers().expect("standard drivers");
        Self {
            controller: WeatherController::new(Config::new(3), drivers),
            now: Duration::ZERO,
        }
    }

    fn frames(&mut self, count: usize) -> Vec<Event> {
        let mut out = Vec::new();
        for _ in 0..count {
            self.now += FRAME;
            self.controller.update(self.now, FRAME, &mut out);
        }
        out
    }

    fn mix(&self, element: Element) -> f32 {
        self.controller.drivers().get(element).mix()
    }
}

#[test]
fn heatwave_fades_in_over_its_animation() {
    let mut stage = Stage::new();
    let mut out = Vec::new();
    stage.controller.request(Some(Element::Fire), &mut out);

    let _ = stage.frames(5);
    let partial = stage.mix(Element::Fire);
    assert!(partial > 0.3 && partial < 0.4, "mix was {partial}");

    let settled = stage.frames(10);
    assert!(settled.contains(&Event::WeatherTransitionCompleted {
        direction: TransitionDirection::Start,
        element: Element::Fire,
    }));
    assert!((stage.mix(Element::Fire) - 1.0).abs() < f32::EPSILON);
}

#[test]
fn switching_to_a_storm_fades_the_heatwave_out_first() {
    let mut stage = Stage::new();
    let mut out = Vec::new();
    stage.controller.request(Some(Element::Fire), &mut out);
    let _ = stage.frames(15);

    stage.controller.request(Some(Element::Water), &mut out);
    let _ = stage.frames(8);
    assert!(stage.mix(Element::Fire) > 0.0);
    assert!(stage.mix(Element::Water).abs() < f32::EPSILON);

    let _ = stage.frames(30);
    assert!(stage.mix(Element::Fire).abs() < f32::EPSILON);
    assert!((stage.mix(Element::Water) - 1.0).abs() < f32::EPSILON);
    assert_eq!(stage.controller.state(), WeatherState::Active(Element::Water));
}

#[test]
fn overgrowth_settles_asynchronously_like_the_others() {
    let mut stage = Stage::new();
    let mut out = Vec::new();
    stage.controller.request(Some(Element::Earth), &mut out);
    assert!(stage.controller.is_transitioning());

    let early = stage.frames(20);
    assert!(!early
        .iter()
        .any(|event| matches!(event, Event::WeatherTransitionCompleted { .. })));

    let late = stage.frames(1);
    assert_eq!(
        late,
        vec![Event::WeatherTransitionCompleted {
            direction: TransitionDirection::Start,
            element: Element::Earth,
        }]
    );
}
