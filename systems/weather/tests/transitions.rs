use std::{cell::RefCell, rc::Rc, time::Duration};

use elemental_farm_core::{Element, Event, TransitionDirection, TransitionRequest, WeatherState};
use elemental_farm_system_weather::{
    AmbientFrame, Config, EffectDriver, EffectDrivers, LightningConfig, Tween, WeatherController,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Call {
    Start(Element),
    Stop(Element),
    Settle(Element, TransitionDirection),
    /// Element fed and the frame's clock in milliseconds.
    Feed(Element, u64),
}

type Log = Rc<RefCell<Vec<Call>>>;

#[derive(Debug)]
struct Recording {
    element: Element,
    length: Duration,
    log: Log,
}

impl EffectDriver for Recording {
    fn element(&self) -> Element {
        self.element
    }

    fn start(&mut self) -> Tween {
        self.log.borrow_mut().push(Call::Start(self.element));
        Tween::new(self.length)
    }

    fn stop(&mut self) -> Tween {
        self.log.borrow_mut().push(Call::Stop(self.element));
        Tween::new(self.length)
    }

    fn settle(&mut self, direction: TransitionDirection) {
        self.log
            .borrow_mut()
            .push(Call::Settle(self.element, direction));
    }

    fn feed(&mut self, frame: &AmbientFrame) {
        let clock_ms = (f64::from(frame.clock_seconds) * 1_000.0).round() as u64;
        self.log
            .borrow_mut()
            .push(Call::Feed(self.element, clock_ms));
    }
}

struct Harness {
    controller: WeatherController,
    log: Log,
    now: Duration,
}

impl Harness {
    fn new(length: Duration) -> Self {
        Self::with_config(length, Config::new(7))
    }

    fn with_config(length: Duration, config: Config) -> Self {
        let log = Log::default();
        let drivers = Element::ALL
            .into_iter()
            .map(|element| {
                Box::new(Recording {
                    element,
                    length,
                    log: Rc::clone(&log),
                }) as Box<dyn EffectDriver>
            })
            .collect();
        let drivers = EffectDrivers::new(drivers).expect("one driver per element");
        Self {
            controller: WeatherController::new(config, drivers),
            log,
            now: Duration::ZERO,
        }
    }

    fn request(&mut self, dominant: Option<Element>) -> Vec<Event> {
        let mut out = Vec::new();
        self.controller.request(dominant, &mut out);
        out
    }

    fn submit(&mut self, request: TransitionRequest) -> Vec<Event> {
        let mut out = Vec::new();
        self.controller.submit(request, &mut out);
        out
    }

    fn tick(&mut self, dt: Duration) -> Vec<Event> {
        self.now += dt;
        let mut out = Vec::new();
        self.controller.handle(
            &[Event::TimeAdvanced {
                now: self.now,
                dt,
            }],
            &mut out,
        );
        out
    }

    fn settle(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        for _ in 0..1_000 {
            if !self.controller.is_transitioning() && self.controller.queued().next().is_none() {
                return events;
            }
            events.extend(self.tick(Duration::from_millis(100)));
        }
        panic!("controller never went idle");
    }

    fn transitions(&self) -> Vec<Call> {
        self.log
            .borrow()
            .iter()
            .copied()
            .filter(|call| !matches!(call, Call::Feed(..)))
            .collect()
    }
}

fn count<F: Fn(&Event) -> bool>(events: &[Event], predicate: F) -> usize {
    events.iter().filter(|event| predicate(event)).count()
}

#[test]
fn repeated_dominance_starts_the_effect_once() {
    let mut harness = Harness::new(Duration::from_millis(300));
    let mut events = harness.request(Some(Element::Fire));
    events.extend(harness.request(Some(Element::Fire)));
    events.extend(harness.tick(Duration::from_millis(100)));
    events.extend(harness.request(Some(Element::Fire)));
    events.extend(harness.settle());
    events.extend(harness.request(Some(Element::Fire)));

    assert_eq!(
        count(&events, |event| matches!(
            event,
            Event::WeatherTransitionStarted {
                direction: TransitionDirection::Start,
                element: Element::Fire,
            }
        )),
        1
    );
    assert_eq!(
        harness.transitions(),
        vec![
            Call::Start(Element::Fire),
            Call::Settle(Element::Fire, TransitionDirection::Start),
        ]
    );
    assert_eq!(harness.controller.state(), WeatherState::Active(Element::Fire));
}

#[test]
fn switching_elements_stops_before_starting() {
    let mut harness = Harness::new(Duration::from_millis(300));
    let _ = harness.request(Some(Element::Fire));
    let _ = harness.settle();

    let _ = harness.request(Some(Element::Water));
    assert_eq!(
        harness.controller.in_flight(),
        Some((TransitionDirection::Stop, Element::Fire))
    );
    assert_eq!(
        harness.controller.queued().copied().collect::<Vec<_>>(),
        vec![TransitionRequest::start(Element::Water)]
    );

    let _ = harness.settle();
    assert_eq!(
        harness.transitions(),
        vec![
            Call::Start(Element::Fire),
            Call::Settle(Element::Fire, TransitionDirection::Start),
            Call::Stop(Element::Fire),
            Call::Settle(Element::Fire, TransitionDirection::Stop),
            Call::Start(Element::Water),
            Call::Settle(Element::Water, TransitionDirection::Start),
        ]
    );

    let flags = harness.controller.flags();
    assert!(!flags.heat_wave);
    assert!(flags.storming);
    assert!(!flags.windy && !flags.overgrown);
}

#[test]
fn transitions_never_overlap() {
    let mut harness = Harness::new(Duration::from_millis(300));
    let inputs = [
        Some(Element::Fire),
        Some(Element::Water),
        None,
        Some(Element::Air),
        Some(Element::Air),
        Some(Element::Earth),
        None,
        Some(Element::Fire),
    ];
    for dominant in inputs {
        let _ = harness.request(dominant);
        let _ = harness.tick(Duration::from_millis(50));
        let flags = harness.controller.flags();
        let raised = [flags.heat_wave, flags.storming, flags.windy, flags.overgrown]
            .into_iter()
            .filter(|flag| *flag)
            .count();
        assert!(raised <= 1);
    }
    let _ = harness.settle();

    let mut open: Option<Element> = None;
    for call in harness.transitions() {
        match call {
            Call::Start(element) | Call::Stop(element) => {
                assert_eq!(open, None, "{call:?} began while another animation ran");
                open = Some(element);
            }
            Call::Settle(element, _) => {
                assert_eq!(open, Some(element));
                open = None;
            }
            Call::Feed(..) => {}
        }
    }
    assert_eq!(open, None);
    assert_eq!(harness.controller.state(), WeatherState::Active(Element::Fire));
}

#[test]
fn resolutions_are_suppressed_until_onboarding_finishes() {
    let mut harness = Harness::new(Duration::from_millis(200));
    let mut events = harness.submit(TransitionRequest::start(Element::Fire));
    events.extend(harness.settle());
    events.extend(harness.submit(TransitionRequest::clear()));
    events.extend(harness.settle());

    assert_eq!(harness.controller.state(), WeatherState::None);
    assert_eq!(count(&events, |event| matches!(event, Event::WeatherResolved { .. })), 0);
    assert_eq!(count(&events, |event| *event == Event::GoalCheckRequested), 1);

    let mut onboarding = Vec::new();
    harness
        .controller
        .handle(&[Event::OnboardingFinished], &mut onboarding);
    assert!(onboarding.is_empty());
    assert!(harness.controller.onboarding_finished());

    let mut events = harness.request(Some(Element::Water));
    events.extend(harness.settle());
    events.extend(harness.request(None));
    events.extend(harness.settle());
    assert_eq!(
        events
            .iter()
            .filter(|event| matches!(event, Event::WeatherResolved { .. }))
            .collect::<Vec<_>>(),
        vec![&Event::WeatherResolved {
            element: Element::Water
        }]
    );
}

#[test]
fn zero_length_animation_completes_on_the_next_tick() {
    let mut harness = Harness::new(Duration::ZERO);
    let begun = harness.request(Some(Element::Earth));
    assert_eq!(
        begun,
        vec![
            Event::WeatherTransitionStarted {
                direction: TransitionDirection::Start,
                element: Element::Earth,
            },
            Event::WeatherChanged {
                from: WeatherState::None,
                to: WeatherState::Active(Element::Earth),
            },
        ]
    );
    assert!(harness.controller.is_transitioning());

    let next = harness.tick(Duration::from_millis(16));
    assert!(next.contains(&Event::WeatherTransitionCompleted {
        direction: TransitionDirection::Start,
        element: Element::Earth,
    }));
    assert!(!harness.controller.is_transitioning());
}

#[test]
fn clearing_clear_skies_does_nothing() {
    let mut harness = Harness::new(Duration::from_millis(100));
    assert!(harness.request(None).is_empty());
    assert!(harness.submit(TransitionRequest::clear()).is_empty());
    assert!(harness.submit(TransitionRequest::stop(Element::Air)).is_empty());
    assert!(!harness.controller.is_transitioning());
    assert!(harness.transitions().is_empty());
}

#[test]
fn stop_during_start_waits_for_the_start() {
    let mut harness = Harness::new(Duration::from_millis(300));
    let _ = harness.request(Some(Element::Fire));
    let _ = harness.request(None);
    assert_eq!(harness.controller.queued().count(), 1);
    assert_eq!(harness.controller.projected_state(), WeatherState::None);

    let _ = harness.settle();
    assert_eq!(harness.controller.state(), WeatherState::None);
    assert_eq!(
        harness.transitions(),
        vec![
            Call::Start(Element::Fire),
            Call::Settle(Element::Fire, TransitionDirection::Start),
            Call::Stop(Element::Fire),
            Call::Settle(Element::Fire, TransitionDirection::Stop),
        ]
    );
}

#[test]
fn in_flight_stop_projects_clear_skies() {
    let mut harness = Harness::new(Duration::from_millis(300));
    let _ = harness.request(Some(Element::Air));
    let _ = harness.settle();

    let _ = harness.request(None);
    assert_eq!(
        harness.controller.in_flight(),
        Some((TransitionDirection::Stop, Element::Air))
    );
    assert!(harness.request(None).is_empty());
    assert_eq!(harness.controller.queued().count(), 0);

    let _ = harness.request(Some(Element::Air));
    assert_eq!(
        harness.controller.queued().copied().collect::<Vec<_>>(),
        vec![TransitionRequest::start(Element::Air)]
    );
    let _ = harness.settle();
    assert_eq!(harness.controller.state(), WeatherState::Active(Element::Air));
}

#[test]
fn active_effects_are_fed_the_running_clock_except_overgrowth() {
    for element in [Element::Fire, Element::Air, Element::Earth] {
        let mut harness = Harness::new(Duration::from_millis(300));
        let _ = harness.request(Some(element));
        for _ in 0..5 {
            let _ = harness.tick(Duration::from_millis(100));
        }

        let fed: Vec<_> = harness
            .log
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::Feed(who, at) => Some((*who, *at)),
                _ => None,
            })
            .collect();
        let expected: Vec<_> = match element {
            Element::Earth => Vec::new(),
            _ => (1..=5).map(|tick| (element, tick * 100)).collect(),
        };
        assert_eq!(fed, expected, "{element:?}");
        assert_eq!(harness.controller.state(), WeatherState::Active(element));
    }
}

#[test]
fn storm_lightning_is_spaced_and_replays() {
    let lightning = LightningConfig::new(Duration::from_millis(5_000), 0.5, 0.8, 0.004);
    let strikes = |seed: u64| {
        let mut harness = Harness::with_config(
            Duration::from_millis(300),
            Config::new(seed).with_lightning(lightning),
        );
        let _ = harness.request(Some(Element::Water));
        let mut at = Vec::new();
        for _ in 0..600 {
            for event in harness.tick(Duration::from_millis(100)) {
                if let Event::LightningStruck { at: when } = event {
                    at.push(when);
                }
            }
            assert!(harness.controller.lightning_intensity() <= 0.8);
        }
        let fed = harness
            .log
            .borrow()
            .iter()
            .filter(|call| matches!(call, Call::Feed(Element::Water, _)))
            .count();
        assert_eq!(fed, 600);

        let _ = harness.request(None);
        let _ = harness.settle();
        assert!(harness.controller.lightning_intensity().abs() < f32::EPSILON);
        at
    };

    let first = strikes(11);
    assert!(!first.is_empty());
    for pair in first.windows(2) {
        assert!(pair[1] - pair[0] > Duration::from_millis(5_000));
    }
    assert!(first[0] > Duration::from_millis(5_000));
    assert_eq!(first, strikes(11));
}
