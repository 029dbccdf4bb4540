// Copyright 2025 the Loopguard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scripted feed with a cycle limit.
//!
//! A three-item vertical feed. The user watches the first clip loop until the
//! cycle rule pauses it, scrolls to the second (a fresh element), and then the
//! page reuses that element for a third clip under a new route.
//!
//! Run:
//! - `RUST_LOG=info cargo run -p loopguard_demos --example scripted_feed`

use core::time::Duration;

use kurbo::Rect;
use loopguard_observe::schedule::{Timer, WatchSpec};
use loopguard_observe::{
    ActuationError, Actuator, Host, HostError, MediaEvent, MediaEvents, Navigation, Observer,
};
use loopguard_select::Candidate;
use loopguard_session::{Config, Playback, StopRule};
use tracing_subscriber::EnvFilter;

const ITEM_HEIGHT: f64 = 800.0;

#[derive(Debug, Default)]
struct Feed {
    route: String,
    scroll: f64,
    reused: bool,
    position: f64,
    paused: Vec<u32>,
}

impl Feed {
    fn current_media(&self) -> u32 {
        let item = (self.scroll / ITEM_HEIGHT).round() as u32;
        100 + item - u32::from(self.reused && item == 2)
    }
}

impl Host for Feed {
    type Item = u32;
    type Media = u32;

    fn route(&self) -> &str {
        &self.route
    }

    fn in_scope(&self) -> bool {
        self.route.starts_with("/clips/")
    }

    fn marked_active(&self) -> Option<u32> {
        None
    }

    fn candidates(&self) -> Vec<Candidate<u32>> {
        (0..3)
            .map(|i| {
                let y0 = f64::from(i) * ITEM_HEIGHT - self.scroll;
                Candidate {
                    item: i,
                    bounds: Rect::new(0.0, y0, 400.0, y0 + ITEM_HEIGHT),
                }
            })
            .collect()
    }

    fn viewport(&self) -> Rect {
        Rect::new(0.0, 0.0, 400.0, ITEM_HEIGHT)
    }

    fn media_of(&self, item: u32) -> Option<u32> {
        // Once reused, item 2 plays inside the element of item 1.
        Some(if self.reused && item == 2 {
            101
        } else {
            100 + item
        })
    }

    fn playback(&self, _media: u32) -> Playback {
        Playback::new(self.position, 6.0)
    }

    fn listen(&mut self, media: u32, _events: MediaEvents) -> Result<(), HostError> {
        println!("  host: listen {media}");
        Ok(())
    }

    fn unlisten(&mut self, media: u32, _events: MediaEvents) -> Result<(), HostError> {
        println!("  host: unlisten {media}");
        Ok(())
    }

    fn watch(&mut self, spec: &WatchSpec) -> Result<(), HostError> {
        println!("  host: watch {:?}", spec.attributes);
        Ok(())
    }

    fn unwatch(&mut self) -> Result<(), HostError> {
        println!("  host: unwatch");
        Ok(())
    }

    fn start_timer(&mut self, timer: Timer, period: Duration) -> Result<(), HostError> {
        println!("  host: start {timer:?} every {period:?}");
        Ok(())
    }

    fn cancel_timer(&mut self, timer: Timer) -> Result<(), HostError> {
        println!("  host: cancel {timer:?}");
        Ok(())
    }
}

impl Actuator<u32> for Feed {
    fn pause(&mut self, media: u32) -> Result<(), ActuationError> {
        println!("  host: PAUSE {media}");
        self.paused.push(media);
        Ok(())
    }

    fn mute(&mut self, media: u32) -> Result<(), ActuationError> {
        println!("  host: mute {media}");
        Ok(())
    }
}

/// Play `loops` full cycles of the current clip, sampling every 250 ms.
fn play_loops(o: &mut Observer<Feed>, now: &mut Duration, loops: u32) {
    let step = Duration::from_millis(250);
    for _ in 0..loops {
        for tick in 1..=24 {
            *now += step;
            o.host_mut().position = f64::from(tick) * 0.25;
            let media = o.host().current_media();
            o.media_event(media, MediaEvent::Progress, *now);
        }
        // Looping players jump back without reporting the end.
        *now += step;
        o.host_mut().position = 0.05;
        let media = o.host().current_media();
        o.media_event(media, MediaEvent::Progress, *now);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let feed = Feed {
        route: "/clips/first".into(),
        ..Feed::default()
    };
    let config = Config {
        stop: StopRule::Cycles { count: 2 },
        ..Config::default()
    };
    let mut o = Observer::new(feed, config);
    let mut now = Duration::ZERO;

    println!("== Bootstrap ==");
    o.bootstrap(now);
    o.navigate(Navigation::DomReady, now);
    println!("  tracking {:?}", o.machine().item());

    println!("== First clip loops ==");
    play_loops(&mut o, &mut now, 3);
    println!(
        "  cycles={} state={:?}",
        o.machine().session().map_or(0, |s| s.cycles()),
        o.machine().state()
    );

    println!("== Scroll to the second clip ==");
    o.host_mut().scroll = ITEM_HEIGHT;
    o.host_mut().position = 0.0;
    o.host_mut().route = "/clips/second".into();
    now += Duration::from_secs(1);
    o.timer_fired(Timer::Steady, now);
    println!("  tracking {:?}", o.machine().item());

    println!("== Same element reused for the third clip ==");
    play_loops(&mut o, &mut now, 1);
    o.host_mut().reused = true;
    o.host_mut().scroll = 2.0 * ITEM_HEIGHT;
    o.host_mut().route = "/clips/third".into();
    now += Duration::from_secs(1);
    o.timer_fired(Timer::Steady, now);
    println!(
        "  tracking {:?} cycles={}",
        o.machine().item(),
        o.machine().session().map_or(0, |s| s.cycles())
    );

    println!("== Leave the feed ==");
    o.host_mut().route = "/home".into();
    o.navigate(Navigation::RouteStart, now);
    println!("  state={:?}", o.machine().state());

    assert_eq!(o.host().paused, vec![100]);
}
