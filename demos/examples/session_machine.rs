// Copyright 2025 the Loopguard Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Elapsed-time accounting without a host.
//!
//! Feeds position samples straight into a session machine: forward progress,
//! a pause (repeated positions), and loop wraps that credit the tail of the
//! previous cycle, until the elapsed limit stops the session.
//!
//! Run:
//! - `cargo run -p loopguard_demos --example session_machine`

use core::time::Duration;

use loopguard_session::{Config, Machine, Playback, StopRule};

fn main() {
    let config = Config {
        stop: StopRule::Elapsed { seconds: 20.0 },
        logging: false,
    };
    let mut machine: Machine<&str> = Machine::new(config);
    let route = Some("/clips/a");
    let duration = 8.0;

    let _ = machine.observe(
        Some("clip"),
        "/clips/a",
        Playback::new(0.0, duration),
        Duration::ZERO,
    );

    // (host seconds, media position)
    let samples = [
        (1.0, 1.0),
        (2.0, 2.0),
        (3.0, 2.0), // paused
        (4.0, 2.0),
        (5.0, 3.0),
        (7.0, 7.5),
        (7.6, 0.1), // wrap: +0.1 and the 0.5 s tail
        (12.0, 4.5),
        (16.0, 7.9),
        (16.3, 0.2), // wrap again
        (20.0, 4.5),
    ];

    for (t, position) in samples {
        let step = machine.sample(
            Playback::new(position, duration),
            route,
            Duration::from_secs_f64(t),
        );
        let session = machine.session().expect("tracked");
        println!(
            "t={t:>5.1}s pos={position:>4.1} accumulated={:>6.2} cycles={} {step:?}",
            session.accumulated(),
            session.cycles(),
        );
        if step.stop.is_some() {
            println!("== stop rule reached at t={t}s ==");
        }
    }

    let session = machine.session().expect("tracked");
    assert_eq!(session.cycles(), 2);
    assert!(session.is_stopped());
}
